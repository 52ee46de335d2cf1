use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// What produced an artifact: subcommand, its parameters, and where the linkage came from.
pub struct Payload {
    pub command: &'static str,
    pub source: String,
    pub params: Value,
}

#[derive(Serialize)]
struct Callsite {
    file: &'static str,
    line: u32,
}

#[derive(Serialize)]
struct Sidecar<'a> {
    code_rev: String,
    linkage_version: &'static str,
    callsite: Callsite,
    command: &'a str,
    source: &'a str,
    params: &'a Value,
    outputs: Vec<String>,
}

/// Write `<stem>.provenance.json` next to `artifact`.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: &Payload) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let path = sidecar_path(artifact);
    ensure_parent(&path)?;
    let here = Location::caller();
    let doc = Sidecar {
        code_rev: current_git_rev(),
        linkage_version: linkage::VERSION,
        callsite: Callsite {
            file: here.file(),
            line: here.line(),
        },
        command: payload.command,
        source: &payload.source,
        params: &payload.params,
        outputs: vec![artifact.to_string_lossy().into_owned()],
    };
    fs::write(&path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::debug!(sidecar = %path.display(), "provenance written");
    Ok(path)
}

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display())),
        _ => Ok(()),
    }
}

fn sidecar_path(artifact: &Path) -> PathBuf {
    let mut name = artifact
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "artifact".into());
    name.push(".provenance.json");
    artifact.with_file_name(name)
}

/// Commit of the working tree: `GIT_COMMIT` (build time, then run time), else `git rev-parse`.
pub fn current_git_rev() -> String {
    let from_env = option_env!("GIT_COMMIT")
        .map(str::to_string)
        .or_else(|| std::env::var("GIT_COMMIT").ok())
        .filter(|s| !s.is_empty());
    if let Some(rev) = from_env {
        return rev;
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
