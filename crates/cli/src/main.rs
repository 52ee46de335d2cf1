use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use linkage::api::{
    evaluate, externalize, internalize, move_point, trace_path, try_remove_point, Linkage,
    PointMap, PointRef, Session,
};
use linkage::{KinCfg, Point, SessionCfg};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

mod io;
mod provenance;
mod script;

use provenance::{write_sidecar, Payload};

#[derive(Parser)]
#[command(name = "linkage-cli")]
#[command(about = "Evaluate, trace and edit planar linkages")]
struct Cmd {
    /// Linkage literal (JSON); defaults to the built-in four-bar
    #[arg(long, global = true)]
    linkage: Option<PathBuf>,

    /// Log rejected drags, skipped frames and other debug events
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Form {
    Internal,
    External,
}

#[derive(Subcommand)]
enum Action {
    /// Print (or write) every variable and the link polylines at one driver angle
    Eval {
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        theta: f64,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Trace one point over a revolution into a CSV or Parquet table
    Trace {
        /// Point suffix (4 for x4/y4)
        #[arg(long)]
        point: u32,
        #[arg(long, default_value_t = linkage::api::DEFAULT_SAMPLES)]
        samples: usize,
        #[arg(long)]
        out: PathBuf,
    },
    /// Drag a point and write the re-parameterized linkage
    Drag {
        #[arg(long)]
        point: u32,
        /// Target position as `x,y`
        #[arg(long, value_parser = parse_xy, allow_hyphen_values = true)]
        to: Point,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        theta: f64,
        #[arg(long)]
        out: PathBuf,
    },
    /// Remove a point (and the structure owning it)
    Remove {
        #[arg(long)]
        point: u32,
        #[arg(long)]
        out: PathBuf,
    },
    /// Switch hinges between link lengths and local-frame coordinates
    Convert {
        #[arg(long, value_enum)]
        to: Form,
        /// Reference angle for the local-frame capture
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        theta: f64,
        #[arg(long)]
        out: PathBuf,
    },
    /// Replay an editor event script and write the resulting linkage
    Script {
        #[arg(long)]
        file: PathBuf,
        /// Point suffix traced during the session
        #[arg(long)]
        trace: Option<u32>,
        #[arg(long, value_enum, default_value_t = Form::External)]
        form: Form,
        #[arg(long)]
        out: PathBuf,
    },
}

fn parse_xy(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y, got {s:?}"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("x: {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("y: {e}"))?;
    Ok(Point::new(x, y))
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = if cmd.verbose { Level::DEBUG } else { Level::INFO };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .init();
    let src = cmd.linkage.as_deref();
    let lk = io::load_linkage(src)?;
    let source = io::source_label(src);
    tracing::info!(source, structures = lk.structures.len(), "linkage loaded");
    match cmd.action {
        Action::Eval { theta, out } => eval(&lk, source, theta, out.as_deref()),
        Action::Trace {
            point,
            samples,
            out,
        } => trace(&lk, source, point, samples, &out),
        Action::Drag {
            point,
            to,
            theta,
            out,
        } => drag(lk, source, point, to, theta, &out),
        Action::Remove { point, out } => remove(lk, source, point, &out),
        Action::Convert { to, theta, out } => convert(&lk, source, to, theta, &out),
        Action::Script {
            file,
            trace,
            form,
            out,
        } => run_script(&lk, source, &file, trace, form, &out),
    }
}

fn point(lk: &Linkage, suffix: u32) -> Result<PointRef> {
    lk.point_by_suffix(suffix)
        .ok_or_else(|| anyhow!("linkage has no point x{suffix}/y{suffix}"))
}

fn eval(lk: &Linkage, source: String, theta: f64, out: Option<&Path>) -> Result<()> {
    let vars = evaluate(lk, theta).context("evaluating linkage")?;
    let values: BTreeMap<String, f64> = lk
        .vars
        .live()
        .map(|(id, name)| (name.to_string(), vars.get(id)))
        .collect();
    let doc = json!({
        "theta": theta,
        "vars": values,
        "segments": linkage::scene::segments(lk, &vars),
    });
    let Some(out) = out else {
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    };
    provenance::ensure_parent(out)?;
    std::fs::write(out, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", out.display()))?;
    let payload = Payload {
        command: "eval",
        source,
        params: json!({ "theta": theta }),
    };
    write_sidecar(out, &payload)?;
    Ok(())
}

fn trace(lk: &Linkage, source: String, suffix: u32, samples: usize, out: &Path) -> Result<()> {
    let p = point(lk, suffix)?;
    let path = trace_path(lk, p, samples)
        .with_context(|| format!("point {suffix} has no closed path"))?;
    io::write_path_table(out, &path)?;
    tracing::info!(point = suffix, rows = path.len(), out = %out.display(), "path written");
    let payload = Payload {
        command: "trace",
        source,
        params: json!({ "point": suffix, "samples": samples }),
    };
    write_sidecar(out, &payload)?;
    Ok(())
}

fn drag(
    mut lk: Linkage,
    source: String,
    suffix: u32,
    to: Point,
    theta: f64,
    out: &Path,
) -> Result<()> {
    let p = point(&lk, suffix)?;
    let map = PointMap::build(&lk);
    let vars = evaluate(&lk, theta).context("evaluating linkage")?;
    let moved = move_point(p, to, &map, &lk, theta, &vars, None, KinCfg::default())
        .ok_or_else(|| anyhow!("drag of point {suffix} rejected: mechanism breaks"))?;
    lk.commit_ground(moved.ground);
    io::write_literal(out, &lk)?;
    let payload = Payload {
        command: "drag",
        source,
        params: json!({ "point": suffix, "to": [to.x, to.y], "theta": theta }),
    };
    write_sidecar(out, &payload)?;
    Ok(())
}

fn remove(mut lk: Linkage, source: String, suffix: u32, out: &Path) -> Result<()> {
    let p = point(&lk, suffix)?;
    let map = PointMap::build(&lk);
    if !try_remove_point(p, &map, &mut lk) {
        return Err(anyhow!(
            "point {suffix} cannot be removed: shared, or not the driven point of its structure"
        ));
    }
    io::write_literal(out, &lk)?;
    let payload = Payload {
        command: "remove",
        source,
        params: json!({ "point": suffix }),
    };
    write_sidecar(out, &payload)?;
    Ok(())
}

fn convert(lk: &Linkage, source: String, to: Form, theta: f64, out: &Path) -> Result<()> {
    let converted = match to {
        Form::Internal => internalize(lk, theta).context("capturing hinge frames")?,
        Form::External => externalize(lk),
    };
    io::write_literal(out, &converted)?;
    let payload = Payload {
        command: "convert",
        source,
        params: json!({ "to": format!("{to:?}").to_lowercase(), "theta": theta }),
    };
    write_sidecar(out, &payload)?;
    Ok(())
}

fn run_script(
    lk: &Linkage,
    source: String,
    file: &Path,
    trace: Option<u32>,
    form: Form,
    out: &Path,
) -> Result<()> {
    let text =
        std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let events = script::parse(&text).with_context(|| format!("parsing {}", file.display()))?;
    let traced = trace.map(|s| point(lk, s)).transpose()?;
    let mut session =
        Session::new(lk, traced, SessionCfg::default()).context("starting session")?;
    let stats = script::replay(&mut session, &events);
    tracing::info!(
        events = events.len(),
        added = stats.added,
        removed = stats.removed,
        skipped_frames = stats.skipped_frames,
        "script replayed"
    );
    let result = match form {
        Form::Internal => session.linkage().clone(),
        Form::External => externalize(session.linkage()),
    };
    io::write_literal(out, &result)?;
    let payload = Payload {
        command: "script",
        source,
        params: json!({
            "script": file.display().to_string(),
            "trace": trace,
            "added": stats.added,
            "removed": stats.removed,
        }),
    };
    write_sidecar(out, &payload)?;
    Ok(())
}
