//! File boundary: linkage literals in, literals and path tables out.

use anyhow::{bail, Context, Result};
use linkage::api::{presets, Linkage, LinkageLiteral, Polyline};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;

use crate::provenance::ensure_parent;

/// Load a literal from `path`, or the built-in four-bar when `path` is None.
pub fn load_linkage(path: Option<&Path>) -> Result<Linkage> {
    let Some(path) = path else {
        return Ok(presets::four_bar_coupler());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let lit: LinkageLiteral =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    Linkage::from_literal(&lit).with_context(|| format!("invalid linkage in {}", path.display()))
}

/// Human-readable name of the linkage source for logs and sidecars.
pub fn source_label(path: Option<&Path>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => "preset:four-bar-coupler".to_string(),
    }
}

pub fn write_literal(path: &Path, linkage: &Linkage) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_vec_pretty(&linkage.to_literal())?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

/// Sample index, driver angle and position of each path point.
pub fn path_frame(path: &Polyline) -> PolarsResult<DataFrame> {
    let n = path.len().saturating_sub(1).max(1);
    let sample: Vec<u32> = (0..path.len() as u32).collect();
    let theta: Vec<f64> = (0..path.len())
        .map(|i| i as f64 * std::f64::consts::TAU / n as f64)
        .collect();
    let x: Vec<f64> = path.iter().map(|p| p.x).collect();
    let y: Vec<f64> = path.iter().map(|p| p.y).collect();
    DataFrame::new(vec![
        Series::new("sample".into(), sample),
        Series::new("theta".into(), theta),
        Series::new("x".into(), x),
        Series::new("y".into(), y),
    ])
}

/// Write `path` as CSV or Parquet, chosen by the file extension.
pub fn write_path_table(out: &Path, path: &Polyline) -> Result<()> {
    ensure_parent(out)?;
    let mut df = path_frame(path)?;
    let ext = out.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !matches!(ext, "csv" | "parquet") {
        bail!("unsupported table format {ext:?} (use .csv or .parquet)");
    }
    let mut file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    if ext == "csv" {
        CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;
    } else {
        ParquetWriter::new(file).finish(&mut df)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkage::api::trace_path;
    use tempfile::tempdir;

    #[test]
    fn preset_is_default_source() {
        let lk = load_linkage(None).unwrap();
        assert_eq!(lk.structures.len(), 3);
        assert_eq!(source_label(None), "preset:four-bar-coupler");
    }

    #[test]
    fn literal_file_round_trip() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("out/four_bar.json");
        let lk = presets::four_bar_coupler();
        write_literal(&file, &lk).unwrap();
        let back = load_linkage(Some(&file)).unwrap();
        assert_eq!(back.to_literal(), lk.to_literal());
    }

    #[test]
    fn bad_literal_reports_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("bad.json");
        fs::write(&file, r#"{"structures": [], "initialVars": {"q1": 1.0}}"#).unwrap();
        let err = load_linkage(Some(&file)).unwrap_err();
        assert!(format!("{err:#}").contains("malformed variable reference"));
    }

    #[test]
    fn csv_table_has_one_row_per_sample() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("coupler.csv");
        let lk = presets::four_bar_coupler();
        let p = lk.point_by_suffix(4).unwrap();
        let path = trace_path(&lk, p, 20).unwrap();
        write_path_table(&out, &path).unwrap();
        let df = LazyCsvReader::new(&out).finish().unwrap().collect().unwrap();
        assert_eq!(df.shape(), (21, 4));
        assert!(write_path_table(&dir.path().join("coupler.txt"), &path).is_err());
    }

    #[test]
    fn parquet_table_is_written() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("coupler.parquet");
        let lk = presets::four_bar_coupler();
        let path = trace_path(&lk, lk.point_by_suffix(2).unwrap(), 10).unwrap();
        write_path_table(&out, &path).unwrap();
        assert!(fs::metadata(&out).unwrap().len() > 0);
    }
}
