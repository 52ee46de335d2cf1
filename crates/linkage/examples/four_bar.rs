//! Print the coupler curve of the built-in four-bar.
//!
//! Usage:
//!   cargo run -p linkage --example four_bar -- [samples]
//!
//! Prints one `x,y` line per sample, first point repeated at the end.

use linkage::api::{presets, trace_path};

fn main() {
    let samples = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(linkage::api::DEFAULT_SAMPLES);
    let lk = presets::four_bar_coupler();
    let Some(coupler) = lk.point_by_suffix(presets::FOUR_BAR_TRACE_SUFFIX) else {
        eprintln!("preset has no coupler point");
        return;
    };
    match trace_path(&lk, coupler, samples) {
        Ok(path) => {
            for p in path {
                println!("{:.6},{:.6}", p.x, p.y);
            }
        }
        Err(e) => eprintln!("four-bar does not complete a revolution: {e}"),
    }
}
