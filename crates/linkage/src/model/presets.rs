//! Built-in mechanisms.

use std::collections::BTreeMap;

use super::literal::{
    HingeInput, HingeOutput, LinkageLiteral, RotaryInput, RotaryOutput, StructureLiteral,
};
use super::types::Linkage;

fn hinge(l0r: &str, l1r: &str, p0: u32, p1: u32, out: u32) -> StructureLiteral {
    StructureLiteral::Hinge {
        input: HingeInput::Lengths {
            l0r: l0r.into(),
            l1r: l1r.into(),
            x0r: format!("x{p0}"),
            y0r: format!("y{p0}"),
            x1r: format!("x{p1}"),
            y1r: format!("y{p1}"),
        },
        output: HingeOutput {
            x2r: format!("x{out}"),
            y2r: format!("y{out}"),
        },
    }
}

/// Crank-driven four-bar with a coupler point (external form).
///
/// Crank: anchor 0 at `(-0.4, 0)`, length 0.25, tip 1. Rocker: hinge on tip 1
/// and ground 3 at `(0.3, 0)` with lengths 0.5/0.5 driving point 2. Coupler
/// point 4: hinge on 2 and 1 with lengths 0.8/0.5.
pub fn four_bar_coupler_literal() -> LinkageLiteral {
    let structures = vec![
        StructureLiteral::Rotary {
            input: RotaryInput {
                lr: "l0".into(),
                x0r: "x0".into(),
                y0r: "y0".into(),
                fr: "f0".into(),
            },
            output: RotaryOutput {
                x1r: "x1".into(),
                y1r: "y1".into(),
            },
        },
        hinge("l1", "l2", 1, 3, 2),
        hinge("l3", "l4", 2, 1, 4),
    ];
    let initial_vars = BTreeMap::from([
        ("l0".to_string(), 0.25),
        ("l1".to_string(), 0.5),
        ("l2".to_string(), 0.5),
        ("l3".to_string(), 0.8),
        ("l4".to_string(), 0.5),
        ("x0".to_string(), -0.4),
        ("y0".to_string(), 0.0),
        ("x3".to_string(), 0.3),
        ("y3".to_string(), 0.0),
        ("f0".to_string(), 0.0),
    ]);
    LinkageLiteral {
        structures,
        initial_vars,
    }
}

pub fn four_bar_coupler() -> Linkage {
    Linkage::from_literal(&four_bar_coupler_literal()).expect("built-in preset is well-formed")
}

/// Point traced by default on the four-bar preset.
pub const FOUR_BAR_TRACE_SUFFIX: u32 = 4;
