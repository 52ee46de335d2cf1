//! Serializable linkage description and its conversion into the typed arena.
//!
//! JSON shape (matches what hosts already store):
//!
//! ```json
//! {
//!   "structures": [
//!     {"type": "rotary", "input": {"lr": "l0", "x0r": "x0", "y0r": "y0", "fr": "f0"},
//!      "output": {"x1r": "x1", "y1r": "y1"}},
//!     {"type": "hinge", "input": {"l0r": "l1", "l1r": "l2", "x0r": "x1", "y0r": "y1",
//!      "x1r": "x3", "y1r": "y3"}, "output": {"x2r": "x2", "y2r": "y2"}}
//!   ],
//!   "initialVars": {"l0": 0.25, "x0": -0.4, "y0": 0.0, "f0": 0.0}
//! }
//! ```
//!
//! A hinge whose input carries `xtr`/`ytr`/`l2tr` instead of `l0r`/`l1r` is the
//! internal (local-frame) form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::ModelError;
use super::refs::{PointRef, Role, VarId, VarName, VarTable};
use super::types::{Ground, Hinge, HingeFrame, Linkage, Rotary, Structure};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkageLiteral {
    pub structures: Vec<StructureLiteral>,
    #[serde(rename = "initialVars")]
    pub initial_vars: BTreeMap<String, f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StructureLiteral {
    Rotary {
        input: RotaryInput,
        output: RotaryOutput,
    },
    Hinge {
        input: HingeInput,
        output: HingeOutput,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotaryInput {
    pub lr: String,
    pub x0r: String,
    pub y0r: String,
    pub fr: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotaryOutput {
    pub x1r: String,
    pub y1r: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HingeInput {
    Lengths {
        l0r: String,
        l1r: String,
        x0r: String,
        y0r: String,
        x1r: String,
        y1r: String,
    },
    Frame {
        xtr: String,
        ytr: String,
        l2tr: String,
        x0r: String,
        y0r: String,
        x1r: String,
        y1r: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HingeOutput {
    pub x2r: String,
    pub y2r: String,
}

/// Interns keys while checking that each one carries the role its slot expects.
struct Interner<'a> {
    table: &'a mut VarTable,
}

impl Interner<'_> {
    fn var(&mut self, key: &str, role: Role) -> Result<VarId, ModelError> {
        let name: VarName = key.parse()?;
        if name.role != role {
            return Err(ModelError::RoleMismatch {
                key: key.to_string(),
                expected: role,
            });
        }
        Ok(self.table.intern(name))
    }

    fn point(&mut self, x: &str, y: &str) -> Result<PointRef, ModelError> {
        Ok(PointRef::new(self.var(x, Role::X)?, self.var(y, Role::Y)?))
    }
}

impl Linkage {
    /// Build and validate a linkage from its literal description.
    pub fn from_literal(lit: &LinkageLiteral) -> Result<Self, ModelError> {
        let mut vars = VarTable::default();
        let mut ground = Ground::default();
        for (key, &value) in &lit.initial_vars {
            let name: VarName = key.parse()?;
            if !value.is_finite() {
                return Err(ModelError::NonFiniteGround { key: key.clone() });
            }
            let id = vars.intern(name);
            ground.set(id, value);
        }

        let mut structures = Vec::with_capacity(lit.structures.len());
        let mut it = Interner { table: &mut vars };
        for s in &lit.structures {
            let structure = match s {
                StructureLiteral::Rotary { input, output } => Structure::Rotary(Rotary {
                    length: it.var(&input.lr, Role::Length)?,
                    anchor: it.point(&input.x0r, &input.y0r)?,
                    phase: it.var(&input.fr, Role::Phase)?,
                    driven: it.point(&output.x1r, &output.y1r)?,
                }),
                StructureLiteral::Hinge {
                    input:
                        HingeInput::Lengths {
                            l0r,
                            l1r,
                            x0r,
                            y0r,
                            x1r,
                            y1r,
                        },
                    output,
                } => Structure::Hinge(Hinge {
                    l0: it.var(l0r, Role::Length)?,
                    l1: it.var(l1r, Role::Length)?,
                    p0: it.point(x0r, y0r)?,
                    p1: it.point(x1r, y1r)?,
                    driven: it.point(&output.x2r, &output.y2r)?,
                }),
                StructureLiteral::Hinge {
                    input:
                        HingeInput::Frame {
                            xtr,
                            ytr,
                            l2tr,
                            x0r,
                            y0r,
                            x1r,
                            y1r,
                        },
                    output,
                } => Structure::HingeFrame(HingeFrame {
                    xt: it.var(xtr, Role::X)?,
                    yt: it.var(ytr, Role::Y)?,
                    l2t: it.var(l2tr, Role::Length)?,
                    p0: it.point(x0r, y0r)?,
                    p1: it.point(x1r, y1r)?,
                    driven: it.point(&output.x2r, &output.y2r)?,
                }),
            };
            structures.push(structure);
        }

        let linkage = Linkage {
            structures,
            vars,
            ground,
        };
        linkage.check()?;
        Ok(linkage)
    }

    /// Literal description of this linkage (live names only).
    pub fn to_literal(&self) -> LinkageLiteral {
        let key = |id: VarId| self.key(id);
        let structures = self
            .structures
            .iter()
            .map(|s| match *s {
                Structure::Rotary(r) => StructureLiteral::Rotary {
                    input: RotaryInput {
                        lr: key(r.length),
                        x0r: key(r.anchor.x),
                        y0r: key(r.anchor.y),
                        fr: key(r.phase),
                    },
                    output: RotaryOutput {
                        x1r: key(r.driven.x),
                        y1r: key(r.driven.y),
                    },
                },
                Structure::Hinge(h) => StructureLiteral::Hinge {
                    input: HingeInput::Lengths {
                        l0r: key(h.l0),
                        l1r: key(h.l1),
                        x0r: key(h.p0.x),
                        y0r: key(h.p0.y),
                        x1r: key(h.p1.x),
                        y1r: key(h.p1.y),
                    },
                    output: HingeOutput {
                        x2r: key(h.driven.x),
                        y2r: key(h.driven.y),
                    },
                },
                Structure::HingeFrame(h) => StructureLiteral::Hinge {
                    input: HingeInput::Frame {
                        xtr: key(h.xt),
                        ytr: key(h.yt),
                        l2tr: key(h.l2t),
                        x0r: key(h.p0.x),
                        y0r: key(h.p0.y),
                        x1r: key(h.p1.x),
                        y1r: key(h.p1.y),
                    },
                    output: HingeOutput {
                        x2r: key(h.driven.x),
                        y2r: key(h.driven.y),
                    },
                },
            })
            .collect();
        let initial_vars = self
            .ground
            .iter()
            .filter(|(id, _)| self.vars.name(*id).is_some())
            .map(|(id, v)| (key(id), v))
            .collect();
        LinkageLiteral {
            structures,
            initial_vars,
        }
    }

    /// Verify the evaluation-order invariants.
    pub fn check(&self) -> Result<(), ModelError> {
        let mut defined: Vec<bool> = (0..self.vars.len())
            .map(|i| self.ground.contains(VarId(i)))
            .collect();
        for (i, s) in self.structures.iter().enumerate() {
            for id in s.inputs() {
                if !defined.get(id.0).copied().unwrap_or(false) {
                    return Err(ModelError::UnboundInput {
                        structure: i,
                        key: self.key(id),
                    });
                }
            }
            for id in s.outputs() {
                if self.ground.contains(id) {
                    return Err(ModelError::GroundOutput {
                        structure: i,
                        key: self.key(id),
                    });
                }
                if defined[id.0] {
                    return Err(ModelError::DuplicateOutput {
                        structure: i,
                        key: self.key(id),
                    });
                }
                defined[id.0] = true;
            }
        }
        Ok(())
    }
}
