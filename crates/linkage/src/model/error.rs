use std::fmt;

use super::refs::Role;

/// Construction-time errors raised at the linkage literal boundary.
///
/// A `Linkage` that made it past `from_literal` never produces these again;
/// the core treats the invariants they guard as given.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Key is not `<x|y|l|f><digits>`.
    MalformedRef { key: String },
    /// Key is well-formed but names no variable of this linkage.
    UnknownRef { key: String },
    /// Key sits in a slot that expects another role (e.g. a length in `x0r`).
    RoleMismatch { key: String, expected: Role },
    /// Input is neither ground nor the output of an earlier structure.
    UnboundInput { structure: usize, key: String },
    /// Output is written by two structures.
    DuplicateOutput { structure: usize, key: String },
    /// Output overwrites a ground value.
    GroundOutput { structure: usize, key: String },
    /// Ground value is NaN or infinite.
    NonFiniteGround { key: String },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::MalformedRef { key } => write!(f, "malformed variable reference {key:?}"),
            ModelError::UnknownRef { key } => write!(f, "unknown variable reference {key:?}"),
            ModelError::RoleMismatch { key, expected } => write!(
                f,
                "variable {key:?} used where a '{}' reference is expected",
                expected.prefix()
            ),
            ModelError::UnboundInput { structure, key } => write!(
                f,
                "structure {structure} reads {key:?} before a ground value or output defines it"
            ),
            ModelError::DuplicateOutput { structure, key } => {
                write!(f, "structure {structure} writes {key:?}, which is already an output")
            }
            ModelError::GroundOutput { structure, key } => {
                write!(f, "structure {structure} writes {key:?}, which is a ground value")
            }
            ModelError::NonFiniteGround { key } => {
                write!(f, "ground value {key:?} is not finite")
            }
        }
    }
}

impl std::error::Error for ModelError {}
