//! Linkage data model.
//!
//! Purpose
//! - Typed variable arena (`VarTable`, `VarId`) with the string keys kept at
//!   the literal boundary only.
//! - Structures (`Rotary`, `Hinge`, `HingeFrame`) and the ordered `Linkage`.
//! - Reference allocator for splicing new structures into a linkage.
//! - External ↔ internal hinge conversion.

mod convert;
mod error;
mod literal;
pub mod presets;
mod refs;
mod types;

pub use convert::{externalize, internalize};
pub use error::ModelError;
pub use literal::{
    HingeInput, HingeOutput, LinkageLiteral, RotaryInput, RotaryOutput, StructureLiteral,
};
pub use refs::{PointRef, RefAllocator, Role, VarId, VarName, VarTable};
pub use types::{Ground, Hinge, HingeFrame, Linkage, Rotary, Structure, Vars};
