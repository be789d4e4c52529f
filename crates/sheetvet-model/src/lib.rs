pub mod coord;
pub mod entity;

pub use coord::AreaRef;
pub use entity::{CellRef, FORMULA_MARKER, Formula, Name, NameScope, Variable, strip_marker};
