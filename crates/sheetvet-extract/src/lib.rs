//! Workbook formula/name/constant extraction and cross-reference engine.
//!
//! Scans a workbook's cells and defined names, tokenizes formula text into
//! semantic parts, and links every formula to the named ranges and constants
//! it consumes along with each entity's cached calculated result. See
//! [`extract_workbook`] for the one-call entry point.

pub mod error;
pub mod loader;
pub mod names;
pub mod pipeline;
pub mod scanner;
pub mod tokenizer;
pub mod xref;

pub use error::ExtractError;
pub use loader::{CellContent, DefinedNameRecord, FormulaLoad, ValueSnapshot};
pub use pipeline::{Extraction, extract_workbook};
pub use tokenizer::TokenScan;

// Re-export the model types that appear in the output structure.
pub use sheetvet_model::{CellRef, Formula, Name, NameScope, Variable};
