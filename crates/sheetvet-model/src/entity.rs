//! Entity records produced by the extraction pipeline.
//!
//! Every record moves through a fixed set of stages and is never revisited:
//! Created -> NameAssigned -> OutputAttached -> VariablesResolved (formulas)
//! or UsageComputed (names). The cross-referencer drives those stages; the
//! types here are plain mutable records.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::coord;

/// The marker a formula cell's text starts with.
pub const FORMULA_MARKER: char = '=';

/// Strip exactly one leading formula marker, if present.
pub fn strip_marker(text: &str) -> &str {
    text.strip_prefix(FORMULA_MARKER).unwrap_or(text)
}

/// Concrete cell binding: which sheet and grid position a record lives at.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellRef {
    pub sheet: String,
    /// A1-style coordinate text, kept because downstream reports print it.
    pub coordinate: String,
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub fn new(sheet: impl Into<String>, row: u32, col: u32) -> Self {
        CellRef {
            sheet: sheet.into(),
            coordinate: coord::coordinate(row, col),
            row,
            col,
        }
    }
}

/// Scope of a defined name.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameScope {
    Workbook,
    Sheet(String),
}

impl fmt::Display for NameScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameScope::Workbook => f.write_str("Workbook"),
            NameScope::Sheet(name) => f.write_str(name),
        }
    }
}

/// Base entity: a constant cell, or the shared core of a name or formula.
///
/// Constants use `Variable` directly — they carry nothing beyond the base
/// fields.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Variable {
    /// Defined name if one matched during cross-referencing, else the cell
    /// coordinate. Empty until the name-assignment stage runs.
    pub name: String,
    /// Grid binding; `None` for a defined name that wraps a literal
    /// expression instead of pointing at cells.
    pub cell: Option<CellRef>,
    /// Formula text with the leading marker stripped, or the literal value.
    pub source: String,
    /// Stringified calculated result from the value-mode load.
    pub output: Option<String>,
}

impl Variable {
    /// A cell-bound record (constant, or the core of a formula/name).
    pub fn cell_bound(sheet: impl Into<String>, row: u32, col: u32, source: String) -> Self {
        Variable {
            name: String::new(),
            cell: Some(CellRef::new(sheet, row, col)),
            source,
            output: None,
        }
    }

    /// Identity rule used for every cross-reference lookup.
    ///
    /// Two records are the same target when both are cell-bound and occupy
    /// the identical (sheet, row, col); cell binding takes precedence. When
    /// either side has no cell, the name strings decide.
    pub fn same_target(&self, other: &Variable) -> bool {
        match (&self.cell, &other.cell) {
            (Some(a), Some(b)) => a.sheet == b.sheet && a.row == b.row && a.col == b.col,
            _ => self.name == other.name,
        }
    }

    pub fn sheet(&self) -> Option<&str> {
        self.cell.as_ref().map(|c| c.sheet.as_str())
    }

    pub fn coordinate(&self) -> Option<&str> {
        self.cell.as_ref().map(|c| c.coordinate.as_str())
    }
}

/// A defined name, expanded to one record per covered cell.
///
/// A multi-cell named range yields one `Name` per cell, all sharing `name`
/// and `scope`. A zero-destination defined name yields exactly one global
/// record with no cell.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Name {
    pub var: Variable,
    pub scope: NameScope,
    /// True when the defined name wraps a literal expression (no cell).
    pub is_global: bool,
    /// Computed during the usage stage; never set at construction.
    pub is_used: bool,
}

impl Name {
    pub fn cell_bound(
        name: impl Into<String>,
        scope: NameScope,
        sheet: impl Into<String>,
        row: u32,
        col: u32,
        source: String,
    ) -> Self {
        let mut var = Variable::cell_bound(sheet, row, col, source);
        var.name = name.into();
        Name {
            var,
            scope,
            is_global: false,
            is_used: false,
        }
    }

    pub fn global(name: impl Into<String>, scope: NameScope, expression: String) -> Self {
        Name {
            var: Variable {
                name: name.into(),
                cell: None,
                source: expression,
                output: None,
            },
            scope,
            is_global: true,
            is_used: false,
        }
    }
}

/// A formula cell together with its tokenized parts and resolved inputs.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Formula {
    pub var: Variable,
    /// Intrinsic function names, in source order, duplicates kept.
    pub built_ins: Vec<String>,
    pub has_digits: bool,
    /// True when the source contains a structured (table) reference.
    pub in_table: bool,
    /// Format-code tokens, populated only for `#`-style markers in a
    /// text-formatting call.
    pub formats: Vec<String>,
    /// Candidate variable-name tokens awaiting resolution.
    pub candidates: Vec<String>,
    /// Resolved inputs, first-seen token order, unmatched tokens dropped.
    pub variables: Vec<Name>,
}
