//! Pipeline orchestrator: sequence the loads and stages into one run.

use std::path::Path;

use sheetvet_model::{Formula, Name, Variable};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::loader::{self, FormulaLoad, ValueSnapshot};
use crate::{names, scanner, xref};

/// The run's complete output: three fully cross-referenced collections.
///
/// Consumed wholesale by the reporting collaborators (tabular export and
/// verification-document generator) and discarded together.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, PartialEq)]
pub struct Extraction {
    pub formulas: Vec<Formula>,
    pub names: Vec<Name>,
    pub constants: Vec<Variable>,
}

/// Extract and cross-reference everything in one workbook.
///
/// The file is opened twice — formula-preserving, then value-mode. Either
/// open failing (missing file, exclusive lock, corrupt archive) aborts the
/// run with no partial output and no retry. Everything past the loads is
/// infallible best-effort resolution.
pub fn extract_workbook<P: AsRef<Path>>(path: P) -> Result<Extraction, ExtractError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "extracting workbook");

    let load = FormulaLoad::open(path)?;
    let records = loader::read_defined_names(path)?;

    let mut names = names::resolve_defined_names(&records, &load);
    let (mut formulas, mut constants) = scanner::scan_cells(&load);

    let values = ValueSnapshot::open(path)?;
    xref::cross_reference(&mut formulas, &mut names, &mut constants, &values);

    debug!(
        formulas = formulas.len(),
        names = names.len(),
        constants = constants.len(),
        "extraction complete"
    );
    Ok(Extraction {
        formulas,
        names,
        constants,
    })
}
