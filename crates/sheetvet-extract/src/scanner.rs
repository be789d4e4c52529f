//! Cell scanner: walk the formula-preserving snapshot and classify every
//! populated cell as a formula, a constant, or an ignorable label.

use sheetvet_model::{Formula, Variable, strip_marker};
use tracing::debug;

use crate::loader::{CellContent, FormulaLoad};
use crate::tokenizer;

/// Scan all sheets in workbook order, cells row-major within a sheet.
///
/// Formula cells lose exactly one leading `=` and are tokenized on the spot;
/// string literals are labels and skipped; everything else populated becomes
/// a constant. The walk order is deterministic for identical input, which
/// keeps downstream report diffs reproducible.
pub fn scan_cells(load: &FormulaLoad) -> (Vec<Formula>, Vec<Variable>) {
    let mut formulas = Vec::new();
    let mut constants = Vec::new();

    for sheet in &load.sheets {
        for (&(row, col), content) in &sheet.cells {
            match content {
                CellContent::Formula(text) => {
                    let source = strip_marker(text).to_string();
                    let var = Variable::cell_bound(&sheet.name, row, col, source);
                    formulas.push(tokenizer::tokenize(var));
                }
                CellContent::Text(_) => {} // plain label, not data
                CellContent::Literal(value) => {
                    constants.push(Variable::cell_bound(&sheet.name, row, col, value.clone()));
                }
            }
        }
    }

    debug!(
        formulas = formulas.len(),
        constants = constants.len(),
        "scanned workbook cells"
    );
    (formulas, constants)
}
