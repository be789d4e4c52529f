//! Named range resolver: expand defined-name records into concrete `Name`
//! entities.

use sheetvet_model::{AreaRef, Name, strip_marker};
use tracing::debug;

use crate::loader::{CellContent, DefinedNameRecord, FormulaLoad};

/// Expand every defined-name record.
///
/// A record whose refers-to text resolves to a bounded cell area yields one
/// `Name` per covered cell (row-major, shared name and scope); anything else
/// — a literal expression, an open-ended range, an empty body — yields a
/// single global `Name` carrying the raw expression. Cell-bound names pick
/// up their source text from the formula-mode grid.
pub fn resolve_defined_names(records: &[DefinedNameRecord], load: &FormulaLoad) -> Vec<Name> {
    let mut names = Vec::new();
    for record in records {
        match first_area(&record.refers_to) {
            Some(area) => {
                for (row, col) in area.cells() {
                    let source = load
                        .content(&area.sheet, row, col)
                        .map(source_text)
                        .unwrap_or_default();
                    names.push(Name::cell_bound(
                        &record.name,
                        record.scope.clone(),
                        &area.sheet,
                        row,
                        col,
                        source,
                    ));
                }
            }
            None => {
                names.push(Name::global(
                    &record.name,
                    record.scope.clone(),
                    record.refers_to.clone(),
                ));
            }
        }
    }
    debug!(records = records.len(), names = names.len(), "resolved defined names");
    names
}

/// First comma-separated chunk of the refers-to text that parses as a
/// bounded area. Multi-area names keep only their first area, like the
/// destination iteration this mirrors.
fn first_area(refers_to: &str) -> Option<AreaRef> {
    refers_to.split(',').find_map(AreaRef::parse)
}

fn source_text(content: &CellContent) -> String {
    match content {
        CellContent::Formula(text) => strip_marker(text).to_string(),
        CellContent::Text(s) | CellContent::Literal(s) => s.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use sheetvet_model::NameScope;

    use super::*;
    use crate::loader::SheetGrid;

    fn record(name: &str, scope: NameScope, refers_to: &str) -> DefinedNameRecord {
        DefinedNameRecord {
            name: name.to_string(),
            scope,
            refers_to: refers_to.to_string(),
        }
    }

    fn empty_load() -> FormulaLoad {
        FormulaLoad { sheets: vec![] }
    }

    #[test]
    fn zero_destination_yields_one_global_name() {
        let names = resolve_defined_names(
            &[record("TaxRate", NameScope::Workbook, "0.0825")],
            &empty_load(),
        );
        assert_eq!(names.len(), 1);
        assert!(names[0].is_global);
        assert!(names[0].var.cell.is_none());
        assert_eq!(names[0].var.source, "0.0825");
        assert!(!names[0].is_used);
    }

    #[test]
    fn multi_cell_range_expands_row_major_sharing_name_and_scope() {
        let names = resolve_defined_names(
            &[record(
                "Window",
                NameScope::Sheet("Calc".into()),
                "Calc!$A$1:$B$2",
            )],
            &empty_load(),
        );
        assert_eq!(names.len(), 4);
        let coords: Vec<_> = names.iter().map(|n| n.var.coordinate().unwrap()).collect();
        assert_eq!(coords, vec!["A1", "B1", "A2", "B2"]);
        assert!(names.iter().all(|n| n.var.name == "Window"));
        assert!(names.iter().all(|n| n.scope == NameScope::Sheet("Calc".into())));
        assert!(names.iter().all(|n| !n.is_global));
    }

    #[test]
    fn cell_bound_name_takes_source_from_the_grid() {
        let load = FormulaLoad {
            sheets: vec![SheetGrid {
                name: "Inputs".into(),
                cells: BTreeMap::from_iter([
                    ((1, 2), CellContent::Formula("=A1*2".into())),
                    ((2, 2), CellContent::Literal("5".into())),
                ]),
            }],
        };
        let names = resolve_defined_names(
            &[
                record("Doubled", NameScope::Workbook, "Inputs!$B$1"),
                record("Rate", NameScope::Workbook, "Inputs!$B$2"),
                record("Blank", NameScope::Workbook, "Inputs!$B$3"),
            ],
            &load,
        );
        assert_eq!(names[0].var.source, "A1*2");
        assert_eq!(names[1].var.source, "5");
        assert_eq!(names[2].var.source, "");
    }

    #[test]
    fn same_text_on_two_sheets_stays_distinct() {
        let names = resolve_defined_names(
            &[
                record("Total", NameScope::Sheet("Jan".into()), "Jan!$C$9"),
                record("Total", NameScope::Sheet("Feb".into()), "Feb!$C$9"),
            ],
            &empty_load(),
        );
        assert_eq!(names.len(), 2);
        assert_ne!(names[0].var.sheet(), names[1].var.sheet());
        assert!(!names[0].var.same_target(&names[1].var));
    }

    #[test]
    fn multi_area_name_keeps_only_its_first_area() {
        let names = resolve_defined_names(
            &[record(
                "Patchwork",
                NameScope::Workbook,
                "Sheet1!$A$1,Sheet1!$C$3",
            )],
            &empty_load(),
        );
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].var.coordinate(), Some("A1"));
    }
}
