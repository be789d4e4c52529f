//! End-to-end extraction over real .xlsx fixtures written with umya.

use std::path::PathBuf;

use sheetvet_extract::{NameScope, extract_workbook};
use tempfile::TempDir;

/// Write a fixture workbook; the TempDir must stay alive while it is read.
fn build_workbook(build: impl FnOnce(&mut umya_spreadsheet::Spreadsheet)) -> (TempDir, PathBuf) {
    let tmp = tempfile::tempdir().expect("temp dir");
    let path = tmp.path().join("fixture.xlsx");
    let mut book = umya_spreadsheet::new_file();
    build(&mut book);
    umya_spreadsheet::writer::xlsx::write(&book, &path).expect("write workbook");
    (tmp, path)
}

#[test]
fn extracts_and_cross_references_the_rate_scenario() {
    // A1 = 3, B1 = 5 named "Rate", C1 = A1+B1 with cached result 8.
    let (_tmp, path) = build_workbook(|book| {
        let sh = book.get_sheet_by_name_mut("Sheet1").unwrap();
        sh.get_cell_mut((1, 1)).set_value_number(3);
        sh.get_cell_mut((2, 1)).set_value_number(5);
        let c1 = sh.get_cell_mut((3, 1));
        c1.set_value_number(8);
        c1.set_formula("A1+B1");
        sh.add_defined_name("Rate", "Sheet1!$B$1")
            .expect("add defined name");
        // A label the scanner must skip.
        sh.get_cell_mut((1, 3)).set_value("inputs below");
    });

    let run = extract_workbook(&path).expect("extract");

    assert_eq!(run.formulas.len(), 1);
    let f = &run.formulas[0];
    assert_eq!(f.var.source, "A1+B1");
    assert!(!f.var.source.starts_with('='));
    assert_eq!(f.var.coordinate(), Some("C1"));
    assert_eq!(f.var.name, "C1", "no name covers C1, coordinate fallback");
    assert!(!f.has_digits);
    assert!(!f.in_table);
    assert!(f.built_ins.is_empty());
    assert_eq!(f.var.output.as_deref(), Some("8"));

    let resolved: Vec<_> = f.variables.iter().map(|n| n.var.name.as_str()).collect();
    assert_eq!(resolved, vec!["Rate"]);

    // Constants: A1 falls back to its coordinate, B1 adopts "Rate". The
    // label cell contributes nothing.
    assert_eq!(run.constants.len(), 2);
    assert_eq!(run.constants[0].name, "A1");
    assert_eq!(run.constants[0].source, "3");
    assert_eq!(run.constants[0].output.as_deref(), Some("3"));
    assert_eq!(run.constants[1].name, "Rate");

    assert_eq!(run.names.len(), 1);
    let rate = &run.names[0];
    assert_eq!(rate.scope, NameScope::Workbook);
    assert!(!rate.is_global);
    assert!(rate.is_used);
    assert_eq!(rate.var.output.as_deref(), Some("5"));
    assert_eq!(rate.var.source, "5");
}

#[test]
fn multi_cell_named_range_expands_per_cell_and_tracks_usage() {
    let (_tmp, path) = build_workbook(|book| {
        let sh = book.get_sheet_by_name_mut("Sheet1").unwrap();
        for row in 1..=3 {
            sh.get_cell_mut((1, row)).set_value_number(row as f64);
        }
        sh.add_defined_name("Window", "Sheet1!$A$1:$A$3")
            .expect("add defined name");
        sh.add_defined_name("Idle", "Sheet1!$B$9")
            .expect("add defined name");
        sh.get_cell_mut((2, 1)).set_formula("SUM(Window)");
    });

    let run = extract_workbook(&path).expect("extract");

    let window: Vec<_> = run.names.iter().filter(|n| n.var.name == "Window").collect();
    assert_eq!(window.len(), 3, "k-cell range yields k Name entities");
    let coords: Vec<_> = window.iter().map(|n| n.var.coordinate().unwrap()).collect();
    assert_eq!(coords, vec!["A1", "A2", "A3"]);
    assert!(window.iter().all(|n| n.scope == NameScope::Workbook));
    assert!(window.iter().all(|n| n.is_used));

    let idle = run.names.iter().find(|n| n.var.name == "Idle").unwrap();
    assert!(!idle.is_used);

    let f = &run.formulas[0];
    assert_eq!(f.built_ins, vec!["SUM"]);
    assert_eq!(f.variables.len(), 3, "every member of the range resolves");
}

#[test]
fn sheet_local_names_keep_their_scope_and_stay_distinct() {
    let (_tmp, path) = build_workbook(|book| {
        let _ = book.new_sheet("Totals");
        {
            let sh = book.get_sheet_by_name_mut("Sheet1").unwrap();
            sh.get_cell_mut((3, 9)).set_value_number(100);
            sh.add_defined_name("Total", "Sheet1!$C$9")
                .expect("add defined name");
            if let Some(last) = sh.get_defined_names_mut().last_mut() {
                last.set_local_sheet_id(0);
            }
        }
        {
            let sh = book.get_sheet_by_name_mut("Totals").unwrap();
            sh.get_cell_mut((3, 9)).set_value_number(200);
            sh.add_defined_name("Total", "Totals!$C$9")
                .expect("add defined name");
            if let Some(last) = sh.get_defined_names_mut().last_mut() {
                last.set_local_sheet_id(1);
            }
        }
    });

    let run = extract_workbook(&path).expect("extract");

    let totals: Vec<_> = run.names.iter().filter(|n| n.var.name == "Total").collect();
    assert_eq!(totals.len(), 2);
    let scopes: Vec<_> = totals.iter().map(|n| n.scope.clone()).collect();
    assert!(scopes.contains(&NameScope::Sheet("Sheet1".into())));
    assert!(scopes.contains(&NameScope::Sheet("Totals".into())));
    assert!(
        !totals[0].var.same_target(&totals[1].var),
        "same text on different sheets must not collapse"
    );
}

#[test]
fn structured_references_and_format_codes_flag_formulas() {
    let (_tmp, path) = build_workbook(|book| {
        let sh = book.get_sheet_by_name_mut("Sheet1").unwrap();
        sh.get_cell_mut((1, 1)).set_value_number(1234.5);
        sh.get_cell_mut((1, 2)).set_formula("SUM(Table1[Col])");
        sh.get_cell_mut((1, 3)).set_formula("TEXT(A1,\"#,##0\")");
    });

    let run = extract_workbook(&path).expect("extract");
    assert_eq!(run.formulas.len(), 2);

    let table = run
        .formulas
        .iter()
        .find(|f| f.var.coordinate() == Some("A2"))
        .unwrap();
    assert!(table.in_table);
    assert_eq!(table.built_ins, vec!["SUM"]);

    let text = run
        .formulas
        .iter()
        .find(|f| f.var.coordinate() == Some("A3"))
        .unwrap();
    assert!(!text.in_table);
    assert!(
        text.formats.iter().any(|t| t.contains('#')),
        "format tokens derived from the #-containing literal: {:?}",
        text.formats
    );
}

#[test]
fn missing_workbook_is_fatal_with_no_partial_output() {
    let err = extract_workbook("definitely/not/here.xlsx").unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("not/here.xlsx"), "{rendered}");
}
