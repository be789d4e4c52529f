//! The two read-only workbook snapshots the pipeline runs over.
//!
//! `FormulaLoad` keeps formula text (the equivalent of opening the file with
//! formulas preserved); `ValueSnapshot` keeps the engine's cached calculated
//! results (value-mode). Both come from calamine. Defined-name records are
//! read straight out of `xl/workbook.xml` because calamine does not surface
//! their scope.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};
use quick_xml::events::Event;
use rustc_hash::FxHashMap;
use sheetvet_model::NameScope;
use tracing::debug;
use zip::ZipArchive;

use crate::error::ExtractError;

/// What a populated cell holds in the formula-preserving snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellContent {
    /// Formula text, normalized to carry exactly one leading `=`.
    Formula(String),
    /// A plain string literal (a label, not data).
    Text(String),
    /// A non-string literal (number, bool, error, datetime), stringified.
    Literal(String),
}

/// One sheet's populated cells, keyed (row, col) 1-based.
///
/// BTreeMap keys iterate row-major, which is what gives the scanner its
/// deterministic, reproducible ordering.
#[derive(Debug)]
pub struct SheetGrid {
    pub name: String,
    pub cells: BTreeMap<(u32, u32), CellContent>,
}

/// Formula-preserving snapshot of the whole workbook, sheets in workbook
/// order.
#[derive(Debug)]
pub struct FormulaLoad {
    pub sheets: Vec<SheetGrid>,
}

impl FormulaLoad {
    pub fn open(path: &Path) -> Result<Self, ExtractError> {
        let mut wb: Xlsx<BufReader<File>> =
            open_workbook(path).map_err(|source| ExtractError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let sheet_names = wb.sheet_names().to_vec();
        let mut sheets = Vec::with_capacity(sheet_names.len());
        for name in &sheet_names {
            let range = wb
                .worksheet_range(name)
                .map_err(|source| ExtractError::Sheet {
                    sheet: name.clone(),
                    source,
                })?;
            // Formula text comes from a parallel range; absent for
            // chartsheets and value-only sheets.
            let formulas = wb.worksheet_formula(name).ok();

            let mut cells: BTreeMap<(u32, u32), CellContent> = BTreeMap::new();

            let start_row = range.start().unwrap_or_default().0;
            let start_col = range.start().unwrap_or_default().1;
            for (row, col, val) in range.used_cells() {
                // calamine is 0-based; the model is 1-based like Excel.
                let row = row as u32 + start_row + 1;
                let col = col as u32 + start_col + 1;
                let content = match val {
                    Data::Empty => continue,
                    Data::String(s) if s.is_empty() => continue,
                    Data::String(s) => CellContent::Text(s.clone()),
                    other => CellContent::Literal(stringify_value(other)),
                };
                cells.insert((row, col), content);
            }

            if let Some(frm) = &formulas {
                let start_row = frm.start().unwrap_or_default().0;
                let start_col = frm.start().unwrap_or_default().1;
                for (row, col, formula) in frm.used_cells() {
                    if formula.is_empty() {
                        continue;
                    }
                    let row = row as u32 + start_row + 1;
                    let col = col as u32 + start_col + 1;
                    let text = if formula.starts_with('=') {
                        formula.clone()
                    } else {
                        format!("={formula}")
                    };
                    // A formula wins over whatever cached value sits there.
                    cells.insert((row, col), CellContent::Formula(text));
                }
            }

            debug!(sheet = name.as_str(), cells = cells.len(), "loaded formula-mode sheet");
            sheets.push(SheetGrid {
                name: name.clone(),
                cells,
            });
        }

        Ok(FormulaLoad { sheets })
    }

    /// Content of one cell, if populated.
    pub fn content(&self, sheet: &str, row: u32, col: u32) -> Option<&CellContent> {
        self.sheets
            .iter()
            .find(|s| s.name == sheet)
            .and_then(|s| s.cells.get(&(row, col)))
    }
}

/// Value-mode snapshot: cached calculated results, stringified, keyed by
/// sheet and (row, col).
#[derive(Debug, Default)]
pub struct ValueSnapshot {
    sheets: FxHashMap<String, FxHashMap<(u32, u32), String>>,
}

impl ValueSnapshot {
    pub fn open(path: &Path) -> Result<Self, ExtractError> {
        let mut wb: Xlsx<BufReader<File>> =
            open_workbook(path).map_err(|source| ExtractError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let mut snapshot = ValueSnapshot::default();
        for name in wb.sheet_names().to_vec() {
            let range = wb
                .worksheet_range(&name)
                .map_err(|source| ExtractError::Sheet {
                    sheet: name.clone(),
                    source,
                })?;
            let start_row = range.start().unwrap_or_default().0;
            let start_col = range.start().unwrap_or_default().1;
            for (row, col, val) in range.used_cells() {
                if matches!(val, Data::Empty) || matches!(val, Data::String(s) if s.is_empty()) {
                    continue;
                }
                let row = row as u32 + start_row + 1;
                let col = col as u32 + start_col + 1;
                snapshot.insert(&name, row, col, stringify_value(val));
            }
        }
        Ok(snapshot)
    }

    pub fn lookup(&self, sheet: &str, row: u32, col: u32) -> Option<&str> {
        self.sheets
            .get(sheet)
            .and_then(|cells| cells.get(&(row, col)))
            .map(String::as_str)
    }

    pub(crate) fn insert(&mut self, sheet: &str, row: u32, col: u32, value: String) {
        self.sheets
            .entry(sheet.to_string())
            .or_default()
            .insert((row, col), value);
    }
}

/// Stringify a cached cell value the way downstream reports show it.
fn stringify_value(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => error_code(e).to_string(),
        // Excel serial number; the verification reports compare numbers.
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

fn error_code(e: &calamine::CellErrorType) -> &'static str {
    use calamine::CellErrorType::*;
    match e {
        Div0 => "#DIV/0!",
        Na => "#N/A",
        Name => "#NAME?",
        Null => "#NULL!",
        Num => "#NUM!",
        Ref => "#REF!",
        Value => "#VALUE!",
        GettingData => "#GETTING_DATA",
    }
}

/// One `<definedName>` record from `xl/workbook.xml`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefinedNameRecord {
    pub name: String,
    pub scope: NameScope,
    /// Raw refers-to text: one or more cell areas, or a literal expression.
    pub refers_to: String,
}

/// Read defined names with their scope.
///
/// `localSheetId` indexes the `<sheet>` list in workbook order; a record
/// without it is workbook-scoped. All records are kept, including hidden and
/// `_xlnm.*` built-ins.
pub fn read_defined_names(path: &Path) -> Result<Vec<DefinedNameRecord>, ExtractError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;
    let mut xml = Vec::new();
    archive.by_name("xl/workbook.xml")?.read_to_end(&mut xml)?;
    parse_workbook_xml(&xml)
}

struct PendingName {
    name: String,
    local_sheet_id: Option<u32>,
    refers_to: String,
}

fn parse_workbook_xml(xml: &[u8]) -> Result<Vec<DefinedNameRecord>, ExtractError> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    let mut sheet_order: Vec<String> = Vec::new();
    let mut pending: Vec<PendingName> = Vec::new();
    let mut current: Option<PendingName> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                for attr in e.attributes() {
                    let attr = attr?;
                    if attr.key.as_ref() == b"name" {
                        sheet_order.push(attr.unescape_value()?.into_owned());
                    }
                }
            }
            Event::Start(e) if e.local_name().as_ref() == b"definedName" => {
                current = read_name_attrs(&e)?;
            }
            Event::Empty(e) if e.local_name().as_ref() == b"definedName" => {
                // No refers-to body at all; keep the record, it resolves to
                // a global with an empty expression.
                if let Some(p) = read_name_attrs(&e)? {
                    pending.push(p);
                }
            }
            Event::Text(e) if current.is_some() => {
                if let Some(p) = current.as_mut() {
                    p.refers_to.push_str(&e.unescape()?);
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"definedName" => {
                if let Some(p) = current.take() {
                    pending.push(p);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    debug!(names = pending.len(), sheets = sheet_order.len(), "read defined-name records");

    Ok(pending
        .into_iter()
        .map(|p| {
            let scope = match p.local_sheet_id {
                Some(idx) => sheet_order
                    .get(idx as usize)
                    .map(|s| NameScope::Sheet(s.clone()))
                    .unwrap_or(NameScope::Workbook),
                None => NameScope::Workbook,
            };
            DefinedNameRecord {
                name: p.name,
                scope,
                refers_to: p.refers_to,
            }
        })
        .collect())
}

fn read_name_attrs(
    e: &quick_xml::events::BytesStart<'_>,
) -> Result<Option<PendingName>, ExtractError> {
    let mut name = None;
    let mut local_sheet_id = None;
    for attr in e.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"name" => name = Some(attr.unescape_value()?.into_owned()),
            b"localSheetId" => {
                local_sheet_id = attr.unescape_value()?.parse::<u32>().ok();
            }
            _ => {}
        }
    }
    Ok(name.map(|name| PendingName {
        name,
        local_sheet_id,
        refers_to: String::new(),
    }))
}
