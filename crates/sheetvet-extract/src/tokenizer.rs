//! Formula-text tokenization.
//!
//! This is deliberately not a formula parser: no precedence, no evaluation,
//! no grammar. The source is split on a fixed character class and each token
//! classified. The split does not respect quoting, so reserved characters
//! inside a quoted text literal are mis-tokenized — that is the accepted
//! approximation this engine ships with, not something to repair here.

use sheetvet_model::{Formula, Variable};

/// The text-formatting built-in whose presence makes `#` tokens format codes.
const TEXT_FUNCTION: &str = "TEXT";

/// Characters the source text is split on (plus ASCII whitespace).
fn is_reserved(c: char) -> bool {
    matches!(c, '=' | '*' | '/' | '-' | '+' | '(' | ')' | ',' | '"') || c.is_ascii_whitespace()
}

/// Tokenized parts of one formula source text.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TokenScan {
    pub built_ins: Vec<String>,
    pub has_digits: bool,
    pub in_table: bool,
    pub formats: Vec<String>,
    pub candidates: Vec<String>,
}

/// Split and classify a stripped formula source text.
pub fn scan_source(source: &str) -> TokenScan {
    let mut scan = TokenScan {
        // A structured (table) reference is the only thing that opens a
        // bracket in formula text.
        in_table: source.contains('['),
        ..TokenScan::default()
    };
    let formats_armed = source.contains(TEXT_FUNCTION);

    for token in source.split(is_reserved).filter(|t| !t.is_empty()) {
        if is_built_in(token) {
            scan.built_ins.push(token.to_string());
        } else if matches!(token, " " | "&" | "'") {
            // Concatenation glue and sheet-name quotes carry no meaning.
        } else if !scan.has_digits && is_all_digits(token) {
            // Only the first digit-only token sets the flag; later ones fall
            // through to the candidate list.
            scan.has_digits = true;
        } else if token.contains('#') && formats_armed {
            scan.formats.push(token.to_string());
        } else {
            scan.candidates.push(token.to_string());
        }
    }
    scan
}

/// Build a `Formula` record from its cell-bound core, tokenizing the source.
pub fn tokenize(var: Variable) -> Formula {
    let scan = scan_source(&var.source);
    Formula {
        var,
        built_ins: scan.built_ins,
        has_digits: scan.has_digits,
        in_table: scan.in_table,
        formats: scan.formats,
        candidates: scan.candidates,
        variables: Vec::new(),
    }
}

/// Intrinsic function names are all-uppercase alphabetic.
fn is_built_in(token: &str) -> bool {
    token.bytes().all(|b| b.is_ascii_uppercase())
}

fn is_all_digits(token: &str) -> bool {
    token.bytes().all(|b| b.is_ascii_digit())
}
