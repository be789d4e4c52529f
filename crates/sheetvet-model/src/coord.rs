//! A1-style coordinate text helpers.
//!
//! Everything here works on Excel's 1-based grid. `AreaRef` is the parsed
//! form of a defined name's refers-to text (`Sheet1!$A$1:$B$3`); anchors are
//! stripped because the extraction model never needs `$` semantics.

use core::fmt;

/// Maximum grid bounds, matching Excel (1,048,576 rows x 16,384 columns).
pub const MAX_ROW: u32 = 1_048_576;
pub const MAX_COL: u32 = 16_384;

/// Render a 1-based column number as letters (`1` -> `A`, `28` -> `AB`).
pub fn column_to_letter(col: u32) -> String {
    debug_assert!(col >= 1);
    let mut n = col;
    let mut out = [0u8; 7];
    let mut i = out.len();
    while n > 0 {
        i -= 1;
        let rem = ((n - 1) % 26) as u8;
        out[i] = b'A' + rem;
        n = (n - 1) / 26;
    }
    String::from_utf8_lossy(&out[i..]).into_owned()
}

/// Parse column letters into a 1-based column number. Case-insensitive.
pub fn letter_to_column(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut col: u32 = 0;
    for b in letters.bytes() {
        let d = match b {
            b'A'..=b'Z' => (b - b'A') as u32 + 1,
            b'a'..=b'z' => (b - b'a') as u32 + 1,
            _ => return None,
        };
        col = col.checked_mul(26)?.checked_add(d)?;
    }
    (col <= MAX_COL).then_some(col)
}

/// Render a (row, col) pair as an A1 coordinate string.
pub fn coordinate(row: u32, col: u32) -> String {
    format!("{}{}", column_to_letter(col), row)
}

/// Parse a single A1 cell token, ignoring `$` anchors (`$B$3` -> (3, 2)).
pub fn parse_cell(text: &str) -> Option<(u32, u32)> {
    let stripped: String = text.chars().filter(|&c| c != '$').collect();
    let split = stripped.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = stripped.split_at(split);
    let col = letter_to_column(letters)?;
    let row: u32 = digits.parse().ok()?;
    if row == 0 || row > MAX_ROW || digits.starts_with('0') {
        return None;
    }
    Some((row, col))
}

/// A sheet-qualified rectangular cell area, bounds inclusive and normalized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AreaRef {
    pub sheet: String,
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl AreaRef {
    /// Parse a refers-to fragment such as `Sheet1!$A$1`, `'P&L'!$A$1:$B$3`.
    ///
    /// Returns `None` for anything that is not a sheet-qualified bounded
    /// cell or rectangle — callers treat that as a literal expression.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (sheet, rest) = split_sheet(text)?;

        let (first, second) = match rest.split_once(':') {
            Some((a, b)) => (a, Some(b)),
            None => (rest, None),
        };
        let (r1, c1) = parse_cell(first)?;
        let (r2, c2) = match second {
            Some(tok) => parse_cell(tok)?,
            None => (r1, c1),
        };

        Some(AreaRef {
            sheet,
            start_row: r1.min(r2),
            start_col: c1.min(c2),
            end_row: r1.max(r2),
            end_col: c1.max(c2),
        })
    }

    pub fn is_single_cell(&self) -> bool {
        self.start_row == self.end_row && self.start_col == self.end_col
    }

    pub fn cell_count(&self) -> u64 {
        let h = (self.end_row - self.start_row + 1) as u64;
        let w = (self.end_col - self.start_col + 1) as u64;
        h * w
    }

    /// Covered cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.start_row..=self.end_row)
            .flat_map(move |r| (self.start_col..=self.end_col).map(move |c| (r, c)))
    }
}

impl fmt::Display for AreaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", self.sheet, coordinate(self.start_row, self.start_col))?;
        if !self.is_single_cell() {
            write!(f, ":{}", coordinate(self.end_row, self.end_col))?;
        }
        Ok(())
    }
}

/// Split `Sheet!A1` into the sheet name and the range part, unescaping a
/// quoted sheet name (`'P''L'!A1`).
fn split_sheet(text: &str) -> Option<(String, &str)> {
    if let Some(rest) = text.strip_prefix('\'') {
        // Quoted sheet name; '' is an escaped quote.
        let bytes = rest.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'\'' {
                if bytes.get(i + 1) == Some(&b'\'') {
                    i += 2;
                    continue;
                }
                let name = rest[..i].replace("''", "'");
                let after = &rest[i + 1..];
                return after.strip_prefix('!').map(|range| (name, range));
            }
            i += 1;
        }
        None
    } else {
        let (sheet, range) = text.split_once('!')?;
        if sheet.is_empty() {
            return None;
        }
        Some((sheet.to_string(), range))
    }
}
