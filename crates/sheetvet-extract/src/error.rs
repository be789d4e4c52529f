use std::path::PathBuf;

use thiserror::Error;

/// Fatal extraction failures.
///
/// Every variant aborts the whole run: the pipeline produces either a
/// complete `Extraction` or one of these, never a partial result. Lookup
/// misses and tokenization ambiguity are not errors — they degrade to
/// defaults inside the stages.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The workbook could not be opened (missing, locked, or corrupt).
    #[error("failed to open workbook {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::XlsxError,
    },

    /// A sheet listed by the workbook could not be read.
    #[error("failed to read sheet '{sheet}'")]
    Sheet {
        sheet: String,
        #[source]
        source: calamine::XlsxError,
    },

    /// The workbook archive could not be walked for defined-name records.
    #[error("failed to read workbook archive")]
    Archive(#[from] zip::result::ZipError),

    /// `xl/workbook.xml` did not parse.
    #[error("failed to parse workbook metadata")]
    Metadata(#[from] quick_xml::Error),

    /// A malformed attribute inside `xl/workbook.xml`.
    #[error("malformed attribute in workbook metadata")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
