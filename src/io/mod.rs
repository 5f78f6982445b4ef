//! Read mzTab documents back into the in-memory model.
//!
//! Decoding mirrors serialization: lines are dispatched by their section
//! prefix, `MTD` lines rebuild the [`Metadata`](crate::metadata::Metadata)
//! through the same upsert API the builder uses, header lines reconstruct a
//! [`ColumnFactory`](crate::columns::ColumnFactory), and data lines populate
//! records through the same type gate as the typed setters.

mod header;
mod mtd;
mod reader;
mod row;

use std::io;

use thiserror::Error;

use crate::columns::ColumnError;
use crate::file::MZTabFileError;
use crate::metadata::MetadataError;

pub use reader::{parse_str, MzTabReader};

#[derive(Debug, Error)]
pub enum MZTabError {
    #[error("Encountered an IO error: {0}")]
    Io(
        #[from]
        #[source]
        io::Error,
    ),
    #[error("line {line}: unrecognized section prefix {prefix:?}")]
    UnknownPrefix { line: u64, prefix: String },
    #[error("line {line}: metadata lines may not follow a table header")]
    MetadataAfterHeader { line: u64 },
    #[error("line {line}: MTD lines carry exactly three tab-separated fields")]
    MalformedMetadataLine { line: u64 },
    #[error("line {line}: unrecognized metadata key {key:?}")]
    UnknownMetadataKey { line: u64, key: String },
    #[error("line {line}: malformed value {value:?} for metadata key {key:?}")]
    MalformedMetadataValue {
        line: u64,
        key: String,
        value: String,
    },
    #[error("line {line}: {source}")]
    Metadata {
        line: u64,
        #[source]
        source: MetadataError,
    },
    #[error("line {line}: unrecognized column header {header:?}")]
    UnknownColumnHeader { line: u64, header: String },
    #[error("line {line}: {source}")]
    Column {
        line: u64,
        #[source]
        source: ColumnError,
    },
    #[error("line {line}: the table header is missing the mandatory column {header:?}")]
    MissingMandatoryColumn { line: u64, header: String },
    #[error("line {line}: this section's table header was already given")]
    DuplicateTableHeader { line: u64 },
    #[error("line {line}: a data row appeared before its table header")]
    DataBeforeHeader { line: u64 },
    #[error("line {line}: expected {expected} data fields, found {found}")]
    FieldCountMismatch {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: ms_run[{id}] is referenced by a column but never declared")]
    UndefinedMsRun { line: u64, id: u32 },
    #[error("line {line}: assay[{id}] is referenced by a column but never declared")]
    UndefinedAssay { line: u64, id: u32 },
    #[error("line {line}: study_variable[{id}] is referenced by a column but never declared")]
    UndefinedStudyVariable { line: u64, id: u32 },
    #[error("{0}")]
    File(
        #[from]
        #[source]
        MZTabFileError,
    ),
}
