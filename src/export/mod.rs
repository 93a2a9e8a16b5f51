//! Read-only export consumers over the store and index.

pub mod doc;
pub mod vcf;

use thiserror::Error;

use crate::core::types::RecordId;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no record with identity {0} is loaded")]
    UnknownRecord(RecordId),
}

pub use doc::record_document;
pub use vcf::write_vcf;
