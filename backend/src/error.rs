use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Unsupported module type: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to query entries from the module store: {0}")]
    StoreAccess(String),

    #[error("Malformed \\{marker} marker on line {line}: '{value}' is not a positive integer")]
    MalformedMarker {
        marker: String,
        line: usize,
        value: String,
    },

    #[error("Unsupported gematria method: {0}")]
    UnsupportedMethod(String),

    #[error("Failed to extract text from PDF: {0}")]
    PdfExtract(String),

    #[error("XML parse error: {0}")]
    Xml(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
