//! Error types for parse operations.

use thiserror::Error;

/// Errors that can occur while ingesting a packaged book.
///
/// Only container-level failures abort a parse; a malformed content document
/// inside an otherwise valid package is skipped, not fatal.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid package: {0}")]
    InvalidPackage(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, ParseError>;
