use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("failed to parse GPX file {path}: {message}")]
    ParseFailure { path: PathBuf, message: String },
    #[error("trace contains no usable trackpoints")]
    EmptyTrace,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to export {path}: {message}")]
    ExportFailure { path: PathBuf, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TraceError>;
