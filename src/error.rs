use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("required column '{column}' missing from '{path}'", path = .file.display())]
    Schema { file: PathBuf, column: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Taxonomy error: {0}")]
    Taxonomy(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
