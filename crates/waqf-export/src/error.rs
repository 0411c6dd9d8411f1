use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("font error: {0}")]
    Font(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("nothing to export: no columns")]
    NoColumns,

    #[error("invalid rows: {0}")]
    InvalidRows(String),

    #[error("invalid column spec: {0}")]
    InvalidColumn(String),

    #[error("unknown export format: {0}")]
    UnknownFormat(String),
}

pub type Result<T> = std::result::Result<T, ExportError>;
