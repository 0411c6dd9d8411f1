//! Table exports for waqf reports: PDF, XLSX and CSV.

pub mod delimited;
pub mod error;
pub mod format;
pub mod pdf;
pub mod rtl;
pub mod sheet;
pub mod table;

pub use error::{ExportError, Result};
pub use format::{ExportFormat, ExportOptions};
pub use table::{CellValue, ColumnDef, Row, Transform, rows_from_json};

/// Render `rows` in `format`. Columns are written in the order given.
pub fn export(
    rows: &[Row],
    columns: &[ColumnDef],
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<Vec<u8>> {
    if columns.is_empty() {
        return Err(ExportError::NoColumns);
    }
    let bytes = match format {
        ExportFormat::Csv => delimited::write(rows, columns, options)?,
        ExportFormat::Xlsx => sheet::write(rows, columns, options)?,
        ExportFormat::Pdf => pdf::write(rows, columns, options)?,
    };
    tracing::info!(%format, rows = rows.len(), bytes = bytes.len(), "export complete");
    Ok(bytes)
}
