use rust_xlsxwriter::{Format, FormatAlign, Workbook};

use crate::error::Result;
use crate::format::ExportOptions;
use crate::table::{CellValue, ColumnDef, Row};

/// Excel caps sheet names at 31 characters and rejects a few symbols.
fn sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(31)
        .collect();
    if cleaned.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}

pub fn write(rows: &[Row], columns: &[ColumnDef], options: &ExportOptions) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold().set_align(FormatAlign::Center);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name(&options.sheet_name))?;
    if options.is_rtl() {
        worksheet.set_right_to_left(true);
    }

    for (col, column) in columns.iter().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, &column.label, &header)?;
        let width = column.label.chars().count().max(12) as f64;
        worksheet.set_column_width(col, width)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        for (col, column) in columns.iter().enumerate() {
            let col = col as u16;
            if column.has_transform() {
                worksheet.write_string(r, col, column.render(row))?;
                continue;
            }
            match column.value(row) {
                CellValue::Null => {}
                CellValue::Bool(b) => {
                    worksheet.write_boolean(r, col, *b)?;
                }
                value @ (CellValue::Int(_) | CellValue::Float(_)) => match value.as_f64() {
                    Some(n) => {
                        worksheet.write_number(r, col, n)?;
                    }
                    None => {
                        worksheet.write_string(r, col, value.to_string())?;
                    }
                },
                CellValue::Text(s) => {
                    worksheet.write_string(r, col, s)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_names_are_sanitized() {
        assert_eq!(sheet_name("قيود/2024"), "قيود2024");
        assert_eq!(sheet_name("[]"), "Sheet1");
        assert_eq!(sheet_name(&"x".repeat(40)).chars().count(), 31);
    }

    #[test]
    fn writes_a_zip_container() {
        let columns = vec![ColumnDef::new("amount", "المبلغ")];
        let rows: Vec<Row> = vec![[("amount".to_string(), CellValue::Int(5))].into_iter().collect()];
        let bytes = write(&rows, &columns, &ExportOptions::default()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
