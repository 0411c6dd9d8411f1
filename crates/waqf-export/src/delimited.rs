use crate::error::Result;
use crate::format::ExportOptions;
use crate::table::{ColumnDef, Row};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Header of labels, then one record per row. Text stays in logical order;
/// spreadsheet applications handle bidi themselves.
pub fn write(rows: &[Row], columns: &[ColumnDef], options: &ExportOptions) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    if options.csv_bom {
        buf.extend_from_slice(UTF8_BOM);
    }
    let mut writer = csv::Writer::from_writer(buf);
    writer.write_record(columns.iter().map(|c| c.label.as_str()))?;
    for row in rows {
        writer.write_record(columns.iter().map(|c| c.render(row)))?;
    }
    let buf = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;

    fn row(pairs: &[(&str, CellValue)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn bom_then_header_then_rows() {
        let columns = vec![ColumnDef::new("name", "الاسم"), ColumnDef::new("amount", "المبلغ")];
        let rows = vec![row(&[
            ("name", CellValue::from("فاطمة")),
            ("amount", CellValue::Float(1500.5)),
        ])];
        let bytes = write(&rows, &columns, &ExportOptions::default()).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap();
        assert_eq!(text, "الاسم,المبلغ\nفاطمة,1500.5\n");
    }

    #[test]
    fn quotes_embedded_commas() {
        let columns = vec![ColumnDef::new("note", "note")];
        let rows = vec![row(&[("note", CellValue::from("a, b"))])];
        let options = ExportOptions {
            csv_bom: false,
            ..Default::default()
        };
        let bytes = write(&rows, &columns, &options).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "note\n\"a, b\"\n");
    }
}
