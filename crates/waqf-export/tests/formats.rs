use serde_json::json;
use waqf_core::TextDirection;
use waqf_export::{
    CellValue, ColumnDef, ExportError, ExportFormat, ExportOptions, Row, export, rows_from_json,
};

fn distribution_rows() -> Vec<Row> {
    rows_from_json(&json!([
        {"name": "عبدالله", "share": 2500, "status": "paid"},
        {"name": "Mariam", "share": 1250.75, "status": "pending"},
        {"name": "خديجة", "share": null, "status": "paid"}
    ]))
    .unwrap()
}

fn columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("name", "المستفيد"),
        ColumnDef::new("share", "الحصة"),
        ColumnDef::new("status", "الحالة").with_transform(|v| match v {
            CellValue::Text(s) if s == "paid" => "مدفوع".to_string(),
            CellValue::Text(s) if s == "pending" => "معلق".to_string(),
            other => other.to_string(),
        }),
    ]
}

#[test]
fn csv_has_labels_and_transformed_values() {
    let options = ExportOptions {
        csv_bom: false,
        ..Default::default()
    };
    let bytes = export(&distribution_rows(), &columns(), ExportFormat::Csv, &options).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "المستفيد,الحصة,الحالة");
    assert_eq!(lines[1], "عبدالله,2500,مدفوع");
    assert_eq!(lines[2], "Mariam,1250.75,معلق");
    assert_eq!(lines[3], "خديجة,,مدفوع");
}

#[test]
fn csv_bom_is_on_by_default() {
    let bytes = export(
        &distribution_rows(),
        &columns(),
        ExportFormat::Csv,
        &ExportOptions::default(),
    )
    .unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
}

#[test]
fn xlsx_is_a_workbook() {
    let bytes = export(
        &distribution_rows(),
        &columns(),
        ExportFormat::Xlsx,
        &ExportOptions::default(),
    )
    .unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn pdf_renders_in_both_directions() {
    for direction in [TextDirection::Rtl, TextDirection::Ltr] {
        let options = ExportOptions::default().with_direction(direction);
        let bytes = export(&distribution_rows(), &columns(), ExportFormat::Pdf, &options).unwrap();
        assert!(bytes.starts_with(b"%PDF"), "{direction}");
    }
}

#[test]
fn pdf_with_no_rows_still_has_a_page() {
    let bytes = export(&[], &columns(), ExportFormat::Pdf, &ExportOptions::default()).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn export_without_columns_is_refused() {
    let result = export(&distribution_rows(), &[], ExportFormat::Csv, &ExportOptions::default());
    assert!(matches!(result, Err(ExportError::NoColumns)));
}

#[test]
fn configured_font_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("font.ttf");
    std::fs::write(&path, b"font bytes").unwrap();
    let settings = waqf_core::config::ExportSettings {
        font_path: Some(path.display().to_string()),
        ..Default::default()
    };
    let options = ExportOptions::from_settings(&settings).unwrap();
    assert_eq!(options.font.as_deref(), Some(&b"font bytes"[..]));
}
