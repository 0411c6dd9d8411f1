//! Paged table report.
//!
//! Layout works in millimetres from the bottom-left corner. Text widths are
//! estimated from character counts, which is close enough for alignment of
//! short cell values.

use std::io::Cursor;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use waqf_core::TextDirection;

use crate::error::{ExportError, Result};
use crate::format::ExportOptions;
use crate::rtl;
use crate::table::{ColumnDef, Row};

const MARGIN: f32 = 15.0;
const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 10.0;
const LINE_HEIGHT: f32 = 7.0;
const TITLE_BLOCK: f32 = 14.0;
const FOOTER_BLOCK: f32 = 8.0;
const CELL_PADDING: f32 = 1.5;
const PT_TO_MM: f32 = 0.3528;
const LAYER: &str = "table";

fn approx_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5 * PT_TO_MM
}

fn rows_per_page(height: f32) -> usize {
    let body = height - 2.0 * MARGIN - TITLE_BLOCK - LINE_HEIGHT - FOOTER_BLOCK;
    ((body / LINE_HEIGHT).floor() as usize).max(1)
}

/// Rows grouped per page. An empty report still gets one page.
fn paginate(rows: &[Row], per_page: usize) -> Vec<&[Row]> {
    if rows.is_empty() {
        vec![rows]
    } else {
        rows.chunks(per_page.max(1)).collect()
    }
}

struct Painter<'a> {
    font: IndirectFontRef,
    direction: TextDirection,
    embedded: bool,
    width: f32,
    height: f32,
    columns: Vec<&'a ColumnDef>,
}

impl Painter<'_> {
    fn column_width(&self) -> f32 {
        (self.width - 2.0 * MARGIN) / self.columns.len() as f32
    }

    fn max_chars(&self) -> usize {
        let per_char = BODY_SIZE * 0.5 * PT_TO_MM;
        (((self.column_width() - 2.0 * CELL_PADDING) / per_char).floor() as usize).max(1)
    }

    /// Visual-order text the font can draw. Built-in fonts only cover Latin-1.
    fn prepare(&self, text: &str) -> String {
        let visual = rtl::visual(text, self.direction);
        if self.embedded {
            return visual;
        }
        visual
            .chars()
            .map(|c| if matches!(c, ' '..='~' | '\u{A0}'..='\u{FF}') { c } else { '?' })
            .collect()
    }

    fn text_in(&self, layer: &PdfLayerReference, text: &str, size: f32, left: f32, right: f32, y: f32) {
        let prepared = self.prepare(text);
        let x = match self.direction {
            TextDirection::Rtl => (right - approx_width(&prepared, size)).max(left),
            TextDirection::Ltr => left,
        };
        layer.use_text(prepared, size, Mm(x), Mm(y), &self.font);
    }

    fn cells(&self, layer: &PdfLayerReference, values: &[String], y: f32) {
        let col_width = self.column_width();
        let max_chars = self.max_chars();
        for (i, value) in values.iter().enumerate() {
            let left = MARGIN + i as f32 * col_width + CELL_PADDING;
            let right = MARGIN + (i + 1) as f32 * col_width - CELL_PADDING;
            let fitted: String = value.chars().take(max_chars).collect();
            self.text_in(layer, &fitted, BODY_SIZE, left, right, y);
        }
    }

    fn page(&self, layer: &PdfLayerReference, title: &str, rows: &[Row], number: usize, total: usize) {
        let title_y = self.height - MARGIN - TITLE_SIZE * PT_TO_MM;
        self.text_in(layer, title, TITLE_SIZE, MARGIN, self.width - MARGIN, title_y);

        let header_y = self.height - MARGIN - TITLE_BLOCK;
        let labels: Vec<String> = self.columns.iter().map(|c| c.label.clone()).collect();
        self.cells(layer, &labels, header_y);

        for (i, row) in rows.iter().enumerate() {
            let y = header_y - (i + 1) as f32 * LINE_HEIGHT;
            let values: Vec<String> = self.columns.iter().map(|c| c.render(row)).collect();
            self.cells(layer, &values, y);
        }

        let footer = format!("{number} / {total}");
        let x = (self.width - approx_width(&footer, BODY_SIZE)) / 2.0;
        layer.use_text(footer, BODY_SIZE, Mm(x), Mm(MARGIN / 2.0), &self.font);
    }
}

fn load_font(doc: &PdfDocumentReference, options: &ExportOptions) -> Result<IndirectFontRef> {
    match &options.font {
        Some(bytes) => doc
            .add_external_font(Cursor::new(bytes.as_slice()))
            .map_err(|e| ExportError::Font(format!("{e:?}"))),
        None => doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::Pdf(format!("{e:?}"))),
    }
}

pub fn write(rows: &[Row], columns: &[ColumnDef], options: &ExportOptions) -> Result<Vec<u8>> {
    let (width, height) = options.page.size_mm();
    let (doc, first_page, first_layer) =
        PdfDocument::new(options.title.as_str(), Mm(width), Mm(height), LAYER);
    let font = load_font(&doc, options)?;

    if options.font.is_none()
        && (rtl::contains_arabic(&options.title) || columns.iter().any(|c| rtl::contains_arabic(&c.label)))
    {
        tracing::warn!("no font configured; Arabic text will not render in the PDF");
    }

    // Right-to-left reports read their first column at the right edge.
    let mut ordered: Vec<&ColumnDef> = columns.iter().collect();
    if options.is_rtl() {
        ordered.reverse();
    }
    let painter = Painter {
        font,
        direction: options.direction,
        embedded: options.font.is_some(),
        width,
        height,
        columns: ordered,
    };

    let pages = paginate(rows, rows_per_page(height));
    let total = pages.len();
    for (i, chunk) in pages.iter().enumerate() {
        let layer = if i == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(width), Mm(height), LAYER);
            doc.get_page(page).get_layer(layer)
        };
        painter.page(&layer, &options.title, chunk, i + 1, total);
    }
    tracing::debug!(pages = total, rows = rows.len(), "laid out PDF report");

    doc.save_to_bytes()
        .map_err(|e| ExportError::Pdf(format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;
    use waqf_core::config::PageLayout;

    #[test]
    fn page_capacity_depends_on_orientation() {
        let (_, portrait) = PageLayout::A4Portrait.size_mm();
        let (_, landscape) = PageLayout::A4Landscape.size_mm();
        assert!(rows_per_page(portrait) > rows_per_page(landscape));
        assert!(rows_per_page(10.0) >= 1);
    }

    #[test]
    fn builtin_font_replaces_unsupported_glyphs() {
        let column = ColumnDef::new("a", "a");
        let painter = Painter {
            font: {
                let (doc, _, _) = PdfDocument::new("t", Mm(100.0), Mm(100.0), LAYER);
                doc.add_builtin_font(BuiltinFont::Helvetica).unwrap()
            },
            direction: TextDirection::Ltr,
            embedded: false,
            width: 100.0,
            height: 100.0,
            columns: vec![&column],
        };
        assert_eq!(painter.prepare("café ok"), "café ok");
        assert_eq!(painter.prepare("x\u{4E2D}"), "x?");
    }

    #[test]
    fn many_rows_span_pages() {
        let columns = vec![ColumnDef::new("n", "No.")];
        let rows: Vec<Row> = (0..200)
            .map(|i| [("n".to_string(), CellValue::Int(i))].into_iter().collect())
            .collect();
        let options = ExportOptions::default().with_title("Ledger");
        let (_, height) = options.page.size_mm();
        let per_page = rows_per_page(height);
        assert!(per_page < rows.len());

        let pages = paginate(&rows, per_page);
        assert_eq!(pages.len(), rows.len().div_ceil(per_page));
        assert!(pages.iter().all(|p| p.len() <= per_page));
        assert_eq!(pages.iter().map(|p| p.len()).sum::<usize>(), rows.len());

        let bytes = write(&rows, &columns, &options).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn empty_report_has_one_page() {
        assert_eq!(paginate(&[], 10).len(), 1);
    }
}
