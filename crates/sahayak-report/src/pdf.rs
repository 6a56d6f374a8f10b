//! PDF report rendering.
//!
//! Renders a [`Report`] as a printable A4 document: a title, the generation
//! date, and a name/marks/grade table that flows onto further pages as
//! needed.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use crate::{Report, ReportError, Result};

// Mm wraps an f32.
const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const ROW_HEIGHT_MM: f32 = 8.0;

const NAME_COLUMN_MM: f32 = MARGIN_MM;
const MARKS_COLUMN_MM: f32 = 120.0;
const GRADE_COLUMN_MM: f32 = 160.0;

/// PDF report generator.
pub struct PdfGenerator<'a> {
    report: &'a Report,
}

impl<'a> PdfGenerator<'a> {
    /// Creates a new PDF generator for the given report.
    #[must_use]
    pub const fn new(report: &'a Report) -> Self {
        Self { report }
    }

    /// Renders the report and returns the PDF bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Pdf`] if font loading or document assembly
    /// fails.
    pub fn generate(&self) -> Result<Vec<u8>> {
        let (doc, page, layer) = PdfDocument::new(
            &self.report.title,
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Layer 1",
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Pdf(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Pdf(e.to_string()))?;

        let mut layer = doc.get_page(page).get_layer(layer);
        let mut y = PAGE_HEIGHT_MM - MARGIN_MM;

        layer.use_text(&self.report.title, 18.0, Mm(MARGIN_MM), Mm(y), &bold);
        y -= ROW_HEIGHT_MM;
        layer.use_text(
            format!(
                "Generated on {}",
                self.report.generated_at.format("%Y-%m-%d")
            ),
            10.0,
            Mm(MARGIN_MM),
            Mm(y),
            &regular,
        );
        y -= 2.0 * ROW_HEIGHT_MM;

        write_header(&layer, y, &bold);
        y -= ROW_HEIGHT_MM;

        for row in &self.report.rows {
            if y < MARGIN_MM {
                let (next_page, next_layer) =
                    doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
                layer = doc.get_page(next_page).get_layer(next_layer);
                y = PAGE_HEIGHT_MM - MARGIN_MM;
                write_header(&layer, y, &bold);
                y -= ROW_HEIGHT_MM;
            }

            layer.use_text(&row.name, 12.0, Mm(NAME_COLUMN_MM), Mm(y), &regular);
            layer.use_text(
                row.marks.to_string(),
                12.0,
                Mm(MARKS_COLUMN_MM),
                Mm(y),
                &regular,
            );
            layer.use_text(row.grade.as_str(), 12.0, Mm(GRADE_COLUMN_MM), Mm(y), &regular);
            y -= ROW_HEIGHT_MM;
        }

        doc.save_to_bytes()
            .map_err(|e| ReportError::Pdf(e.to_string()))
    }
}

fn write_header(layer: &PdfLayerReference, y: f32, bold: &IndirectFontRef) {
    layer.use_text("Student", 12.0, Mm(NAME_COLUMN_MM), Mm(y), bold);
    layer.use_text("Marks", 12.0, Mm(MARKS_COLUMN_MM), Mm(y), bold);
    layer.use_text("Grade", 12.0, Mm(GRADE_COLUMN_MM), Mm(y), bold);
}
