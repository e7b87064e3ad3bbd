//! Report serialization and artifact writing.
//!
//! [`ReportWriter`] turns a composed [`Report`] into bytes; [`write_report`]
//! names the artifact, writes it atomically, and returns its checksum.
//! [`PdfWriter`] is the built-in backend.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use printpdf::path::PaintMode;
use printpdf::{
    Actions, BuiltinFont, Color, IndirectFontRef, LinkAnnotation, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Rect,
};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use insolvencycheck_shared::{InsolvencyCheckError, Result};

use crate::filename::report_filename;
use crate::layout::{Align, DrawOp, Font, PAGE_HEIGHT_MM, PAGE_WIDTH_MM, Report, Rgb, TextLine};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A backend that serializes a composed report.
pub trait ReportWriter: Send + Sync {
    /// File extension for artifacts this writer produces (no leading dot).
    fn extension(&self) -> &str;

    /// Serialize the report, preserving page order and in-page element order.
    fn render(&self, report: &Report) -> Result<Vec<u8>>;

    /// Human-readable backend name for tracing.
    fn name(&self) -> &str;
}

/// A report written to disk.
#[derive(Debug, Clone, Serialize)]
pub struct WrittenReport {
    pub path: PathBuf,
    pub sha256: String,
    pub size_bytes: usize,
}

/// Render `report` and write it to `output_dir` under the standard artifact name.
///
/// The directory is created if needed. Bytes go to a temporary file first and
/// are renamed into place, so a failed run never leaves a partial artifact.
#[instrument(skip_all, fields(dir = %output_dir.display(), writer = writer.name()))]
pub fn write_report(
    writer: &dyn ReportWriter,
    report: &Report,
    output_dir: &Path,
    official_name: &str,
    timestamp: &NaiveDateTime,
) -> Result<WrittenReport> {
    let bytes = writer.render(report)?;

    std::fs::create_dir_all(output_dir).map_err(|e| InsolvencyCheckError::io(output_dir, e))?;

    let filename = report_filename(official_name, timestamp, writer.extension());
    let target = output_dir.join(&filename);
    let temp = output_dir.join(format!(".{filename}.{}.tmp", Uuid::now_v7()));

    persist(&bytes, &temp, &target)?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let sha256 = format!("{:x}", hasher.finalize());

    info!(path = %target.display(), size = bytes.len(), "report written");

    Ok(WrittenReport {
        path: target,
        sha256,
        size_bytes: bytes.len(),
    })
}

/// Write `bytes` to `temp`, then rename it to `target`. On any failure the
/// temporary file is removed.
fn persist(bytes: &[u8], temp: &Path, target: &Path) -> Result<()> {
    if let Err(e) = std::fs::write(temp, bytes) {
        let _ = std::fs::remove_file(temp);
        return Err(InsolvencyCheckError::io(temp, e));
    }
    if let Err(e) = std::fs::rename(temp, target) {
        let _ = std::fs::remove_file(temp);
        return Err(InsolvencyCheckError::io(target, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// PDF backend
// ---------------------------------------------------------------------------

const LAYER_NAME: &str = "Layer 1";
const MARGIN_X_MM: f32 = 10.0;
const TOP_MARGIN_MM: f32 = 10.0;
const BOTTOM_MARGIN_MM: f32 = 15.0;
const PT_TO_MM: f32 = 0.352_778;
/// Average Helvetica glyph advance as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.5;
const STATUS_ROW_MM: f32 = 10.0;
const STATUS_LABEL_WIDTH_MM: f32 = 100.0;
const STATUS_SWATCH_WIDTH_MM: f32 = 20.0;

/// Writes A4 PDFs using the builtin Helvetica faces.
///
/// Builtin faces only cover Latin-1, so other characters are replaced with `?`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfWriter;

impl ReportWriter for PdfWriter {
    fn extension(&self) -> &str {
        "pdf"
    }

    fn render(&self, report: &Report) -> Result<Vec<u8>> {
        let (doc, first_page, first_layer) = PdfDocument::new(
            report.title.clone(),
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            LAYER_NAME,
        );

        let fonts = Fonts {
            regular: doc
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(|e| InsolvencyCheckError::render(format!("font: {e}")))?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(|e| InsolvencyCheckError::render(format!("font: {e}")))?,
        };

        let sheets = {
            let mut sheet = Sheet {
                doc: &doc,
                layer: doc.get_page(first_page).get_layer(first_layer),
                y: TOP_MARGIN_MM,
                count: 1,
            };

            for (i, page) in report.pages.iter().enumerate() {
                if i > 0 {
                    sheet.next_sheet();
                }
                for op in &page.ops {
                    sheet.draw(op, &fonts);
                }
            }
            sheet.count
        };

        debug!(pages = report.pages.len(), sheets, "pdf laid out");

        doc.save_to_bytes()
            .map_err(|e| InsolvencyCheckError::render(format!("pdf serialization: {e}")))
    }

    fn name(&self) -> &str {
        "pdf"
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn pick(&self, font: Font) -> &IndirectFontRef {
        if font.bold { &self.bold } else { &self.regular }
    }
}

/// Cursor over the current physical sheet. `y` is measured from the top edge.
struct Sheet<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    count: usize,
}

impl Sheet<'_> {
    fn next_sheet(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = TOP_MARGIN_MM;
        self.count += 1;
    }

    /// Start a continuation sheet if a row of `height` would cross the bottom margin.
    fn ensure_room(&mut self, height: f32) {
        if self.y + height > PAGE_HEIGHT_MM - BOTTOM_MARGIN_MM {
            self.next_sheet();
        }
    }

    fn draw(&mut self, op: &DrawOp, fonts: &Fonts) {
        match op {
            DrawOp::MoveTo { y_mm } => self.y = *y_mm,
            DrawOp::Gap { height_mm } => self.y += height_mm,
            DrawOp::Text(line) => {
                self.ensure_room(line.row_height_mm);
                self.place_text(line, fonts);
                self.y += line.row_height_mm;
            }
            DrawOp::Link { line, url } => {
                self.ensure_room(line.row_height_mm);
                let (x, width) = self.place_text(line, fonts);
                let area = self.row_rect(x, x + width, line.row_height_mm);
                self.layer.add_link_annotation(LinkAnnotation::new(
                    area,
                    None,
                    None,
                    Actions::uri(url.clone()),
                    None,
                ));
                self.y += line.row_height_mm;
            }
            DrawOp::StatusBox { label, fill } => {
                self.ensure_room(STATUS_ROW_MM);
                let left = MARGIN_X_MM;
                let split = left + STATUS_LABEL_WIDTH_MM;
                let right = split + STATUS_SWATCH_WIDTH_MM;

                self.layer.set_outline_color(pdf_color(Rgb::BLACK));
                self.layer.set_outline_thickness(0.5);
                self.layer.add_rect(
                    self.row_rect(left, split, STATUS_ROW_MM)
                        .with_mode(PaintMode::Stroke),
                );
                self.place_text(
                    &TextLine {
                        text: label.clone(),
                        font: Font::bold(10.0),
                        align: Align::Left,
                        color: Rgb::BLACK,
                        row_height_mm: STATUS_ROW_MM,
                    },
                    fonts,
                );

                self.layer.set_fill_color(pdf_color(*fill));
                self.layer.add_rect(
                    self.row_rect(split, right, STATUS_ROW_MM)
                        .with_mode(PaintMode::FillStroke),
                );
                self.y += STATUS_ROW_MM;
            }
        }
    }

    /// Draw one line of text vertically centred in the current row.
    /// Returns the line's left edge and estimated width.
    fn place_text(&self, line: &TextLine, fonts: &Fonts) -> (f32, f32) {
        let text = to_latin1(&line.text);
        let width = text_width_mm(&text, line.font.size_pt);
        let x = match line.align {
            Align::Left => MARGIN_X_MM + 1.0,
            Align::Center => ((PAGE_WIDTH_MM - width) / 2.0).max(MARGIN_X_MM),
        };
        let baseline = self.y + line.row_height_mm / 2.0 + line.font.size_pt * PT_TO_MM * 0.35;

        self.layer.set_fill_color(pdf_color(line.color));
        self.layer.use_text(
            text,
            line.font.size_pt,
            Mm(x),
            Mm(PAGE_HEIGHT_MM - baseline),
            fonts.pick(line.font),
        );
        (x, width)
    }

    /// Rectangle spanning `left..right` over a row starting at the cursor.
    fn row_rect(&self, left: f32, right: f32, height: f32) -> Rect {
        let top = PAGE_HEIGHT_MM - self.y;
        let bottom = top - height;
        Rect::new(Mm(left), Mm(bottom), Mm(right), Mm(top))
    }
}

fn pdf_color(rgb: Rgb) -> Color {
    let Rgb(r, g, b) = rgb;
    Color::Rgb(printpdf::Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

/// Replace characters the builtin fonts cannot encode. Control characters become spaces.
pub fn to_latin1(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            c if c.is_control() => ' ',
            c if u32::from(c) <= 0xFF => c,
            _ => '?',
        })
        .collect()
}

fn text_width_mm(text: &str, size_pt: f32) -> f32 {
    text.chars().count() as f32 * size_pt * AVG_GLYPH_EM * PT_TO_MM
}
