//! Backend-neutral document model.
//!
//! A [`Report`] is an ordered list of logical pages, each an ordered list of
//! draw instructions. Positions are vertical offsets in millimetres from the
//! top edge of an A4 sheet; writers flow instructions top-down and may spill a
//! long logical page onto extra sheets, but never reorder anything.

/// A4 portrait width in millimetres.
pub const PAGE_WIDTH_MM: f32 = 210.0;

/// A4 portrait height in millimetres.
pub const PAGE_HEIGHT_MM: f32 = 297.0;

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const LINK_BLUE: Rgb = Rgb(0, 0, 255);
}

/// Status-box fill when the source has at least one record.
pub const HIGHLIGHT_FOUND: Rgb = Rgb(255, 255, 0);

/// Status-box fill when the source has no records.
pub const HIGHLIGHT_CLEAR: Rgb = Rgb(144, 238, 144);

/// Horizontal placement within the printable width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Font selection. Family is fixed by the writer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub size_pt: f32,
    pub bold: bool,
}

impl Font {
    pub const fn body(size_pt: f32) -> Self {
        Self {
            size_pt,
            bold: false,
        }
    }

    pub const fn bold(size_pt: f32) -> Self {
        Self {
            size_pt,
            bold: true,
        }
    }
}

/// A single line of text occupying a fixed-height row.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub font: Font,
    pub align: Align,
    pub color: Rgb,
    pub row_height_mm: f32,
}

/// One draw instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Jump the cursor to an absolute offset from the top of the sheet.
    MoveTo { y_mm: f32 },
    /// Advance the cursor without drawing.
    Gap { height_mm: f32 },
    Text(TextLine),
    /// A text line that is also a clickable link.
    Link { line: TextLine, url: String },
    /// A bordered label cell followed by a filled indicator swatch.
    StatusBox { label: String, fill: Rgb },
}

/// Which part of the report a logical page holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Cover,
    Findings,
    Sources,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub kind: PageKind,
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// Every piece of visible text on the page, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text(line) | DrawOp::Link { line, .. } => Some(line.text.as_str()),
                DrawOp::StatusBox { label, .. } => Some(label.as_str()),
                DrawOp::MoveTo { .. } | DrawOp::Gap { .. } => None,
            })
            .collect()
    }
}

/// A composed report. Built once by the composer and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Document title recorded in the output's metadata.
    pub title: String,
    pub pages: Vec<Page>,
}

impl Report {
    pub fn page(&self, kind: PageKind) -> Option<&Page> {
        self.pages.iter().find(|p| p.kind == kind)
    }
}
