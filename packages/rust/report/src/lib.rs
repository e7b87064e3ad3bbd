//! Report synthesis: normalization, composition, and writing.
//!
//! This crate provides:
//! - [`normalize`]: raw evidence records → titled text blocks
//! - [`compose`]: identity + blocks → a three-page [`Report`]
//! - [`ReportWriter`] / [`PdfWriter`]: serialization, plus [`write_report`] for the artifact on disk

pub mod compose;
pub mod filename;
pub mod layout;
pub mod normalize;
pub mod writer;

pub use compose::{
    CASES_LABEL, ComposeContext, FILINGS_LABEL, NO_RECORDS, NOTICES_LABEL, compose,
    indicator_fill,
};
pub use filename::{report_filename, sanitize_name};
pub use layout::{
    Align, DrawOp, Font, HIGHLIGHT_CLEAR, HIGHLIGHT_FOUND, Page, PageKind, Report, Rgb, TextLine,
};
pub use normalize::{
    NormalizedEvidence, TITLE_MARKER, TextBlock, UNKNOWN_DATE, format_long_date,
    humanize_event_type, normalize,
};
pub use writer::{PdfWriter, ReportWriter, WrittenReport, write_report};
