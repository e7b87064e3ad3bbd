//! Evidence normalization: raw collector records → presentation-ready text blocks.
//!
//! Each record becomes one [`TextBlock`]. The first line of every block is a
//! title line prefixed with [`TITLE_MARKER`]; the composer renders those in
//! bold. No filtering happens here: every record received is rendered.

use chrono::NaiveDate;
use tracing::{debug, instrument};

use insolvencycheck_shared::{EvidenceSet, FilingRecord, GazetteNotice, InsolvencyCase};

/// Prefix marking a block-title line.
pub const TITLE_MARKER: &str = "**";

/// Shown when a record carries no date, or only a blank one.
pub const UNKNOWN_DATE: &str = "Unknown date";

const ISO_DATE: &str = "%Y-%m-%d";
const LONG_DATE: &str = "%d %B %Y";

/// A titled group of lines describing one evidence record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub lines: Vec<String>,
}

impl TextBlock {
    fn titled(title: &str) -> Self {
        Self {
            lines: vec![format!("{TITLE_MARKER}{title}")],
        }
    }

    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }
}

/// Normalized blocks, kept per source so the composer can order them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedEvidence {
    pub cases: Vec<TextBlock>,
    pub filings: Vec<TextBlock>,
    pub notices: Vec<TextBlock>,
}

impl NormalizedEvidence {
    /// All blocks in fixed source order: cases, then filings, then notices.
    pub fn blocks(&self) -> impl Iterator<Item = &TextBlock> {
        self.cases
            .iter()
            .chain(self.filings.iter())
            .chain(self.notices.iter())
    }
}

/// Normalize every record in the evidence set.
#[instrument(skip_all, fields(registry_id = %evidence.identity.registry_id))]
pub fn normalize(evidence: &EvidenceSet) -> NormalizedEvidence {
    let normalized = NormalizedEvidence {
        cases: evidence.cases.iter().map(case_block).collect(),
        filings: evidence.filings.iter().map(filing_block).collect(),
        notices: evidence.notices.iter().map(notice_block).collect(),
    };
    debug!(
        cases = normalized.cases.len(),
        filings = normalized.filings.len(),
        notices = normalized.notices.len(),
        "evidence normalized"
    );
    normalized
}

/// One line per dated event: `<Readable event type>: <dd Month yyyy>`.
pub fn case_block(case: &InsolvencyCase) -> TextBlock {
    let mut block = TextBlock::titled("Insolvency Case");
    for event in &case.events {
        block.push(format!(
            "{}: {}",
            humanize_event_type(&event.event_type),
            display_date(Some(&event.event_date))
        ));
    }
    block
}

pub fn filing_block(filing: &FilingRecord) -> TextBlock {
    let date = display_date(filing.date.as_deref());

    let mut block = TextBlock::titled("Filing");
    block.push(format!("Description: {}", filing.description));
    block.push(format!("Date: {date}"));
    block
}

/// Notice dates are free text from the site and are passed through verbatim.
pub fn notice_block(notice: &GazetteNotice) -> TextBlock {
    let mut block = TextBlock::titled("Gazette Notice");
    block.push(format!("Title: {}", notice.title));
    block.push(format!("Date: {}", notice.date));
    block.push(format!("Link: {}", notice.link));
    block
}

/// Reformat an ISO date as `05 March 2024`; anything unparseable is returned unchanged.
pub fn format_long_date(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw.trim(), ISO_DATE) {
        Ok(date) => date.format(LONG_DATE).to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Long-form date for display; missing or blank dates become [`UNKNOWN_DATE`].
fn display_date(raw: Option<&str>) -> String {
    match raw {
        Some(date) if !date.trim().is_empty() => format_long_date(date),
        _ => UNKNOWN_DATE.to_string(),
    }
}

/// `appointment-of-liquidator` → `Appointment of liquidator`.
pub fn humanize_event_type(code: &str) -> String {
    let spaced = code.replace('-', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => {
            let upper: String = first.to_uppercase().collect();
            format!("{upper}{}", chars.as_str().to_lowercase())
        }
        None => String::new(),
    }
}
