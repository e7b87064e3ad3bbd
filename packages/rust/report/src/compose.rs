//! Report composition: identity + normalized evidence → three-page [`Report`].
//!
//! Pure and deterministic: the same inputs and timestamp always produce the
//! same report. Layout:
//! 1. Cover: reporting party, report date, subject company, three status boxes
//! 2. Findings: every normalized block in source order, or "No records found."
//! 3. Sources: fixed hyperlinked references

use chrono::NaiveDateTime;
use tracing::{debug, instrument};

use insolvencycheck_shared::{CompanyIdentity, EvidenceCounts};

use crate::layout::{
    Align, DrawOp, Font, HIGHLIGHT_CLEAR, HIGHLIGHT_FOUND, Page, PageKind, Report, Rgb, TextLine,
};
use crate::normalize::{NormalizedEvidence, TITLE_MARKER, TextBlock};

/// Findings-page line shown when no source produced any record.
pub const NO_RECORDS: &str = "No records found.";

/// Cover-page indicator labels, in display order.
pub const CASES_LABEL: &str = "Insolvency Cases Found";
pub const FILINGS_LABEL: &str = "Relevant Filings Found";
pub const NOTICES_LABEL: &str = "London Gazette Notices Found";

/// A static entry on the sources page.
struct SourceRef {
    title: &'static str,
    url: &'static str,
    description: &'static str,
}

const SOURCES: &[SourceRef] = &[
    SourceRef {
        title: "Companies House API",
        url: "https://developer.company-information.service.gov.uk",
        description: "The official UK government API for company financial and status data.",
    },
    SourceRef {
        title: "The London Gazette",
        url: "https://www.thegazette.co.uk",
        description: "The UK's official public record for legal, insolvency, and regulatory notices.",
    },
];

// Vertical layout, in millimetres.
const COVER_TOP: f32 = 60.0;
const BODY_TOP: f32 = 80.0;
const ROW: f32 = 10.0;
const ADDRESS_ROW: f32 = 5.0;
const LINK_ROW: f32 = 8.0;
const DESCRIPTION_ROW: f32 = 6.0;
const BLOCK_GAP: f32 = 5.0;

/// Inputs that are not evidence: who produced the report and when.
#[derive(Debug, Clone)]
pub struct ComposeContext {
    /// Reporting-party identity block, one entry per line.
    pub produced_by: Vec<String>,
    /// Run timestamp; printed on the cover as the report date.
    pub generated_at: NaiveDateTime,
}

/// Lay out a report.
///
/// `counts` are the raw per-source record counts and drive the cover-page
/// indicators; `evidence` supplies the findings text.
#[instrument(skip_all, fields(registry_id = %identity.registry_id))]
pub fn compose(
    identity: &CompanyIdentity,
    counts: EvidenceCounts,
    evidence: &NormalizedEvidence,
    ctx: &ComposeContext,
) -> Report {
    let pages = vec![
        cover_page(identity, counts, ctx),
        findings_page(counts, evidence),
        sources_page(),
    ];

    debug!(
        pages = pages.len(),
        ops = pages.iter().map(|p| p.ops.len()).sum::<usize>(),
        "report composed"
    );

    Report {
        title: format!("Insolvency report: {}", identity.official_name),
        pages,
    }
}

/// Fill colour for an indicator: one colour when records exist, another when none do.
pub fn indicator_fill(count: usize) -> Rgb {
    if count > 0 {
        HIGHLIGHT_FOUND
    } else {
        HIGHLIGHT_CLEAR
    }
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

fn cover_page(identity: &CompanyIdentity, counts: EvidenceCounts, ctx: &ComposeContext) -> Page {
    let mut ops = vec![
        DrawOp::MoveTo { y_mm: COVER_TOP },
        text("Report Produced By:", Font::bold(10.0), Align::Left, ROW),
    ];
    for line in &ctx.produced_by {
        ops.push(text(line, Font::body(8.0), Align::Left, ADDRESS_ROW));
    }
    ops.push(DrawOp::Gap { height_mm: 8.0 });

    let date = ctx.generated_at.format("%d %B %Y");
    ops.push(text(
        &format!("Date of Report: {date}"),
        Font::bold(10.0),
        Align::Left,
        ROW,
    ));
    ops.push(text(
        &format!(
            "Company against which enquiries are made: {}",
            identity.official_name
        ),
        Font::bold(10.0),
        Align::Left,
        ROW,
    ));
    ops.push(DrawOp::Gap { height_mm: 12.0 });

    for (label, count) in [
        (CASES_LABEL, counts.cases),
        (FILINGS_LABEL, counts.filings),
        (NOTICES_LABEL, counts.notices),
    ] {
        ops.push(DrawOp::StatusBox {
            label: label.to_string(),
            fill: indicator_fill(count),
        });
    }

    Page {
        kind: PageKind::Cover,
        ops,
    }
}

fn findings_page(counts: EvidenceCounts, evidence: &NormalizedEvidence) -> Page {
    let mut ops = heading("Summary of Findings");

    if counts.is_empty() {
        ops.push(text(NO_RECORDS, Font::body(8.0), Align::Center, ROW));
    } else {
        for block in evidence.blocks() {
            push_block(&mut ops, block);
        }
    }

    Page {
        kind: PageKind::Findings,
        ops,
    }
}

fn sources_page() -> Page {
    let mut ops = heading("Sources");

    for (i, source) in SOURCES.iter().enumerate() {
        if i > 0 {
            ops.push(DrawOp::Gap {
                height_mm: BLOCK_GAP,
            });
        }
        ops.push(DrawOp::Link {
            line: TextLine {
                text: source.title.to_string(),
                font: Font::bold(9.0),
                align: Align::Center,
                color: Rgb::LINK_BLUE,
                row_height_mm: LINK_ROW,
            },
            url: source.url.to_string(),
        });
        ops.push(text(
            source.description,
            Font::body(8.0),
            Align::Center,
            DESCRIPTION_ROW,
        ));
    }

    Page {
        kind: PageKind::Sources,
        ops,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn heading(title: &str) -> Vec<DrawOp> {
    vec![
        DrawOp::MoveTo { y_mm: BODY_TOP },
        text(title, Font::bold(12.0), Align::Center, ROW),
        DrawOp::Gap { height_mm: 10.0 },
    ]
}

/// Title-marked lines go bold with the marker stripped; the rest are body text.
fn push_block(ops: &mut Vec<DrawOp>, block: &TextBlock) {
    for line in &block.lines {
        let op = match line.strip_prefix(TITLE_MARKER) {
            Some(title) => text(title, Font::bold(8.0), Align::Center, ROW),
            None => text(line, Font::body(8.0), Align::Center, ROW),
        };
        ops.push(op);
    }
    ops.push(DrawOp::Gap {
        height_mm: BLOCK_GAP,
    });
}

fn text(content: &str, font: Font, align: Align, row_height_mm: f32) -> DrawOp {
    DrawOp::Text(TextLine {
        text: content.to_string(),
        font,
        align,
        color: Rgb::BLACK,
        row_height_mm,
    })
}
