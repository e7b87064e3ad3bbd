//! Notice extraction from the legal-notices search results page.
//!
//! Each result is an `<article class="notice">` carrying an `<h3>` title, a
//! `<time>` date, and an `<a href>` link. Entries missing any of the three are
//! skipped with a warning; they never abort the page.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use insolvencycheck_shared::GazetteNotice;

// ---------------------------------------------------------------------------
// Selectors (compiled once)
// ---------------------------------------------------------------------------

static NOTICE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article.notice").expect("notice selector"));

static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3").expect("title selector"));

static DATE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("time").expect("date selector"));

static LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("link selector"));

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Why a result entry was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SkipReason {
    MissingTitle,
    MissingDate,
    MissingLink,
    BadLink,
}

impl SkipReason {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingTitle => "missing title",
            Self::MissingDate => "missing date",
            Self::MissingLink => "missing link",
            Self::BadLink => "unresolvable link",
        }
    }
}

/// Parse up to `max_entries` result entries from `html`, in page order.
///
/// The cap applies to result entries as they appear on the page, so a
/// malformed entry inside the cap costs a slot rather than pulling in a later one.
pub(crate) fn parse_notices(html: &str, base_url: &Url, max_entries: usize) -> Vec<GazetteNotice> {
    let doc = Html::parse_document(html);
    let mut notices = Vec::new();

    for (index, article) in doc.select(&NOTICE_SEL).take(max_entries).enumerate() {
        match parse_entry(article, base_url) {
            Ok(notice) => notices.push(notice),
            Err(reason) => {
                warn!(index, reason = reason.as_str(), "skipping malformed notice entry");
            }
        }
    }

    debug!(parsed = notices.len(), "notice entries parsed");
    notices
}

fn parse_entry(article: ElementRef<'_>, base_url: &Url) -> Result<GazetteNotice, SkipReason> {
    let title = first_text(article, &TITLE_SEL).ok_or(SkipReason::MissingTitle)?;
    let date = first_text_verbatim(article, &DATE_SEL).ok_or(SkipReason::MissingDate)?;

    let href = article
        .select(&LINK_SEL)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or(SkipReason::MissingLink)?;

    let link = base_url.join(href).map_err(|_| SkipReason::BadLink)?;

    Ok(GazetteNotice {
        title,
        date,
        link: link.to_string(),
    })
}

/// Whitespace-collapsed text of the first match, or `None` if absent or blank.
fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let el = scope.select(selector).next()?;
    let text = el.text().collect::<Vec<_>>().join(" ");
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() { None } else { Some(collapsed) }
}

/// Text of the first match trimmed at both ends only, or `None` if absent or blank.
fn first_text_verbatim(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let el = scope.select(selector).next()?;
    let text = el.text().collect::<String>();
    let trimmed = text.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}
