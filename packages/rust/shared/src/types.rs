//! Core domain types: the resolved company identity and the evidence collected for it.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one report run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Canonical registry identity for the company under enquiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyIdentity {
    /// Registry identifier (company number).
    pub registry_id: String,
    /// Official name as held by the registry.
    pub official_name: String,
}

// ---------------------------------------------------------------------------
// Evidence records
// ---------------------------------------------------------------------------

/// One dated milestone within an insolvency case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseEvent {
    /// Hyphenated machine code, e.g. `appointment-of-liquidator`.
    pub event_type: String,
    /// Date as supplied by the registry (ISO `YYYY-MM-DD` when well-formed).
    pub event_date: String,
}

/// A formal insolvency proceeding and its milestones, in registry order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsolvencyCase {
    pub events: Vec<CaseEvent>,
}

/// A filing-history entry that matched the insolvency keyword filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingRecord {
    pub description: String,
    /// Raw filing date; `None` when the registry supplied no date field.
    pub date: Option<String>,
}

/// A notice scraped from the legal-notices search page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GazetteNotice {
    pub title: String,
    /// Free-text date exactly as the site renders it.
    pub date: String,
    /// Absolute link to the notice.
    pub link: String,
}

// ---------------------------------------------------------------------------
// EvidenceSet
// ---------------------------------------------------------------------------

/// Everything collected for one company in one run. Each collection may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceSet {
    pub identity: CompanyIdentity,
    pub cases: Vec<InsolvencyCase>,
    pub filings: Vec<FilingRecord>,
    pub notices: Vec<GazetteNotice>,
}

impl EvidenceSet {
    /// An evidence set with no records of any kind.
    pub fn empty(identity: CompanyIdentity) -> Self {
        Self {
            identity,
            cases: Vec::new(),
            filings: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Raw per-source record counts.
    pub fn counts(&self) -> EvidenceCounts {
        EvidenceCounts {
            cases: self.cases.len(),
            filings: self.filings.len(),
            notices: self.notices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts().is_empty()
    }
}

/// Pre-normalization record counts, used for the cover-page indicators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceCounts {
    pub cases: usize,
    pub filings: usize,
    pub notices: usize,
}

impl EvidenceCounts {
    pub fn is_empty(&self) -> bool {
        self.cases == 0 && self.filings == 0 && self.notices == 0
    }
}

// ---------------------------------------------------------------------------
// Evidence gaps
// ---------------------------------------------------------------------------

/// The upstream source a collector reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    InsolvencyCases,
    FilingHistory,
    GazetteNotices,
}

impl fmt::Display for EvidenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InsolvencyCases => "insolvency cases",
            Self::FilingHistory => "filing history",
            Self::GazetteNotices => "gazette notices",
        };
        f.write_str(name)
    }
}

/// A collector fell back to empty evidence. Non-terminal: the run carries on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceGap {
    pub source: EvidenceSource,
    pub reason: String,
}

impl EvidenceGap {
    pub fn new(source: EvidenceSource, reason: impl Into<String>) -> Self {
        Self {
            source,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for EvidenceGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.reason)
    }
}

/// What a collector hands back: its records plus a gap if it degraded to empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collected<T> {
    pub items: Vec<T>,
    pub gap: Option<EvidenceGap>,
}

impl<T> Collected<T> {
    pub fn found(items: Vec<T>) -> Self {
        Self { items, gap: None }
    }

    pub fn gap(source: EvidenceSource, reason: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            gap: Some(EvidenceGap::new(source, reason)),
        }
    }
}
