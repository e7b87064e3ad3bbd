//! Core pipeline orchestration for InsolvencyCheck.
//!
//! This crate ties together identity resolution, evidence collection, report
//! composition, and writing into one end-to-end run ([`generate_report`]).

pub mod collect;
pub mod pipeline;

pub use collect::{CollectedEvidence, collect_evidence};
pub use pipeline::{
    ProgressReporter, ReportOutcome, ReportRunConfig, SilentProgress, build_report,
    generate_report,
};
