//! Shared types, error model, and configuration for InsolvencyCheck.
//!
//! This crate is the foundation depended on by all other InsolvencyCheck crates.
//! It provides:
//! - [`InsolvencyCheckError`]: the unified error type
//! - Domain types ([`CompanyIdentity`], [`EvidenceSet`], [`EvidenceGap`], [`RunId`])
//! - Configuration ([`AppConfig`], config loading, API key lookup)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, GazetteConfig, HttpConfig, MatchPolicy, RegistryConfig, ReportConfig, api_key,
    config_dir, config_file_path, init_config, load_config, load_config_from, parse_base_url,
};
pub use error::{InsolvencyCheckError, Result};
pub use types::{
    CaseEvent, Collected, CompanyIdentity, EvidenceCounts, EvidenceGap, EvidenceSet,
    EvidenceSource, FilingRecord, GazetteNotice, InsolvencyCase, RunId,
};
