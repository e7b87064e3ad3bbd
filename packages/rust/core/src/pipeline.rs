//! End-to-end `report` pipeline: name → identity → evidence → report → artifact.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{field, info, instrument};

use insolvencycheck_gazette::{GazetteClient, GazetteOptions};
use insolvencycheck_registry::{RegistryClient, RegistryOptions, validate_company_name};
use insolvencycheck_report::{
    ComposeContext, Report, ReportWriter, WrittenReport, compose, normalize, write_report,
};
use insolvencycheck_shared::{
    AppConfig, CompanyIdentity, EvidenceCounts, EvidenceGap, EvidenceSet, Result, RunId,
};

use crate::collect::collect_evidence;

/// Configuration for one report run.
#[derive(Debug, Clone)]
pub struct ReportRunConfig {
    pub registry: RegistryOptions,
    pub gazette: GazetteOptions,
    /// Directory the artifact is written to. Created if missing.
    pub output_dir: PathBuf,
    /// Reporting-party lines for the cover page.
    pub produced_by: Vec<String>,
}

impl ReportRunConfig {
    /// Build a run config from the loaded app config.
    ///
    /// `output_dir` overrides `[report].output_dir` when given.
    pub fn from_app_config(
        config: &AppConfig,
        api_key: String,
        output_dir: Option<PathBuf>,
    ) -> Result<Self> {
        Ok(Self {
            registry: RegistryOptions::from_config(config, api_key)?,
            gazette: GazetteOptions::from_config(config)?,
            output_dir: output_dir.unwrap_or_else(|| PathBuf::from(&config.report.output_dir)),
            produced_by: config.report.produced_by.clone(),
        })
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutcome {
    pub run_id: RunId,
    pub identity: CompanyIdentity,
    pub counts: EvidenceCounts,
    pub gaps: Vec<EvidenceGap>,
    pub report: WrittenReport,
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once per source that degraded to empty evidence.
    fn gap(&self, gap: &EvidenceGap);
    /// Called when the pipeline completes.
    fn done(&self, outcome: &ReportOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn gap(&self, _gap: &EvidenceGap) {}
    fn done(&self, _outcome: &ReportOutcome) {}
}

/// Normalize collected evidence and lay out the report.
pub fn build_report(
    evidence: &EvidenceSet,
    produced_by: &[String],
    generated_at: NaiveDateTime,
) -> Report {
    let normalized = normalize(evidence);
    let ctx = ComposeContext {
        produced_by: produced_by.to_vec(),
        generated_at,
    };
    compose(&evidence.identity, evidence.counts(), &normalized, &ctx)
}

/// Run the full `report` pipeline.
///
/// 1. Validate the name (no I/O on failure)
/// 2. Resolve the company; no match ends the run with `NotFound`
/// 3. Collect cases, filings and notices concurrently
/// 4. Normalize and compose
/// 5. Write the artifact
#[instrument(skip_all, fields(run_id = field::Empty))]
pub async fn generate_report(
    config: &ReportRunConfig,
    company_name: &str,
    writer: &dyn ReportWriter,
    progress: &dyn ProgressReporter,
) -> Result<ReportOutcome> {
    let start = Instant::now();
    let run_id = RunId::new();
    tracing::Span::current().record("run_id", field::display(&run_id));

    let query = validate_company_name(company_name)?;
    info!(query, "starting report pipeline");

    let registry = RegistryClient::new(config.registry.clone())?;
    let gazette = GazetteClient::new(config.gazette.clone())?;

    // --- Phase 1: Identity ---
    progress.phase("Resolving company");
    let identity = registry.resolve(query).await?.into_result(query)?;

    // --- Phase 2: Evidence ---
    progress.phase("Collecting evidence");
    let collected = collect_evidence(&registry, &gazette, &identity).await;
    for gap in &collected.gaps {
        progress.gap(gap);
    }

    // --- Phase 3: Compose ---
    progress.phase("Composing report");
    let generated_at = chrono::Local::now().naive_local();
    let report = build_report(&collected.evidence, &config.produced_by, generated_at);

    // --- Phase 4: Write ---
    progress.phase("Writing report");
    let written = write_report(
        writer,
        &report,
        &config.output_dir,
        &identity.official_name,
        &generated_at,
    )?;

    let outcome = ReportOutcome {
        run_id,
        counts: collected.evidence.counts(),
        identity,
        gaps: collected.gaps,
        report: written,
        elapsed: start.elapsed(),
    };

    progress.done(&outcome);

    info!(
        path = %outcome.report.path.display(),
        gaps = outcome.gaps.len(),
        elapsed_ms = outcome.elapsed.as_millis(),
        "report pipeline complete"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insolvencycheck_report::{
        CASES_LABEL, DrawOp, FILINGS_LABEL, HIGHLIGHT_CLEAR, HIGHLIGHT_FOUND, NO_RECORDS,
        NOTICES_LABEL, PageKind, PdfWriter, UNKNOWN_DATE,
    };
    use insolvencycheck_shared::{EvidenceSource, InsolvencyCheckError, MatchPolicy};
    use serde_json::json;
    use std::sync::Mutex;
    use url::Url;
    use uuid::Uuid;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const EMPTY_RESULTS_PAGE: &str = "<html><body><main></main></body></html>";

    fn run_config(server: &MockServer, output_dir: PathBuf) -> ReportRunConfig {
        let base = Url::parse(&server.uri()).unwrap();
        ReportRunConfig {
            registry: RegistryOptions {
                base_url: base.clone(),
                api_key: "test-key".into(),
                items_per_page: 100,
                match_policy: MatchPolicy::First,
                timeout: Duration::from_secs(5),
            },
            gazette: GazetteOptions {
                base_url: base,
                max_notices: 5,
                timeout: Duration::from_secs(5),
            },
            output_dir,
            produced_by: vec!["Example Reporting Ltd".into()],
        }
    }

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ic-core-{tag}-{}", Uuid::now_v7()))
    }

    fn ts() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    async fn mount_search(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/search/companies"))
            .and(query_param("q", "Acme Ltd"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{ "company_number": "01234567", "title": "ACME LTD" }]
            })))
            .mount(server)
            .await;
    }

    async fn mount_no_notices(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/all-notices/notice"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_RESULTS_PAGE))
            .mount(server)
            .await;
    }

    async fn mount_filings(server: &MockServer, items: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/company/01234567/filing-history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": items })))
            .mount(server)
            .await;
    }

    fn status_fills(report: &Report) -> Vec<(String, insolvencycheck_report::Rgb)> {
        report
            .page(PageKind::Cover)
            .unwrap()
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::StatusBox { label, fill } => Some((label.clone(), *fill)),
                _ => None,
            })
            .collect()
    }

    #[derive(Default)]
    struct RecordingProgress {
        phases: Mutex<Vec<String>>,
        gaps: Mutex<Vec<EvidenceSource>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, name: &str) {
            self.phases.lock().unwrap().push(name.to_string());
        }
        fn gap(&self, gap: &EvidenceGap) {
            self.gaps.lock().unwrap().push(gap.source);
        }
        fn done(&self, _outcome: &ReportOutcome) {}
    }

    #[tokio::test]
    async fn scenario_unknown_company_is_not_found_and_writes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/companies"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .mount(&server)
            .await;

        let dir = temp_dir("not-found");
        let config = run_config(&server, dir.clone());

        let err = generate_report(&config, "Acme Ltd", &PdfWriter, &SilentProgress)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn blank_name_is_rejected_before_any_request() {
        let server = MockServer::start().await;
        let config = run_config(&server, temp_dir("blank"));

        let err = generate_report(&config, "   ", &PdfWriter, &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, InsolvencyCheckError::Validation { .. }));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_failure_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/companies"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let dir = temp_dir("upstream");
        let config = run_config(&server, dir.clone());

        let err = generate_report(&config, "Acme Ltd", &PdfWriter, &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, InsolvencyCheckError::Upstream(_)));
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn scenario_cases_and_filings_without_notices() {
        let server = MockServer::start().await;
        mount_search(&server).await;
        Mock::given(method("GET"))
            .and(path("/company/01234567/insolvency"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cases": [{ "dates": [{ "type": "appointment-of-liquidator", "date": "2023-07-01" }] }]
            })))
            .mount(&server)
            .await;
        mount_filings(
            &server,
            json!([{ "description": "Notice of intention to appoint administrator", "date": "2023-06-15" }]),
        )
        .await;
        mount_no_notices(&server).await;

        let config = run_config(&server, temp_dir("scenario-2"));
        let registry = RegistryClient::new(config.registry.clone()).unwrap();
        let gazette = GazetteClient::new(config.gazette.clone()).unwrap();
        let identity = registry
            .resolve("Acme Ltd")
            .await
            .unwrap()
            .into_result("Acme Ltd")
            .unwrap();

        let collected = collect_evidence(&registry, &gazette, &identity).await;
        assert!(collected.gaps.is_empty());

        let report = build_report(&collected.evidence, &config.produced_by, ts());

        assert_eq!(
            status_fills(&report),
            vec![
                (CASES_LABEL.to_string(), HIGHLIGHT_FOUND),
                (FILINGS_LABEL.to_string(), HIGHLIGHT_FOUND),
                (NOTICES_LABEL.to_string(), HIGHLIGHT_CLEAR),
            ]
        );

        let findings = report.page(PageKind::Findings).unwrap().texts();
        assert!(findings.contains(&"Appointment of liquidator: 01 July 2023"));
        assert!(findings.iter().any(|t| t.contains("15 June 2023")));
        assert!(!findings.contains(&NO_RECORDS));
    }

    #[tokio::test]
    async fn scenario_undated_filing_shows_unknown_date() {
        let server = MockServer::start().await;
        mount_search(&server).await;
        Mock::given(method("GET"))
            .and(path("/company/01234567/insolvency"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        mount_filings(
            &server,
            json!([{ "description": "Resolution for winding up" }]),
        )
        .await;
        mount_no_notices(&server).await;

        let config = run_config(&server, temp_dir("scenario-3"));
        let registry = RegistryClient::new(config.registry.clone()).unwrap();
        let gazette = GazetteClient::new(config.gazette.clone()).unwrap();
        let identity = CompanyIdentity {
            registry_id: "01234567".into(),
            official_name: "ACME LTD".into(),
        };

        let collected = collect_evidence(&registry, &gazette, &identity).await;
        let report = build_report(&collected.evidence, &config.produced_by, ts());

        let findings = report.page(PageKind::Findings).unwrap().texts();
        assert!(findings.contains(&format!("Date: {UNKNOWN_DATE}").as_str()));
    }

    #[tokio::test]
    async fn failing_sources_degrade_to_gaps_and_report_is_still_written() {
        let server = MockServer::start().await;
        mount_search(&server).await;
        Mock::given(method("GET"))
            .and(path("/company/01234567/insolvency"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/company/01234567/filing-history"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/all-notices/notice"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let dir = temp_dir("gaps");
        let config = run_config(&server, dir.clone());
        let progress = RecordingProgress::default();

        let outcome = generate_report(&config, "  Acme Ltd  ", &PdfWriter, &progress)
            .await
            .unwrap();

        assert!(outcome.counts.is_empty());
        assert_eq!(
            *progress.gaps.lock().unwrap(),
            vec![
                EvidenceSource::InsolvencyCases,
                EvidenceSource::FilingHistory,
                EvidenceSource::GazetteNotices,
            ]
        );
        assert_eq!(outcome.gaps.len(), 3);
        assert!(outcome.report.path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn full_run_writes_named_pdf() {
        let server = MockServer::start().await;
        mount_search(&server).await;
        Mock::given(method("GET"))
            .and(path("/company/01234567/insolvency"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        mount_filings(&server, json!([])).await;
        // Notices are searched by the registry's official name, not the typed input
        Mock::given(method("GET"))
            .and(path("/all-notices/notice"))
            .and(query_param("text", "ACME LTD"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_RESULTS_PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let dir = temp_dir("full");
        let config = run_config(&server, dir.clone());
        let progress = RecordingProgress::default();

        let outcome = generate_report(&config, "Acme Ltd", &PdfWriter, &progress)
            .await
            .unwrap();

        assert_eq!(outcome.identity.official_name, "ACME LTD");
        assert!(outcome.gaps.is_empty());
        server.verify().await;

        let name = outcome
            .report
            .path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        assert!(name.starts_with("ACME_LTD_"));
        assert!(name.ends_with(".pdf"));

        let bytes = std::fs::read(&outcome.report.path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(bytes.len(), outcome.report.size_bytes);

        assert_eq!(
            *progress.phases.lock().unwrap(),
            vec![
                "Resolving company",
                "Collecting evidence",
                "Composing report",
                "Writing report"
            ]
        );

        let summary = serde_json::to_value(&outcome).unwrap();
        assert_eq!(summary["identity"]["registry_id"], "01234567");
        assert_eq!(summary["counts"]["cases"], 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn cli_override_wins_over_configured_output_dir() {
        let mut app = AppConfig::default();
        app.report.output_dir = "reports".into();

        let from_file = ReportRunConfig::from_app_config(&app, "k".into(), None).unwrap();
        assert_eq!(from_file.output_dir, PathBuf::from("reports"));

        let overridden =
            ReportRunConfig::from_app_config(&app, "k".into(), Some(PathBuf::from("/tmp/out")))
                .unwrap();
        assert_eq!(overridden.output_dir, PathBuf::from("/tmp/out"));
    }
}
