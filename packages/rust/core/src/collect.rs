//! Concurrent evidence collection for a resolved company.

use tracing::{info, instrument, warn};

use insolvencycheck_gazette::GazetteClient;
use insolvencycheck_registry::RegistryClient;
use insolvencycheck_shared::{CompanyIdentity, EvidenceGap, EvidenceSet};

/// Evidence for one company, plus any sources that degraded to empty.
#[derive(Debug, Clone)]
pub struct CollectedEvidence {
    pub evidence: EvidenceSet,
    pub gaps: Vec<EvidenceGap>,
}

/// Run the three collectors concurrently and merge their results.
///
/// Never fails: a collector that cannot reach its source contributes an empty
/// list and a gap. Gaps are ordered cases, filings, notices.
#[instrument(skip_all, fields(registry_id = %identity.registry_id))]
pub async fn collect_evidence(
    registry: &RegistryClient,
    gazette: &GazetteClient,
    identity: &CompanyIdentity,
) -> CollectedEvidence {
    let (cases, filings, notices) = tokio::join!(
        registry.insolvency_cases(&identity.registry_id),
        registry.filing_history(&identity.registry_id),
        gazette.search(&identity.official_name),
    );

    let gaps: Vec<EvidenceGap> = [cases.gap, filings.gap, notices.gap]
        .into_iter()
        .flatten()
        .collect();

    for gap in &gaps {
        warn!(source = %gap.source, reason = %gap.reason, "evidence gap");
    }

    let evidence = EvidenceSet {
        identity: identity.clone(),
        cases: cases.items,
        filings: filings.items,
        notices: notices.items,
    };

    let counts = evidence.counts();
    info!(
        cases = counts.cases,
        filings = counts.filings,
        notices = counts.notices,
        gaps = gaps.len(),
        "evidence collected"
    );

    CollectedEvidence { evidence, gaps }
}
