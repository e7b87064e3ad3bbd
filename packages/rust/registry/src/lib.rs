//! Corporate registry client: identity resolution, insolvency cases, and filing history.
//!
//! Every call is a single authenticated `GET` returning JSON. The identity
//! search is strict (transport failures and non-success statuses are errors),
//! while the two evidence collectors never fail: a missing record, a bad
//! status, or an undecodable body all degrade to an empty [`Collected`] with
//! an [`EvidenceGap`](insolvencycheck_shared::EvidenceGap) attached.

mod filter;
mod models;

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};
use url::Url;

use insolvencycheck_shared::{
    AppConfig, Collected, CompanyIdentity, EvidenceSource, FilingRecord, InsolvencyCase,
    InsolvencyCheckError, MatchPolicy, Result, parse_base_url,
};

pub use filter::{INSOLVENCY_KEYWORDS, filter_filings, matches_keywords};

use models::{FilingHistoryResponse, InsolvencyResponse, SearchResponse};

/// User-Agent string for registry requests.
const USER_AGENT: &str = concat!("InsolvencyCheck/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Connection settings for [`RegistryClient`]. The API key is injected here and nowhere else.
#[derive(Clone)]
pub struct RegistryOptions {
    /// API base URL.
    pub base_url: Url,
    /// API key, sent as the basic-auth username with an empty password.
    pub api_key: String,
    /// Filing-history page size. Only the first page is fetched.
    pub items_per_page: u32,
    /// Which search result becomes the identity.
    pub match_policy: MatchPolicy,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl RegistryOptions {
    /// Build options from the loaded config and a credential read elsewhere.
    pub fn from_config(config: &AppConfig, api_key: String) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url("registry.base_url", &config.registry.base_url)?,
            api_key,
            items_per_page: config.registry.items_per_page,
            match_policy: config.registry.match_policy,
            timeout: config.http.timeout(),
        })
    }
}

impl std::fmt::Debug for RegistryOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryOptions")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("items_per_page", &self.items_per_page)
            .field("match_policy", &self.match_policy)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Outcome of resolving a free-text company name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The search produced a usable match.
    Found(CompanyIdentity),
    /// The search returned nothing the match policy accepts.
    NotFound,
}

impl Resolution {
    /// Convert to a `Result`, mapping `NotFound` to [`InsolvencyCheckError::NotFound`].
    pub fn into_result(self, query: &str) -> Result<CompanyIdentity> {
        match self {
            Self::Found(identity) => Ok(identity),
            Self::NotFound => Err(InsolvencyCheckError::not_found(query)),
        }
    }
}

/// Reject empty or whitespace-only names before any request is made.
pub fn validate_company_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(InsolvencyCheckError::validation(
            "company name must not be empty",
        ));
    }
    Ok(trimmed)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Authenticated client for the registry API.
pub struct RegistryClient {
    client: Client,
    options: RegistryOptions,
}

impl RegistryClient {
    /// Create a client with the given options.
    pub fn new(options: RegistryOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(options.timeout)
            .build()
            .map_err(|e| {
                InsolvencyCheckError::upstream(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, options })
    }

    /// Map a company name to its canonical registry identity.
    ///
    /// Issues exactly one search request. Which result wins is decided by
    /// [`MatchPolicy`]; with the default policy the first result is taken
    /// with no disambiguation.
    #[instrument(skip_all, fields(policy = ?self.options.match_policy))]
    pub async fn resolve(&self, name: &str) -> Result<Resolution> {
        let query = validate_company_name(name)?;
        let url = self.endpoint(&["search", "companies"])?;

        debug!(%url, query, "searching registry");

        let response = self
            .client
            .get(url.clone())
            .basic_auth(&self.options.api_key, None::<&str>)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| InsolvencyCheckError::upstream(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InsolvencyCheckError::upstream(format!(
                "{url}: HTTP {status}"
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| InsolvencyCheckError::parse(format!("{url}: {e}")))?;

        let hit = match self.options.match_policy {
            MatchPolicy::First => body.items.first(),
            MatchPolicy::Exact => {
                let wanted = query.to_lowercase();
                body.items.iter().find(|i| i.title.to_lowercase() == wanted)
            }
        };

        match hit {
            Some(item) => {
                let identity = CompanyIdentity::from(item);
                info!(
                    registry_id = %identity.registry_id,
                    official_name = %identity.official_name,
                    candidates = body.items.len(),
                    "company resolved"
                );
                Ok(Resolution::Found(identity))
            }
            None => {
                info!(query, candidates = body.items.len(), "no matching company");
                Ok(Resolution::NotFound)
            }
        }
    }

    /// Fetch insolvency cases for a company.
    ///
    /// The registry answers 404 for companies with no insolvency history, so
    /// any non-success status is an empty result rather than a failure.
    #[instrument(skip_all, fields(registry_id = %registry_id))]
    pub async fn insolvency_cases(&self, registry_id: &str) -> Collected<InsolvencyCase> {
        let source = EvidenceSource::InsolvencyCases;
        let url = match self.endpoint(&["company", registry_id, "insolvency"]) {
            Ok(url) => url,
            Err(e) => return Collected::gap(source, e.to_string()),
        };

        match self.get_json::<InsolvencyResponse>(url, &[]).await {
            Ok(Some(body)) => {
                let cases: Vec<InsolvencyCase> =
                    body.cases.into_iter().map(InsolvencyCase::from).collect();
                info!(count = cases.len(), "insolvency cases collected");
                Collected::found(cases)
            }
            Ok(None) => {
                debug!("no insolvency record held");
                Collected::found(Vec::new())
            }
            Err(e) => {
                warn!(error = %e, "insolvency lookup failed, treating as no evidence");
                Collected::gap(source, e.to_string())
            }
        }
    }

    /// Fetch the first page of filing history and keep insolvency-related records.
    ///
    /// Pages beyond the first are not requested.
    #[instrument(skip_all, fields(registry_id = %registry_id, items_per_page = self.options.items_per_page))]
    pub async fn filing_history(&self, registry_id: &str) -> Collected<FilingRecord> {
        let source = EvidenceSource::FilingHistory;
        let url = match self.endpoint(&["company", registry_id, "filing-history"]) {
            Ok(url) => url,
            Err(e) => return Collected::gap(source, e.to_string()),
        };
        let page_size = self.options.items_per_page.to_string();

        match self
            .get_json::<FilingHistoryResponse>(url, &[("items_per_page", page_size.as_str())])
            .await
        {
            Ok(Some(body)) => {
                let fetched = body.items.len();
                let records: Vec<FilingRecord> =
                    body.items.into_iter().map(FilingRecord::from).collect();
                let kept = filter_filings(records, INSOLVENCY_KEYWORDS);
                info!(fetched, kept = kept.len(), "filing history collected");
                Collected::found(kept)
            }
            Ok(None) => Collected::gap(source, "filing history unavailable (HTTP 404)"),
            Err(e) => {
                warn!(error = %e, "filing history lookup failed, treating as no evidence");
                Collected::gap(source, e.to_string())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Build `<base_url>/<segments...>`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.options.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                InsolvencyCheckError::config(format!(
                    "registry base URL cannot have a path: {}",
                    self.options.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Authenticated GET decoding a JSON body.
    ///
    /// `Ok(None)` means the registry answered 404. Other non-success statuses
    /// are errors so the caller can record why evidence is missing.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<Option<T>> {
        let response = self
            .client
            .get(url.clone())
            .basic_auth(&self.options.api_key, None::<&str>)
            .query(query)
            .send()
            .await
            .map_err(|e| InsolvencyCheckError::upstream(format!("{url}: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(InsolvencyCheckError::upstream(format!(
                "{url}: HTTP {status}"
            )));
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| InsolvencyCheckError::parse(format!("{url}: {e}")))
    }
}
