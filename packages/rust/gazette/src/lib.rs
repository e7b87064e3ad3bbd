//! Legal-notices collector.
//!
//! Searches the notices site for the company's official name and scrapes the
//! first few result entries. Like the registry evidence collectors it never
//! fails: transport problems and bad statuses become an empty result with an
//! [`EvidenceGap`](insolvencycheck_shared::EvidenceGap).

mod parser;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument, warn};
use url::Url;

use insolvencycheck_shared::{
    AppConfig, Collected, EvidenceSource, GazetteNotice, InsolvencyCheckError, Result,
    parse_base_url,
};

/// User-Agent string for notice searches.
const USER_AGENT: &str = concat!("InsolvencyCheck/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects to follow on the search page.
const MAX_REDIRECTS: usize = 3;

/// Search path under the site's base URL.
const SEARCH_PATH: &[&str] = &["all-notices", "notice"];

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for [`GazetteClient`].
#[derive(Debug, Clone)]
pub struct GazetteOptions {
    /// Site base URL; relative notice links resolve against it.
    pub base_url: Url,
    /// Maximum number of result entries read from the page.
    pub max_notices: usize,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl GazetteOptions {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url("gazette.base_url", &config.gazette.base_url)?,
            max_notices: config.gazette.max_notices,
            timeout: config.http.timeout(),
        })
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the legal-notices search page.
pub struct GazetteClient {
    client: Client,
    options: GazetteOptions,
}

impl GazetteClient {
    pub fn new(options: GazetteOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(options.timeout)
            .build()
            .map_err(|e| {
                InsolvencyCheckError::upstream(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, options })
    }

    /// Search for notices mentioning `official_name`.
    ///
    /// Callers pass the registry's official name, not the user's input.
    #[instrument(skip_all, fields(official_name = %official_name))]
    pub async fn search(&self, official_name: &str) -> Collected<GazetteNotice> {
        let source = EvidenceSource::GazetteNotices;
        let url = match self.search_url(official_name) {
            Ok(url) => url,
            Err(e) => return Collected::gap(source, e.to_string()),
        };

        match self.fetch(&url).await {
            Ok(body) => {
                let notices = parser::parse_notices(&body, &self.options.base_url, self.options.max_notices);
                info!(count = notices.len(), "gazette notices collected");
                Collected::found(notices)
            }
            Err(e) => {
                warn!(error = %e, "notice search failed, treating as no evidence");
                Collected::gap(source, e.to_string())
            }
        }
    }

    /// `<base>/all-notices/notice?text=<name>`, with spaces form-encoded as `+`.
    pub fn search_url(&self, official_name: &str) -> Result<Url> {
        let mut url = self.options.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                InsolvencyCheckError::config(format!(
                    "gazette base URL cannot have a path: {}",
                    self.options.base_url
                ))
            })?
            .pop_if_empty()
            .extend(SEARCH_PATH);
        url.query_pairs_mut().append_pair("text", official_name.trim());
        Ok(url)
    }

    async fn fetch(&self, url: &Url) -> Result<String> {
        debug!(%url, "fetching notice search page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| InsolvencyCheckError::upstream(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InsolvencyCheckError::upstream(format!(
                "{url}: HTTP {status}"
            )));
        }

        response
            .text()
            .await
            .map_err(|e| InsolvencyCheckError::upstream(format!("{url}: failed to read body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(base: &str) -> GazetteClient {
        GazetteClient::new(GazetteOptions {
            base_url: Url::parse(base).unwrap(),
            max_notices: 5,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn search_url_encodes_spaces_as_plus() {
        let client = client_for("https://www.thegazette.co.uk");
        let url = client.search_url("ACME TRADING & SONS LTD").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.thegazette.co.uk/all-notices/notice?text=ACME+TRADING+%26+SONS+LTD"
        );
    }

    #[tokio::test]
    async fn search_parses_result_page() {
        let server = MockServer::start().await;
        let html = std::fs::read_to_string("../../../fixtures/html/gazette-results.html")
            .expect("read fixture");

        Mock::given(method("GET"))
            .and(path("/all-notices/notice"))
            .and(query_param("text", "ACME LTD"))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let collected = client.search("ACME LTD").await;

        assert!(collected.gap.is_none());
        assert_eq!(collected.items.len(), 4);
        assert!(collected.items[0].link.starts_with(&server.uri()));
    }

    #[tokio::test]
    async fn search_caps_at_max_notices() {
        let server = MockServer::start().await;
        let body: String = (0..9)
            .map(|i| {
                format!(
                    r#"<article class="notice"><h3>N{i}</h3><time>1 July 2023</time><a href="/notice/{i}">x</a></article>"#
                )
            })
            .collect();

        Mock::given(method("GET"))
            .and(path("/all-notices/notice"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let collected = client.search("ACME LTD").await;
        assert_eq!(collected.items.len(), 5);
    }

    #[tokio::test]
    async fn search_error_status_is_a_gap() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/all-notices/notice"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let collected = client.search("ACME LTD").await;
        assert!(collected.items.is_empty());
        let gap = collected.gap.expect("gap recorded");
        assert_eq!(gap.source, EvidenceSource::GazetteNotices);
        assert!(gap.reason.contains("502"));
    }
}
