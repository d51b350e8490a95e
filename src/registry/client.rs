//! HTTP client for the legal-acts registry search endpoint.

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use crate::error::TransportError;
use crate::registry::act::{ActRecord, SearchResponse};
use crate::registry::filter::{SearchFilter, query_params};

/// Default registry root.
pub const DEFAULT_BASE_URL: &str = "https://api.sejm.gov.pl/eli";

/// Publisher scope for every search (Dziennik Ustaw).
pub const DEFAULT_PUBLISHER: &str = "DU";

/// Source of discovered acts for one pipeline run.
#[async_trait]
pub trait ActSource: Send + Sync {
    /// Search for acts. Failures are absorbed into an empty result.
    async fn search(&self, filter: &SearchFilter) -> Vec<ActRecord>;
}

/// Registry search client.
pub struct RegistryClient {
    client: reqwest::Client,
    base_url: String,
    publisher: String,
}

impl RegistryClient {
    /// Create a client for the given registry root (no trailing slash needed).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client sharing an existing connection pool.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            publisher: DEFAULT_PUBLISHER.to_string(),
        }
    }

    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = publisher.into();
        self
    }

    /// Root under which act documents live.
    pub fn acts_base(&self) -> String {
        format!("{}/acts", self.base_url)
    }

    fn search_url(&self) -> String {
        format!("{}/acts/search", self.base_url)
    }

    /// Search, surfacing transport failures to the caller.
    pub async fn try_search(
        &self,
        filter: &SearchFilter,
    ) -> Result<Vec<ActRecord>, TransportError> {
        self.try_search_on(filter, Local::now().date_naive()).await
    }

    /// Search as of a fixed date (`today` only matters when the filter has
    /// no explicit year).
    pub async fn try_search_on(
        &self,
        filter: &SearchFilter,
        today: NaiveDate,
    ) -> Result<Vec<ActRecord>, TransportError> {
        let url = self.search_url();
        let params = query_params(filter, &self.publisher, today);
        debug!(url = %url, ?params, "searching registry");

        let resp = self.client.get(&url).query(&params).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body: SearchResponse = resp.json().await.map_err(|e| TransportError::Decode {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        let base = self.acts_base();
        let acts: Vec<ActRecord> = body
            .items
            .iter()
            .map(|raw| ActRecord::from_raw(raw, &base))
            .collect();
        info!(count = acts.len(), "registry search complete");
        Ok(acts)
    }
}

#[async_trait]
impl ActSource for RegistryClient {
    async fn search(&self, filter: &SearchFilter) -> Vec<ActRecord> {
        match self.try_search(filter).await {
            Ok(acts) => acts,
            Err(e) => {
                warn!(
                    error = %e,
                    status = ?e.status(),
                    "registry search failed, treating as no results"
                );
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::registry::filter::DateRange;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 25).unwrap()
    }

    fn search_body() -> serde_json::Value {
        serde_json::json!({
            "count": 2,
            "items": [
                {
                    "title": "Ustawa o ochronie przeciwpożarowej",
                    "inForce": "IN_FORCE",
                    "entryIntoForce": "2025-03-20",
                    "keywords": ["ochrona przeciwpożarowa"],
                    "ELI": "DU/2025/373",
                    "textPDF": true,
                    "textHTML": true
                },
                {
                    "title": "Obwieszczenie",
                    "ELI": "DU/2025/380",
                    "textPDF": false,
                    "textHTML": false
                }
            ]
        })
    }

    #[tokio::test]
    async fn sends_filter_and_normalizes_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/acts/search"))
            .and(query_param("publisher", "DU"))
            .and(query_param("year", "2025"))
            .and(query_param("keyword", "a,b"))
            .and(query_param("dateEffectFrom", "2025-03-18"))
            .and(query_param("dateEffectTo", "2025-03-25"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = RegistryClient::new(server.uri());
        let filter = SearchFilter::last_week(today()).with_keywords(["a", "b"]);
        let acts = client.try_search_on(&filter, today()).await.unwrap();

        assert_eq!(acts.len(), 2);
        assert_eq!(acts[0].title, "Ustawa o ochronie przeciwpożarowej");
        assert_eq!(
            acts[0].document_url(),
            Some(format!("{}/acts/DU/2025/373/text.pdf", server.uri()).as_str())
        );
        assert_eq!(acts[1].document_url(), None);
    }

    #[tokio::test]
    async fn non_success_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/acts/search"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = RegistryClient::new(server.uri());
        let filter = SearchFilter {
            date_range: DateRange::new(today(), today()),
            ..SearchFilter::default()
        };
        let err = client.try_search_on(&filter, today()).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn search_absorbs_failures_into_empty_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = RegistryClient::new(server.uri());
        assert!(client.search(&SearchFilter::default()).await.is_empty());
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let client = RegistryClient::new(server.uri());
        let err = client
            .try_search_on(&SearchFilter::default(), today())
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Decode { .. }));
    }

    #[test]
    fn acts_base_strips_trailing_slash() {
        let client = RegistryClient::new("https://api.sejm.gov.pl/eli/");
        assert_eq!(client.acts_base(), "https://api.sejm.gov.pl/eli/acts");
    }
}
