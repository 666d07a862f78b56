//! MediaWiki exact-title lookup

use crate::{LookupError, ReferenceLink, ReferenceLookup};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Wikipedia client configuration
#[derive(Debug, Clone)]
pub struct WikipediaConfig {
    /// MediaWiki action API endpoint (selects the language edition)
    pub endpoint: String,
    /// Sent with every request, as Wikimedia asks of API clients
    pub user_agent: String,
    /// Upper bound for one lookup
    pub timeout: Duration,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://en.wikipedia.org/w/api.php".to_string(),
            user_agent: concat!("aviary/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    query: Option<Query>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct Query {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    fullurl: Option<String>,
    #[serde(default)]
    pageprops: PageProps,
}

#[derive(Debug, Default, Deserialize)]
struct PageProps {
    disambiguation: Option<serde_json::Value>,
}

/// Looks terms up as exact Wikipedia titles (redirects followed)
#[derive(Debug, Clone)]
pub struct WikipediaLookup {
    client: reqwest::Client,
    endpoint: String,
}

impl WikipediaLookup {
    pub fn new(config: &WikipediaConfig) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| LookupError::Unavailable(format!("client setup failed: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    async fn query(&self, term: &str) -> Result<QueryResponse, LookupError> {
        let response = self
            .client
            .get(self.endpoint.as_str())
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("redirects", "1"),
                ("prop", "info|pageprops"),
                ("inprop", "url"),
                ("ppprop", "disambiguation"),
                ("titles", term),
            ])
            .send()
            .await
            .map_err(|e| LookupError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Unavailable(format!("status {}", status)));
        }

        response
            .json::<QueryResponse>()
            .await
            .map_err(|e| LookupError::Unavailable(format!("malformed response: {}", e)))
    }
}

#[async_trait]
impl ReferenceLookup for WikipediaLookup {
    async fn lookup(&self, term: &str) -> Result<ReferenceLink, LookupError> {
        if term.trim().is_empty() {
            return Err(LookupError::NotFound(term.to_string()));
        }

        debug!("Looking up reference page for {:?}", term);
        let response = self.query(term).await?;
        let link = interpret(term, response);
        if let Err(e) = &link {
            warn!("Reference lookup failed: {}", e);
        }
        link
    }
}

fn interpret(term: &str, response: QueryResponse) -> Result<ReferenceLink, LookupError> {
    if let Some(error) = response.error {
        return Err(LookupError::Unavailable(format!("{}: {}", error.code, error.info)));
    }

    let page = response
        .query
        .and_then(|q| q.pages.into_iter().next())
        .ok_or_else(|| LookupError::NotFound(term.to_string()))?;

    if page.missing || page.invalid {
        return Err(LookupError::NotFound(term.to_string()));
    }
    if page.pageprops.disambiguation.is_some() {
        return Err(LookupError::Ambiguous(term.to_string()));
    }

    match page.fullurl {
        Some(url) if !url.is_empty() => Ok(ReferenceLink {
            category_queried: term.to_string(),
            url,
        }),
        _ => Err(LookupError::Unavailable("page without URL".to_string())),
    }
}
