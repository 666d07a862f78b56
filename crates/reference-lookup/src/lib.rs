//! Reference Lookup
//!
//! Resolves a species name to the canonical URL of a descriptive page in an
//! external knowledge source. One best-effort call per lookup, no retries.

mod wikipedia;

pub use wikipedia::{WikipediaConfig, WikipediaLookup};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Canonical page for a queried term
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceLink {
    /// Term exactly as it was queried
    pub category_queried: String,
    pub url: String,
}

/// Lookup failures
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    /// No page carries this exact title
    #[error("No reference page for {0:?}")]
    NotFound(String),
    /// The title resolves to a disambiguation page
    #[error("Reference for {0:?} is ambiguous")]
    Ambiguous(String),
    /// Knowledge source unreachable or answered unusably
    #[error("Reference source unavailable: {0}")]
    Unavailable(String),
}

impl LookupError {
    /// Short stable name, used as a metric label
    pub fn kind(&self) -> &'static str {
        match self {
            LookupError::NotFound(_) => "not_found",
            LookupError::Ambiguous(_) => "ambiguous",
            LookupError::Unavailable(_) => "unavailable",
        }
    }
}

/// Knowledge source capable of resolving a term to a page URL
#[async_trait]
pub trait ReferenceLookup: Send + Sync {
    async fn lookup(&self, term: &str) -> Result<ReferenceLink, LookupError>;
}
