//! Typed failure causes for harvest steps.
//!
//! The operator must be able to tell "no products" from "page failed to
//! load", so page-level faults carry their cause instead of collapsing to
//! an empty sequence.

use thiserror::Error;

/// A harvest step failure.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// The CSS selector in the site profile does not parse.
    #[error("invalid CSS selector `{selector}`")]
    BadSelector { selector: String },

    /// The page could not be loaded at all.
    #[error("navigation to {url} failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    /// The page loaded but the expected anchors never appeared.
    #[error("no element matching `{selector}` appeared on {url} within {timeout_ms}ms")]
    SelectorTimeout {
        selector: String,
        url: String,
        timeout_ms: u64,
    },

    /// The rendered page could not be read back from the session.
    #[error("failed to read page content from {url}: {source}")]
    PageUnavailable {
        url: String,
        #[source]
        source: anyhow::Error,
    },
}
