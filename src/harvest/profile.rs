//! Site extraction profile.
//!
//! A `SiteProfile` is the data that couples a run to one vendor site: the
//! listing URL, the CSS selector that identifies product links, and the
//! file extension that identifies firmware archives. The compiled-in
//! default targets the TP-Link download center; any other site is a JSON
//! file away.

use anyhow::{Context, Result};
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default listing page.
pub const DEFAULT_LISTING_URL: &str = "https://www.tp-link.com/dk/support/download/";

/// Default product link selector on the listing page.
pub const DEFAULT_PRODUCT_SELECTOR: &str = r#"a[href^="/dk/support/download/"]"#;

/// Default archive extension.
pub const DEFAULT_ARCHIVE_EXTENSION: &str = ".zip";

/// Default bounded wait for matching anchors to appear.
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 20_000;

/// Extraction profile for one vendor site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteProfile {
    /// Top-level page enumerating product models.
    pub listing_url: String,
    /// CSS selector matching product page anchors on the listing page.
    pub product_selector: String,
    /// Extension identifying downloadable archives (e.g. ".zip").
    pub archive_extension: String,
    /// Bounded wait for matching anchors, per page.
    pub wait_timeout_ms: u64,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            product_selector: DEFAULT_PRODUCT_SELECTOR.to_string(),
            archive_extension: DEFAULT_ARCHIVE_EXTENSION.to_string(),
            wait_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
        }
    }
}

impl SiteProfile {
    /// Load a profile from a JSON file. Missing fields fall back to the
    /// compiled-in defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read profile {}", path.display()))?;
        let profile: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse profile {}", path.display()))?;
        profile.validate()?;
        Ok(profile)
    }

    /// Check that the profile is usable before a run starts.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.listing_url)
            .with_context(|| format!("listing_url is not a valid URL: {}", self.listing_url))?;
        if Selector::parse(&self.product_selector).is_err() {
            anyhow::bail!(
                "product_selector is not a valid CSS selector: {}",
                self.product_selector
            );
        }
        if self.archive_extension.trim_matches('.').is_empty() {
            anyhow::bail!("archive_extension must not be empty");
        }
        Ok(())
    }

    /// Archive extension normalized to a lowercase ".ext" form.
    pub fn normalized_extension(&self) -> String {
        let ext = self.archive_extension.to_ascii_lowercase();
        if ext.starts_with('.') {
            ext
        } else {
            format!(".{ext}")
        }
    }
}
