//! Page-driving half of the harvest pipeline.
//!
//! A `Harvester` owns one page session and replays the same navigate →
//! wait → read-back shape for the listing page and for each product page.

use super::links;
use super::{HarvestError, SiteProfile};
use crate::renderer::PageSession;
use anyhow::Result;
use tracing::info;

/// Drives a page session over one site profile.
pub struct Harvester {
    session: Box<dyn PageSession>,
    profile: SiteProfile,
}

impl Harvester {
    pub fn new(session: Box<dyn PageSession>, profile: SiteProfile) -> Self {
        Self { session, profile }
    }

    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    /// Navigate to the listing page and collect every product link matched
    /// by the profile selector, resolved absolute. DOM order, duplicates
    /// retained.
    pub async fn enumerate_products(&mut self) -> Result<Vec<String>, HarvestError> {
        let url = self.profile.listing_url.clone();
        let selector = self.profile.product_selector.clone();
        info!("accessing listing page: {url}");

        let base = self.goto_and_wait(&url, &selector).await?;
        let html = self
            .session
            .html()
            .await
            .map_err(|e| HarvestError::PageUnavailable {
                url: url.clone(),
                source: e,
            })?;

        let found = links::matching_links(&html, &base, &selector)?;
        info!("found {} product links", found.len());
        Ok(found)
    }

    /// Navigate to one product page and collect every archive link matching
    /// the profile extension, resolved absolute.
    pub async fn archive_links_on(
        &mut self,
        product_url: &str,
    ) -> Result<Vec<String>, HarvestError> {
        let ext = self.profile.normalized_extension();
        let selector = format!(r#"a[href$="{ext}"]"#);
        info!("accessing product page: {product_url}");

        let base = self.goto_and_wait(product_url, &selector).await?;
        let html = self
            .session
            .html()
            .await
            .map_err(|e| HarvestError::PageUnavailable {
                url: product_url.to_string(),
                source: e,
            })?;

        let found = links::archive_links(&html, &base, &ext);
        info!("found {} firmware links on {product_url}", found.len());
        Ok(found)
    }

    /// Shared navigate-and-wait step. Returns the final URL so relative
    /// hrefs resolve against the page actually loaded, redirects included.
    async fn goto_and_wait(&mut self, url: &str, selector: &str) -> Result<String, HarvestError> {
        let timeout_ms = self.profile.wait_timeout_ms;

        let nav = self
            .session
            .navigate(url, timeout_ms)
            .await
            .map_err(|e| HarvestError::Navigation {
                url: url.to_string(),
                source: e,
            })?;

        self.session
            .wait_for_selector(selector, timeout_ms)
            .await
            .map_err(|_| HarvestError::SelectorTimeout {
                selector: selector.to_string(),
                url: url.to_string(),
                timeout_ms,
            })?;

        Ok(nav.final_url)
    }

    /// Close the underlying session. The engine itself is shut down by the
    /// caller that launched it.
    pub async fn close(self) -> Result<()> {
        self.session.close().await
    }
}
