//! Plain-HTTP page engine — no browser, no JavaScript.
//!
//! Fallback for when Chromium is unavailable (or `--no-browser` is passed).
//! Works only for pages whose anchors are present in the served markup;
//! script-injected links will not be visible to this engine.

use super::{NavigationResult, PageSession, Renderer};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Plain-HTTP page engine.
pub struct HttpPager {
    client: reqwest::Client,
    active_count: Arc<AtomicUsize>,
}

impl HttpPager {
    /// Create a new HTTP pager with a standard Chrome user-agent.
    pub fn new(timeout_ms: u64) -> Self {
        let ua = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                  AppleWebKit/537.36 (KHTML, like Gecko) \
                  Chrome/131.0.0.0 Safari/537.36";

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(ua)
            .build()
            .unwrap_or_default();

        Self {
            client,
            active_count: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Renderer for HttpPager {
    async fn new_session(&self) -> Result<Box<dyn PageSession>> {
        self.active_count.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(HttpSession {
            client: self.client.clone(),
            body: String::new(),
            current_url: String::new(),
            active_count: Arc::clone(&self.active_count),
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn active_sessions(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

/// A single HTTP "page": the body of the last successful GET.
pub struct HttpSession {
    client: reqwest::Client,
    body: String,
    current_url: String,
    active_count: Arc<AtomicUsize>,
}

#[async_trait]
impl PageSession for HttpSession {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult> {
        let start = Instant::now();

        let resp = self
            .client
            .get(url)
            .timeout(Duration::from_millis(timeout_ms))
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();
        if status >= 400 {
            bail!("navigation failed: HTTP {status} from {final_url}");
        }

        self.body = resp.text().await.context("failed to read page body")?;
        self.current_url = final_url.clone();

        Ok(NavigationResult {
            final_url,
            status,
            load_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<()> {
        // A static page either has the element now or never will; the
        // bounded wait collapses to a single check.
        let sel = match Selector::parse(selector) {
            Ok(s) => s,
            Err(e) => bail!("invalid CSS selector `{selector}`: {e}"),
        };
        let present = Html::parse_document(&self.body).select(&sel).next().is_some();
        if present {
            Ok(())
        } else {
            bail!("no element matching `{selector}` appeared within {timeout_ms}ms");
        }
    }

    async fn html(&self) -> Result<String> {
        Ok(self.body.clone())
    }

    async fn url(&self) -> Result<String> {
        Ok(self.current_url.clone())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.active_count.fetch_sub(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_for_selector_checks_fetched_body() {
        let session = HttpSession {
            client: reqwest::Client::new(),
            body: r#"<html><body><a href="/a.zip">a</a></body></html>"#.to_string(),
            current_url: "https://example.com/".to_string(),
            active_count: Arc::new(AtomicUsize::new(1)),
        };

        session
            .wait_for_selector(r#"a[href]"#, 1000)
            .await
            .expect("present selector should succeed");

        let err = session
            .wait_for_selector("table.specs", 1000)
            .await
            .expect_err("absent selector should fail");
        assert!(err.to_string().contains("table.specs"));

        let err = session
            .wait_for_selector("a[", 1000)
            .await
            .expect_err("bad selector should fail");
        assert!(err.to_string().contains("invalid CSS selector"));
    }

    #[tokio::test]
    async fn session_count_tracks_open_and_close() {
        let pager = HttpPager::new(5000);
        let session = pager.new_session().await.expect("session");
        assert_eq!(pager.active_sessions(), 1);
        session.close().await.expect("close");
        assert_eq!(pager.active_sessions(), 0);
    }
}
