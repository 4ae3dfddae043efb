//! Renderer abstraction for browser-based page loading.
//!
//! Defines the `Renderer` and `PageSession` traits that abstract over the
//! page engine: headless Chromium via chromiumoxide, or a plain-HTTP
//! fetcher for sites that serve their markup statically.

pub mod chromium;
pub mod http;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// HTTP status code.
    pub status: u16,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// A page engine that can open navigable sessions.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Open a new page session (browser tab or HTTP fetch state).
    async fn new_session(&self) -> Result<Box<dyn PageSession>>;
    /// Shut down the engine.
    async fn shutdown(&self) -> Result<()>;
    /// Number of currently open sessions.
    fn active_sessions(&self) -> usize;
}

/// A single navigable page session.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Navigate to a URL with a timeout.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;
    /// Block until at least one element matching the CSS selector is present,
    /// or the timeout elapses.
    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<()>;
    /// Get the full page HTML.
    async fn html(&self) -> Result<String>;
    /// Get the current URL.
    async fn url(&self) -> Result<String>;
    /// Close this session.
    async fn close(self: Box<Self>) -> Result<()>;
}
