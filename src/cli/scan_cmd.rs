//! `fwmirror scan` — enumerate and extract without downloading.

use crate::cli::mirror_cmd::{open_renderer, resolve_profile};
use crate::cli::output::{self, Styled};
use crate::harvest::Harvester;
use crate::renderer::Renderer;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::warn;

/// Arguments for the scan command.
#[derive(Debug, Clone)]
pub struct ScanOpts {
    pub url: Option<String>,
    pub profile: Option<PathBuf>,
    pub ext: Option<String>,
    pub selector: Option<String>,
    pub timeout: Option<u64>,
    pub headed: bool,
    pub no_browser: bool,
}

/// Run the scan command: print every archive URL the mirror run would
/// attempt, in the order it would attempt them.
pub async fn run(opts: ScanOpts) -> Result<()> {
    let profile = resolve_profile(
        opts.profile.as_deref(),
        opts.url,
        opts.selector,
        opts.ext,
        opts.timeout,
    )?;

    let renderer = open_renderer(opts.no_browser, opts.headed, profile.wait_timeout_ms).await?;
    let session = renderer
        .new_session()
        .await
        .context("failed to open a page session")?;

    let mut harvester = Harvester::new(session, profile);
    let mut pages_failed = 0usize;
    let mut archives = Vec::new();

    let products = match harvester.enumerate_products().await {
        Ok(products) => products,
        Err(e) => {
            warn!("product enumeration failed: {e}");
            pages_failed += 1;
            Vec::new()
        }
    };

    for product_url in &products {
        match harvester.archive_links_on(product_url).await {
            Ok(found) => archives.extend(found),
            Err(e) => {
                warn!("firmware link extraction failed on {product_url}: {e}");
                pages_failed += 1;
            }
        }
    }

    harvester.close().await?;
    renderer.shutdown().await?;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "products": products,
            "archives": archives,
            "pages_failed": pages_failed,
        }));
        return Ok(());
    }

    for url in &archives {
        println!("{url}");
    }
    if !output::is_quiet() {
        let s = Styled::new();
        let sym = if pages_failed == 0 {
            s.ok_sym()
        } else {
            s.warn_sym()
        };
        eprintln!(
            "  {sym} {} product page(s), {} archive link(s), {} page failure(s)",
            products.len(),
            archives.len(),
            pages_failed
        );
    }
    Ok(())
}
