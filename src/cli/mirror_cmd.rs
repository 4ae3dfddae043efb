//! `fwmirror mirror` — full run: enumerate, extract, retrieve.

use crate::cli::output::{self, Styled};
use crate::harvest::{Harvester, MirrorRunner, RunReport, SiteProfile};
use crate::progress::{self, MirrorEventKind};
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::http::HttpPager;
use crate::renderer::Renderer;
use crate::retrieval::Fetcher;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Connection-setup bound for archive retrieval.
const CONNECT_TIMEOUT_MS: u64 = 30_000;

/// Arguments for the mirror command.
#[derive(Debug, Clone)]
pub struct MirrorOpts {
    pub url: Option<String>,
    pub profile: Option<PathBuf>,
    pub out: PathBuf,
    pub ext: Option<String>,
    pub selector: Option<String>,
    pub timeout: Option<u64>,
    pub headed: bool,
    pub no_browser: bool,
}

/// Run the mirror command.
pub async fn run(opts: MirrorOpts) -> Result<()> {
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

    let (tx, rx) = progress::channel();
    let printer = spawn_status_printer(rx);

    let runner = MirrorRunner::new(
        Harvester::new(session, profile),
        Fetcher::new(CONNECT_TIMEOUT_MS),
        opts.out.clone(),
    )
    .with_events(tx);

    info!("starting the firmware mirror run");
    let report = runner.run().await;
    renderer.shutdown().await?;

    // All senders are gone once the runner is dropped; the printer drains
    // and exits on its own.
    let _ = printer.await;

    print_report(&report, &opts.out);
    Ok(())
}

/// Resolve the site profile: JSON file (or compiled-in default) plus any
/// command-line overrides.
pub(crate) fn resolve_profile(
    profile_path: Option<&std::path::Path>,
    url: Option<String>,
    selector: Option<String>,
    ext: Option<String>,
    timeout: Option<u64>,
) -> Result<SiteProfile> {
    let mut profile = match profile_path {
        Some(path) => SiteProfile::from_json_file(path)?,
        None => SiteProfile::default(),
    };
    if let Some(url) = url {
        profile.listing_url = url;
    }
    if let Some(selector) = selector {
        profile.product_selector = selector;
    }
    if let Some(ext) = ext {
        profile.archive_extension = ext;
    }
    if let Some(timeout) = timeout {
        profile.wait_timeout_ms = timeout;
    }
    profile.validate()?;
    Ok(profile)
}

/// Pick the page engine: headless Chromium, falling back to plain HTTP
/// when the browser is unavailable or explicitly disabled.
pub(crate) async fn open_renderer(
    no_browser: bool,
    headed: bool,
    timeout_ms: u64,
) -> Result<Arc<dyn Renderer>> {
    if no_browser {
        info!("browser disabled, using plain-HTTP page fetching");
        return Ok(Arc::new(HttpPager::new(timeout_ms)));
    }
    match ChromiumRenderer::launch(headed).await {
        Ok(renderer) => {
            info!("Chromium renderer initialized");
            Ok(Arc::new(renderer))
        }
        Err(e) => {
            warn!("failed to initialize Chromium: {e:#}");
            warn!("falling back to plain-HTTP page fetching (script-injected links will be missed)");
            Ok(Arc::new(HttpPager::new(timeout_ms)))
        }
    }
}

/// Render progress events as live status lines while the run is going.
fn spawn_status_printer(
    mut rx: progress::ProgressReceiver,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let show = !output::is_quiet() && !output::is_json();
        let spinner = if show {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::with_template("{spinner} {msg}")
                    .expect("static template"),
            );
            pb.enable_steady_tick(Duration::from_millis(120));
            Some(pb)
        } else {
            None
        };
        let s = Styled::new();

        while let Ok(ev) = rx.recv().await {
            let Some(pb) = &spinner else { continue };
            match ev.event {
                MirrorEventKind::RunStarted { listing_url } => {
                    pb.set_message(format!("scanning {listing_url}"));
                }
                MirrorEventKind::ProductsEnumerated { count, .. } => {
                    pb.println(format!("  {} {count} product page(s) found", s.ok_sym()));
                }
                MirrorEventKind::PageScanned { url, archives } => {
                    pb.set_message(format!("scanned {url}"));
                    pb.println(format!("  {} {archives} archive(s) on {url}", s.ok_sym()));
                }
                MirrorEventKind::PageFailed { url, reason } => {
                    pb.println(format!("  {} {url}: {reason}", s.warn_sym()));
                }
                MirrorEventKind::FileRetrieved { file, bytes, .. } => {
                    pb.println(format!("  {} {file} ({bytes} bytes)", s.ok_sym()));
                }
                MirrorEventKind::RetrievalFailed { url, reason } => {
                    pb.println(format!("  {} {url}: {reason}", s.fail_sym()));
                }
                MirrorEventKind::RunComplete { .. } => {
                    pb.finish_and_clear();
                }
            }
        }
    })
}

/// Print the end-of-run report: JSON under `--json`, otherwise a short
/// human summary.
fn print_report(report: &RunReport, out_dir: &std::path::Path) {
    if output::is_json() {
        if let Ok(value) = serde_json::to_value(report) {
            output::print_json(&value);
        }
        return;
    }
    if output::is_quiet() {
        return;
    }

    let s = Styled::new();
    let sym = if report.is_clean() {
        s.ok_sym()
    } else {
        s.warn_sym()
    };
    eprintln!();
    eprintln!(
        "  {sym} mirror run finished in {:.1}s",
        report.elapsed_ms as f64 / 1000.0
    );
    if report.listing_failed {
        eprintln!("    listing page:     FAILED");
    }
    eprintln!("    products found:   {}", report.products_found);
    eprintln!(
        "    pages scanned:    {} ({} failed)",
        report.pages_scanned, report.pages_failed
    );
    eprintln!("    archives found:   {}", report.archives_found);
    eprintln!(
        "    downloads:        {} attempted, {} succeeded, {} failed",
        report.downloads_attempted, report.downloads_succeeded, report.downloads_failed
    );
    eprintln!("    bytes written:    {}", report.bytes_written);
    eprintln!("    output directory: {}", out_dir.display());
}
