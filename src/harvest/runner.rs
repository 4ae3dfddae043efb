//! Full mirror run: enumeration feeds extraction feeds retrieval.
//!
//! The runner never aborts mid-run. Every page-level and archive-level
//! failure is logged, counted, and left behind; the run always ends with a
//! report stating what was attempted, what succeeded, and what failed.

use super::Harvester;
use crate::progress::{self, MirrorEventKind, ProgressSender};
use crate::retrieval::Fetcher;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Aggregate counters for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    /// RFC 3339 start timestamp.
    pub started_at: String,
    /// Product links found on the listing page.
    pub products_found: usize,
    /// Whether the listing page itself failed to harvest.
    pub listing_failed: bool,
    /// Product pages scanned successfully.
    pub pages_scanned: usize,
    /// Product pages that failed to load or never showed matching anchors.
    pub pages_failed: usize,
    /// Archive links found across all product pages.
    pub archives_found: usize,
    /// Retrieval attempts (one per archive link).
    pub downloads_attempted: usize,
    /// Retrievals that wrote a complete file.
    pub downloads_succeeded: usize,
    /// Retrievals that failed.
    pub downloads_failed: usize,
    /// Total bytes written.
    pub bytes_written: u64,
    /// Wall-clock duration of the run.
    pub elapsed_ms: u64,
}

impl RunReport {
    /// A run is clean when nothing along the way failed.
    pub fn is_clean(&self) -> bool {
        !self.listing_failed && self.pages_failed == 0 && self.downloads_failed == 0
    }
}

/// Executes one full mirror run.
pub struct MirrorRunner {
    harvester: Harvester,
    fetcher: Fetcher,
    out_dir: PathBuf,
    events: Option<ProgressSender>,
    run_id: String,
    seq: u64,
}

impl MirrorRunner {
    pub fn new(harvester: Harvester, fetcher: Fetcher, out_dir: PathBuf) -> Self {
        Self {
            harvester,
            fetcher,
            out_dir,
            events: None,
            run_id: Uuid::new_v4().to_string(),
            seq: 0,
        }
    }

    /// Attach a progress event sender.
    pub fn with_events(mut self, tx: ProgressSender) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    fn emit(&mut self, event: MirrorEventKind) {
        progress::emit(&self.events, &self.run_id, &mut self.seq, event);
    }

    /// Run the whole pipeline and close the page session. Infallible by
    /// design: failures end up in the report, not in a Result.
    pub async fn run(mut self) -> RunReport {
        let started = Instant::now();
        let mut report = RunReport {
            started_at: Utc::now().to_rfc3339(),
            ..Default::default()
        };

        let listing_url = self.harvester.profile().listing_url.clone();
        self.emit(MirrorEventKind::RunStarted {
            listing_url: listing_url.clone(),
        });

        let products = match self.harvester.enumerate_products().await {
            Ok(products) => products,
            Err(e) => {
                warn!("product enumeration failed: {e}");
                report.listing_failed = true;
                self.emit(MirrorEventKind::PageFailed {
                    url: listing_url,
                    reason: e.to_string(),
                });
                Vec::new()
            }
        };
        report.products_found = products.len();
        self.emit(MirrorEventKind::ProductsEnumerated {
            count: products.len(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        });

        for product_url in &products {
            info!("starting to scrape firmware from {product_url}");
            let archives = match self.harvester.archive_links_on(product_url).await {
                Ok(archives) => {
                    report.pages_scanned += 1;
                    self.emit(MirrorEventKind::PageScanned {
                        url: product_url.clone(),
                        archives: archives.len(),
                    });
                    archives
                }
                Err(e) => {
                    warn!("firmware link extraction failed on {product_url}: {e}");
                    report.pages_failed += 1;
                    self.emit(MirrorEventKind::PageFailed {
                        url: product_url.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            report.archives_found += archives.len();

            for archive_url in archives {
                info!("downloading firmware from {archive_url}");
                report.downloads_attempted += 1;
                match self.fetcher.download(&archive_url, &self.out_dir).await {
                    Ok(done) => {
                        report.downloads_succeeded += 1;
                        report.bytes_written += done.bytes;
                        info!("downloaded: {}", done.path.display());
                        self.emit(MirrorEventKind::FileRetrieved {
                            url: archive_url,
                            file: done
                                .path
                                .file_name()
                                .map(|n| n.to_string_lossy().into_owned())
                                .unwrap_or_default(),
                            bytes: done.bytes,
                        });
                    }
                    Err(e) => {
                        report.downloads_failed += 1;
                        warn!("error downloading file {archive_url}: {e:#}");
                        self.emit(MirrorEventKind::RetrievalFailed {
                            url: archive_url,
                            reason: format!("{e:#}"),
                        });
                    }
                }
            }
        }

        report.elapsed_ms = started.elapsed().as_millis() as u64;
        self.emit(MirrorEventKind::RunComplete {
            attempted: report.downloads_attempted,
            succeeded: report.downloads_succeeded,
            failed: report.downloads_failed,
            elapsed_ms: report.elapsed_ms,
        });

        if let Err(e) = self.harvester.close().await {
            warn!("failed to close page session: {e:#}");
        }

        info!(
            "completed mirror run: {} attempted, {} succeeded, {} failed",
            report.downloads_attempted, report.downloads_succeeded, report.downloads_failed
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_report_requires_no_failures() {
        let mut report = RunReport::default();
        assert!(report.is_clean());
        report.downloads_failed = 1;
        assert!(!report.is_clean());

        report = RunReport {
            listing_failed: true,
            ..Default::default()
        };
        assert!(!report.is_clean());
    }

    #[test]
    fn report_serializes_for_json_output() {
        let report = RunReport {
            started_at: "2026-08-06T12:00:00Z".to_string(),
            products_found: 2,
            pages_scanned: 2,
            archives_found: 4,
            downloads_attempted: 4,
            downloads_succeeded: 4,
            bytes_written: 1024,
            elapsed_ms: 90,
            ..Default::default()
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"downloads_attempted\":4"));
        assert!(json.contains("\"bytes_written\":1024"));
    }
}
