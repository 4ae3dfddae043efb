//! `fwmirror fetch <url>` — retrieve a single archive.

use crate::cli::output::{self, Styled};
use crate::retrieval::Fetcher;
use anyhow::Result;
use std::path::Path;

/// Connection-setup bound, same as the mirror command.
const CONNECT_TIMEOUT_MS: u64 = 30_000;

/// Run the fetch command.
pub async fn run(url: &str, out: &Path) -> Result<()> {
    let fetcher = Fetcher::new(CONNECT_TIMEOUT_MS);
    let done = fetcher.download(url, out).await?;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "url": url,
            "file": done.path.display().to_string(),
            "bytes": done.bytes,
        }));
        return Ok(());
    }
    if !output::is_quiet() {
        let s = Styled::new();
        eprintln!(
            "  {} {} ({} bytes)",
            s.ok_sym(),
            done.path.display(),
            done.bytes
        );
    }
    Ok(())
}
