//! Environment readiness check.

use crate::renderer::chromium::find_chromium;
use anyhow::Result;
use std::path::Path;

/// Check Chromium availability and output-directory writability.
pub async fn run(out: &Path) -> Result<()> {
    println!("fwmirror Doctor");
    println!("===============");
    println!();

    // OS and architecture
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    println!("OS:   {os}");
    println!("Arch: {arch}");
    println!();

    // Check Chromium
    let chromium_path = find_chromium();
    match &chromium_path {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => {
            println!("[!!] Chromium NOT found. Set FWMIRROR_CHROMIUM_PATH or install google-chrome/chromium.");
            println!("     Mirror runs will fall back to plain-HTTP page fetching.");
        }
    }

    // Check output directory writability
    match probe_writable(out) {
        Ok(()) => println!("[OK] Output directory {} is writable", out.display()),
        Err(e) => println!("[!!] Output directory {} is not writable: {e}", out.display()),
    }

    println!();
    if chromium_path.is_some() {
        println!("Status: READY");
    } else {
        println!("Status: READY (HTTP-only)");
        println!("  Pages that inject their download links via JavaScript need Chromium.");
    }

    Ok(())
}

/// Create the directory if needed and round-trip a probe file.
fn probe_writable(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let probe = dir.join(".fwmirror-doctor");
    std::fs::write(&probe, b"probe")?;
    std::fs::remove_file(&probe)?;
    Ok(())
}
