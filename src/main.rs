// Copyright 2026 fwmirror Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use fwmirror::cli;
use fwmirror::cli::mirror_cmd::MirrorOpts;
use fwmirror::cli::scan_cmd::ScanOpts;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "fwmirror",
    about = "fwmirror — bulk mirror of vendor firmware archives",
    version,
    after_help = "Run 'fwmirror <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mirror every firmware archive reachable from the listing page
    Mirror {
        /// Listing page URL (defaults to the built-in profile)
        #[arg(long)]
        url: Option<String>,
        /// Site profile JSON file
        #[arg(long)]
        profile: Option<PathBuf>,
        /// Output directory for downloaded archives
        #[arg(long, default_value = "firmware_downloads")]
        out: PathBuf,
        /// Archive extension to collect (e.g. ".zip")
        #[arg(long)]
        ext: Option<String>,
        /// CSS selector for product links on the listing page
        #[arg(long)]
        selector: Option<String>,
        /// Per-page element wait in milliseconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Show the browser window instead of running headless
        #[arg(long)]
        headed: bool,
        /// Skip the browser and fetch pages over plain HTTP
        #[arg(long)]
        no_browser: bool,
    },
    /// Enumerate and extract archive links without downloading
    Scan {
        /// Listing page URL (defaults to the built-in profile)
        #[arg(long)]
        url: Option<String>,
        /// Site profile JSON file
        #[arg(long)]
        profile: Option<PathBuf>,
        /// Archive extension to collect (e.g. ".zip")
        #[arg(long)]
        ext: Option<String>,
        /// CSS selector for product links on the listing page
        #[arg(long)]
        selector: Option<String>,
        /// Per-page element wait in milliseconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Show the browser window instead of running headless
        #[arg(long)]
        headed: bool,
        /// Skip the browser and fetch pages over plain HTTP
        #[arg(long)]
        no_browser: bool,
    },
    /// Retrieve a single archive URL
    Fetch {
        /// Archive URL
        url: String,
        /// Output directory
        #[arg(long, default_value = "firmware_downloads")]
        out: PathBuf,
    },
    /// Check environment and diagnose issues
    Doctor {
        /// Output directory to probe
        #[arg(long, default_value = "firmware_downloads")]
        out: PathBuf,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var("FWMIRROR_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("FWMIRROR_QUIET", "1");
    }
    if cli.no_color {
        std::env::set_var("FWMIRROR_NO_COLOR", "1");
    }

    // Initialize tracing; stdout is reserved for command output
    let directive = if cli.verbose {
        "fwmirror=debug"
    } else {
        "fwmirror=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(directive.parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Mirror {
            url,
            profile,
            out,
            ext,
            selector,
            timeout,
            headed,
            no_browser,
        } => {
            cli::mirror_cmd::run(MirrorOpts {
                url,
                profile,
                out,
                ext,
                selector,
                timeout,
                headed,
                no_browser,
            })
            .await
        }
        Commands::Scan {
            url,
            profile,
            ext,
            selector,
            timeout,
            headed,
            no_browser,
        } => {
            cli::scan_cmd::run(ScanOpts {
                url,
                profile,
                ext,
                selector,
                timeout,
                headed,
                no_browser,
            })
            .await
        }
        Commands::Fetch { url, out } => cli::fetch_cmd::run(&url, &out).await,
        Commands::Doctor { out } => cli::doctor::run(&out).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "fwmirror", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if !cli::output::is_json() {
            eprintln!("  Error: {e:#}");
        } else {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        }
        std::process::exit(1);
    }

    result
}
