// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every tunable has a flag AND an environment variable, so the same binary
// works from a terminal and from a scheduled CI job that only sets env vars.
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Enums: Types that can be one of several variants
// - Derive macros: Automatically generate code for our types
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::checker::{BatchConfig, CheckOptions, ProbeConfig, DEFAULT_USER_AGENT};

#[derive(Parser, Debug)]
#[command(
    name = "listing-guardian",
    version,
    about = "Maintenance jobs for a business directory: broken-link checks and sitemap generation",
    long_about = "listing-guardian probes the website URL of every active listing and reports the broken ones, \
                  and renders sitemap.xml/robots.txt from the same listings table. \
                  It's meant to run on a schedule in CI."
)]
pub struct Cli {
    /// Log filter for diagnostics on stderr (e.g. "debug"); defaults to RUST_LOG, then "warn"
    #[arg(long, global = true, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check every active listing's website URL and report the broken ones
    ///
    /// Example: listing-guardian check-links --json
    CheckLinks(CheckLinksArgs),

    /// Generate sitemap.xml and robots.txt from the active listings
    ///
    /// Example: listing-guardian sitemap --base-url https://example.jp --out-dir public
    Sitemap(SitemapArgs),
}

#[derive(Args, Debug)]
pub struct CheckLinksArgs {
    /// Supabase project URL
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: String,

    /// Supabase service-role key (needed for write-back)
    #[arg(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true)]
    pub supabase_key: String,

    /// Table holding the listings
    #[arg(long, env = "LISTINGS_TABLE", default_value = "shops")]
    pub table: String,

    /// Timeout for a single request, in milliseconds
    #[arg(long, env = "CHECK_LINKS_TIMEOUT_MS", default_value_t = 8000)]
    pub timeout_ms: u64,

    /// Listings probed at the same time
    #[arg(
        long,
        env = "CHECK_LINKS_CONCURRENCY",
        default_value_t = 5,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub concurrency: u32,

    /// Extra attempts after a timeout or connection error
    #[arg(long, env = "CHECK_LINKS_RETRY_COUNT", default_value_t = 2)]
    pub retry_count: u32,

    /// Pause between attempts, in milliseconds
    #[arg(long, env = "CHECK_LINKS_RETRY_DELAY_MS", default_value_t = 1000)]
    pub retry_delay_ms: u64,

    /// Pause between two chunks of probes, in milliseconds
    #[arg(long, env = "CHECK_LINKS_CHUNK_DELAY_MS", default_value_t = 500)]
    pub chunk_delay_ms: u64,

    /// Redirect hops followed before a URL counts as broken
    #[arg(long, env = "CHECK_LINKS_MAX_REDIRECTS", default_value_t = 10)]
    pub max_redirects: usize,

    /// User-Agent header sent with every probe
    #[arg(long, env = "CHECK_LINKS_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Mark broken listings inactive (off by default: broken links are only reported)
    #[arg(long, env = "CHECK_LINKS_AUTO_DEACTIVATE")]
    pub auto_deactivate: bool,

    /// Print only the JSON summary on stdout (progress goes to stderr)
    #[arg(long)]
    pub json: bool,

    /// File to append broken_count/valid_count lines to (GitHub Actions)
    #[arg(long, env = "GITHUB_OUTPUT")]
    pub github_output: Option<PathBuf>,
}

impl CheckLinksArgs {
    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            timeout: Duration::from_millis(self.timeout_ms),
            retry_count: self.retry_count,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            max_redirects: self.max_redirects,
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn check_options(&self) -> CheckOptions {
        CheckOptions {
            batch: BatchConfig {
                concurrency: self.concurrency as usize,
                chunk_delay: Duration::from_millis(self.chunk_delay_ms),
            },
            auto_deactivate: self.auto_deactivate,
        }
    }
}

#[derive(Args, Debug)]
pub struct SitemapArgs {
    /// Supabase project URL
    #[arg(long, env = "VITE_SUPABASE_URL")]
    pub supabase_url: String,

    /// Supabase anon key (read access is enough)
    #[arg(long, env = "VITE_SUPABASE_ANON_KEY", hide_env_values = true)]
    pub supabase_key: String,

    /// Table holding the listings
    #[arg(long, env = "LISTINGS_TABLE", default_value = "shops")]
    pub table: String,

    /// Public URL of the site, e.g. https://example.jp
    #[arg(long, env = "SITE_BASE_URL")]
    pub base_url: String,

    /// Directory receiving sitemap.xml and robots.txt
    #[arg(long, default_value = "public")]
    pub out_dir: PathBuf,
}
