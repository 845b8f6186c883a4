// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments (and env vars) using clap
// 2. Set up diagnostic logging
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = run completed, 1 = fatal error)
//
// Broken links are a reported outcome, not a failure: a check-links run that
// finds some still exits with 0. CI jobs read the counts from the summary.
// =============================================================================

// Module declarations - tells Rust about our other source files
mod checker; // src/checker/ - probing and batching
mod cli; // src/cli.rs - command-line parsing
mod console; // src/console.rs - human-readable output
mod logging; // src/logging.rs - tracing setup
mod sitemap; // src/sitemap/ - sitemap.xml and robots.txt
mod store; // src/store/ - Supabase access

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser; // Parser trait enables the parse() method
use cli::{CheckLinksArgs, Cli, Commands, SitemapArgs};
use console::Console;
use store::SupabaseClient;
use url::Url;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::setup_logging(cli.log_level.as_deref());

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::CheckLinks(args) => handle_check_links(args).await,
        Commands::Sitemap(args) => handle_sitemap(args).await,
    }
}

// Handles the 'check-links' subcommand
async fn handle_check_links(args: CheckLinksArgs) -> Result<()> {
    let console = Console::new(args.json);
    let probe_config = args.probe_config();
    let options = args.check_options();

    console.line("🔍 Starting link check...");
    console.line(format!(
        "⚙️  Timeout: {}ms, concurrency: {}, retries: {}, auto-deactivate: {}",
        probe_config.timeout.as_millis(),
        options.batch.concurrency,
        probe_config.retry_count,
        if options.auto_deactivate { "on" } else { "off" }
    ));
    console.blank();

    let source = SupabaseClient::new(&args.supabase_url, &args.supabase_key, &args.table)?;
    let prober = checker::HttpProber::new(probe_config).context("failed to build HTTP client")?;

    let summary = checker::run_check(&source, &prober, &options, &console).await?;

    if !args.json {
        console.line("📄 Run summary (JSON):");
    }
    println!("{}", summary.to_json()?);

    if let Some(path) = &args.github_output {
        summary
            .append_ci_outputs(path)
            .with_context(|| format!("failed to write CI outputs to {}", path.display()))?;
    }

    console.blank();
    console.line("✨ Link check finished!");
    Ok(())
}

// Handles the 'sitemap' subcommand
async fn handle_sitemap(args: SitemapArgs) -> Result<()> {
    let console = Console::new(false);
    let base_url = Url::parse(&args.base_url)
        .with_context(|| format!("invalid base URL '{}'", args.base_url))?;

    console.line("🗺️  Generating sitemap...");
    console.line(format!("📍 Base URL: {}", base_url));
    console.line(format!("📁 Output: {}", args.out_dir.display()));
    console.blank();

    let source = SupabaseClient::new(&args.supabase_url, &args.supabase_key, &args.table)?;
    let entries = source
        .fetch_sitemap_entries()
        .await
        .context("failed to load listings")?;
    console.line(format!("✅ Loaded {} listing(s)", entries.len()));

    let files = sitemap::SiteFiles::render(&base_url, &entries, Utc::now().date_naive());
    let written = files
        .write_to(&args.out_dir)
        .with_context(|| format!("failed to write files to {}", args.out_dir.display()))?;

    if written.created_dir {
        console.line(format!("📁 Created directory {}", args.out_dir.display()));
    }
    console.line(format!("✅ Wrote {}", written.sitemap_path.display()));
    console.line(format!("✅ Wrote {}", written.robots_path.display()));

    console.blank();
    console.rule();
    console.line("📊 Result");
    console.rule();
    console.line(format!("📄 URLs: {}", files.url_count));
    console.line("   - Home page: 1");
    console.line(format!("   - Listing pages: {}", entries.len()));
    console.blank();
    console.line("✨ Done!");
    Ok(())
}
