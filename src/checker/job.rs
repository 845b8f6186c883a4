// src/checker/job.rs
// =============================================================================
// One complete check-links run:
//
// 1. Load the active listings that have a URL (failure here is fatal)
// 2. Probe them with the batch driver, printing a line per listing
// 3. Print the summary block
// 4. Write-back: deactivate the broken listings, only when enabled
// 5. Hand the RunSummary back to the caller for JSON/CI output
// =============================================================================

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use super::batch::{run_batch, BatchConfig, ClassifiedRecord};
use super::probe::Probe;
use super::report::RunSummary;
use crate::console::Console;
use crate::store::{ListingSource, RecordId};

/// Everything a run needs besides its collaborators
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub batch: BatchConfig,
    /// Mark broken listings inactive in the data source
    pub auto_deactivate: bool,
}

pub async fn run_check<S, P>(
    source: &S,
    prober: &P,
    options: &CheckOptions,
    console: &Console,
) -> Result<RunSummary>
where
    S: ListingSource + ?Sized,
    P: Probe + ?Sized,
{
    let records = source
        .fetch_candidates()
        .await
        .context("failed to load listings")?;

    console.line(format!("📋 Listings to check: {}", records.len()));
    console.blank();

    let outcome = run_batch(prober, records, &options.batch, |progress| {
        console.line(&progress)
    })
    .await;

    console.blank();
    console.rule();
    console.line("📊 Results");
    console.rule();
    console.line(format!("✅ Valid: {}", outcome.valid.len()));
    console.line(format!("❌ Broken: {}", outcome.broken.len()));
    console.blank();

    write_back(source, &outcome.broken, options.auto_deactivate, console).await?;

    Ok(RunSummary::from_outcome(&outcome, Utc::now()))
}

// Broken listings are only ever reported unless auto-deactivation is on
async fn write_back<S>(
    source: &S,
    broken: &[ClassifiedRecord],
    enabled: bool,
    console: &Console,
) -> Result<()>
where
    S: ListingSource + ?Sized,
{
    if broken.is_empty() {
        return Ok(());
    }

    if !enabled {
        warn!(count = broken.len(), "auto-deactivation disabled, leaving broken listings active");
        console.line("⚠️  Auto-deactivation is off");
        console.line("📝 Broken listings (not updated):");
        print_broken(broken, console);
        return Ok(());
    }

    let ids: Vec<RecordId> = broken.iter().map(|c| c.record.id.clone()).collect();
    source
        .deactivate(&ids, Utc::now())
        .await
        .context("failed to deactivate broken listings")?;

    info!(count = ids.len(), "deactivated broken listings");
    console.line("📝 Deactivated listings:");
    print_broken(broken, console);
    Ok(())
}

fn print_broken(broken: &[ClassifiedRecord], console: &Console) {
    for classified in broken {
        console.line(format!(
            "   - {} ({})",
            classified.record.display_name(),
            classified.error.as_deref().unwrap_or("unknown error")
        ));
        console.line(format!("     URL: {}", classified.record.url));
    }
    console.blank();
}
