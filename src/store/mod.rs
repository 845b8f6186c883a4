// src/store/mod.rs
// =============================================================================
// This module is the boundary to the hosted database holding the listings.
//
// Submodules:
// - record: Row types (Record, RecordId, SitemapEntry)
// - supabase: REST client for a Supabase table
// - error: StoreError
//
// The link checker only depends on the ListingSource trait, so tests can
// hand it an in-memory source instead of a live project.
// =============================================================================

mod error;
mod record;
mod supabase;

pub use error::StoreError;
pub use record::{Record, RecordId, SitemapEntry};
pub use supabase::SupabaseClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Where the link checker reads listings from and writes deactivations to
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// All active listings that have a website URL, in table order
    async fn fetch_candidates(&self) -> Result<Vec<Record>, StoreError>;

    /// Marks the given listings inactive in one batched update
    async fn deactivate(&self, ids: &[RecordId], at: DateTime<Utc>) -> Result<(), StoreError>;
}
