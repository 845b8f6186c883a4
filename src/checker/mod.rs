// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - probe: Decides whether one URL is alive (HEAD, GET fallback, timeouts)
// - retry: Fixed-delay retry helper used by the probe
// - batch: Probes listings chunk by chunk and partitions the results
// - report: The run summary (JSON + CI outputs)
// - job: A whole check-links run, from loading listings to write-back
//
// This file (mod.rs) is the module root - it ties everything together and
// exports the public API that other parts of our application can use.
// =============================================================================

mod batch;
mod job;
mod probe;
mod report;
mod retry;

// Re-export public items from submodules
// This lets users write `checker::run_check()` instead of
// `checker::job::run_check()`
pub use batch::BatchConfig;
pub use job::{run_check, CheckOptions};
pub use probe::{HttpProber, ProbeConfig, DEFAULT_USER_AGENT};
