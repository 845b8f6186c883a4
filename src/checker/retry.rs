// src/checker/retry.rs
// =============================================================================
// A small "try again later" helper for async operations.
//
// retry() runs an operation; if it fails with an error the caller considers
// transient, it sleeps a fixed delay and runs it again, up to `retries` extra
// attempts. The last error is returned once the budget is spent.
//
// Rust concepts:
// - Generic closures: FnMut() -> Future lets the caller build a fresh
//   request future for every attempt
// - Trait bounds on generics: the compiler checks the shape of the closure
// =============================================================================

use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Runs `op` until it succeeds, fails permanently, or the retry budget is spent
///
/// Makes at most `retries + 1` attempts. `is_transient` decides whether an
/// error is worth another attempt.
pub async fn retry<T, E, F, Fut>(
    retries: u32,
    delay: Duration,
    is_transient: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < retries && is_transient(&e) => {
                attempt += 1;
                debug!(attempt, retries, "transient failure, retrying");
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
