// src/checker/batch.rs
// =============================================================================
// The batch driver: probes every listing, a few at a time.
//
// How it works:
// 1. Split the listings into consecutive chunks (the concurrency width)
// 2. Probe every listing of a chunk at the same time
// 3. Wait for the WHOLE chunk before moving on
// 4. Pause between chunks so target hosts don't rate-limit us
// 5. Sort results into valid/broken, keeping the input order in each
//
// A failing probe never stops the batch: it just lands in `broken`.
//
// Rust concepts:
// - join_all: runs several futures concurrently and returns their outputs
//   in the order the futures were given (not completion order)
// - Closures as callbacks: the caller decides how progress is shown
// =============================================================================

use futures::future::join_all;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::probe::{Probe, ProbeResult};
use crate::store::Record;

/// How the driver paces itself
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Listings probed at the same time
    pub concurrency: usize,
    /// Pause between two chunks
    pub chunk_delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            chunk_delay: Duration::from_millis(500),
        }
    }
}

/// A listing plus the verdict on its URL
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRecord {
    pub record: Record,
    pub is_broken: bool,
    pub error: Option<String>,
    pub status: Option<u16>,
}

impl ClassifiedRecord {
    pub fn from_probe(record: Record, result: ProbeResult) -> Self {
        if result.ok {
            Self {
                record,
                is_broken: false,
                error: None,
                status: None,
            }
        } else {
            Self {
                record,
                is_broken: true,
                error: result.error,
                status: result.status,
            }
        }
    }
}

/// Both partitions of one run, each in input order
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub valid: Vec<ClassifiedRecord>,
    pub broken: Vec<ClassifiedRecord>,
}

impl BatchOutcome {
    pub fn total(&self) -> usize {
        self.valid.len() + self.broken.len()
    }
}

/// Reported once for every finished probe
#[derive(Debug)]
pub struct Progress<'a> {
    /// How many probes have finished, this one included
    pub position: usize,
    pub total: usize,
    pub record: &'a Record,
    pub result: &'a ProbeResult,
}

impl fmt::Display for Progress<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.result.ok {
            write!(f, "✅ [{}/{}] {}", self.position, self.total, self.record.display_name())
        } else {
            write!(
                f,
                "❌ [{}/{}] {} - {}",
                self.position,
                self.total,
                self.record.display_name(),
                self.result.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}

/// Probes all `records` chunk by chunk and partitions them
///
/// `on_progress` runs as each probe finishes, so inside a chunk the
/// positions follow completion order.
pub async fn run_batch<P, F>(
    prober: &P,
    records: Vec<Record>,
    config: &BatchConfig,
    on_progress: F,
) -> BatchOutcome
where
    P: Probe + ?Sized,
    F: Fn(Progress<'_>) + Sync,
{
    let total = records.len();
    let width = config.concurrency.max(1);
    let completed = AtomicUsize::new(0);
    let mut outcome = BatchOutcome::default();

    for (index, chunk) in records.chunks(width).enumerate() {
        if index > 0 {
            tokio::time::sleep(config.chunk_delay).await;
        }

        let completed = &completed;
        let on_progress = &on_progress;
        let probes = chunk.iter().map(|record| async move {
            let result = prober.probe(&record.url).await;
            let position = completed.fetch_add(1, Ordering::SeqCst) + 1;
            on_progress(Progress {
                position,
                total,
                record,
                result: &result,
            });
            result
        });

        // The chunk is only done when every probe in it is done
        let results = join_all(probes).await;

        for (record, result) in chunk.iter().zip(results) {
            let classified = ClassifiedRecord::from_probe(record.clone(), result);
            if classified.is_broken {
                outcome.broken.push(classified);
            } else {
                outcome.valid.push(classified);
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordId;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Instant;

    /// Answers from a table, 200 for anything unknown, after a short delay
    struct StubProber {
        responses: HashMap<String, ProbeResult>,
        delay: Duration,
        starts: Mutex<Vec<Instant>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl StubProber {
        fn new(responses: Vec<(&str, ProbeResult)>) -> Self {
            Self {
                responses: responses
                    .into_iter()
                    .map(|(url, result)| (url.to_string(), result))
                    .collect(),
                delay: Duration::from_millis(10),
                starts: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Probe for StubProber {
        async fn probe(&self, url: &str) -> ProbeResult {
            self.starts.lock().unwrap().push(Instant::now());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(self.delay).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.responses
                .get(url)
                .cloned()
                .unwrap_or_else(|| ProbeResult::alive(200))
        }
    }

    fn records(n: i64) -> Vec<Record> {
        (1..=n)
            .map(|i| Record::new(i, format!("Shop {}", i), format!("https://shop{}.example", i)))
            .collect()
    }

    fn fast_config(concurrency: usize, chunk_delay_ms: u64) -> BatchConfig {
        BatchConfig {
            concurrency,
            chunk_delay: Duration::from_millis(chunk_delay_ms),
        }
    }

    fn ids(list: &[ClassifiedRecord]) -> Vec<RecordId> {
        list.iter().map(|c| c.record.id.clone()).collect()
    }

    fn numbers(list: &[i64]) -> Vec<RecordId> {
        list.iter().copied().map(RecordId::Number).collect()
    }

    #[tokio::test]
    async fn test_partitions_are_exhaustive_and_ordered() {
        let prober = StubProber::new(vec![
            ("https://shop2.example", ProbeResult::http_error(404)),
            ("https://shop5.example", ProbeResult::failed("timeout after 8000 ms")),
            ("https://shop6.example", ProbeResult::http_error(500)),
        ]);

        let outcome = run_batch(&prober, records(7), &fast_config(3, 0), |_| {}).await;

        assert_eq!(outcome.total(), 7);
        assert_eq!(ids(&outcome.valid), numbers(&[1, 3, 4, 7]));
        assert_eq!(ids(&outcome.broken), numbers(&[2, 5, 6]));
        assert!(outcome.valid.iter().all(|c| !c.is_broken && c.error.is_none()));

        let broken_404 = &outcome.broken[0];
        assert_eq!(broken_404.error.as_deref(), Some("HTTP 404"));
        assert_eq!(broken_404.status, Some(404));
        assert_eq!(outcome.broken[1].status, None);
    }

    #[tokio::test]
    async fn test_twelve_records_run_in_chunks_of_five_five_two() {
        let prober = StubProber::new(vec![]);
        let start = Instant::now();

        let outcome = run_batch(&prober, records(12), &fast_config(5, 100), |_| {}).await;

        assert_eq!(outcome.valid.len(), 12);
        // Two pauses: after chunk 1 and after chunk 2, none after the last
        assert!(start.elapsed() >= Duration::from_millis(200));
        assert_eq!(prober.peak.load(Ordering::SeqCst), 5);

        // Probe start times cluster by chunk; the pause separates clusters
        let starts = prober.starts.lock().unwrap().clone();
        let mut sizes = vec![1];
        for pair in starts.windows(2) {
            if pair[1].duration_since(pair[0]) >= Duration::from_millis(100) {
                sizes.push(1);
            } else {
                *sizes.last_mut().unwrap() += 1;
            }
        }
        assert_eq!(sizes, vec![5, 5, 2]);
    }

    #[tokio::test]
    async fn test_single_chunk_has_no_pause() {
        let prober = StubProber::new(vec![]);
        let start = Instant::now();

        run_batch(&prober, records(3), &fast_config(5, 1000), |_| {}).await;

        assert!(start.elapsed() < Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_progress_reports_every_record_once() {
        let prober = StubProber::new(vec![("https://shop4.example", ProbeResult::http_error(410))]);
        let lines = Mutex::new(Vec::new());

        run_batch(&prober, records(6), &fast_config(4, 0), |p| {
            lines.lock().unwrap().push((p.position, p.total, p.to_string()));
        })
        .await;

        let lines = lines.into_inner().unwrap();
        assert_eq!(lines.len(), 6);

        let mut positions: Vec<usize> = lines.iter().map(|(pos, _, _)| *pos).collect();
        positions.sort_unstable();
        assert_eq!(positions, vec![1, 2, 3, 4, 5, 6]);
        assert!(lines.iter().all(|(_, total, _)| *total == 6));
        assert!(lines.iter().any(|(_, _, text)| text.ends_with("Shop 4 - HTTP 410")));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let prober = StubProber::new(vec![]);
        let outcome = run_batch(&prober, Vec::new(), &BatchConfig::default(), |_| {
            panic!("no progress expected");
        })
        .await;

        assert_eq!(outcome.total(), 0);
        assert!(prober.starts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_progress_line_format() {
        let record = Record::new(9, "Salon Mika", "https://mika.example");
        let ok = ProbeResult::alive(200);
        let broken = ProbeResult::failed("timeout after 8000 ms");

        let line = Progress { position: 3, total: 12, record: &record, result: &ok };
        assert_eq!(line.to_string(), "✅ [3/12] Salon Mika");

        let line = Progress { position: 4, total: 12, record: &record, result: &broken };
        assert_eq!(line.to_string(), "❌ [4/12] Salon Mika - timeout after 8000 ms");
    }

    #[test]
    fn test_classification_keeps_reason_only_when_broken() {
        let record = Record::new(2, "Spa", "https://404.example");

        let broken = ClassifiedRecord::from_probe(record.clone(), ProbeResult::http_error(404));
        assert!(broken.is_broken);
        assert_eq!(broken.error.as_deref(), Some("HTTP 404"));
        assert_eq!(broken.status, Some(404));
        assert_eq!(broken.record, record);

        let valid = ClassifiedRecord::from_probe(record, ProbeResult::alive(301));
        assert!(!valid.is_broken);
        assert_eq!(valid.error, None);
        assert_eq!(valid.status, None);
    }
}
