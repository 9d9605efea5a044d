use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,
    extraction_calls: AtomicUsize,
    extraction_failures: AtomicUsize,
    cache_hits: AtomicUsize,
    reports_with_warnings: AtomicUsize,

    // Timing (in microseconds)
    total_extract_time_us: AtomicU64,
    total_report_time_us: AtomicU64,

    total_annotations: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            successful_requests: AtomicUsize::new(0),
            failed_requests: AtomicUsize::new(0),
            extraction_calls: AtomicUsize::new(0),
            extraction_failures: AtomicUsize::new(0),
            cache_hits: AtomicUsize::new(0),
            reports_with_warnings: AtomicUsize::new(0),
            total_extract_time_us: AtomicU64::new(0),
            total_report_time_us: AtomicU64::new(0),
            total_annotations: AtomicUsize::new(0),
        })
    }

    pub fn record_request(&self, success: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_extract(&self, duration: Duration, annotations: Option<usize>) {
        self.extraction_calls.fetch_add(1, Ordering::Relaxed);
        self.total_extract_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        match annotations {
            Some(count) => {
                self.total_annotations.fetch_add(count, Ordering::Relaxed);
            }
            None => {
                self.extraction_failures.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_report(&self, duration: Duration, warnings: usize) {
        self.total_report_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        if warnings > 0 {
            self.reports_with_warnings.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let successful = self.successful_requests.load(Ordering::Relaxed);
        let extraction_calls = self.extraction_calls.load(Ordering::Relaxed);
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: successful,
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            extraction_calls,
            extraction_failures: self.extraction_failures.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            reports_with_warnings: self.reports_with_warnings.load(Ordering::Relaxed),
            total_annotations: self.total_annotations.load(Ordering::Relaxed),
            avg_extract_time_ms: avg_time_ms(&self.total_extract_time_us, extraction_calls),
            avg_report_time_ms: avg_time_ms(&self.total_report_time_us, successful),
        }
    }
}

fn avg_time_ms(total_us: &AtomicU64, count: usize) -> f64 {
    let total = total_us.load(Ordering::Relaxed) as f64;
    if count > 0 {
        total / count as f64 / 1000.0 // Convert to ms
    } else {
        0.0
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub extraction_calls: usize,
    pub extraction_failures: usize,
    pub cache_hits: usize,
    pub reports_with_warnings: usize,
    pub total_annotations: usize,
    pub avg_extract_time_ms: f64,
    pub avg_report_time_ms: f64,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
