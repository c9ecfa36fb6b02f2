//! Run Metrics Collection
//!
//! Aggregates model usage and unit progress for one documentation run.
//!
//! ## Usage
//!
//! ```ignore
//! let metrics = create_shared_metrics("run-20250101-120000");
//! metrics.record_response(&response);
//! metrics.record_unit(UnitKind::File);
//! println!("{}", metrics.summary().display());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Instant;

use crate::ai::provider::LlmResponse;
use crate::types::UnitKind;

// =============================================================================
// Metrics Collector
// =============================================================================

/// Thread-safe metrics collector for a run.
pub struct MetricsCollector {
    /// Run identifier
    session_id: String,
    /// Run start time
    start_time: Instant,
    /// Total LLM API calls
    api_calls: AtomicU32,
    /// Total input tokens
    input_tokens: AtomicU64,
    /// Total output tokens
    output_tokens: AtomicU64,
    /// Total latency in milliseconds
    total_latency_ms: AtomicU64,
    /// Folders documented during this run
    folders: AtomicU32,
    /// Files documented during this run
    files: AtomicU32,
    /// Files that took the map-reduce path
    large_files: AtomicU32,
    /// Units found already documented and skipped
    resumed: AtomicU32,
}

/// Summary statistics for a run
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub session_id: String,
    pub total_duration_ms: u64,
    pub api_calls: u32,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub avg_latency_ms: f64,
    pub folders: u32,
    pub files: u32,
    pub large_files: u32,
    pub resumed: u32,
}

impl MetricsCollector {
    /// Create new metrics collector for a run
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            start_time: Instant::now(),
            api_calls: AtomicU32::new(0),
            input_tokens: AtomicU64::new(0),
            output_tokens: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            folders: AtomicU32::new(0),
            files: AtomicU32::new(0),
            large_files: AtomicU32::new(0),
            resumed: AtomicU32::new(0),
        }
    }

    /// Record metrics from an LLM response
    pub fn record_response(&self, response: &LlmResponse) {
        self.api_calls.fetch_add(1, Ordering::Relaxed);
        self.input_tokens
            .fetch_add(response.usage.input_tokens as u64, Ordering::Relaxed);
        self.output_tokens
            .fetch_add(response.usage.output_tokens as u64, Ordering::Relaxed);
        self.total_latency_ms
            .fetch_add(response.timing.total_ms, Ordering::Relaxed);
    }

    /// Record a newly documented unit
    pub fn record_unit(&self, kind: UnitKind) {
        match kind {
            UnitKind::Folder => self.folders.fetch_add(1, Ordering::Relaxed),
            UnitKind::File => self.files.fetch_add(1, Ordering::Relaxed),
        };
    }

    /// Record a file documented through the large-file path
    pub fn record_large_file(&self) {
        self.large_files.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a unit skipped because it was already documented
    pub fn record_resumed(&self) {
        self.resumed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSummary {
        let api_calls = self.api_calls.load(Ordering::Relaxed);
        let input_tokens = self.input_tokens.load(Ordering::Relaxed);
        let output_tokens = self.output_tokens.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);

        let avg_latency = if api_calls > 0 {
            total_latency as f64 / api_calls as f64
        } else {
            0.0
        };

        MetricsSummary {
            session_id: self.session_id.clone(),
            total_duration_ms: self.start_time.elapsed().as_millis() as u64,
            api_calls,
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
            avg_latency_ms: avg_latency,
            folders: self.folders.load(Ordering::Relaxed),
            files: self.files.load(Ordering::Relaxed),
            large_files: self.large_files.load(Ordering::Relaxed),
            resumed: self.resumed.load(Ordering::Relaxed),
        }
    }

    /// Get final summary
    pub fn summary(&self) -> MetricsSummary {
        self.snapshot()
    }
}

impl MetricsSummary {
    /// Format summary for display
    pub fn display(&self) -> String {
        format!(
            "Run: {}\n\
             Duration: {:.1}s\n\
             Units: {} folders, {} files ({} large), {} already documented\n\
             API Calls: {}\n\
             Tokens: {} (input: {}, output: {})\n\
             Avg Latency: {:.0}ms",
            self.session_id,
            self.total_duration_ms as f64 / 1000.0,
            self.folders,
            self.files,
            self.large_files,
            self.resumed,
            self.api_calls,
            self.total_tokens,
            self.input_tokens,
            self.output_tokens,
            self.avg_latency_ms,
        )
    }
}

// =============================================================================
// Shared Type
// =============================================================================

/// Shared metrics collector for pipeline stages
pub type SharedMetrics = Arc<MetricsCollector>;

/// Create shared metrics collector
pub fn create_shared_metrics(session_id: impl Into<String>) -> SharedMetrics {
    Arc::new(MetricsCollector::new(session_id))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{ResponseMetadata, ResponseTiming, TokenUsage};

    #[test]
    fn test_record_response() {
        let metrics = MetricsCollector::new("test-session");

        let response = LlmResponse::with_metrics(
            "docs".to_string(),
            TokenUsage {
                input_tokens: 100,
                output_tokens: 50,
            },
            ResponseTiming { total_ms: 500 },
            ResponseMetadata {
                model: "qwen:7b".to_string(),
                provider: "ollama".to_string(),
            },
        );

        metrics.record_response(&response);
        metrics.record_response(&LlmResponse::content_only("more"));

        let summary = metrics.summary();
        assert_eq!(summary.api_calls, 2);
        assert_eq!(summary.input_tokens, 100);
        assert_eq!(summary.output_tokens, 50);
        assert_eq!(summary.total_tokens, 150);
        assert!((summary.avg_latency_ms - 250.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unit_counters() {
        let metrics = create_shared_metrics("units");
        metrics.record_unit(UnitKind::Folder);
        metrics.record_unit(UnitKind::File);
        metrics.record_unit(UnitKind::File);
        metrics.record_large_file();
        metrics.record_resumed();

        let summary = metrics.snapshot();
        assert_eq!(summary.folders, 1);
        assert_eq!(summary.files, 2);
        assert_eq!(summary.large_files, 1);
        assert_eq!(summary.resumed, 1);
    }

    #[test]
    fn test_concurrent_recording() {
        use std::thread;

        let metrics = Arc::new(MetricsCollector::new("concurrent-test"));

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let m = Arc::clone(&metrics);
                thread::spawn(move || {
                    for _ in 0..100 {
                        m.record_unit(UnitKind::File);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.summary().files, 1000);
    }

    #[test]
    fn test_summary_display() {
        let metrics = MetricsCollector::new("display-test");
        metrics.record_response(&LlmResponse::with_metrics(
            String::new(),
            TokenUsage {
                input_tokens: 1000,
                output_tokens: 500,
            },
            ResponseTiming { total_ms: 1000 },
            ResponseMetadata::default(),
        ));

        let display = metrics.summary().display();
        assert!(display.contains("display-test"));
        assert!(display.contains("1500"));
    }
}
