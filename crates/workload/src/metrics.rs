//! Run metrics and the final report.

use crate::classify::RejectionKind;
use hdrhistogram::Histogram;
use smallbank_types::TransactionType;
use std::collections::BTreeMap;
use std::time::Duration;

/// Collects per-submission outcomes and latencies during a run.
pub struct MetricsCollector {
    /// Submission latency in microseconds.
    latencies: Histogram<u64>,

    /// Accepted submissions per transaction type.
    accepted: BTreeMap<TransactionType, u64>,

    /// Recognised rejections per kind.
    rejections: BTreeMap<RejectionKind, u64>,

    /// Write submissions (accepted or rejected).
    writes: u64,

    /// Read submissions (accepted or rejected).
    reads: u64,
}

impl MetricsCollector {
    /// Create an empty collector.
    pub fn new() -> Result<Self, hdrhistogram::CreationError> {
        Ok(Self {
            latencies: Histogram::new(3)?,
            accepted: BTreeMap::new(),
            rejections: BTreeMap::new(),
            writes: 0,
            reads: 0,
        })
    }

    /// Record an accepted submission.
    pub fn record_accepted(&mut self, tx_type: TransactionType, latency: Duration) {
        *self.accepted.entry(tx_type).or_default() += 1;
        self.record_common(tx_type, latency);
    }

    /// Record a recognised rejection.
    pub fn record_rejection(&mut self, tx_type: TransactionType, kind: RejectionKind, latency: Duration) {
        *self.rejections.entry(kind).or_default() += 1;
        self.record_common(tx_type, latency);
    }

    fn record_common(&mut self, tx_type: TransactionType, latency: Duration) {
        if tx_type.is_write() {
            self.writes += 1;
        } else {
            self.reads += 1;
        }
        self.latencies
            .saturating_record(latency.as_micros().min(u64::MAX as u128) as u64);
    }

    /// Total submissions recorded.
    pub fn submitted(&self) -> u64 {
        self.writes + self.reads
    }

    /// Produce the final report.
    pub fn finish(self, duration: Duration, creation_rejected: bool) -> RunReport {
        let submitted = self.submitted();
        let p50_latency = Duration::from_micros(self.latencies.value_at_quantile(0.50));
        let p99_latency = Duration::from_micros(self.latencies.value_at_quantile(0.99));
        let max_latency = Duration::from_micros(self.latencies.max());

        RunReport {
            submitted,
            accepted: self.accepted.values().sum(),
            accepted_by_type: self.accepted,
            rejections: self.rejections,
            writes: self.writes,
            reads: self.reads,
            creation_rejected,
            duration,
            p50_latency,
            p99_latency,
            max_latency,
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Transactions submitted.
    pub submitted: u64,
    /// Transactions accepted.
    pub accepted: u64,
    /// Accepted transactions per type.
    pub accepted_by_type: BTreeMap<TransactionType, u64>,
    /// Recognised rejections per kind.
    pub rejections: BTreeMap<RejectionKind, u64>,
    /// Write transactions submitted.
    pub writes: u64,
    /// Read transactions submitted.
    pub reads: u64,
    /// Whether account creation was rejected as a duplicate.
    pub creation_rejected: bool,
    /// Wall-clock time of the transaction body.
    pub duration: Duration,
    /// Median submission latency.
    pub p50_latency: Duration,
    /// 99th percentile submission latency.
    pub p99_latency: Duration,
    /// Worst submission latency.
    pub max_latency: Duration,
}

impl RunReport {
    /// Total recognised rejections.
    pub fn rejected(&self) -> u64 {
        self.rejections.values().sum()
    }

    /// Submissions per second over the transaction body.
    pub fn throughput(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.submitted as f64 / secs
        } else {
            0.0
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print(&self) {
        println!("=== SmallBank run report ===");
        println!("Duration:       {:?}", self.duration);
        println!("Submitted:      {}", self.submitted);
        println!("  writes:       {}", self.writes);
        println!("  reads:        {}", self.reads);
        println!("Accepted:       {}", self.accepted);
        for (tx_type, count) in &self.accepted_by_type {
            println!("  {:<18}{}", format!("{}:", tx_type), count);
        }
        println!("Rejected:       {}", self.rejected());
        for (kind, count) in &self.rejections {
            println!("  {:<18}{}", format!("{}:", kind), count);
        }
        if self.creation_rejected {
            println!("Account creation rejected: accounts already existed");
        }
        println!("Throughput:     {:.2} tx/s", self.throughput());
        println!("Latency p50:    {:?}", self.p50_latency);
        println!("Latency p99:    {:?}", self.p99_latency);
        println!("Latency max:    {:?}", self.max_latency);
    }
}
