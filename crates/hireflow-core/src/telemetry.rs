// crates/hireflow-core/src/telemetry.rs
// ============================================================================
// Module: HireFlow Interview Telemetry
// Description: Bounded aggregation of face-tracking snapshots submitted
//              during a candidate's self-serve interview session.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The candidate-facing interview widget submits a face-tracking snapshot
//! roughly once a second. Rather than persist every snapshot, the
//! interview-link sub-engine keeps a bounded ring buffer and a running
//! mean, matching the bounded in-memory buffer discipline used elsewhere
//! in the pipeline (mailbox status, recent-results list).

use serde::{Deserialize, Serialize};

/// Maximum number of snapshots retained per interview link.
pub const SNAPSHOT_BUFFER_SIZE: usize = 100;

/// A single face-tracking observation submitted by the candidate widget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Attention score in `[0.0, 1.0]` for this sample.
    pub attention: f64,
    /// Whether a face was detected in this sample.
    pub face_present: bool,
}

/// Aggregated telemetry for an interview link: a running mean attention
/// score, a running face-present percentage, and the most recent
/// snapshots, bounded to [`SNAPSHOT_BUFFER_SIZE`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryAggregate {
    /// Mean attention score across every snapshot ever submitted.
    pub avg_attention: f64,
    /// Percentage (`[0.0, 100.0]`) of snapshots with a face present.
    pub face_present_pct: f64,
    /// Total snapshots submitted, including those evicted from
    /// `recent_snapshots`.
    pub total_snapshots: u64,
    /// The most recent snapshots, oldest first, capped at
    /// [`SNAPSHOT_BUFFER_SIZE`].
    pub recent_snapshots: Vec<TelemetrySnapshot>,
}

impl Default for TelemetryAggregate {
    fn default() -> Self {
        Self {
            avg_attention: 0.0,
            face_present_pct: 0.0,
            total_snapshots: 0,
            recent_snapshots: Vec::new(),
        }
    }
}

impl TelemetryAggregate {
    /// Folds a new snapshot into the aggregate, updating the running
    /// means and evicting the oldest snapshot if the buffer is full.
    pub fn record(&mut self, snapshot: TelemetrySnapshot) {
        let n = self.total_snapshots as f64;
        self.avg_attention = (self.avg_attention * n + snapshot.attention) / (n + 1.0);
        let present_count = self.face_present_pct / 100.0 * n;
        let present_count = present_count + f64::from(u8::from(snapshot.face_present));
        self.total_snapshots += 1;
        self.face_present_pct = present_count / (n + 1.0) * 100.0;

        if self.recent_snapshots.len() >= SNAPSHOT_BUFFER_SIZE {
            self.recent_snapshots.remove(0);
        }
        self.recent_snapshots.push(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_mean_tracks_simple_average() {
        let mut agg = TelemetryAggregate::default();
        agg.record(TelemetrySnapshot {
            attention: 1.0,
            face_present: true,
        });
        agg.record(TelemetrySnapshot {
            attention: 0.0,
            face_present: false,
        });
        assert!((agg.avg_attention - 0.5).abs() < 1e-9);
        assert!((agg.face_present_pct - 50.0).abs() < 1e-9);
        assert_eq!(agg.total_snapshots, 2);
    }

    #[test]
    fn buffer_evicts_oldest_beyond_cap() {
        let mut agg = TelemetryAggregate::default();
        for i in 0..(SNAPSHOT_BUFFER_SIZE + 10) {
            agg.record(TelemetrySnapshot {
                attention: f64::from(u32::try_from(i).unwrap_or(0) % 2),
                face_present: i % 2 == 0,
            });
        }
        assert_eq!(agg.recent_snapshots.len(), SNAPSHOT_BUFFER_SIZE);
        assert_eq!(agg.total_snapshots, (SNAPSHOT_BUFFER_SIZE + 10) as u64);
    }
}
