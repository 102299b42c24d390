use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use super::types::{DetectionResult, DetectionStats};

/// The latest published result set
///
/// Immutable once published; readers hold an `Arc` to a consistent set.
#[derive(Debug, Clone, Default)]
pub struct DetectionSnapshot {
    pub results: Arc<Vec<DetectionResult>>,
    pub round_trip: Option<Duration>,
    /// Increments on every publish
    pub generation: u64,
}

impl DetectionSnapshot {
    pub fn stats(&self) -> DetectionStats {
        DetectionStats::from_results(&self.results, self.round_trip)
    }
}

/// Single-slot latest-value mailbox for detection results
///
/// Each publish swaps the whole set; the last arrival wins regardless of
/// when its request was sent.
#[derive(Debug, Clone)]
pub struct DetectionMailbox {
    tx: Arc<watch::Sender<DetectionSnapshot>>,
}

impl DetectionMailbox {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(DetectionSnapshot::default());
        Self { tx: Arc::new(tx) }
    }

    /// Replace the current result set
    pub fn publish(&self, results: Vec<DetectionResult>, round_trip: Duration) {
        let results = Arc::new(results);
        self.tx.send_modify(|snapshot| {
            *snapshot = DetectionSnapshot {
                results,
                round_trip: Some(round_trip),
                generation: snapshot.generation + 1,
            };
        });
    }

    pub fn latest(&self) -> DetectionSnapshot {
        self.tx.borrow().clone()
    }

    /// Watch for new result sets
    pub fn subscribe(&self) -> watch::Receiver<DetectionSnapshot> {
        self.tx.subscribe()
    }
}

impl Default for DetectionMailbox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str) -> DetectionResult {
        DetectionResult {
            id: id.to_string(),
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            confidence: 0.8,
            label: None,
        }
    }

    #[test]
    fn test_publish_replaces_wholesale() {
        let mailbox = DetectionMailbox::new();
        assert!(mailbox.latest().results.is_empty());

        mailbox.publish(vec![result("a"), result("b")], Duration::from_millis(40));
        mailbox.publish(vec![result("c")], Duration::from_millis(25));

        let latest = mailbox.latest();
        assert_eq!(latest.results.len(), 1);
        assert_eq!(latest.results[0].id, "c");
        assert_eq!(latest.generation, 2);
        assert_eq!(latest.stats().last_round_trip, Some(Duration::from_millis(25)));
    }

    #[tokio::test]
    async fn test_subscribers_see_new_sets() {
        let mailbox = DetectionMailbox::new();
        let mut rx = mailbox.subscribe();

        mailbox.publish(vec![result("a")], Duration::from_millis(5));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().results[0].id, "a");
    }
}
