//! Network latency sampling.
//!
//! The session samples once per decoded frame; the tracker derives an
//! average from frame arrival gaps. The trait is the seam the latency
//! widget plugs into.

use std::collections::VecDeque;
use std::time::Instant;

/// Collaborator the session delegates latency measurement to.
pub trait LatencyTracker: Send {
    /// Records a frame arrival and returns the current average latency
    /// in milliseconds.
    fn sample(&mut self) -> f64;
}

/// Average inter-frame gap over a fixed window.
#[derive(Debug)]
pub struct RollingLatency {
    gaps_ms: VecDeque<f64>,
    capacity: usize,
    last_arrival: Option<Instant>,
}

impl RollingLatency {
    pub fn new(capacity: usize) -> Self {
        Self {
            gaps_ms: VecDeque::with_capacity(capacity),
            capacity,
            last_arrival: None,
        }
    }
}

impl Default for RollingLatency {
    fn default() -> Self {
        Self::new(16)
    }
}

impl LatencyTracker for RollingLatency {
    fn sample(&mut self) -> f64 {
        let now = Instant::now();

        if let Some(last) = self.last_arrival {
            if self.gaps_ms.len() == self.capacity {
                self.gaps_ms.pop_front();
            }
            self.gaps_ms.push_back(now.duration_since(last).as_secs_f64() * 1000.0);
        }
        self.last_arrival = Some(now);

        if self.gaps_ms.is_empty() {
            return 0.0;
        }
        self.gaps_ms.iter().sum::<f64>() / self.gaps_ms.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn first_sample_reports_zero() {
        let mut tracker = RollingLatency::default();
        assert_eq!(tracker.sample(), 0.0);
    }

    #[test]
    fn average_reflects_frame_gaps() {
        let mut tracker = RollingLatency::new(4);
        tracker.sample();
        std::thread::sleep(Duration::from_millis(10));
        let avg = tracker.sample();
        assert!(avg >= 10.0, "average {avg} below the slept gap");
    }

    #[test]
    fn window_is_bounded() {
        let mut tracker = RollingLatency::new(2);
        for _ in 0..10 {
            tracker.sample();
        }
        assert!(tracker.gaps_ms.len() <= 2);
    }
}
