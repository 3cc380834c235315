//! Liveness tracking of the processing loop

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Default time without a processed frame before the loop counts as stalled
pub const DEFAULT_DEAD_DURATION: Duration = Duration::from_secs(1);

/// Health of the processing loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VitalStatus {
    /// A frame was processed within the dead duration
    Alive,
    /// No frame within the dead duration; `since_last` is `None` if none was ever seen
    Stalled { since_last: Option<Duration> },
}

/// Records when the last frame was processed
#[derive(Debug)]
pub struct VitalChecker {
    last_poke: Mutex<Option<Instant>>,
    dead_duration: Duration,
}

impl VitalChecker {
    pub fn new(dead_duration: Duration) -> Self {
        Self {
            last_poke: Mutex::new(None),
            dead_duration,
        }
    }

    /// Mark the loop as alive now
    pub fn poke(&self) {
        *self.last_poke.lock() = Some(Instant::now());
    }

    pub fn status(&self) -> VitalStatus {
        match *self.last_poke.lock() {
            Some(last) => {
                let elapsed = last.elapsed();
                if elapsed <= self.dead_duration {
                    VitalStatus::Alive
                } else {
                    VitalStatus::Stalled { since_last: Some(elapsed) }
                }
            }
            None => VitalStatus::Stalled { since_last: None },
        }
    }

    pub fn is_alive(&self) -> bool {
        self.status() == VitalStatus::Alive
    }
}

impl Default for VitalChecker {
    fn default() -> Self {
        Self::new(DEFAULT_DEAD_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_stalled_before_first_poke() {
        let checker = VitalChecker::default();
        assert!(!checker.is_alive());
        assert_eq!(checker.status(), VitalStatus::Stalled { since_last: None });
    }

    #[test]
    fn test_alive_after_poke() {
        let checker = VitalChecker::new(Duration::from_secs(60));
        checker.poke();
        assert!(checker.is_alive());
    }

    #[test]
    fn test_stalls_after_dead_duration() {
        let checker = VitalChecker::new(Duration::from_millis(5));
        checker.poke();
        thread::sleep(Duration::from_millis(20));
        match checker.status() {
            VitalStatus::Stalled { since_last: Some(elapsed) } => {
                assert!(elapsed >= Duration::from_millis(20));
            }
            other => panic!("Expected stalled status, got {:?}", other),
        }
    }
}
