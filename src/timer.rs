use std::time::{Duration, Instant};

/// A one-shot timer driven by the main run loop.
///
/// The embedder polls once per run-loop turn; a zero-delay timer therefore
/// fires on the next turn, never within the turn that armed it. There is no
/// repeating mode and no cancellation beyond [`OneShotTimer::stop`].
#[derive(Debug, Default)]
pub struct OneShotTimer {
    fire_at: Option<Instant>,
}

impl OneShotTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the timer to fire once `delay` from now. Re-arming an active
    /// timer replaces its deadline.
    pub fn start_one_shot(&mut self, delay: Duration) {
        self.fire_at = Some(Instant::now() + delay);
    }

    pub fn is_active(&self) -> bool {
        self.fire_at.is_some()
    }

    pub fn stop(&mut self) {
        self.fire_at = None;
    }

    /// Returns true at most once per arming, when the deadline has passed.
    pub fn poll(&mut self) -> bool {
        match self.fire_at {
            Some(deadline) if Instant::now() >= deadline => {
                self.fire_at = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_delay_fires_on_next_poll() {
        let mut timer = OneShotTimer::new();
        assert!(!timer.poll());

        timer.start_one_shot(Duration::ZERO);
        assert!(timer.is_active());
        assert!(timer.poll());
        assert!(!timer.is_active());

        // One-shot: does not fire again.
        assert!(!timer.poll());
    }

    #[test]
    fn test_stop_disarms() {
        let mut timer = OneShotTimer::new();
        timer.start_one_shot(Duration::ZERO);
        timer.stop();
        assert!(!timer.is_active());
        assert!(!timer.poll());
    }

    #[test]
    fn test_future_deadline_does_not_fire_early() {
        let mut timer = OneShotTimer::new();
        timer.start_one_shot(Duration::from_secs(3600));
        assert!(timer.is_active());
        assert!(!timer.poll());
        assert!(timer.is_active());
    }
}
