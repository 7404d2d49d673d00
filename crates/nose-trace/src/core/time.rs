/// Frame throttle for the logic tick.
/// The display may refresh at 60-144 Hz; game logic only needs ~30 Hz.
pub struct FrameThrottle {
    /// Minimum spacing between accepted ticks, in ms.
    min_interval_ms: f64,
    /// Timestamp of the last accepted tick.
    last: Option<f64>,
}

impl FrameThrottle {
    pub fn new(min_interval_ms: f64) -> Self {
        Self {
            min_interval_ms,
            last: None,
        }
    }

    /// Returns true (and records `now_ms`) if enough time passed since the last accepted tick.
    pub fn ready(&mut self, now_ms: f64) -> bool {
        match self.last {
            Some(last) if now_ms - last < self.min_interval_ms => false,
            _ => {
                self.last = Some(now_ms);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn min_interval_ms(&self) -> f64 {
        self.min_interval_ms
    }
}

/// Wall-clock round countdown.
#[derive(Debug, Clone)]
pub struct Countdown {
    duration_ms: f64,
    started_at: Option<f64>,
}

impl Countdown {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            duration_ms,
            started_at: None,
        }
    }

    pub fn start(&mut self, now_ms: f64) {
        self.started_at = Some(now_ms);
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Absolute time at which the countdown hits zero.
    pub fn deadline(&self) -> Option<f64> {
        self.started_at.map(|start| start + self.duration_ms)
    }

    pub fn is_expired(&self, now_ms: f64) -> bool {
        self.deadline().is_some_and(|deadline| now_ms >= deadline)
    }

    /// Milliseconds left; the full duration before the countdown starts.
    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        match self.deadline() {
            Some(deadline) => (deadline - now_ms).max(0.0),
            None => self.duration_ms,
        }
    }

    /// Whole seconds left, rounded up the way a countdown display reads.
    pub fn remaining_secs(&self, now_ms: f64) -> u32 {
        (self.remaining_ms(now_ms) / 1000.0).ceil() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_always_runs() {
        let mut throttle = FrameThrottle::new(33.0);
        assert!(throttle.ready(1000.0));
    }

    #[test]
    fn skips_ticks_inside_interval() {
        let mut throttle = FrameThrottle::new(33.0);
        assert!(throttle.ready(0.0));
        assert!(!throttle.ready(16.0));
        assert!(!throttle.ready(32.9));
        assert!(throttle.ready(33.0));
        assert!(!throttle.ready(50.0));
        assert!(throttle.ready(70.0));
    }

    #[test]
    fn zero_interval_never_throttles() {
        let mut throttle = FrameThrottle::new(0.0);
        assert!(throttle.ready(5.0));
        assert!(throttle.ready(5.0));
    }

    #[test]
    fn countdown_expires_at_deadline() {
        let mut countdown = Countdown::new(30_000.0);
        assert!(!countdown.is_expired(1e9));
        countdown.start(500.0);
        assert!(!countdown.is_expired(30_499.0));
        assert!(countdown.is_expired(30_500.0));
    }

    #[test]
    fn remaining_seconds_round_up() {
        let mut countdown = Countdown::new(30_000.0);
        assert_eq!(countdown.remaining_secs(0.0), 30);
        countdown.start(0.0);
        assert_eq!(countdown.remaining_secs(1.0), 30);
        assert_eq!(countdown.remaining_secs(29_001.0), 1);
        assert_eq!(countdown.remaining_secs(31_000.0), 0);
    }
}
