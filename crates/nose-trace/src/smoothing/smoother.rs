use std::collections::VecDeque;

use glam::Vec2;

use crate::api::config::SmootherConfig;

/// Distance-dependent gain: `(upper bound, gain)` pairs, checked in order.
/// Tiny moves are mostly jitter and barely move the cursor; big moves are
/// followed almost immediately.
pub const GAIN_TIERS: [(f32, f32); 4] = [(1.0, 0.02), (3.0, 0.05), (8.0, 0.15), (25.0, 0.4)];
/// Gain for anything at or beyond the last tier.
pub const MAX_GAIN: f32 = 0.8;

/// Fraction of the remaining distance applied in one update.
pub fn gain_for_distance(distance: f32) -> f32 {
    GAIN_TIERS
        .iter()
        .find(|(limit, _)| distance < *limit)
        .map_or(MAX_GAIN, |(_, gain)| *gain)
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    position: Vec2,
    at_ms: f64,
}

/// Turns jittery raw positions into a stable cursor.
///
/// Each update averages the recent history with exponentially decaying
/// weights, then moves the cursor part of the way towards that average.
/// The internal state stays unrounded; only the emitted cursor snaps to
/// the output grid, so slow drifts still converge.
pub struct PositionSmoother {
    config: SmootherConfig,
    history: VecDeque<Sample>,
    current: Option<Vec2>,
}

impl PositionSmoother {
    /// `origin` is where the cursor rests before the first sample; `None`
    /// snaps to the first sample instead.
    pub fn new(config: SmootherConfig, origin: Option<Vec2>) -> Self {
        Self {
            history: VecDeque::with_capacity(config.history_len),
            config,
            current: origin,
        }
    }

    pub fn smooth(&mut self, raw: Vec2, now_ms: f64) -> Vec2 {
        self.history.push_back(Sample {
            position: raw,
            at_ms: now_ms,
        });
        while self.history.len() > self.config.history_len {
            self.history.pop_front();
        }

        let mut total = 0.0f64;
        let mut sum = glam::DVec2::ZERO;
        for sample in &self.history {
            let age = (now_ms - sample.at_ms).max(0.0);
            let weight = (-age / self.config.decay_ms).exp();
            sum += sample.position.as_dvec2() * weight;
            total += weight;
        }
        let average = if total > 0.0 {
            (sum / total).as_vec2()
        } else {
            raw
        };

        let current = match self.current {
            Some(current) => {
                let delta = average - current;
                current + delta * gain_for_distance(delta.length())
            }
            None => average,
        };
        self.current = Some(current);
        self.snap(current)
    }

    /// The emitted cursor, if there is one yet.
    pub fn current(&self) -> Option<Vec2> {
        self.current.map(|c| self.snap(c))
    }

    /// Forget the history and rest at `origin`.
    pub fn reset(&mut self, origin: Option<Vec2>) {
        self.history.clear();
        self.current = origin;
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn snap(&self, v: Vec2) -> Vec2 {
        let step = self.config.round_step;
        if step > 0.0 {
            (v / step).round() * step
        } else {
            v
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_MS: f64 = 33.0;

    fn smoother(origin: Vec2) -> PositionSmoother {
        PositionSmoother::new(SmootherConfig::default(), Some(origin))
    }

    fn frames_to_ninety_percent(step: f32) -> usize {
        let mut s = smoother(Vec2::ZERO);
        let target = Vec2::new(step, 0.0);
        for frame in 1..=500 {
            let out = s.smooth(target, frame as f64 * FRAME_MS);
            if (target - out).length() <= step * 0.1 {
                return frame;
            }
        }
        panic!("never reached 90% of a {step}px step");
    }

    #[test]
    fn gain_tiers() {
        assert_eq!(gain_for_distance(0.5), 0.02);
        assert_eq!(gain_for_distance(1.0), 0.05);
        assert_eq!(gain_for_distance(7.9), 0.15);
        assert_eq!(gain_for_distance(24.0), 0.4);
        assert_eq!(gain_for_distance(25.0), 0.8);
    }

    #[test]
    fn converges_on_constant_target() {
        let mut s = smoother(Vec2::new(100.0, 100.0));
        let target = Vec2::new(180.0, 40.0);
        let mut out = Vec2::ZERO;
        for frame in 0..120 {
            out = s.smooth(target, frame as f64 * FRAME_MS);
        }
        assert!((out - target).length() <= 1.0, "ended at {out:?}");
    }

    #[test]
    fn large_steps_settle_faster() {
        let large = frames_to_ninety_percent(200.0);
        let small = frames_to_ninety_percent(5.0);
        assert!(large < small, "large {large} vs small {small}");
    }

    #[test]
    fn output_is_on_half_pixel_grid() {
        let mut s = smoother(Vec2::ZERO);
        let out = s.smooth(Vec2::new(10.3, 3.3), 0.0);
        assert_eq!(out * 2.0, (out * 2.0).round());
    }

    #[test]
    fn first_sample_snaps_without_origin() {
        let mut s = PositionSmoother::new(SmootherConfig::default(), None);
        assert_eq!(s.current(), None);
        assert_eq!(s.smooth(Vec2::new(42.0, 17.5), 0.0), Vec2::new(42.0, 17.5));
    }

    #[test]
    fn history_is_bounded() {
        let mut s = smoother(Vec2::ZERO);
        for frame in 0..25 {
            s.smooth(Vec2::ONE, frame as f64);
        }
        assert_eq!(s.history_len(), 10);
        s.reset(None);
        assert_eq!(s.history_len(), 0);
        assert_eq!(s.current(), None);
    }
}
