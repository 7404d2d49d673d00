use glam::Vec2;

use super::checkpoints::{Checkpoint, MAX_CHECKPOINTS};
use crate::api::config::CompletionConfig;

/// Where the active letter is drawn on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterPlacement {
    /// Center of the glyph.
    pub center: Vec2,
    pub font_size: f32,
    /// Size of the box checkpoints are laid out in.
    pub box_size: Vec2,
}

impl LetterPlacement {
    /// Screen position of a normalized checkpoint.
    pub fn checkpoint_position(&self, checkpoint: &Checkpoint) -> Vec2 {
        let top_left = self.center - self.box_size / 2.0;
        top_left + Vec2::new(checkpoint.x, checkpoint.y) * self.box_size
    }
}

/// Tracing state of one letter slot in the word.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LetterProgress {
    pub completed: bool,
    /// Bit `i` set once checkpoint `i` was touched.
    pub hit: u32,
    /// When the completion threshold was last reached, if it still holds.
    pub completion_timer_start: Option<f64>,
}

impl LetterProgress {
    pub fn is_hit(&self, checkpoint: usize) -> bool {
        checkpoint < 32 && self.hit & (1 << checkpoint) != 0
    }

    pub fn hit_count(&self) -> u32 {
        self.hit.count_ones()
    }
}

/// What one completion update changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionUpdate {
    /// Indices of checkpoints hit for the first time this frame.
    pub newly_hit: Vec<usize>,
    pub dwell_started: bool,
    pub dwell_cancelled: bool,
    /// The letter finished its dwell and is now complete.
    pub completed: bool,
}

/// Decides when a letter counts as traced.
///
/// Progress is kept per display position (ordinal), so spaces simply own a
/// slot that is never touched.
pub struct CompletionEngine {
    config: CompletionConfig,
    progress: Vec<LetterProgress>,
}

impl CompletionEngine {
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            config,
            progress: Vec::new(),
        }
    }

    /// Clear all progress and size it for a word of `slots` display characters.
    pub fn reset(&mut self, slots: usize) {
        self.progress.clear();
        self.progress.resize(slots, LetterProgress::default());
    }

    pub fn progress(&self, ordinal: usize) -> Option<&LetterProgress> {
        self.progress.get(ordinal)
    }

    pub fn all_progress(&self) -> &[LetterProgress] {
        &self.progress
    }

    pub fn is_completed(&self, ordinal: usize) -> bool {
        self.progress.get(ordinal).is_some_and(|p| p.completed)
    }

    /// Checkpoint hit radius for a given font size.
    pub fn hit_radius(&self, font_size: f32) -> f32 {
        self.config.min_radius.max(self.config.radius_factor * font_size)
    }

    /// Feed one cursor position for the letter at `ordinal`.
    pub fn update(
        &mut self,
        ordinal: usize,
        checkpoints: &[Checkpoint],
        placement: &LetterPlacement,
        cursor: Vec2,
        now_ms: f64,
    ) -> CompletionUpdate {
        let radius = self.hit_radius(placement.font_size);
        let mut update = CompletionUpdate::default();

        let Some(progress) = self.progress.get_mut(ordinal) else {
            return update;
        };
        if progress.completed || checkpoints.is_empty() {
            return update;
        }
        if checkpoints.len() > MAX_CHECKPOINTS {
            log::warn!(
                "letter at {} has {} checkpoints, more than {} can be tracked",
                ordinal,
                checkpoints.len(),
                MAX_CHECKPOINTS
            );
            return update;
        }

        for (i, checkpoint) in checkpoints.iter().enumerate() {
            if progress.is_hit(i) {
                continue;
            }
            if cursor.distance(placement.checkpoint_position(checkpoint)) < radius {
                progress.hit |= 1 << i;
                update.newly_hit.push(i);
            }
        }

        let fraction = progress.hit_count() as f32 / checkpoints.len() as f32;
        if fraction >= self.config.required_fraction {
            let started = match progress.completion_timer_start {
                Some(start) => start,
                None => {
                    progress.completion_timer_start = Some(now_ms);
                    update.dwell_started = true;
                    now_ms
                }
            };
            if now_ms - started >= self.config.dwell_ms {
                progress.completed = true;
                progress.hit = 0;
                progress.completion_timer_start = None;
                update.completed = true;
            }
        } else if progress.completion_timer_start.take().is_some() {
            update.dwell_cancelled = true;
        }

        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement() -> LetterPlacement {
        LetterPlacement {
            center: Vec2::new(500.0, 500.0),
            font_size: 400.0,
            box_size: Vec2::new(320.0, 320.0),
        }
    }

    fn two_points() -> Vec<Checkpoint> {
        vec![Checkpoint::new(0.0, 0.0, "a"), Checkpoint::new(1.0, 1.0, "b")]
    }

    fn engine(required_fraction: f32) -> CompletionEngine {
        let mut engine = CompletionEngine::new(CompletionConfig {
            required_fraction,
            ..CompletionConfig::default()
        });
        engine.reset(3);
        engine
    }

    #[test]
    fn checkpoint_positions_follow_box() {
        let p = placement();
        let cps = two_points();
        assert_eq!(p.checkpoint_position(&cps[0]), Vec2::new(340.0, 340.0));
        assert_eq!(p.checkpoint_position(&cps[1]), Vec2::new(660.0, 660.0));
    }

    #[test]
    fn radius_grows_with_font() {
        let e = engine(1.0);
        assert_eq!(e.hit_radius(100.0), 50.0);
        assert_eq!(e.hit_radius(400.0), 100.0);
    }

    #[test]
    fn hits_are_idempotent() {
        let mut e = engine(1.0);
        let cps = two_points();
        let first = e.update(0, &cps, &placement(), Vec2::new(345.0, 340.0), 0.0);
        assert_eq!(first.newly_hit, vec![0]);
        let again = e.update(0, &cps, &placement(), Vec2::new(345.0, 340.0), 33.0);
        assert!(again.newly_hit.is_empty());
        assert_eq!(e.progress(0).unwrap().hit_count(), 1);
    }

    #[test]
    fn completes_after_dwell() {
        let mut e = engine(1.0);
        let cps = two_points();
        let p = placement();
        e.update(0, &cps, &p, Vec2::new(340.0, 340.0), 0.0);
        let met = e.update(0, &cps, &p, Vec2::new(660.0, 660.0), 50.0);
        assert!(met.dwell_started);
        assert!(!met.completed);
        assert!(!e.update(0, &cps, &p, Vec2::new(660.0, 660.0), 449.0).completed);
        let done = e.update(0, &cps, &p, Vec2::new(660.0, 660.0), 450.0);
        assert!(done.completed);

        let progress = e.progress(0).unwrap();
        assert!(progress.completed);
        assert_eq!(progress.hit, 0);
        assert_eq!(progress.completion_timer_start, None);
        // Completed letters ignore further input.
        assert_eq!(e.update(0, &cps, &p, Vec2::new(340.0, 340.0), 500.0), CompletionUpdate::default());
    }

    #[test]
    fn oversized_checkpoint_set_is_ignored() {
        let mut e = engine(0.5);
        let cps: Vec<Checkpoint> = (0..33)
            .map(|i| Checkpoint::new(0.0, 0.0, &format!("p{i}")))
            .collect();
        let update = e.update(0, &cps, &placement(), Vec2::new(340.0, 340.0), 0.0);
        assert_eq!(update, CompletionUpdate::default());
        assert_eq!(e.progress(0).unwrap().hit, 0);
    }

    #[test]
    fn falling_below_fraction_cancels_dwell() {
        let mut e = engine(0.5);
        let cps = two_points();
        let p = placement();
        assert!(e.update(1, &cps, &p, Vec2::new(340.0, 340.0), 0.0).dwell_started);

        // Raise the bar so the same hit count no longer satisfies it.
        e.config.required_fraction = 1.0;
        let dropped = e.update(1, &cps, &p, Vec2::new(0.0, 0.0), 200.0);
        assert!(dropped.dwell_cancelled);
        assert_eq!(e.progress(1).unwrap().completion_timer_start, None);

        // Re-satisfying restarts the dwell from zero.
        let back = e.update(1, &cps, &p, Vec2::new(660.0, 660.0), 300.0);
        assert!(back.dwell_started);
        assert!(!e.update(1, &cps, &p, Vec2::new(660.0, 660.0), 650.0).completed);
        assert!(e.update(1, &cps, &p, Vec2::new(660.0, 660.0), 700.0).completed);
    }
}
