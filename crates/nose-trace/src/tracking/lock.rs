use std::collections::VecDeque;

use glam::Vec2;

use super::descriptor::Descriptor;
use super::oracle::Candidate;
use crate::api::config::TrackerConfig;

/// Lock strength saturates here.
pub const MAX_LOCK_STRENGTH: u32 = 100;
/// Velocity widens the geometric thresholds by at most this factor.
const MAX_VELOCITY_FACTOR: f32 = 3.0;
/// Mean displacement that adds one full base threshold of slack.
const VELOCITY_SCALE: f32 = 50.0;
/// A full-strength lock tightens the geometric thresholds to this fraction.
const MIN_STRENGTH_FACTOR: f32 = 0.8;
/// Lock strength that would remove all slack if it were not clamped.
const STRENGTH_SCALE: f32 = 500.0;

/// Why the tracker let go of its person.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockReason {
    /// Too many frames without an acceptable candidate.
    Absent,
    /// The tracked face left the frame.
    OutOfFrame,
}

/// Lock state change produced by one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockTransition {
    Locked,
    Unlocked(UnlockReason),
}

/// Result of one tracker frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackUpdate {
    /// The candidate accepted as the tracked person, if any.
    pub accepted: Option<Candidate>,
    pub transition: Option<LockTransition>,
}

/// Persistent tracker memory.
///
/// The reference fields describe the locked person and are only populated
/// while `locked` is true; unlocking clears all of them together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackState {
    pub locked: bool,
    pub reference_position: Option<Vec2>,
    pub reference_anchor: Option<Vec2>,
    pub reference_descriptor: Option<Descriptor>,
    pub frames_missing: u32,
    pub velocity_estimate: f32,
    pub lock_strength: u32,
    pub frames_out_of_bounds: u32,
    displacements: VecDeque<f32>,
}

impl TrackState {
    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// How a locked tracker judged the best candidate of a frame.
enum Verdict {
    Accept(usize),
    Reject,
    OutOfFrame,
}

/// Keeps the game locked onto one person across frames.
pub struct PersonLockTracker {
    config: TrackerConfig,
    state: TrackState,
}

impl PersonLockTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            state: TrackState::default(),
        }
    }

    pub fn state(&self) -> &TrackState {
        &self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state.locked
    }

    pub fn reset(&mut self) {
        self.state.clear();
    }

    /// Consume one detection cycle.
    ///
    /// `frame_size` is the source frame in the same coordinates as the
    /// candidates; when unknown every candidate counts as in frame.
    pub fn update(&mut self, candidates: &[Candidate], frame_size: Option<Vec2>) -> TrackUpdate {
        let usable: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| c.confidence >= self.config.min_confidence)
            .collect();

        if usable.is_empty() {
            return self.miss();
        }

        if !self.state.locked {
            let best = usable
                .iter()
                .copied()
                .filter(|c| self.in_frame(c.position, frame_size))
                .max_by(|a, b| a.confidence.total_cmp(&b.confidence));
            return match best {
                Some(candidate) => self.lock_onto(candidate),
                None => self.miss(),
            };
        }

        self.state.lock_strength = (self.state.lock_strength + 1).min(MAX_LOCK_STRENGTH);
        self.record_motion(&usable);

        match self.judge(&usable, frame_size) {
            Verdict::Accept(i) => {
                self.state.frames_out_of_bounds = 0;
                self.accept(usable[i])
            }
            Verdict::Reject => {
                self.state.frames_out_of_bounds = 0;
                self.miss()
            }
            Verdict::OutOfFrame => {
                self.state.frames_out_of_bounds += 1;
                if self.state.frames_out_of_bounds >= self.config.out_of_frame_frames {
                    self.unlock(UnlockReason::OutOfFrame)
                } else {
                    self.miss()
                }
            }
        }
    }

    fn lock_onto(&mut self, candidate: &Candidate) -> TrackUpdate {
        self.state.clear();
        self.state.locked = true;
        self.state.reference_position = Some(candidate.position);
        self.state.reference_anchor = candidate.anchor;
        self.state.reference_descriptor = candidate.descriptor.clone();
        log::info!(
            "person locked at ({:.0}, {:.0}), confidence {:.2}",
            candidate.position.x,
            candidate.position.y,
            candidate.confidence
        );
        TrackUpdate {
            accepted: Some(candidate.clone()),
            transition: Some(LockTransition::Locked),
        }
    }

    /// Pick the best candidate for the locked person and decide on it.
    fn judge(&self, usable: &[&Candidate], frame_size: Option<Vec2>) -> Verdict {
        let Some(reference) = self.state.reference_position else {
            return Verdict::Reject;
        };

        // Descriptor mode when identity can actually be compared.
        if let Some(ref_desc) = &self.state.reference_descriptor {
            let best = usable
                .iter()
                .enumerate()
                .filter_map(|(i, c)| {
                    let d = c.descriptor.as_ref()?.distance(ref_desc)?;
                    Some((i, d))
                })
                .min_by(|a, b| a.1.total_cmp(&b.1));
            if let Some((i, distance)) = best {
                if !self.in_frame(usable[i].position, frame_size) {
                    return Verdict::OutOfFrame;
                }
                return if distance < self.descriptor_threshold() {
                    Verdict::Accept(i)
                } else {
                    log::debug!("rejected candidate, descriptor distance {:.3}", distance);
                    Verdict::Reject
                };
            }
        }

        let best = usable
            .iter()
            .enumerate()
            .map(|(i, c)| (i, c.position.distance(reference)))
            .min_by(|a, b| a.1.total_cmp(&b.1));
        let Some((i, nose_distance)) = best else {
            return Verdict::Reject;
        };
        let candidate = usable[i];
        if !self.in_frame(candidate.position, frame_size) {
            return Verdict::OutOfFrame;
        }

        if self.geometric_match(nose_distance, candidate.anchor) {
            Verdict::Accept(i)
        } else {
            log::debug!("rejected candidate, nose jump {:.1}px", nose_distance);
            Verdict::Reject
        }
    }

    /// Push the nearest candidate's jump into the velocity window before it
    /// is judged, so a fast move widens its own threshold.
    fn record_motion(&mut self, usable: &[&Candidate]) {
        let Some(reference) = self.state.reference_position else {
            return;
        };
        let Some(displacement) = usable
            .iter()
            .map(|c| c.position.distance(reference))
            .min_by(|a, b| a.total_cmp(b))
        else {
            return;
        };

        let window = &mut self.state.displacements;
        window.push_back(displacement);
        while window.len() > self.config.velocity_window {
            window.pop_front();
        }
        self.state.velocity_estimate = window.iter().sum::<f32>() / window.len() as f32;
    }

    fn descriptor_threshold(&self) -> f32 {
        if self.state.frames_missing >= self.config.recently_missing_frames {
            self.config.descriptor_threshold_after_missing
        } else {
            self.config.descriptor_threshold
        }
    }

    /// Nose and face-center jump test with velocity- and strength-adaptive thresholds.
    fn geometric_match(&self, nose_distance: f32, anchor: Option<Vec2>) -> bool {
        let velocity = self.state.velocity_estimate;
        let velocity_factor = (1.0 + velocity / VELOCITY_SCALE).clamp(1.0, MAX_VELOCITY_FACTOR);
        let strength_factor =
            (1.0 - self.state.lock_strength as f32 / STRENGTH_SCALE).max(MIN_STRENGTH_FACTOR);
        let scale = velocity_factor * strength_factor;

        let nose_ok = nose_distance < self.config.max_nose_jump * scale;
        let anchor_ok = match (anchor, self.state.reference_anchor) {
            (Some(a), Some(r)) => a.distance(r) < self.config.max_anchor_jump * scale,
            _ => return nose_ok,
        };

        if velocity > self.config.fast_motion_velocity {
            nose_ok || anchor_ok
        } else {
            nose_ok && anchor_ok
        }
    }

    fn accept(&mut self, candidate: &Candidate) -> TrackUpdate {
        let size_factor = candidate.size.map_or(1.0, |size| {
            (size / self.config.near_face_size).clamp(self.config.min_size_ratio, 1.0)
        });
        let position_weight = self.config.position_blend * size_factor;
        let descriptor_weight = self.config.descriptor_blend * size_factor;

        let state = &mut self.state;
        if let Some(reference) = state.reference_position.as_mut() {
            *reference = reference.lerp(candidate.position, position_weight);
        }

        state.reference_anchor = match (state.reference_anchor, candidate.anchor) {
            (Some(r), Some(a)) => Some(r.lerp(a, position_weight)),
            (None, a) => a,
            (r, None) => r,
        };

        if let Some(d) = &candidate.descriptor {
            if let Some(reference) = state.reference_descriptor.as_mut() {
                if !reference.blend(d, descriptor_weight) {
                    log::warn!("descriptor length changed mid-lock, keeping reference");
                }
            } else {
                state.reference_descriptor = Some(d.clone());
            }
        }

        state.frames_missing = 0;

        TrackUpdate {
            accepted: Some(candidate.clone()),
            transition: None,
        }
    }

    fn miss(&mut self) -> TrackUpdate {
        self.state.frames_missing = self.state.frames_missing.saturating_add(1);
        if self.state.locked && self.state.frames_missing > self.config.max_frames_without_person {
            return self.unlock(UnlockReason::Absent);
        }
        TrackUpdate::default()
    }

    fn unlock(&mut self, reason: UnlockReason) -> TrackUpdate {
        log::info!("person lost ({:?})", reason);
        self.state.clear();
        TrackUpdate {
            accepted: None,
            transition: Some(LockTransition::Unlocked(reason)),
        }
    }

    fn in_frame(&self, point: Vec2, frame_size: Option<Vec2>) -> bool {
        let Some(size) = frame_size else {
            return true;
        };
        let m = self.config.out_of_frame_margin;
        point.x >= -m && point.y >= -m && point.x <= size.x + m && point.y <= size.y + m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Option<Vec2> = Some(Vec2::new(640.0, 480.0));

    fn tracker() -> PersonLockTracker {
        PersonLockTracker::new(TrackerConfig::default())
    }

    fn face(x: f32, y: f32) -> Candidate {
        Candidate::at(Vec2::new(x, y), 0.9).with_anchor(Vec2::new(x, y - 20.0))
    }

    #[test]
    fn locks_on_first_frame() {
        let mut t = tracker();
        let c = face(320.0, 240.0);
        let update = t.update(&[c.clone()], FRAME);
        assert_eq!(update.transition, Some(LockTransition::Locked));
        assert_eq!(update.accepted.unwrap().position, c.position);
        assert!(t.is_locked());
        assert_eq!(t.state().reference_position, Some(c.position));
    }

    #[test]
    fn locks_onto_most_confident() {
        let mut t = tracker();
        let weak = Candidate::at(Vec2::new(100.0, 100.0), 0.4);
        let strong = Candidate::at(Vec2::new(500.0, 300.0), 0.8);
        let update = t.update(&[weak, strong.clone()], FRAME);
        assert_eq!(update.accepted, Some(strong));
    }

    #[test]
    fn low_confidence_is_ignored() {
        let mut t = tracker();
        let update = t.update(&[Candidate::at(Vec2::new(10.0, 10.0), 0.1)], FRAME);
        assert_eq!(update, TrackUpdate::default());
        assert!(!t.is_locked());
    }

    #[test]
    fn accepts_jitter_and_tracks_velocity() {
        let mut t = tracker();
        t.update(&[face(320.0, 240.0)], FRAME);
        let update = t.update(&[face(330.0, 240.0)], FRAME);
        assert!(update.accepted.is_some());
        assert_eq!(t.state().velocity_estimate, 10.0);
        assert_eq!(t.state().lock_strength, 1);
        // Reference blends 70% toward the new position.
        let reference = t.state().reference_position.unwrap();
        assert!((reference.x - 327.0).abs() < 1e-3);
    }

    #[test]
    fn rejects_jump_beyond_widest_threshold() {
        let mut t = tracker();
        let wide = Some(Vec2::new(1920.0, 1080.0));
        t.update(&[face(100.0, 240.0)], wide);
        // Velocity saturates the widening at 3x, which still falls short of 800px.
        let update = t.update(&[face(900.0, 240.0)], wide);
        assert!(update.accepted.is_none());
        assert_eq!(t.state().frames_missing, 1);
        assert_eq!(t.state().velocity_estimate, 800.0);
        assert!(t.is_locked());
    }

    #[test]
    fn fast_swipe_from_rest_stays_locked() {
        let mut t = tracker();
        t.update(&[face(100.0, 240.0)], None);
        let accepted: Vec<bool> = (1..=6)
            .map(|step| {
                let x = 100.0 + 250.0 * step as f32;
                t.update(&[face(x, 240.0)], None).accepted.is_some()
            })
            .collect();
        assert_eq!(accepted, vec![true; 6]);
        assert!(t.state().velocity_estimate > 200.0);
        assert_eq!(t.state().frames_missing, 0);
        assert_eq!(t.state().lock_strength, 6);
    }

    #[test]
    fn lock_strength_grows_on_rejected_frames_too() {
        let mut t = tracker();
        t.update(&[face(320.0, 240.0)], FRAME);
        let stranger = Candidate::at(Vec2::new(325.0, 240.0), 0.9).with_anchor(Vec2::new(320.0, 460.0));
        assert!(t.update(&[stranger], FRAME).accepted.is_none());
        assert_eq!(t.state().lock_strength, 1);
        // Empty frames are not locked frames.
        t.update(&[], FRAME);
        assert_eq!(t.state().lock_strength, 1);
    }

    #[test]
    fn fast_motion_needs_only_one_check() {
        let mut t = tracker();
        t.update(&[face(100.0, 240.0)], FRAME);
        // Build a fast velocity estimate with accepted moves of 40px.
        for step in 1..=4 {
            let x = 100.0 + 40.0 * step as f32;
            assert!(t.update(&[face(x, 240.0)], FRAME).accepted.is_some());
        }
        assert!(t.state().velocity_estimate > 15.0);
        let reference = t.state().reference_position.unwrap();
        let anchor = t.state().reference_anchor.unwrap();

        // Nose close, face center far: passes only under the fast-motion rule.
        let odd = Candidate::at(reference + Vec2::new(10.0, 0.0), 0.9)
            .with_anchor(anchor + Vec2::new(0.0, 400.0));
        assert!(t.update(&[odd], FRAME).accepted.is_some());
    }

    #[test]
    fn slow_motion_needs_both_checks() {
        let mut t = tracker();
        t.update(&[face(320.0, 240.0)], FRAME);
        let odd = Candidate::at(Vec2::new(325.0, 240.0), 0.9).with_anchor(Vec2::new(320.0, 460.0));
        assert!(t.update(&[odd], FRAME).accepted.is_none());
    }

    #[test]
    fn unlocks_after_max_missing_then_relocks() {
        let mut t = tracker();
        t.update(&[face(320.0, 240.0)], FRAME);
        for _ in 0..8 {
            let update = t.update(&[], FRAME);
            assert_eq!(update.transition, None);
            assert!(t.is_locked());
        }
        let update = t.update(&[], FRAME);
        assert_eq!(update.transition, Some(LockTransition::Unlocked(UnlockReason::Absent)));
        assert!(!t.is_locked());
        assert_eq!(t.state().reference_position, None);

        // A different person is accepted immediately.
        let other = face(50.0, 50.0);
        let update = t.update(&[other.clone()], FRAME);
        assert_eq!(update.transition, Some(LockTransition::Locked));
        assert_eq!(update.accepted, Some(other));
    }

    #[test]
    fn descriptor_picks_same_identity() {
        let mut t = tracker();
        let me = Descriptor::new(vec![0.0, 0.0, 0.0]);
        let you = Descriptor::new(vec![1.0, 1.0, 0.0]);
        t.update(&[face(320.0, 240.0).with_descriptor(me.clone())], FRAME);

        // The stranger is closer in space but not in identity.
        let stranger = face(322.0, 240.0).with_descriptor(you);
        let mine = face(420.0, 240.0).with_descriptor(Descriptor::new(vec![0.1, 0.0, 0.0]));
        let update = t.update(&[stranger, mine.clone()], FRAME);
        assert_eq!(update.accepted, Some(mine));
    }

    #[test]
    fn strict_descriptor_threshold_after_absence() {
        let mut t = tracker();
        let me = Descriptor::new(vec![0.0, 0.0]);
        t.update(&[face(320.0, 240.0).with_descriptor(me)], FRAME);
        for _ in 0..3 {
            t.update(&[], FRAME);
        }
        // 0.5 passes the normal 0.6 threshold but not the strict 0.45 one.
        let doubtful = face(320.0, 240.0).with_descriptor(Descriptor::new(vec![0.5, 0.0]));
        assert!(t.update(&[doubtful.clone()], FRAME).accepted.is_none());

        let mut fresh = tracker();
        fresh.update(&[face(320.0, 240.0).with_descriptor(Descriptor::new(vec![0.0, 0.0]))], FRAME);
        assert!(fresh.update(&[doubtful], FRAME).accepted.is_some());
    }

    #[test]
    fn leaving_the_frame_unlocks_fast() {
        let mut t = tracker();
        t.update(&[face(630.0, 240.0)], FRAME);
        let gone = face(660.0, 240.0);
        assert_eq!(t.update(&[gone.clone()], FRAME).transition, None);
        assert_eq!(t.update(&[gone.clone()], FRAME).transition, None);
        let update = t.update(&[gone], FRAME);
        assert_eq!(update.transition, Some(LockTransition::Unlocked(UnlockReason::OutOfFrame)));
        assert!(update.accepted.is_none());
    }

    #[test]
    fn small_faces_blend_slower() {
        let mut t = tracker();
        t.update(&[face(300.0, 240.0)], FRAME);
        // 50px wide face: weight 0.7 * 0.25.
        t.update(&[face(310.0, 240.0).with_size(50.0)], FRAME);
        let reference = t.state().reference_position.unwrap();
        assert!((reference.x - 301.75).abs() < 1e-3);
    }
}
