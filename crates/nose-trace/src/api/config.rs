use serde::Deserialize;

use crate::error::{Error, Result};

/// Configuration for a game session, provided once at initialization.
///
/// Every field has a default, so a JSON document only needs to name the
/// values it overrides:
///
/// ```
/// use nose_trace::SessionConfig;
///
/// let config = SessionConfig::from_json(r#"{ "round": { "duration_secs": 20.0 } }"#).unwrap();
/// assert_eq!(config.round.duration_secs, 20.0);
/// assert_eq!(config.completion.dwell_ms, 400.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub round: RoundConfig,
    pub tracker: TrackerConfig,
    pub smoother: SmootherConfig,
    pub completion: CompletionConfig,
    pub layout: LayoutConfig,
}

/// Round timing and word selection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    /// Countdown length in seconds (default: 30).
    pub duration_secs: f32,
    /// Minimum spacing between logic ticks in ms (default: 33, ~30 Hz).
    pub min_frame_interval_ms: f64,
    /// Pause between `WordComplete` and `RoundEnded` in ms (default: 100).
    pub closing_delay_ms: f64,
    /// Insert a space between letters of each word (default: true).
    pub letter_spacing: bool,
    /// Seed for word selection (default: 42).
    pub seed: u64,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            duration_secs: 30.0,
            min_frame_interval_ms: 33.0,
            closing_delay_ms: 100.0,
            letter_spacing: true,
            seed: 42,
        }
    }
}

/// Person lock-on tuning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Candidates below this confidence never reach the tracker (default: 0.15).
    pub min_confidence: f32,
    /// Missed frames tolerated before the lock is released (default: 8).
    pub max_frames_without_person: u32,
    /// Missed frames after which the strict descriptor threshold applies (default: 3).
    pub recently_missing_frames: u32,
    /// Descriptor distance accepted while continuously tracked (default: 0.6).
    pub descriptor_threshold: f32,
    /// Descriptor distance accepted after a recent absence (default: 0.45).
    pub descriptor_threshold_after_missing: f32,
    /// Base nose jump accepted between frames, in source pixels (default: 200).
    pub max_nose_jump: f32,
    /// Base face-center jump accepted between frames, in source pixels (default: 180).
    pub max_anchor_jump: f32,
    /// Mean displacement above which motion counts as fast (default: 15).
    pub fast_motion_velocity: f32,
    /// Number of accepted displacements in the velocity estimate (default: 5).
    pub velocity_window: usize,
    /// Reference position blend weight for a close face (default: 0.7).
    pub position_blend: f32,
    /// Reference descriptor blend weight for a close face (default: 0.2).
    pub descriptor_blend: f32,
    /// Face width (source pixels) at which the full blend weight applies (default: 200).
    pub near_face_size: f32,
    /// Lower bound of the size factor applied to blend weights (default: 0.25).
    pub min_size_ratio: f32,
    /// Distance beyond the frame edge that counts as out of frame (default: 10).
    pub out_of_frame_margin: f32,
    /// Consecutive out-of-frame frames that force an unlock (default: 3).
    pub out_of_frame_frames: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.15,
            max_frames_without_person: 8,
            recently_missing_frames: 3,
            descriptor_threshold: 0.6,
            descriptor_threshold_after_missing: 0.45,
            max_nose_jump: 200.0,
            max_anchor_jump: 180.0,
            fast_motion_velocity: 15.0,
            velocity_window: 5,
            position_blend: 0.7,
            descriptor_blend: 0.2,
            near_face_size: 200.0,
            min_size_ratio: 0.25,
            out_of_frame_margin: 10.0,
            out_of_frame_frames: 3,
        }
    }
}

/// Cursor smoothing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SmootherConfig {
    /// Samples kept for the weighted average (default: 10).
    pub history_len: usize,
    /// Age in ms over which a sample's weight decays by 1/e (default: 100).
    pub decay_ms: f64,
    /// Output grid the emitted cursor snaps to (default: 0.5).
    pub round_step: f32,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            history_len: 10,
            decay_ms: 100.0,
            round_step: 0.5,
        }
    }
}

/// Letter completion policy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Fraction of a letter's checkpoints that must be hit (default: 0.65).
    pub required_fraction: f32,
    /// Time the fraction must hold before the letter completes, in ms (default: 400).
    pub dwell_ms: f64,
    /// Pause after a completed letter before the next one, in ms (default: 1000).
    pub advance_pause_ms: f64,
    /// Smallest checkpoint hit radius in pixels (default: 50).
    pub min_radius: f32,
    /// Hit radius as a fraction of the font size (default: 0.25).
    pub radius_factor: f32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            required_fraction: 0.65,
            dwell_ms: 400.0,
            advance_pause_ms: 1000.0,
            min_radius: 50.0,
            radius_factor: 0.25,
        }
    }
}

/// Where the active letter sits on the canvas and how the cursor is mapped onto it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Letter center as a fraction of canvas width (default: 0.5).
    pub letter_x: f32,
    /// Letter center as a fraction of canvas height (default: 0.6).
    pub letter_y: f32,
    /// Font size as a fraction of the shorter canvas side (default: 0.3).
    pub font_scale: f32,
    /// Checkpoint box width as a fraction of the font size (default: 0.8).
    pub box_width_ratio: f32,
    /// Checkpoint box height as a fraction of the font size (default: 0.8).
    pub box_height_ratio: f32,
    /// The video is drawn mirrored, so the cursor is flipped horizontally (default: true).
    pub mirror_x: bool,
    /// Maximum motion trail points (default: 100).
    pub trail_capacity: usize,
    /// Per-axis movement needed before a trail point is added (default: 2).
    pub trail_min_step: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            letter_x: 0.5,
            letter_y: 0.6,
            font_scale: 0.3,
            box_width_ratio: 0.8,
            box_height_ratio: 0.8,
            mirror_x: true,
            trail_capacity: 100,
            trail_min_step: 2.0,
        }
    }
}

impl SessionConfig {
    /// Parse a config from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        fn check(ok: bool, field: &'static str, reason: &'static str) -> Result<()> {
            if ok {
                Ok(())
            } else {
                Err(Error::InvalidConfig { field, reason })
            }
        }

        let r = &self.round;
        check(r.duration_secs > 0.0, "round.duration_secs", "must be positive")?;
        check(r.min_frame_interval_ms >= 0.0, "round.min_frame_interval_ms", "must not be negative")?;
        check(r.closing_delay_ms >= 0.0, "round.closing_delay_ms", "must not be negative")?;

        let t = &self.tracker;
        check((0.0..=1.0).contains(&t.min_confidence), "tracker.min_confidence", "must be within [0, 1]")?;
        check(t.max_frames_without_person >= 1, "tracker.max_frames_without_person", "must be at least 1")?;
        check(t.descriptor_threshold > 0.0, "tracker.descriptor_threshold", "must be positive")?;
        check(
            t.descriptor_threshold_after_missing > 0.0
                && t.descriptor_threshold_after_missing <= t.descriptor_threshold,
            "tracker.descriptor_threshold_after_missing",
            "must be positive and no looser than descriptor_threshold",
        )?;
        check(t.max_nose_jump > 0.0, "tracker.max_nose_jump", "must be positive")?;
        check(t.max_anchor_jump > 0.0, "tracker.max_anchor_jump", "must be positive")?;
        check(t.velocity_window >= 1, "tracker.velocity_window", "must be at least 1")?;
        check((0.0..=1.0).contains(&t.position_blend), "tracker.position_blend", "must be within [0, 1]")?;
        check((0.0..=1.0).contains(&t.descriptor_blend), "tracker.descriptor_blend", "must be within [0, 1]")?;
        check(t.near_face_size > 0.0, "tracker.near_face_size", "must be positive")?;
        check((0.0..=1.0).contains(&t.min_size_ratio), "tracker.min_size_ratio", "must be within [0, 1]")?;
        check(t.out_of_frame_frames >= 1, "tracker.out_of_frame_frames", "must be at least 1")?;

        let s = &self.smoother;
        check(s.history_len >= 1, "smoother.history_len", "must be at least 1")?;
        check(s.decay_ms > 0.0, "smoother.decay_ms", "must be positive")?;
        check(s.round_step >= 0.0, "smoother.round_step", "must not be negative")?;

        let c = &self.completion;
        check(
            c.required_fraction > 0.0 && c.required_fraction <= 1.0,
            "completion.required_fraction",
            "must be within (0, 1]",
        )?;
        check(c.dwell_ms >= 0.0, "completion.dwell_ms", "must not be negative")?;
        check(c.advance_pause_ms >= 0.0, "completion.advance_pause_ms", "must not be negative")?;
        check(c.min_radius >= 0.0, "completion.min_radius", "must not be negative")?;
        check(c.radius_factor >= 0.0, "completion.radius_factor", "must not be negative")?;

        let l = &self.layout;
        check(l.font_scale > 0.0, "layout.font_scale", "must be positive")?;
        check(
            l.box_width_ratio > 0.0 && l.box_width_ratio <= 1.0,
            "layout.box_width_ratio",
            "must be within (0, 1]",
        )?;
        check(
            l.box_height_ratio > 0.0 && l.box_height_ratio <= 1.0,
            "layout.box_height_ratio",
            "must be within (0, 1]",
        )?;
        check(l.trail_capacity >= 1, "layout.trail_capacity", "must be at least 1")?;

        Ok(())
    }

    /// Round duration in milliseconds.
    pub fn round_duration_ms(&self) -> f64 {
        self.round.duration_secs as f64 * 1000.0
    }
}
