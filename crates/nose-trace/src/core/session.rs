use glam::Vec2;

use super::rng::Rng;
use super::time::FrameThrottle;
use super::viewport::Viewport;
use crate::api::config::SessionConfig;
use crate::api::types::{RoundEvent, RoundOutcome};
use crate::error::{Error, Result};
use crate::game::progression::{Progression, RoundState};
use crate::input::queue::{SessionMessage, SessionQueue};
use crate::letters::checkpoints::CheckpointTable;
use crate::letters::completion::CompletionEngine;
use crate::letters::words::{WordBank, WordEntry, WordState};
use crate::smoothing::smoother::PositionSmoother;
use crate::smoothing::trail::MotionTrail;
use crate::tracking::lock::{LockTransition, PersonLockTracker};
use crate::tracking::oracle::DetectionFrame;

/// Outcome of acquiring the detection source (camera + model).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    Ready,
    Unavailable(String),
}

/// Everything presentation needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    /// Logic ticks run so far.
    pub frame: u64,
    /// Smoothed cursor in screen coordinates; `None` while nobody is tracked.
    pub cursor: Option<Vec2>,
    pub locked: bool,
    pub state: RoundState,
    /// Word as displayed, spaces included.
    pub word: String,
    pub brand: String,
    pub active_letter_index: usize,
    pub letter_count: usize,
    pub active_letter: Option<char>,
    pub active_ordinal: Option<usize>,
    /// Checkpoints of the active letter touched so far.
    pub hit_mask: u32,
    pub checkpoint_count: usize,
    pub active_completed: bool,
    /// Completion per display position.
    pub completed: Vec<bool>,
    pub time_remaining_secs: u32,
    pub outcome: Option<RoundOutcome>,
    pub trail: Vec<Vec2>,
}

/// One player's game: tracking, smoothing, letter progress and the round clock.
///
/// Owns all per-round state; nothing is global. Time is always passed in,
/// in milliseconds, so a host can drive it from `requestAnimationFrame`
/// and tests can drive it from a loop.
pub struct GameSession {
    config: SessionConfig,
    checkpoints: CheckpointTable,
    words: WordBank,
    rng: Rng,
    viewport: Viewport,
    queue: SessionQueue,
    throttle: FrameThrottle,
    tracker: PersonLockTracker,
    smoother: PositionSmoother,
    trail: MotionTrail,
    completion: CompletionEngine,
    entry: WordEntry,
    word: WordState,
    progression: Progression,
    /// Latest accepted candidate in canvas coordinates.
    latest: Option<Vec2>,
    cursor: Option<Vec2>,
    detection_active: bool,
    events: Vec<RoundEvent>,
    frame: u64,
}

impl GameSession {
    /// Build a session, validating everything up front.
    pub fn new(
        config: SessionConfig,
        checkpoints: CheckpointTable,
        words: WordBank,
        canvas: (f32, f32),
    ) -> Result<Self> {
        config.validate()?;
        if words.is_empty() {
            return Err(Error::EmptyWordBank);
        }
        for entry in words.entries() {
            checkpoints.ensure_covers(&entry.word)?;
        }

        let mut rng = Rng::new(config.round.seed);
        let entry = words.pick(&mut rng)?.clone();
        let word = WordState::new(&entry, config.round.letter_spacing);
        let viewport = Viewport::new(canvas.0, canvas.1, config.layout.clone());
        let mut completion = CompletionEngine::new(config.completion.clone());
        completion.reset(word.display().len());

        log::info!(
            "session ready: {} words, canvas {}x{}, first word {:?} ({})",
            words.len(),
            canvas.0,
            canvas.1,
            word.display(),
            word.brand()
        );

        Ok(Self {
            checkpoints,
            words,
            rng,
            queue: SessionQueue::new(),
            throttle: FrameThrottle::new(config.round.min_frame_interval_ms),
            tracker: PersonLockTracker::new(config.tracker.clone()),
            smoother: PositionSmoother::new(config.smoother.clone(), Some(viewport.center())),
            trail: MotionTrail::new(config.layout.trail_capacity, config.layout.trail_min_step),
            completion,
            entry,
            word,
            progression: Progression::new(&config.round, &config.completion),
            viewport,
            config,
            latest: None,
            cursor: None,
            detection_active: false,
            events: Vec::new(),
            frame: 0,
        })
    }

    /// Default config, built-in checkpoints and words.
    pub fn with_defaults(width: f32, height: f32) -> Result<Self> {
        Self::new(
            SessionConfig::default(),
            CheckpointTable::builtin(),
            WordBank::builtin(),
            (width, height),
        )
    }

    /// Begin a round once the detection source has been acquired.
    pub fn start_round(&mut self, now_ms: f64, source: SourceStatus) -> Result<()> {
        if let SourceStatus::Unavailable(reason) = source {
            log::warn!("cannot start round: {}", reason);
            return Err(Error::SourceUnavailable(reason));
        }
        self.clear_round_state();
        self.progression.start(now_ms);
        self.detection_active = true;
        log::info!("round started with {:?}", self.word.display());
        Ok(())
    }

    /// Post a message for the next tick. Detection results arriving after
    /// detection has halted are dropped.
    pub fn post(&mut self, message: SessionMessage) {
        let is_detection = matches!(
            message,
            SessionMessage::Detections(_) | SessionMessage::DetectionFailed { .. }
        );
        if is_detection && !self.detection_active {
            log::debug!("dropping detection result, detection is halted");
            return;
        }
        self.queue.push(message);
    }

    /// Run one logic tick if the frame throttle allows it. Returns whether it ran.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        if !self.throttle.ready(now_ms) {
            return false;
        }
        self.frame += 1;

        for message in self.queue.drain() {
            match message {
                // A stop earlier in the batch halts detection for the rest of it.
                SessionMessage::Detections(_) | SessionMessage::DetectionFailed { .. }
                    if !self.detection_active => {}
                SessionMessage::Detections(frame) => self.consume_detections(&frame),
                SessionMessage::DetectionFailed { timestamp_ms } => {
                    log::debug!("detection cycle at {:.0}ms failed", timestamp_ms);
                    self.consume_detections(&DetectionFrame::default());
                }
                SessionMessage::SelectNewWord => self.select_new_word(now_ms),
                SessionMessage::ResetRound => self.reset_round(now_ms),
                SessionMessage::Stop => self.stop(now_ms),
            }
        }

        let latest = self.latest;
        self.step(now_ms, latest);
        true
    }

    /// Advance smoothing, letter completion and the round clock with
    /// `raw` (canvas coordinates) as the tracked point.
    pub fn step(&mut self, now_ms: f64, raw: Option<Vec2>) {
        let state = self.progression.state();
        if matches!(state, RoundState::AwaitingStart) || state.is_ended() {
            return;
        }

        self.cursor = raw.map(|raw| {
            let smoothed = self.smoother.smooth(raw, now_ms);
            self.viewport.to_screen(smoothed)
        });

        if let Some(cursor) = self.cursor {
            let active_done = self
                .word
                .active_ordinal()
                .is_some_and(|ordinal| self.completion.is_completed(ordinal));
            if !active_done {
                self.trail.push(cursor);
            }
            if self.progression.accepts_input() {
                self.trace_active_letter(cursor, now_ms);
            }
        }

        self.progression.tick(now_ms, &mut self.word, &mut self.events);
        if self.progression.state().is_ended() {
            self.halt_detection();
        }
    }

    fn consume_detections(&mut self, frame: &DetectionFrame) {
        let candidates = frame.candidates(self.config.tracker.min_confidence);
        let update = self.tracker.update(&candidates, frame.size());
        match update.transition {
            Some(LockTransition::Locked) => self.events.push(RoundEvent::PersonLocked),
            Some(LockTransition::Unlocked(_)) => self.events.push(RoundEvent::PersonLost),
            None => {}
        }
        self.latest = update
            .accepted
            .map(|c| self.viewport.to_canvas(c.position, frame.size()));
    }

    fn trace_active_letter(&mut self, cursor: Vec2, now_ms: f64) {
        let (Some(ordinal), Some(letter)) = (self.word.active_ordinal(), self.word.active_letter())
        else {
            return;
        };
        let Some(checkpoints) = self.checkpoints.get(letter) else {
            return;
        };

        let placement = self.viewport.letter_placement();
        let update = self
            .completion
            .update(ordinal, checkpoints, &placement, cursor, now_ms);

        for checkpoint in update.newly_hit {
            self.events.push(RoundEvent::CheckpointHit { ordinal, checkpoint });
        }
        if update.dwell_cancelled {
            log::debug!("letter {} dropped below the completion threshold", letter);
        }
        if update.completed {
            log::info!("letter {} (position {}) complete", letter, ordinal);
            self.trail.clear();
            self.events.push(RoundEvent::LetterCompleted { ordinal, letter });
            self.progression.on_letter_completed(now_ms);
        }
    }

    /// Pick another word and restart the round with it.
    pub fn select_new_word(&mut self, now_ms: f64) {
        match self.words.pick(&mut self.rng) {
            Ok(entry) => {
                self.entry = entry.clone();
                log::info!("selected {:?} ({})", self.entry.word, self.entry.brand);
            }
            Err(err) => log::warn!("keeping current word: {}", err),
        }
        self.reset_round(now_ms);
    }

    /// Restart the current word. A live round gets a fresh countdown; an
    /// ended one waits for `start_round`, since its camera is released.
    pub fn reset_round(&mut self, now_ms: f64) {
        self.clear_round_state();
        if self.detection_active {
            self.progression.start(now_ms);
        }
    }

    /// End the round now and release the camera.
    pub fn stop(&mut self, now_ms: f64) {
        if self.progression.stop(now_ms, &mut self.events) {
            log::info!("round stopped");
        }
        self.halt_detection();
    }

    fn halt_detection(&mut self) {
        if !self.detection_active {
            return;
        }
        self.detection_active = false;
        self.queue.clear();
        self.latest = None;
        self.cursor = None;
        self.events.push(RoundEvent::ReleaseCamera);
        log::info!("detection halted, releasing camera");
    }

    fn clear_round_state(&mut self) {
        self.tracker.reset();
        self.smoother.reset(Some(self.viewport.center()));
        self.trail.clear();
        self.word = WordState::new(&self.entry, self.config.round.letter_spacing);
        self.completion.reset(self.word.display().len());
        self.progression = Progression::new(&self.config.round, &self.config.completion);
        self.latest = None;
        self.cursor = None;
    }

    /// Take the events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events produced since the last drain, without consuming them.
    pub fn events(&self) -> &[RoundEvent] {
        &self.events
    }

    pub fn snapshot(&self, now_ms: f64) -> FrameSnapshot {
        let active_ordinal = self.word.active_ordinal();
        let active = active_ordinal.and_then(|o| self.completion.progress(o));
        let checkpoint_count = self
            .word
            .active_letter()
            .and_then(|l| self.checkpoints.get(l))
            .map_or(0, <[_]>::len);

        FrameSnapshot {
            frame: self.frame,
            cursor: self.cursor,
            locked: self.tracker.is_locked(),
            state: self.progression.state(),
            word: self.word.display().to_string(),
            brand: self.word.brand().to_string(),
            active_letter_index: self.word.active_letter_index(),
            letter_count: self.word.letter_count(),
            active_letter: self.word.active_letter(),
            active_ordinal,
            hit_mask: active.map_or(0, |p| p.hit),
            checkpoint_count,
            active_completed: active.is_some_and(|p| p.completed),
            completed: self.completion.all_progress().iter().map(|p| p.completed).collect(),
            time_remaining_secs: self.progression.remaining_secs(now_ms),
            outcome: self.progression.outcome(),
            trail: self.trail.iter().collect(),
        }
    }

    /// Screen positions of the active letter's checkpoints, with their hit flags.
    pub fn active_checkpoint_positions(&self) -> Vec<(Vec2, bool)> {
        let (Some(ordinal), Some(letter)) = (self.word.active_ordinal(), self.word.active_letter())
        else {
            return Vec::new();
        };
        let Some(checkpoints) = self.checkpoints.get(letter) else {
            return Vec::new();
        };
        let placement = self.viewport.letter_placement();
        let progress = self.completion.progress(ordinal).copied().unwrap_or_default();
        checkpoints
            .iter()
            .enumerate()
            .map(|(i, cp)| (placement.checkpoint_position(cp), progress.is_hit(i)))
            .collect()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport.resize(width, height);
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn word(&self) -> &WordState {
        &self.word
    }

    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    pub fn state(&self) -> RoundState {
        self.progression.state()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether the host should keep polling the detection source.
    pub fn is_detection_active(&self) -> bool {
        self.detection_active
    }
}
