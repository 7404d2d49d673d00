use crate::api::config::{CompletionConfig, RoundConfig};
use crate::api::types::{RoundEvent, RoundOutcome};
use crate::core::time::Countdown;
use crate::letters::words::WordState;

/// Where the round is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoundState {
    /// Waiting for the detection source; nothing runs.
    AwaitingStart,
    /// The player is tracing the letter at `letter_index`.
    WordActive { letter_index: usize },
    /// The letter just completed; the next one comes up at `advance_at`.
    LetterComplete { letter_index: usize, advance_at: f64 },
    /// Every letter is traced; the round closes at `close_at`.
    WordComplete { close_at: f64 },
    RoundEnded(RoundOutcome),
}

impl RoundState {
    /// Numeric phase for the wire.
    pub fn code(&self) -> u32 {
        match self {
            RoundState::AwaitingStart => 0,
            RoundState::WordActive { .. } => 1,
            RoundState::LetterComplete { .. } => 2,
            RoundState::WordComplete { .. } => 3,
            RoundState::RoundEnded(_) => 4,
        }
    }

    pub fn is_ended(&self) -> bool {
        matches!(self, RoundState::RoundEnded(_))
    }
}

/// Round progression: letter pulses, word completion and the countdown.
///
/// Only letter completions and the clock move the round forward.
pub struct Progression {
    state: RoundState,
    countdown: Countdown,
    advance_pause_ms: f64,
    closing_delay_ms: f64,
    /// Time left when the round ended, so the display freezes.
    frozen_remaining_ms: Option<f64>,
}

impl Progression {
    pub fn new(round: &RoundConfig, completion: &CompletionConfig) -> Self {
        Self {
            state: RoundState::AwaitingStart,
            countdown: Countdown::new(round.duration_secs as f64 * 1000.0),
            advance_pause_ms: completion.advance_pause_ms,
            closing_delay_ms: round.closing_delay_ms,
            frozen_remaining_ms: None,
        }
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn outcome(&self) -> Option<RoundOutcome> {
        match self.state {
            RoundState::RoundEnded(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Letters are only traced while one is active.
    pub fn accepts_input(&self) -> bool {
        matches!(self.state, RoundState::WordActive { .. })
    }

    /// Begin the round at `now_ms` with the first letter active.
    pub fn start(&mut self, now_ms: f64) {
        self.state = RoundState::WordActive { letter_index: 0 };
        self.countdown.start(now_ms);
        self.frozen_remaining_ms = None;
    }

    /// The active letter finished its dwell.
    pub fn on_letter_completed(&mut self, now_ms: f64) {
        if let RoundState::WordActive { letter_index } = self.state {
            self.state = RoundState::LetterComplete {
                letter_index,
                advance_at: now_ms + self.advance_pause_ms,
            };
        }
    }

    /// Apply every transition that is due by `now_ms`, oldest first.
    pub fn tick(&mut self, now_ms: f64, word: &mut WordState, events: &mut Vec<RoundEvent>) {
        loop {
            match self.state {
                RoundState::WordActive { .. } => {
                    if self.countdown.is_expired(now_ms) {
                        self.expire(now_ms, events);
                    }
                    return;
                }
                RoundState::LetterComplete { advance_at, .. } => {
                    let deadline = self.countdown.deadline().unwrap_or(f64::INFINITY);
                    if now_ms >= advance_at && advance_at <= deadline {
                        self.advance(advance_at, word, events);
                    } else {
                        if self.countdown.is_expired(now_ms) {
                            self.expire(now_ms, events);
                        }
                        return;
                    }
                }
                RoundState::WordComplete { close_at } => {
                    if now_ms >= close_at {
                        self.end(RoundOutcome::WordCompleted, now_ms, events);
                    }
                    return;
                }
                RoundState::AwaitingStart | RoundState::RoundEnded(_) => return,
            }
        }
    }

    /// End the round from outside. Returns false if it had already ended.
    pub fn stop(&mut self, now_ms: f64, events: &mut Vec<RoundEvent>) -> bool {
        if self.state.is_ended() {
            return false;
        }
        self.end(RoundOutcome::Stopped, now_ms, events);
        true
    }

    /// Milliseconds left on the countdown, frozen once the round has ended.
    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        self.frozen_remaining_ms
            .unwrap_or_else(|| self.countdown.remaining_ms(now_ms))
    }

    /// Whole seconds left, as displayed.
    pub fn remaining_secs(&self, now_ms: f64) -> u32 {
        (self.remaining_ms(now_ms) / 1000.0).ceil() as u32
    }

    fn advance(&mut self, at_ms: f64, word: &mut WordState, events: &mut Vec<RoundEvent>) {
        let index = word.advance();
        if word.is_complete() {
            log::info!("word {:?} complete", word.display());
            self.state = RoundState::WordComplete {
                close_at: at_ms + self.closing_delay_ms,
            };
            events.push(RoundEvent::WordComplete);
        } else {
            log::debug!("advancing to letter {}", index);
            self.state = RoundState::WordActive {
                letter_index: index,
            };
            events.push(RoundEvent::LetterAdvanced { index });
        }
    }

    fn expire(&mut self, now_ms: f64, events: &mut Vec<RoundEvent>) {
        log::info!("time expired");
        events.push(RoundEvent::TimeExpired);
        self.end(RoundOutcome::TimeExpired, now_ms, events);
    }

    fn end(&mut self, outcome: RoundOutcome, now_ms: f64, events: &mut Vec<RoundEvent>) {
        self.frozen_remaining_ms = Some(self.countdown.remaining_ms(now_ms));
        self.state = RoundState::RoundEnded(outcome);
        events.push(RoundEvent::RoundEnded(outcome));
    }
}
