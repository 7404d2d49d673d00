use bytemuck::{Pod, Zeroable};

/// How a round finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Every letter of the word was traced.
    WordCompleted,
    /// The countdown ran out first.
    TimeExpired,
    /// The round was stopped from outside (navigation, hidden tab).
    Stopped,
}

impl RoundOutcome {
    pub fn code(self) -> u32 {
        match self {
            RoundOutcome::WordCompleted => 0,
            RoundOutcome::TimeExpired => 1,
            RoundOutcome::Stopped => 2,
        }
    }
}

/// Something that happened during a tick, for the presentation layer to react to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoundEvent {
    /// The tracker locked onto a person.
    PersonLocked,
    /// The tracker released its lock.
    PersonLost,
    /// A checkpoint of the letter at `ordinal` was touched for the first time.
    CheckpointHit { ordinal: usize, checkpoint: usize },
    /// The letter at `ordinal` finished its dwell and is complete.
    LetterCompleted { ordinal: usize, letter: char },
    /// The active letter moved on to `index` (counting letters only).
    LetterAdvanced { index: usize },
    /// All letters are traced.
    WordComplete,
    /// The countdown reached zero before the word was done.
    TimeExpired,
    /// The round reached its terminal state.
    RoundEnded(RoundOutcome),
    /// Detection polling stopped; the camera must be released now.
    ReleaseCamera,
}

// Wire event kinds (Rust → JS)
pub const EVENT_PERSON_LOCKED: f32 = 1.0;
pub const EVENT_PERSON_LOST: f32 = 2.0;
pub const EVENT_CHECKPOINT_HIT: f32 = 3.0;
pub const EVENT_LETTER_COMPLETED: f32 = 4.0;
pub const EVENT_LETTER_ADVANCED: f32 = 5.0;
pub const EVENT_WORD_COMPLETE: f32 = 6.0;
pub const EVENT_TIME_EXPIRED: f32 = 7.0;
pub const EVENT_ROUND_ENDED: f32 = 8.0;
pub const EVENT_RELEASE_CAMERA: f32 = 9.0;

impl RoundEvent {
    /// Flatten into the fixed four-float wire form.
    pub fn to_wire(&self) -> WireEvent {
        match *self {
            RoundEvent::PersonLocked => WireEvent::new(EVENT_PERSON_LOCKED, 0.0, 0.0),
            RoundEvent::PersonLost => WireEvent::new(EVENT_PERSON_LOST, 0.0, 0.0),
            RoundEvent::CheckpointHit { ordinal, checkpoint } => {
                WireEvent::new(EVENT_CHECKPOINT_HIT, ordinal as f32, checkpoint as f32)
            }
            RoundEvent::LetterCompleted { ordinal, letter } => {
                WireEvent::new(EVENT_LETTER_COMPLETED, ordinal as f32, letter as u32 as f32)
            }
            RoundEvent::LetterAdvanced { index } => {
                WireEvent::new(EVENT_LETTER_ADVANCED, index as f32, 0.0)
            }
            RoundEvent::WordComplete => WireEvent::new(EVENT_WORD_COMPLETE, 0.0, 0.0),
            RoundEvent::TimeExpired => WireEvent::new(EVENT_TIME_EXPIRED, 0.0, 0.0),
            RoundEvent::RoundEnded(outcome) => {
                WireEvent::new(EVENT_ROUND_ENDED, outcome.code() as f32, 0.0)
            }
            RoundEvent::ReleaseCamera => WireEvent::new(EVENT_RELEASE_CAMERA, 0.0, 0.0),
        }
    }
}

/// A round event as read by JS out of the snapshot buffer.
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct WireEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl WireEvent {
    pub const FLOATS: usize = 4;

    fn new(kind: f32, a: f32, b: f32) -> Self {
        Self { kind, a, b, c: 0.0 }
    }
}
