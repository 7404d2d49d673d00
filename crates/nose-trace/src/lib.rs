pub mod api;
pub mod core;
pub mod tracking;
pub mod smoothing;
pub mod letters;
pub mod game;
pub mod bridge;
pub mod input;
pub mod error;

// Re-export key types at crate root for convenience
pub use api::config::{
    CompletionConfig, LayoutConfig, RoundConfig, SessionConfig, SmootherConfig, TrackerConfig,
};
pub use api::types::{RoundEvent, RoundOutcome, WireEvent};
pub use core::session::{FrameSnapshot, GameSession, SourceStatus};
pub use core::time::{Countdown, FrameThrottle};
pub use core::viewport::Viewport;
pub use core::rng::Rng;
pub use error::{Error, Result};
pub use tracking::{Candidate, Descriptor, DetectionFrame, PersonLockTracker, RawDetection, TrackState};
pub use smoothing::{MotionTrail, PositionSmoother};
pub use letters::{Checkpoint, CheckpointTable, CompletionEngine, LetterPlacement, WordBank, WordState};
pub use game::{Progression, RoundState};
pub use input::queue::{SessionMessage, SessionQueue};
pub use bridge::protocol::SnapshotLayout;
