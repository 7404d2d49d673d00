pub mod rng;
pub mod session;
pub mod time;
pub mod viewport;

pub use session::{FrameSnapshot, GameSession, SourceStatus};
pub use time::{Countdown, FrameThrottle};
pub use viewport::Viewport;
