pub mod queue;

pub use queue::{SessionMessage, SessionQueue};
