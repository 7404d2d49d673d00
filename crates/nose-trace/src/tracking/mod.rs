pub mod descriptor;
pub mod lock;
pub mod oracle;

pub use descriptor::Descriptor;
pub use lock::{LockTransition, PersonLockTracker, TrackState, TrackUpdate, UnlockReason};
pub use oracle::{Candidate, DetectionFrame, RawDetection};
