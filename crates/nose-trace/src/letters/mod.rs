pub mod checkpoints;
pub mod completion;
pub mod words;

pub use checkpoints::{Checkpoint, CheckpointTable};
pub use completion::{CompletionEngine, CompletionUpdate, LetterPlacement, LetterProgress};
pub use words::{WordBank, WordEntry, WordState};
