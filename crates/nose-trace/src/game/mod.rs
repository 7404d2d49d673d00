pub mod progression;

pub use progression::{Progression, RoundState};
