pub mod smoother;
pub mod trail;

pub use smoother::{gain_for_distance, PositionSmoother};
pub use trail::MotionTrail;
