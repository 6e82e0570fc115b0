pub mod goal;
pub mod member;
pub mod workout;

pub use goal::Goal;
pub use member::{Circle, Member};
pub use workout::WorkoutSession;
