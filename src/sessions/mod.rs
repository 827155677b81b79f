pub mod clock;
pub mod commands;
pub mod plans;
pub mod timer;

pub use clock::{SessionClock, SessionPhase};
pub use plans::SessionPlans;
pub use timer::{SessionSnapshot, SessionTimer};
