pub mod appointment;
pub mod health_entry;
pub mod mood;
pub mod session_plan;

pub use appointment::{Appointment, Therapist, TimeSlot};
pub use health_entry::{HealthEntry, HealthForm, MetricField, StressAssessment, ValidationError};
pub use mood::{Emotion, MoodEntry};
pub use session_plan::SessionPlan;
