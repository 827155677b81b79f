use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved relaxation-session plan shown on the sessions screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionPlan {
    #[serde(default = "new_plan_id")]
    pub id: String,
    pub title: String,
    pub duration_min: u32,
    /// Display schedule, e.g. "Daily at 8:00 AM" or "Mon, Wed, Fri".
    pub schedule: String,
    #[serde(default)]
    pub completed: u32,
}

fn new_plan_id() -> String {
    Uuid::new_v4().to_string()
}

impl SessionPlan {
    pub fn new(title: String, duration_min: u32, schedule: String) -> Self {
        Self {
            id: new_plan_id(),
            title,
            duration_min,
            schedule,
            completed: 0,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        u64::from(self.duration_min) * 60_000
    }
}

/// The plans seeded into an empty store.
pub fn default_plans() -> Vec<SessionPlan> {
    vec![
        SessionPlan::new("Morning Meditation".into(), 10, "Daily at 8:00 AM".into()),
        SessionPlan::new("Stress Relief".into(), 15, "Mon, Wed, Fri".into()),
        SessionPlan::new("Deep Sleep".into(), 20, "Every night".into()),
    ]
}
