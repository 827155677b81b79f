use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A therapist offered on the scheduling screen. The roster is static
/// app data, not user state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Therapist {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub rating: f64,
    pub experience_years: u32,
    pub next_available: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub time: String,
    pub available: bool,
}

/// A booked teletherapy appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(default = "new_appointment_id")]
    pub id: String,
    pub therapist_id: String,
    pub therapist_name: String,
    pub date: NaiveDate,
    pub time: String,
    pub booked_at: DateTime<Utc>,
}

fn new_appointment_id() -> String {
    Uuid::new_v4().to_string()
}

impl Appointment {
    pub fn booked(therapist: &Therapist, date: NaiveDate, time: String) -> Self {
        Self {
            id: new_appointment_id(),
            therapist_id: therapist.id.clone(),
            therapist_name: therapist.name.clone(),
            date,
            time,
            booked_at: Utc::now(),
        }
    }
}

pub fn therapist_roster() -> Vec<Therapist> {
    vec![
        Therapist {
            id: "1".into(),
            name: "Dr. Sarah Johnson".into(),
            specialty: "Anxiety & Depression".into(),
            rating: 4.9,
            experience_years: 15,
            next_available: "Today, 3:00 PM".into(),
        },
        Therapist {
            id: "2".into(),
            name: "Dr. Michael Chen".into(),
            specialty: "Relationship Counseling".into(),
            rating: 4.8,
            experience_years: 12,
            next_available: "Tomorrow, 10:00 AM".into(),
        },
        Therapist {
            id: "3".into(),
            name: "Dr. Emily Martinez".into(),
            specialty: "Stress Management".into(),
            rating: 4.7,
            experience_years: 10,
            next_available: "Today, 5:30 PM".into(),
        },
    ]
}

pub fn default_time_slots() -> Vec<TimeSlot> {
    [
        ("9:00 AM", true),
        ("10:00 AM", true),
        ("11:00 AM", false),
        ("1:00 PM", true),
        ("2:00 PM", true),
        ("3:00 PM", false),
        ("4:00 PM", true),
        ("5:00 PM", true),
    ]
    .into_iter()
    .map(|(time, available)| TimeSlot {
        time: time.into(),
        available,
    })
    .collect()
}
