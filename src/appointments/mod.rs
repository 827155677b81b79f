//! Teletherapy scheduling: the three-step booking wizard and the durable
//! appointment list (`appointments` key). Appointments support per-item
//! cancel as well as a full clear.

pub mod commands;

use std::sync::Arc;

use chrono::NaiveDate;
use log::warn;
use thiserror::Error;

use crate::models::{Appointment, Therapist, TimeSlot};
use crate::storage::{KeyValue, PersistenceError};

const APPOINTMENTS_KEY: &str = "appointments";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleStep {
    Date,
    Time,
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("step taken out of order")]
    OutOfOrder,
    #[error("time slot '{0}' is not available")]
    SlotUnavailable(String),
}

/// The booking wizard: Date, then Time, then Confirm. Steps must be taken
/// in order; `back` walks the other way.
#[derive(Debug, Clone)]
pub struct ScheduleDraft {
    therapist: Therapist,
    date: Option<NaiveDate>,
    time: Option<String>,
    step: ScheduleStep,
}

impl ScheduleDraft {
    pub fn new(therapist: Therapist) -> Self {
        Self {
            therapist,
            date: None,
            time: None,
            step: ScheduleStep::Date,
        }
    }

    pub fn step(&self) -> ScheduleStep {
        self.step
    }

    pub fn choose_date(&mut self, date: NaiveDate) -> Result<(), ScheduleError> {
        if self.step != ScheduleStep::Date {
            return Err(ScheduleError::OutOfOrder);
        }
        self.date = Some(date);
        self.step = ScheduleStep::Time;
        Ok(())
    }

    pub fn choose_time(&mut self, time: &str, slots: &[TimeSlot]) -> Result<(), ScheduleError> {
        if self.step != ScheduleStep::Time {
            return Err(ScheduleError::OutOfOrder);
        }
        let open = slots.iter().any(|slot| slot.available && slot.time == time);
        if !open {
            return Err(ScheduleError::SlotUnavailable(time.to_string()));
        }
        self.time = Some(time.to_string());
        self.step = ScheduleStep::Confirm;
        Ok(())
    }

    pub fn back(&mut self) {
        self.step = match self.step {
            ScheduleStep::Confirm => ScheduleStep::Time,
            _ => ScheduleStep::Date,
        };
    }

    pub fn confirm(self) -> Result<Appointment, ScheduleError> {
        if self.step != ScheduleStep::Confirm {
            return Err(ScheduleError::OutOfOrder);
        }
        let (Some(date), Some(time)) = (self.date, self.time) else {
            return Err(ScheduleError::OutOfOrder);
        };
        Ok(Appointment::booked(&self.therapist, date, time))
    }
}

#[derive(Clone)]
pub struct AppointmentBook {
    kv: Arc<dyn KeyValue>,
}

impl AppointmentBook {
    pub fn new(kv: Arc<dyn KeyValue>) -> Self {
        Self { kv }
    }

    /// Booked appointments in booking order. Absent or unreadable blob
    /// means no appointments.
    pub async fn upcoming(&self) -> Result<Vec<Appointment>, PersistenceError> {
        let Some(raw) = self.kv.get(APPOINTMENTS_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(list) => Ok(list),
            Err(err) => {
                warn!("Discarding unreadable appointments blob: {err}");
                Ok(Vec::new())
            }
        }
    }

    pub async fn book(&self, appointment: Appointment) -> Result<(), PersistenceError> {
        let mut list = self.upcoming().await?;
        list.push(appointment);
        self.write_all(&list).await
    }

    pub async fn cancel(&self, id: &str) -> Result<bool, PersistenceError> {
        let mut list = self.upcoming().await?;
        let before = list.len();
        list.retain(|appointment| appointment.id != id);
        if list.len() == before {
            return Ok(false);
        }
        self.write_all(&list).await?;
        Ok(true)
    }

    pub async fn clear_all(&self) -> Result<(), PersistenceError> {
        self.kv.delete(APPOINTMENTS_KEY).await
    }

    async fn write_all(&self, list: &[Appointment]) -> Result<(), PersistenceError> {
        let blob = serde_json::to_string(list)
            .map_err(|err| PersistenceError::Write(err.to_string()))?;
        self.kv.set(APPOINTMENTS_KEY, blob).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::appointment::{default_time_slots, therapist_roster};
    use crate::storage::testing::MemoryKv;

    fn draft() -> ScheduleDraft {
        ScheduleDraft::new(therapist_roster().remove(0))
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    #[test]
    fn wizard_walks_date_time_confirm() {
        let mut d = draft();
        assert_eq!(d.step(), ScheduleStep::Date);
        d.choose_date(monday()).unwrap();
        assert_eq!(d.step(), ScheduleStep::Time);
        d.choose_time("2:00 PM", &default_time_slots()).unwrap();
        assert_eq!(d.step(), ScheduleStep::Confirm);

        let appointment = d.confirm().unwrap();
        assert_eq!(appointment.date, monday());
        assert_eq!(appointment.time, "2:00 PM");
    }

    #[test]
    fn wizard_rejects_steps_out_of_order() {
        let mut d = draft();
        assert_eq!(
            d.choose_time("2:00 PM", &default_time_slots()),
            Err(ScheduleError::OutOfOrder)
        );
        assert_eq!(d.clone().confirm().unwrap_err(), ScheduleError::OutOfOrder);
        d.choose_date(monday()).unwrap();
        assert_eq!(d.choose_date(monday()), Err(ScheduleError::OutOfOrder));
    }

    #[test]
    fn wizard_rejects_unavailable_slots() {
        let mut d = draft();
        d.choose_date(monday()).unwrap();
        // 11:00 AM is marked unavailable in the slot table.
        assert_eq!(
            d.choose_time("11:00 AM", &default_time_slots()),
            Err(ScheduleError::SlotUnavailable("11:00 AM".into()))
        );
        assert_eq!(d.step(), ScheduleStep::Time);
    }

    #[test]
    fn back_returns_to_the_previous_step() {
        let mut d = draft();
        d.choose_date(monday()).unwrap();
        d.choose_time("9:00 AM", &default_time_slots()).unwrap();
        d.back();
        assert_eq!(d.step(), ScheduleStep::Time);
        d.back();
        assert_eq!(d.step(), ScheduleStep::Date);
    }

    #[tokio::test]
    async fn book_cancel_and_clear() {
        let kv = Arc::new(MemoryKv::default());
        let book = AppointmentBook::new(kv);

        let roster = therapist_roster();
        let a = Appointment::booked(&roster[0], monday(), "9:00 AM".into());
        let b = Appointment::booked(&roster[1], monday(), "1:00 PM".into());
        book.book(a.clone()).await.unwrap();
        book.book(b.clone()).await.unwrap();
        assert_eq!(book.upcoming().await.unwrap(), vec![a.clone(), b.clone()]);

        assert!(book.cancel(&a.id).await.unwrap());
        assert!(!book.cancel(&a.id).await.unwrap());
        assert_eq!(book.upcoming().await.unwrap(), vec![b]);

        book.clear_all().await.unwrap();
        assert!(book.upcoming().await.unwrap().is_empty());
    }
}
