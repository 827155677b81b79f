use chrono::NaiveDate;
use tauri::State;

use crate::{
    appointments::ScheduleDraft,
    models::{
        appointment::{default_time_slots, therapist_roster},
        Appointment, Therapist, TimeSlot,
    },
    AppState,
};

#[tauri::command]
pub fn get_therapists() -> Vec<Therapist> {
    therapist_roster()
}

#[tauri::command]
pub fn get_time_slots() -> Vec<TimeSlot> {
    default_time_slots()
}

#[tauri::command]
pub async fn book_appointment(
    state: State<'_, AppState>,
    therapist_id: String,
    date: NaiveDate,
    time: String,
) -> Result<Appointment, String> {
    let therapist = therapist_roster()
        .into_iter()
        .find(|t| t.id == therapist_id)
        .ok_or_else(|| format!("unknown therapist '{therapist_id}'"))?;

    let mut draft = ScheduleDraft::new(therapist);
    draft.choose_date(date).map_err(|e| e.to_string())?;
    draft
        .choose_time(&time, &default_time_slots())
        .map_err(|e| e.to_string())?;
    let appointment = draft.confirm().map_err(|e| e.to_string())?;

    state
        .appointments
        .book(appointment.clone())
        .await
        .map_err(|e| e.to_string())?;
    Ok(appointment)
}

#[tauri::command]
pub async fn get_appointments(state: State<'_, AppState>) -> Result<Vec<Appointment>, String> {
    state.appointments.upcoming().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn cancel_appointment(
    state: State<'_, AppState>,
    appointment_id: String,
) -> Result<bool, String> {
    state
        .appointments
        .cancel(&appointment_id)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn clear_appointments(state: State<'_, AppState>) -> Result<(), String> {
    state
        .appointments
        .clear_all()
        .await
        .map_err(|e| e.to_string())
}
