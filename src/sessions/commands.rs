use tauri::State;

use crate::{models::SessionPlan, AppState};

use super::SessionSnapshot;

#[tauri::command]
pub async fn get_session_plans(state: State<'_, AppState>) -> Result<Vec<SessionPlan>, String> {
    state.plans.list().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn create_session_plan(
    state: State<'_, AppState>,
    title: String,
    duration_min: u32,
    schedule: String,
) -> Result<SessionPlan, String> {
    let plan = SessionPlan::new(title, duration_min, schedule);
    state
        .plans
        .create(plan.clone())
        .await
        .map_err(|e| e.to_string())?;
    Ok(plan)
}

#[tauri::command]
pub async fn delete_session_plan(
    state: State<'_, AppState>,
    plan_id: String,
) -> Result<bool, String> {
    state.plans.remove(&plan_id).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn start_session(
    state: State<'_, AppState>,
    plan_id: String,
) -> Result<SessionSnapshot, String> {
    state.timer.start(plan_id).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn pause_session(state: State<'_, AppState>) -> Result<SessionSnapshot, String> {
    state.timer.pause().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn resume_session(state: State<'_, AppState>) -> Result<SessionSnapshot, String> {
    state.timer.resume().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn cancel_session(state: State<'_, AppState>) -> Result<(), String> {
    state.timer.cancel().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_session_state(state: State<'_, AppState>) -> Result<SessionSnapshot, String> {
    Ok(state.timer.snapshot().await)
}
