use chrono::Utc;
use tauri::State;

use crate::{
    health::{SeriesPoint, WindowOrder},
    models::{HealthEntry, HealthForm, MetricField},
    AppState,
};

/// Validate the form, classify it against the prediction backend, then
/// persist. The entry is only constructed once every required field
/// parses, and only persisted once the classification call succeeds.
#[tauri::command]
pub async fn save_health_entry(
    state: State<'_, AppState>,
    form: HealthForm,
) -> Result<HealthEntry, String> {
    let entry = form.into_entry(Utc::now()).map_err(|e| e.to_string())?;
    let assessment = state
        .remote
        .predict_stress(&entry)
        .await
        .map_err(|e| e.to_string())?;
    let entry = entry.with_assessment(assessment);
    state
        .health
        .append(entry.clone())
        .await
        .map_err(|e| e.to_string())?;
    Ok(entry)
}

#[tauri::command]
pub async fn get_health_entries(state: State<'_, AppState>) -> Result<Vec<HealthEntry>, String> {
    state.health.load_all().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn delete_health_entry(
    state: State<'_, AppState>,
    entry_id: String,
) -> Result<bool, String> {
    state
        .health
        .remove_one(&entry_id)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn clear_health_entries(state: State<'_, AppState>) -> Result<(), String> {
    state.health.clear_all().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_metric_series(
    state: State<'_, AppState>,
    count: usize,
    field: MetricField,
    newest_first: Option<bool>,
) -> Result<Vec<SeriesPoint>, String> {
    let order = if newest_first.unwrap_or(false) {
        WindowOrder::NewestFirst
    } else {
        WindowOrder::Chronological
    };
    state
        .health
        .recent_window(count, field, order)
        .await
        .map_err(|e| e.to_string())
}
