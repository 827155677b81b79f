use chrono::Utc;
use tauri::State;

use crate::{
    models::{Emotion, MoodEntry},
    AppState,
};

/// Send a captured frame to the emotion backend and record the result.
/// The UI owns the camera; the backend only sees the saved image file.
#[tauri::command]
pub async fn analyze_mood(
    state: State<'_, AppState>,
    image_path: String,
) -> Result<MoodEntry, String> {
    let image = tokio::fs::read(&image_path)
        .await
        .map_err(|e| format!("failed to read capture {image_path}: {e}"))?;

    let detection = state
        .remote
        .detect_emotion(image)
        .await
        .map_err(|e| e.to_string())?;

    let emotion = Emotion::from_label(&detection.emotion)
        .ok_or_else(|| format!("backend returned unknown emotion '{}'", detection.emotion))?;

    let entry = MoodEntry::detected(
        emotion,
        detection.confidence,
        Some(image_path),
        Utc::now(),
    );
    state
        .moods
        .record(entry.clone())
        .await
        .map_err(|e| e.to_string())?;
    Ok(entry)
}

#[tauri::command]
pub async fn get_mood_history(state: State<'_, AppState>) -> Result<Vec<MoodEntry>, String> {
    state.moods.history().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn delete_mood_entry(
    state: State<'_, AppState>,
    entry_id: String,
) -> Result<bool, String> {
    state
        .moods
        .remove_one(&entry_id)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn clear_mood_history(state: State<'_, AppState>) -> Result<(), String> {
    state.moods.clear_all().await.map_err(|e| e.to_string())
}
