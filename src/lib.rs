mod appointments;
mod audio;
mod health;
mod models;
mod moods;
mod remote;
mod sessions;
mod settings;
mod storage;
mod utils;

use std::sync::Arc;

use appointments::commands::{
    book_appointment, cancel_appointment, clear_appointments, get_appointments, get_therapists,
    get_time_slots,
};
use appointments::AppointmentBook;
use audio::{AmbientEngine, AmbientSound};
use health::commands::{
    clear_health_entries, delete_health_entry, get_health_entries, get_metric_series,
    save_health_entry,
};
use health::HealthLog;
use moods::commands::{analyze_mood, clear_mood_history, delete_mood_entry, get_mood_history};
use moods::MoodLog;
use remote::RemoteClient;
use sessions::commands::{
    cancel_session, create_session_plan, delete_session_plan, get_session_plans,
    get_session_state, pause_session, resume_session, start_session,
};
use sessions::{SessionPlans, SessionTimer};
use settings::{SettingsStore, UserSettings};
use storage::{KeyValue, SqliteKv};
use tauri::{Manager, State};

pub(crate) struct AppState {
    pub(crate) health: HealthLog,
    pub(crate) moods: MoodLog,
    pub(crate) appointments: AppointmentBook,
    pub(crate) plans: SessionPlans,
    pub(crate) timer: SessionTimer,
    pub(crate) audio: AmbientEngine,
    pub(crate) remote: RemoteClient,
    pub(crate) settings: Arc<SettingsStore>,
}

#[tauri::command]
fn start_ambient(sound: Option<AmbientSound>, state: State<AppState>) -> Result<String, String> {
    let sound = sound.unwrap_or_else(|| state.settings.ambient().sound);
    state.audio.start(sound)?;
    state.audio.set_volume(state.settings.ambient().volume)?;
    Ok("Ambient audio started".to_string())
}

#[tauri::command]
fn stop_ambient(state: State<AppState>) -> Result<String, String> {
    state.audio.stop()?;
    Ok("Ambient audio stopped".to_string())
}

#[tauri::command]
fn toggle_ambient_pause(state: State<AppState>) -> Result<bool, String> {
    if state.audio.is_paused() {
        state.audio.resume()?;
        Ok(false)
    } else {
        state.audio.pause()?;
        Ok(true)
    }
}

#[tauri::command]
fn set_ambient_volume(volume: f32, state: State<AppState>) -> Result<String, String> {
    state.audio.set_volume(volume)?;
    Ok(format!("Volume set to {}", volume))
}

#[tauri::command]
fn get_settings(state: State<AppState>) -> Result<UserSettings, String> {
    Ok(state.settings.current())
}

/// A changed `server_url` takes effect on the next launch; the ambient
/// volume is applied to the live sink immediately.
#[tauri::command]
fn update_settings(settings: UserSettings, state: State<AppState>) -> Result<(), String> {
    let volume = settings.ambient.volume;
    state
        .settings
        .update(settings)
        .map_err(|e| e.to_string())?;
    state.audio.set_volume(volume)?;
    Ok(())
}

#[tauri::command]
async fn send_chat_message(state: State<'_, AppState>, message: String) -> Result<String, String> {
    state
        .remote
        .send_chat_message(&message)
        .await
        .map_err(|e| e.to_string())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Calmify starting up...");

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let result = (|| -> anyhow::Result<()> {
                let app_data_dir = app
                    .path()
                    .app_data_dir()
                    .map_err(|err| anyhow::anyhow!(err))?;
                std::fs::create_dir_all(&app_data_dir)?;

                let db_path = app_data_dir.join("calmify.sqlite3");
                let kv: Arc<dyn KeyValue> = Arc::new(SqliteKv::open(db_path)?);

                let settings_path = app_data_dir.join("settings.json");
                let settings = Arc::new(SettingsStore::new(settings_path)?);

                let plans = SessionPlans::new(kv.clone());
                let audio = AmbientEngine::new();
                let timer = SessionTimer::new(
                    app.handle().clone(),
                    plans.clone(),
                    audio.clone(),
                    settings.clone(),
                );

                app.manage(AppState {
                    health: HealthLog::new(kv.clone()),
                    moods: MoodLog::new(kv.clone()),
                    appointments: AppointmentBook::new(kv.clone()),
                    plans,
                    timer,
                    audio,
                    remote: RemoteClient::new(settings.server_url()),
                    settings,
                });

                Ok(())
            })();

            result.map_err(|err| err.into())
        })
        .invoke_handler(tauri::generate_handler![
            save_health_entry,
            get_health_entries,
            delete_health_entry,
            clear_health_entries,
            get_metric_series,
            analyze_mood,
            get_mood_history,
            delete_mood_entry,
            clear_mood_history,
            get_therapists,
            get_time_slots,
            book_appointment,
            get_appointments,
            cancel_appointment,
            clear_appointments,
            get_session_plans,
            create_session_plan,
            delete_session_plan,
            start_session,
            pause_session,
            resume_session,
            cancel_session,
            get_session_state,
            start_ambient,
            stop_ambient,
            toggle_ambient_pause,
            set_ambient_volume,
            get_settings,
            update_settings,
            send_chat_message,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
