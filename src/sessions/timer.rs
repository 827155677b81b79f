use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tauri::{AppHandle, Emitter};
use tokio::{sync::Mutex, task::JoinHandle, time};

use crate::audio::AmbientEngine;
use crate::log_info;
use crate::settings::SettingsStore;

use super::clock::{SessionClock, SessionPhase};
use super::plans::SessionPlans;

const ENABLE_LOGS: bool = false;

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub clock: SessionClock,
    pub remaining_ms: i64,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct SessionCompletedEvent {
    plan_id: String,
    completed_at: DateTime<Utc>,
}

/// Drives one relaxation session at a time: owns the countdown clock,
/// starts and stops the ambient soundscape, and emits tick/state events
/// the UI renders. One ticker task exists while a session is active.
#[derive(Clone)]
pub struct SessionTimer {
    clock: Arc<Mutex<SessionClock>>,
    plans: SessionPlans,
    audio: AmbientEngine,
    settings: Arc<SettingsStore>,
    app_handle: AppHandle,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
}

impl SessionTimer {
    pub fn new(
        app_handle: AppHandle,
        plans: SessionPlans,
        audio: AmbientEngine,
        settings: Arc<SettingsStore>,
    ) -> Self {
        Self {
            clock: Arc::new(Mutex::new(SessionClock::new())),
            plans,
            audio,
            settings,
            app_handle,
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: Duration::from_secs(1),
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let mut guard = self.clock.lock().await;
        guard.sync_active_from_anchor();
        SessionSnapshot {
            remaining_ms: guard.remaining_ms(),
            clock: guard.clone(),
        }
    }

    pub async fn start(&self, plan_id: String) -> Result<SessionSnapshot> {
        let plan = self
            .plans
            .get(&plan_id)
            .await?
            .ok_or_else(|| anyhow!("unknown session plan '{plan_id}'"))?;

        {
            let mut clock = self.clock.lock().await;
            if clock.phase != SessionPhase::Idle {
                return Err(anyhow!("a session is already active"));
            }
            clock.start(plan.id.clone(), plan.duration_ms(), Utc::now(), Instant::now());
        }

        let ambient = self.settings.ambient();
        if ambient.enabled {
            self.audio.start(ambient.sound).map_err(|e| anyhow!(e))?;
            self.audio
                .set_volume(ambient.volume)
                .map_err(|e| anyhow!(e))?;
        }

        self.spawn_ticker().await;
        self.emit_state().await;
        Ok(self.snapshot().await)
    }

    pub async fn pause(&self) -> Result<SessionSnapshot> {
        {
            let mut clock = self.clock.lock().await;
            if clock.phase != SessionPhase::Running {
                return Err(anyhow!("no running session to pause"));
            }
            clock.pause();
        }
        self.audio.pause().map_err(|e| anyhow!(e))?;
        self.emit_state().await;
        Ok(self.snapshot().await)
    }

    pub async fn resume(&self) -> Result<SessionSnapshot> {
        {
            let mut clock = self.clock.lock().await;
            if clock.phase != SessionPhase::Paused {
                return Err(anyhow!("no paused session to resume"));
            }
            clock.resume(Instant::now());
        }
        self.audio.resume().map_err(|e| anyhow!(e))?;
        self.emit_state().await;
        Ok(self.snapshot().await)
    }

    /// Abandon the active session without crediting a completion.
    pub async fn cancel(&self) -> Result<()> {
        {
            let mut clock = self.clock.lock().await;
            if clock.phase == SessionPhase::Idle {
                return Ok(());
            }
            clock.reset();
        }
        self.audio.stop().map_err(|e| anyhow!(e))?;
        self.cancel_ticker().await;
        self.emit_state().await;
        Ok(())
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let clock = self.clock.clone();
        let plans = self.plans.clone();
        let audio = self.audio.clone();
        let app_handle = self.app_handle.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            loop {
                interval.tick().await;

                let (snapshot, phase) = {
                    let mut guard = clock.lock().await;
                    guard.sync_active_from_anchor();
                    let snapshot = SessionSnapshot {
                        remaining_ms: guard.remaining_ms(),
                        clock: guard.clone(),
                    };
                    (snapshot, guard.phase)
                };

                match phase {
                    SessionPhase::Idle => break,
                    SessionPhase::Paused => continue,
                    SessionPhase::Running => {}
                }

                log_info!("Session tick, {} ms remaining", snapshot.remaining_ms);
                let _ = app_handle.emit("session-tick", snapshot.clone());

                if snapshot.remaining_ms > 0 {
                    continue;
                }

                // Countdown exhausted: credit the plan, swap the ambient
                // bed for the completion chime, and go idle.
                let plan_id = {
                    let mut guard = clock.lock().await;
                    let plan_id = guard.plan_id.clone();
                    guard.reset();
                    plan_id
                };

                let _ = audio.stop();
                let _ = audio.chime();

                if let Some(plan_id) = plan_id {
                    if let Err(err) = plans.record_completion(&plan_id).await {
                        log::error!("Failed to record session completion: {err}");
                    }
                    let _ = app_handle.emit(
                        "session-complete",
                        SessionCompletedEvent {
                            plan_id,
                            completed_at: Utc::now(),
                        },
                    );
                }

                emit_session_state(&app_handle, &clock).await;
                break;
            }
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    async fn emit_state(&self) {
        emit_session_state(&self.app_handle, &self.clock).await;
    }
}

async fn emit_session_state(app_handle: &AppHandle, clock: &Arc<Mutex<SessionClock>>) {
    let snapshot = {
        let mut guard = clock.lock().await;
        guard.sync_active_from_anchor();
        SessionSnapshot {
            remaining_ms: guard.remaining_ms(),
            clock: guard.clone(),
        }
    };
    let _ = app_handle.emit("session-state-changed", snapshot);
}
