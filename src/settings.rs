//! Process-wide configuration: one JSON file loaded at startup and handed
//! to whoever needs it through `AppState`. Carries no business logic.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::audio::AmbientSound;

/// UI color-scheme preference; the frontend resolves `System` against the
/// OS setting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ThemePreference {
    System,
    Light,
    Dark,
}

impl Default for ThemePreference {
    fn default() -> Self {
        ThemePreference::System
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AmbientSettings {
    pub enabled: bool,
    pub sound: AmbientSound,
    pub volume: f32,
}

impl Default for AmbientSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            sound: AmbientSound::default(),
            volume: 0.7,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub theme: ThemePreference,
    /// Pins the wellness backend to one base URL instead of probing the
    /// built-in endpoint list.
    pub server_url: Option<String>,
    pub ambient: AmbientSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn current(&self) -> UserSettings {
        self.data.read().unwrap().clone()
    }

    pub fn ambient(&self) -> AmbientSettings {
        self.data.read().unwrap().ambient.clone()
    }

    pub fn server_url(&self) -> Option<String> {
        self.data.read().unwrap().server_url.clone()
    }

    pub fn update(&self, settings: UserSettings) -> Result<()> {
        {
            let mut guard = self.data.write().unwrap();
            *guard = settings;
            self.persist(&guard)?;
        }
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
