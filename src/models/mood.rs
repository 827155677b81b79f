use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Emotion classes reported by the detection backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Emotion {
    Angry,
    Disgust,
    Fear,
    Happy,
    Sad,
    Surprise,
    Neutral,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Angry => "Angry",
            Emotion::Disgust => "Disgust",
            Emotion::Fear => "Fear",
            Emotion::Happy => "Happy",
            Emotion::Sad => "Sad",
            Emotion::Surprise => "Surprise",
            Emotion::Neutral => "Neutral",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "angry" => Some(Emotion::Angry),
            "disgust" => Some(Emotion::Disgust),
            "fear" => Some(Emotion::Fear),
            "happy" => Some(Emotion::Happy),
            "sad" => Some(Emotion::Sad),
            "surprise" => Some(Emotion::Surprise),
            "neutral" => Some(Emotion::Neutral),
            _ => None,
        }
    }

    /// Stress scale used by the detector backend: 1 (low) to 5 (very high).
    pub fn stress_level(&self) -> u8 {
        match self {
            Emotion::Angry => 5,
            Emotion::Disgust | Emotion::Fear => 4,
            Emotion::Sad => 3,
            Emotion::Surprise | Emotion::Neutral => 2,
            Emotion::Happy => 1,
        }
    }
}

/// Advisory text shown next to a detected stress level.
pub fn stress_note(level: u8) -> &'static str {
    match level {
        1 => "Low stress - Good emotional state",
        2 => "Moderate stress - Normal range",
        3 => "Elevated stress - Consider taking a break",
        4 => "High stress - Recommended to practice stress management",
        5 => "Very high stress - Consider seeking support",
        _ => "Unknown stress level",
    }
}

/// One mood-camera capture with its detection result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    #[serde(default = "new_mood_id")]
    pub id: String,
    pub emotion: Emotion,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    pub stress_level: u8,
    pub notes: String,
    #[serde(default)]
    pub image_path: Option<String>,
}

fn new_mood_id() -> String {
    Uuid::new_v4().to_string()
}

impl MoodEntry {
    pub fn detected(
        emotion: Emotion,
        confidence: f64,
        image_path: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let stress_level = emotion.stress_level();
        Self {
            id: new_mood_id(),
            emotion,
            confidence,
            timestamp,
            stress_level,
            notes: stress_note(stress_level).to_string(),
            image_path,
        }
    }
}
