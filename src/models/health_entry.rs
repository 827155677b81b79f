use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// One submitted measurement snapshot.
///
/// Immutable once created, except for the one-time attachment of the
/// stress assessment returned by the prediction backend. Older app
/// revisions persisted only the first three readings (and no id), so
/// everything added since deserializes with a default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthEntry {
    #[serde(default = "new_entry_id")]
    pub id: String,
    pub heart_rate: f64,
    pub sleep_hours: f64,
    pub snoring_rate: f64,
    #[serde(default)]
    pub respiration_rate: Option<f64>,
    #[serde(default)]
    pub body_temperature: Option<f64>,
    #[serde(default)]
    pub blood_oxygen: Option<f64>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub stress: Option<StressAssessment>,
}

fn new_entry_id() -> String {
    Uuid::new_v4().to_string()
}

impl HealthEntry {
    /// Attach the prediction result. Call once, right after the remote
    /// call succeeds and before the entry is appended.
    pub fn with_assessment(mut self, assessment: StressAssessment) -> Self {
        self.stress = Some(assessment);
        self
    }
}

/// Classification attached after the remote prediction call: a discrete
/// stress code 0-4 with its display label, plus the model's confidence
/// when the backend reports one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StressAssessment {
    pub level: u8,
    pub label: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl StressAssessment {
    pub fn from_level(level: u8, confidence: Option<f64>) -> Self {
        let level = level.min(4);
        Self {
            level,
            label: label_for_level(level).to_string(),
            confidence,
        }
    }
}

pub fn label_for_level(level: u8) -> &'static str {
    match level {
        0 => "Calm",
        1 => "Low",
        2 => "Moderate",
        3 => "High",
        _ => "Very High",
    }
}

/// Maps a backend stress label back onto the 0-4 code. Unrecognised
/// labels land on the middle of the scale.
pub fn level_for_label(label: &str) -> u8 {
    match label.trim().to_ascii_lowercase().as_str() {
        "calm" | "relaxed" => 0,
        "low" | "low stress" => 1,
        "moderate" | "medium" | "normal" => 2,
        "high" | "high stress" => 3,
        "very high" | "severe" => 4,
        _ => 2,
    }
}

/// Raw form text as typed on the health screen. An entry is only
/// constructed once every required field parses as a finite number.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthForm {
    pub heart_rate: String,
    pub sleep_hours: String,
    pub snoring_rate: String,
    #[serde(default)]
    pub respiration_rate: String,
    #[serde(default)]
    pub body_temperature: String,
    #[serde(default)]
    pub blood_oxygen: String,
}

impl HealthForm {
    pub fn into_entry(self, timestamp: DateTime<Utc>) -> Result<HealthEntry, ValidationError> {
        Ok(HealthEntry {
            id: new_entry_id(),
            heart_rate: required_number("heartRate", &self.heart_rate)?,
            sleep_hours: required_number("sleepHours", &self.sleep_hours)?,
            snoring_rate: required_number("snoringRate", &self.snoring_rate)?,
            respiration_rate: optional_number("respirationRate", &self.respiration_rate)?,
            body_temperature: optional_number("bodyTemperature", &self.body_temperature)?,
            blood_oxygen: optional_number("bloodOxygen", &self.blood_oxygen)?,
            timestamp,
            stress: None,
        })
    }
}

fn required_number(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing { field });
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::NotANumber {
            field,
            raw: raw.to_string(),
        }),
    }
}

fn optional_number(field: &'static str, raw: &str) -> Result<Option<f64>, ValidationError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    required_number(field, raw).map(Some)
}

/// Malformed or missing user input. Raised while building an entry from
/// form text; never reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} is not a valid number: '{raw}'")]
    NotANumber { field: &'static str, raw: String },
}

/// Selects which reading `recent_window` projects into a chart series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MetricField {
    HeartRate,
    SleepHours,
    SnoringRate,
    RespirationRate,
    BodyTemperature,
    BloodOxygen,
    StressLevel,
}

impl MetricField {
    pub fn value_of(&self, entry: &HealthEntry) -> Option<f64> {
        match self {
            MetricField::HeartRate => Some(entry.heart_rate),
            MetricField::SleepHours => Some(entry.sleep_hours),
            MetricField::SnoringRate => Some(entry.snoring_rate),
            MetricField::RespirationRate => entry.respiration_rate,
            MetricField::BodyTemperature => entry.body_temperature,
            MetricField::BloodOxygen => entry.blood_oxygen,
            MetricField::StressLevel => entry.stress.as_ref().map(|s| f64::from(s.level)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn filled_form() -> HealthForm {
        HealthForm {
            heart_rate: "72".into(),
            sleep_hours: "7.5".into(),
            snoring_rate: "12".into(),
            ..HealthForm::default()
        }
    }

    #[test]
    fn form_parses_required_fields() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let entry = filled_form().into_entry(ts).expect("valid form");
        assert_eq!(entry.heart_rate, 72.0);
        assert_eq!(entry.sleep_hours, 7.5);
        assert_eq!(entry.snoring_rate, 12.0);
        assert_eq!(entry.timestamp, ts);
        assert!(entry.respiration_rate.is_none());
        assert!(entry.stress.is_none());
    }

    #[test]
    fn blank_required_field_is_rejected() {
        let mut form = filled_form();
        form.sleep_hours = "  ".into();
        let err = form.into_entry(Utc::now()).unwrap_err();
        assert_eq!(err, ValidationError::Missing { field: "sleepHours" });
    }

    #[test]
    fn non_numeric_input_is_rejected() {
        let mut form = filled_form();
        form.heart_rate = "seventy".into();
        match form.into_entry(Utc::now()).unwrap_err() {
            ValidationError::NotANumber { field, raw } => {
                assert_eq!(field, "heartRate");
                assert_eq!(raw, "seventy");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let mut form = filled_form();
        form.snoring_rate = "NaN".into();
        assert!(form.into_entry(Utc::now()).is_err());
    }

    #[test]
    fn optional_vitals_parse_when_present() {
        let mut form = filled_form();
        form.blood_oxygen = "97.2".into();
        let entry = form.into_entry(Utc::now()).unwrap();
        assert_eq!(entry.blood_oxygen, Some(97.2));
    }

    #[test]
    fn entry_round_trips_through_json() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 22, 15, 30).unwrap();
        let entry = filled_form()
            .into_entry(ts)
            .unwrap()
            .with_assessment(StressAssessment::from_level(3, Some(0.91)));
        let json = serde_json::to_string(&entry).unwrap();
        let back: HealthEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn old_schema_blob_still_loads() {
        // Shape written by the first app revision: three readings, no id,
        // no vitals, no assessment.
        let json = r#"{
            "heartRate": 68,
            "sleepHours": 8,
            "snoringRate": 4,
            "timestamp": "2024-01-01T08:00:00Z"
        }"#;
        let entry: HealthEntry = serde_json::from_str(json).unwrap();
        assert!(!entry.id.is_empty());
        assert_eq!(entry.heart_rate, 68.0);
        assert!(entry.body_temperature.is_none());
        assert!(entry.stress.is_none());
    }

    #[test]
    fn stress_labels_round_trip() {
        for level in 0..=4 {
            assert_eq!(level_for_label(label_for_level(level)), level);
        }
        assert_eq!(level_for_label("something else"), 2);
    }

    #[test]
    fn assessment_clamps_out_of_range_codes() {
        let assessment = StressAssessment::from_level(9, None);
        assert_eq!(assessment.level, 4);
        assert_eq!(assessment.label, "Very High");
    }

    #[test]
    fn field_selector_skips_absent_vitals() {
        let entry = filled_form().into_entry(Utc::now()).unwrap();
        assert_eq!(MetricField::HeartRate.value_of(&entry), Some(72.0));
        assert_eq!(MetricField::BloodOxygen.value_of(&entry), None);
        assert_eq!(MetricField::StressLevel.value_of(&entry), None);
    }
}
