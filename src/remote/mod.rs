//! Thin clients for the external wellness backend: stress prediction,
//! emotion detection, and the chat service. Plain request/response over
//! an opaque JSON contract; no retry, caching, or session management
//! here beyond probing the known dev-network endpoints in order.

use std::time::Duration;

use log::warn;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::health_entry::{level_for_label, HealthEntry, StressAssessment};

/// Base URLs probed in order when no server override is configured:
/// the dev-network host, the Android-emulator loopback, then localhost.
const DEFAULT_ENDPOINTS: &[&str] = &[
    "http://192.168.204.181:5000",
    "http://10.0.2.2:5000",
    "http://localhost:5000",
];

const REQUEST_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("could not reach the wellness backend on any known endpoint")]
    Unreachable,
    #[error("backend rejected the request: {0}")]
    Rejected(String),
    #[error("backend returned an unreadable response: {0}")]
    BadResponse(String),
}

#[derive(Clone)]
pub struct RemoteClient {
    http: Client,
    base_urls: Vec<String>,
}

impl RemoteClient {
    /// A configured `server_url` pins one base URL; otherwise the default
    /// endpoint list is probed per request.
    pub fn new(server_url: Option<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        let base_urls = match server_url {
            Some(url) => vec![url.trim_end_matches('/').to_string()],
            None => DEFAULT_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
        };

        Self { http, base_urls }
    }

    /// POST the entry's readings to `/predict` and normalise whatever
    /// shape the backend answers with into a [`StressAssessment`].
    pub async fn predict_stress(
        &self,
        entry: &HealthEntry,
    ) -> Result<StressAssessment, RemoteError> {
        let body = PredictRequest {
            heart_rate: entry.heart_rate,
            sleep_hours: entry.sleep_hours,
            snoring_rate: entry.snoring_rate,
        };
        let response: PredictResponse = self.post_json("predict", &body).await?;
        response.into_assessment()
    }

    /// POST a captured frame to `/detect_emotion` as multipart form data.
    pub async fn detect_emotion(&self, image: Vec<u8>) -> Result<EmotionDetection, RemoteError> {
        for base in &self.base_urls {
            let part = Part::bytes(image.clone())
                .file_name("photo.jpg")
                .mime_str("image/jpeg")
                .map_err(|err| RemoteError::BadResponse(err.to_string()))?;
            let form = Form::new().part("image", part);
            let url = format!("{base}/detect_emotion");

            match self.http.post(&url).multipart(form).send().await {
                Ok(response) => return read_response(response).await,
                Err(err) if err.is_connect() || err.is_timeout() => {
                    warn!("Failed to connect to {url}: {err}");
                    continue;
                }
                Err(err) => return Err(RemoteError::BadResponse(err.to_string())),
            }
        }
        Err(RemoteError::Unreachable)
    }

    /// POST one user message to `/chat`, returning the bot's reply.
    pub async fn send_chat_message(&self, message: &str) -> Result<String, RemoteError> {
        let response: ChatResponse = self
            .post_json("chat", &ChatRequest { message })
            .await?;
        Ok(response.response)
    }

    async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, RemoteError> {
        for base in &self.base_urls {
            let url = format!("{base}/{path}");
            match self.http.post(&url).json(body).send().await {
                Ok(response) => return read_response(response).await,
                Err(err) if err.is_connect() || err.is_timeout() => {
                    warn!("Failed to connect to {url}: {err}");
                    continue;
                }
                Err(err) => return Err(RemoteError::BadResponse(err.to_string())),
            }
        }
        Err(RemoteError::Unreachable)
    }
}

async fn read_response<R: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<R, RemoteError> {
    if response.status().is_success() {
        return response
            .json::<R>()
            .await
            .map_err(|err| RemoteError::BadResponse(err.to_string()));
    }

    let status = response.status();
    let detail = match response.json::<BackendError>().await {
        Ok(body) => body.message(),
        Err(_) => status.to_string(),
    };
    Err(RemoteError::Rejected(detail))
}

// ── Wire types ──────────────────────────────────────────────────────────

/// Request body for `/predict`.
#[derive(Serialize)]
struct PredictRequest {
    heart_rate: f64,
    sleep_hours: f64,
    snoring_rate: f64,
}

/// `stress_level` has been both a numeric code and a display label across
/// backend revisions.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StressLevelField {
    Code(u8),
    Label(String),
}

/// Response body from `/predict`, tolerant of every observed revision.
#[derive(Debug, Default, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    stress_level: Option<StressLevelField>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    prediction: Option<f64>,
}

impl PredictResponse {
    fn into_assessment(self) -> Result<StressAssessment, RemoteError> {
        let level = match &self.stress_level {
            Some(StressLevelField::Code(code)) => *code,
            Some(StressLevelField::Label(label)) => level_for_label(label),
            None => match self.prediction {
                Some(score) => score.round().clamp(0.0, 4.0) as u8,
                None => {
                    return Err(RemoteError::BadResponse(
                        "prediction response carried no stress fields".into(),
                    ))
                }
            },
        };
        Ok(StressAssessment::from_level(level, self.confidence))
    }
}

/// Response body from `/detect_emotion`.
#[derive(Debug, Clone, Deserialize)]
pub struct EmotionDetection {
    pub emotion: String,
    pub confidence: f64,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    response: String,
}

/// Error body the backend sends with non-2xx statuses.
#[derive(Deserialize)]
struct BackendError {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

impl BackendError {
    fn message(self) -> String {
        self.error
            .or(self.details)
            .unwrap_or_else(|| "unknown backend error".into())
    }
}
