//! Client for the `/predict` endpoint of the iris classification service.

use std::io;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, PredictorConfig};
use crate::http_client;
use crate::measurements::MeasurementSet;

pub const PREDICT_PATH: &str = "/predict";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Four feature values in wire order, all finite.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PredictionRequest {
    features: [f64; 4],
}

/// A raw feature value was NaN or infinite.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("Feature {index} is not a finite number: {value}")]
pub struct NonFiniteFeature {
    pub index: usize,
    pub value: f64,
}

impl PredictionRequest {
    /// Build a request from raw values, failing fast on NaN or infinity.
    pub fn new(features: [f64; 4]) -> Result<Self, NonFiniteFeature> {
        if let Some((index, &value)) = features
            .iter()
            .enumerate()
            .find(|(_, value)| !value.is_finite())
        {
            return Err(NonFiniteFeature { index, value });
        }
        Ok(Self { features })
    }

    pub fn features(&self) -> [f64; 4] {
        self.features
    }
}

impl From<&MeasurementSet> for PredictionRequest {
    fn from(measurements: &MeasurementSet) -> Self {
        // Stored measurements are always finite and in domain.
        Self {
            features: measurements.values(),
        }
    }
}

/// Species label and confidence (percentage scale) returned by the service.
#[derive(Clone, Debug, PartialEq)]
pub struct PredictionResult {
    pub species: String,
    pub confidence: f64,
}

/// Classified failure of a prediction exchange.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum PredictError {
    #[error(
        "Request timed out after {timeout_ms} ms - please check that the prediction service is running"
    )]
    Timeout { timeout_ms: u64 },
    #[error("Network error - unable to connect to the prediction service at {address}")]
    NetworkUnavailable { address: String },
    /// The service answered with a non-2xx status.
    #[error("{message}")]
    Service { status: u16, message: String },
    #[error("Malformed prediction response: {0}")]
    MalformedResponse(String),
    #[error("Failed to connect to prediction service: {0}")]
    UnknownTransport(String),
}

impl PredictError {
    /// Short machine-friendly name of the failure class, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::NetworkUnavailable { .. } => "network_unavailable",
            Self::Service { .. } => "service",
            Self::MalformedResponse(_) => "malformed_response",
            Self::UnknownTransport(_) => "unknown_transport",
        }
    }
}

/// Anything able to answer a prediction request.
pub trait PredictionService: Send + Sync {
    /// Perform exactly one exchange; no retries.
    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, PredictError>;
}

/// Blocking HTTP implementation of [`PredictionService`].
#[derive(Debug, Clone)]
pub struct HttpPredictionClient {
    agent: ureq::Agent,
    endpoint: String,
    address: String,
    timeout: Duration,
    max_response_bytes: usize,
}

impl HttpPredictionClient {
    pub fn new(config: &PredictorConfig) -> Result<Self, ConfigError> {
        let config = config.clone().validated()?;
        Ok(Self {
            agent: http_client::agent(config.timeout()),
            endpoint: config.endpoint_url(PREDICT_PATH)?,
            address: config.service_address()?,
            timeout: config.timeout(),
            max_response_bytes: config.max_response_bytes,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn timeout_error(&self) -> PredictError {
        PredictError::Timeout {
            timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    fn classify_transport(&self, err: &ureq::Transport) -> PredictError {
        if http_client::is_timeout(err) {
            return self.timeout_error();
        }
        match err.kind() {
            ureq::ErrorKind::Dns | ureq::ErrorKind::ConnectionFailed => {
                PredictError::NetworkUnavailable {
                    address: self.address.clone(),
                }
            }
            _ => PredictError::UnknownTransport(non_blank(err.to_string())),
        }
    }

    fn classify_body_error(&self, err: &io::Error) -> PredictError {
        if http_client::is_timeout(err) {
            return self.timeout_error();
        }
        match err.kind() {
            io::ErrorKind::InvalidData => PredictError::MalformedResponse(err.to_string()),
            _ => PredictError::UnknownTransport(non_blank(err.to_string())),
        }
    }
}

impl PredictionService for HttpPredictionClient {
    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, PredictError> {
        tracing::info!(
            method = "POST",
            target = %self.endpoint,
            payload = ?request.features(),
            "Sending prediction request"
        );
        let response = match self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", JSON_CONTENT_TYPE)
            .set("Accept", JSON_CONTENT_TYPE)
            .send_json(request)
        {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                let body = http_client::read_response_text(response, self.max_response_bytes)
                    .unwrap_or_default();
                tracing::warn!(status, payload = %body, "Prediction service returned an error");
                return Err(map_status_error(status, &body));
            }
            Err(ureq::Error::Transport(err)) => {
                let classified = self.classify_transport(&err);
                tracing::warn!(kind = classified.kind(), "Prediction request failed: {err}");
                return Err(classified);
            }
        };

        let status = response.status();
        let body = http_client::read_response_text(response, self.max_response_bytes)
            .map_err(|err| self.classify_body_error(&err))
            .inspect_err(|err| tracing::warn!(status, kind = err.kind(), "{err}"))?;
        tracing::info!(status, payload = %body, "Prediction response received");
        if !(200..300).contains(&status) {
            return Err(map_status_error(status, &body));
        }
        parse_prediction_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct PredictionResponseWire {
    species: Option<String>,
    confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponseWire {
    error: Option<String>,
}

fn parse_prediction_response(body: &str) -> Result<PredictionResult, PredictError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(PredictError::MalformedResponse("Empty response body".to_string()));
    }
    let parsed: PredictionResponseWire = serde_json::from_str(trimmed)
        .map_err(|err| PredictError::MalformedResponse(format!("{err}: {trimmed}")))?;
    match (parsed.species, parsed.confidence) {
        (Some(species), Some(confidence)) if !species.trim().is_empty() => Ok(PredictionResult {
            species,
            confidence,
        }),
        (species, confidence) => Err(PredictError::MalformedResponse(format!(
            "Missing species/confidence in response (species={species:?}, confidence={confidence:?})"
        ))),
    }
}

fn map_status_error(status: u16, body: &str) -> PredictError {
    let message = serde_json::from_str::<ErrorResponseWire>(body.trim())
        .ok()
        .and_then(|wire| wire.error)
        .map(|error| error.trim().to_string())
        .filter(|error| !error.is_empty())
        .unwrap_or_else(|| format!("Server error: {status}"));
    PredictError::Service { status, message }
}

fn non_blank(message: String) -> String {
    if message.trim().is_empty() {
        "unexpected transport failure".to_string()
    } else {
        message
    }
}
