//! Iris species prediction client: measurements, request orchestration and
//! classified transport errors for a remote KNN classification service.
/// Application directory resolution.
pub mod app_dirs;
/// Predictor settings loaded from TOML.
pub mod config;
mod http_client;
/// Tracing subscriber setup.
pub mod logging;
/// Bounded flower measurements.
pub mod measurements;
/// Prediction transport, state machine and species profiles.
pub mod prediction;
/// Per-session state owner.
pub mod session;
/// Display helpers for presentation layers.
pub mod view_model;

pub use config::PredictorConfig;
pub use measurements::{Measurement, MeasurementSet, MeasurementStore, OutOfDomainError};
pub use prediction::{PredictError, PredictionController, PredictionState};
pub use session::PredictorSession;
