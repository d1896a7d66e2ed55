//! Per-session owner of the measurements and the prediction controller.

use std::sync::Arc;

use crate::config::{ConfigError, PredictorConfig};
use crate::measurements::{Measurement, MeasurementSet, MeasurementStore, OutOfDomainError};
use crate::prediction::{HttpPredictionClient, PredictionController, PredictionService};

/// Everything a presentation layer needs for one predictor session.
pub struct PredictorSession {
    config: PredictorConfig,
    measurements: MeasurementStore,
    predictions: PredictionController,
}

impl PredictorSession {
    /// Start a session talking to the HTTP service described by `config`.
    pub fn new(config: PredictorConfig) -> Result<Self, ConfigError> {
        let client = HttpPredictionClient::new(&config)?;
        tracing::info!(endpoint = client.endpoint(), "Predictor session started");
        Ok(Self::with_service(config, Arc::new(client)))
    }

    /// Start a session backed by any prediction service.
    pub fn with_service(config: PredictorConfig, service: Arc<dyn PredictionService>) -> Self {
        Self {
            config,
            measurements: MeasurementStore::new(),
            predictions: PredictionController::new(service),
        }
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    pub fn measurements(&self) -> MeasurementSet {
        self.measurements.get()
    }

    pub fn set_measurement(
        &mut self,
        field: Measurement,
        value: f64,
    ) -> Result<(), OutOfDomainError> {
        self.measurements.set(field, value)
    }

    pub fn reset_measurements(&mut self) {
        self.measurements.reset();
    }

    /// Start a prediction from the current measurements.
    ///
    /// Ignored while a request is pending, like a disabled predict button.
    /// Returns true when a request was started.
    pub fn predict(&mut self) -> bool {
        if !self.predictions.can_trigger() {
            tracing::debug!("Prediction already pending; trigger ignored");
            return false;
        }
        let snapshot = self.measurements.get();
        self.predictions.trigger(&snapshot);
        true
    }

    /// Apply finished predictions. Call once per UI frame.
    pub fn poll(&mut self) -> bool {
        self.predictions.poll()
    }

    pub fn predictions(&self) -> &PredictionController {
        &self.predictions
    }

    pub fn predictions_mut(&mut self) -> &mut PredictionController {
        &mut self.predictions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::{PredictError, PredictionRequest, PredictionResult, PredictionState};
    use std::sync::Mutex;
    use std::time::Duration;

    struct RecordingService {
        calls: Mutex<Vec<PredictionRequest>>,
    }

    impl PredictionService for RecordingService {
        fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, PredictError> {
            self.calls.lock().unwrap().push(request.clone());
            Ok(PredictionResult {
                species: "virginica".to_string(),
                confidence: 100.0,
            })
        }
    }

    #[test]
    fn predict_sends_current_measurements() {
        let service = Arc::new(RecordingService {
            calls: Mutex::new(Vec::new()),
        });
        let mut session =
            PredictorSession::with_service(PredictorConfig::default(), service.clone());
        session.set_measurement(Measurement::SepalLength, 6.7).unwrap();
        session.set_measurement(Measurement::PetalWidth, 2.3).unwrap();

        assert!(session.predict());
        assert!(session.predictions_mut().wait_for_completion(Duration::from_secs(5)));

        let calls = service.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].features(), [6.7, 3.5, 4.0, 2.3]);
        assert!(matches!(
            session.predictions().state(),
            PredictionState::Succeeded { .. }
        ));
    }

    #[test]
    fn rejected_edit_does_not_reach_the_service() {
        let service = Arc::new(RecordingService {
            calls: Mutex::new(Vec::new()),
        });
        let mut session =
            PredictorSession::with_service(PredictorConfig::default(), service.clone());
        assert!(session.set_measurement(Measurement::SepalWidth, 9.0).is_err());
        assert_eq!(session.measurements(), MeasurementSet::default());
        assert!(service.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn new_rejects_invalid_address() {
        let config = PredictorConfig::with_base_url("localhost");
        assert!(PredictorSession::new(config).is_err());
    }
}
