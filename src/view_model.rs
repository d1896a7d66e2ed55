//! Helpers to turn session state into display-ready values.
//!
//! Widget toolkits render [`PredictionView`] directly; nothing here touches
//! the network or mutates state.

use crate::measurements::{Measurement, MeasurementSet};
use crate::prediction::{ConnectionStatus, PredictionController, PredictionState, SpeciesColor};

/// What the result panel should show.
#[derive(Clone, Debug, PartialEq)]
pub enum PredictionView {
    Idle {
        hint: &'static str,
    },
    Pending {
        summary: String,
    },
    Success {
        headline: String,
        description: &'static str,
        color: SpeciesColor,
        characteristics: Vec<&'static str>,
        sepal: String,
        petal: String,
    },
    Failure {
        title: &'static str,
        message: String,
        steps: Vec<String>,
    },
}

const IDLE_HINT: &str = "Adjust the measurements to see the prediction";

/// Build the result panel view from the controller and the current measurements.
pub fn prediction_view(
    controller: &PredictionController,
    measurements: &MeasurementSet,
    service_address: &str,
) -> PredictionView {
    match controller.state() {
        PredictionState::Idle => PredictionView::Idle { hint: IDLE_HINT },
        PredictionState::Pending => PredictionView::Pending {
            summary: pending_summary(measurements),
        },
        PredictionState::Succeeded { result, profile } => PredictionView::Success {
            headline: format!("{} {}%", profile.name, result.confidence),
            description: profile.description,
            color: profile.color,
            characteristics: profile.characteristics.to_vec(),
            sepal: pair_summary(measurements, Measurement::SepalLength, Measurement::SepalWidth),
            petal: pair_summary(measurements, Measurement::PetalLength, Measurement::PetalWidth),
        },
        PredictionState::Failed(err) => PredictionView::Failure {
            title: "Connection Error",
            message: err.to_string(),
            steps: troubleshooting_steps(service_address),
        },
    }
}

/// "Processing 5.1, 3.5, 1.4, 0.2 cm"
pub fn pending_summary(measurements: &MeasurementSet) -> String {
    let values = measurements
        .values()
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("Processing {values} cm")
}

fn pair_summary(measurements: &MeasurementSet, length: Measurement, width: Measurement) -> String {
    format!(
        "{} × {} {}",
        measurements.get(length),
        measurements.get(width),
        length.domain().unit
    )
}

/// Label for the connection indicator; `None` before the first exchange.
pub fn connection_label(status: ConnectionStatus) -> Option<&'static str> {
    match status {
        ConnectionStatus::Unknown => None,
        ConnectionStatus::Connected => Some("Connected to prediction service"),
        ConnectionStatus::Disconnected => Some("Disconnected from prediction service"),
    }
}

/// Value label for a measurement control, e.g. "5.1 cm".
pub fn measurement_label(measurements: &MeasurementSet, field: Measurement) -> String {
    format!("{} {}", measurements.get(field), field.domain().unit)
}

pub fn troubleshooting_steps(service_address: &str) -> Vec<String> {
    vec![
        format!("Ensure the prediction service is running on {service_address}"),
        "Verify the KNN model file (knn_model.pkl) exists".to_string(),
        "Start the service with: python app.py".to_string(),
    ]
}
