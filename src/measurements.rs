//! Flower measurements edited by the user and their declared domains.
//!
//! Every edit goes through [`MeasurementStore::set`], which rejects values
//! outside a field's `[min, max]`, so a [`MeasurementSet`] never holds an
//! out-of-domain or non-finite value.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the four flower dimensions, in request order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Measurement {
    SepalLength,
    SepalWidth,
    PetalLength,
    PetalWidth,
}

/// Static bounds and display metadata for one measurement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldDomain {
    pub label: &'static str,
    pub description: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    /// Granularity of the input control. Stored values are not snapped to it.
    pub step: f64,
    pub default: f64,
}

impl FieldDomain {
    /// True when `value` is finite and inside `[min, max]`.
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

const SEPAL_LENGTH: FieldDomain = FieldDomain {
    label: "Sepal Length",
    description: "Length of the outer floral leaf",
    unit: "cm",
    min: 3.0,
    max: 8.0,
    step: 0.1,
    default: 5.0,
};

const SEPAL_WIDTH: FieldDomain = FieldDomain {
    label: "Sepal Width",
    description: "Width of the outer floral leaf",
    unit: "cm",
    min: 1.5,
    max: 5.0,
    step: 0.1,
    default: 3.5,
};

const PETAL_LENGTH: FieldDomain = FieldDomain {
    label: "Petal Length",
    description: "Length of the inner floral leaf",
    unit: "cm",
    min: 1.0,
    max: 7.0,
    step: 0.1,
    default: 4.0,
};

const PETAL_WIDTH: FieldDomain = FieldDomain {
    label: "Petal Width",
    description: "Width of the inner floral leaf",
    unit: "cm",
    min: 0.1,
    max: 3.0,
    step: 0.1,
    default: 1.5,
};

impl Measurement {
    /// All measurements in the fixed wire order.
    pub const ALL: [Measurement; 4] = [
        Measurement::SepalLength,
        Measurement::SepalWidth,
        Measurement::PetalLength,
        Measurement::PetalWidth,
    ];

    /// Position of this measurement in a prediction request.
    pub fn index(self) -> usize {
        match self {
            Self::SepalLength => 0,
            Self::SepalWidth => 1,
            Self::PetalLength => 2,
            Self::PetalWidth => 3,
        }
    }

    pub fn domain(self) -> &'static FieldDomain {
        match self {
            Self::SepalLength => &SEPAL_LENGTH,
            Self::SepalWidth => &SEPAL_WIDTH,
            Self::PetalLength => &PETAL_LENGTH,
            Self::PetalWidth => &PETAL_WIDTH,
        }
    }

    pub fn label(self) -> &'static str {
        self.domain().label
    }
}

/// A measurement edit fell outside the field's declared domain.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("{} must be between {min} and {max} cm, got {value}", .field.label())]
pub struct OutOfDomainError {
    pub field: Measurement,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

/// Snapshot of the four measurements, always within their domains.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeasurementSet {
    values: [f64; 4],
}

impl Default for MeasurementSet {
    fn default() -> Self {
        Self {
            values: Measurement::ALL.map(|field| field.domain().default),
        }
    }
}

impl MeasurementSet {
    /// Build a set from values in wire order, validating each against its domain.
    pub fn from_values(values: [f64; 4]) -> Result<Self, OutOfDomainError> {
        let mut set = Self::default();
        for field in Measurement::ALL {
            set.set(field, values[field.index()])?;
        }
        Ok(set)
    }

    pub fn get(&self, field: Measurement) -> f64 {
        self.values[field.index()]
    }

    /// Values in wire order: sepal length, sepal width, petal length, petal width.
    pub fn values(&self) -> [f64; 4] {
        self.values
    }

    fn set(&mut self, field: Measurement, value: f64) -> Result<(), OutOfDomainError> {
        let domain = field.domain();
        if !domain.contains(value) {
            return Err(OutOfDomainError {
                field,
                value,
                min: domain.min,
                max: domain.max,
            });
        }
        self.values[field.index()] = value;
        Ok(())
    }
}

/// Session-owned holder of the current measurements.
#[derive(Debug, Default)]
pub struct MeasurementStore {
    current: MeasurementSet,
}

impl MeasurementStore {
    /// Start a session with the default measurements.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current measurements.
    pub fn get(&self) -> MeasurementSet {
        self.current
    }

    /// Update one measurement; out-of-domain values are rejected and leave the store unchanged.
    pub fn set(&mut self, field: Measurement, value: f64) -> Result<(), OutOfDomainError> {
        self.current.set(field, value).inspect_err(|err| {
            tracing::debug!("Rejected measurement edit: {err}");
        })
    }

    pub fn reset(&mut self) {
        self.current = MeasurementSet::default();
    }
}
