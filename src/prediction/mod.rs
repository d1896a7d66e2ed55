//! Species prediction against the remote KNN classification service.

pub mod api;
pub mod controller;
pub mod species;

pub use api::{
    HttpPredictionClient, NonFiniteFeature, PredictError, PredictionRequest, PredictionResult,
    PredictionService,
};
pub use controller::{ConnectionStatus, PredictionController, PredictionState};
pub use species::{SpeciesColor, SpeciesProfile};
