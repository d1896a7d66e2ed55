//! Request lifecycle for predictions: `Idle -> Pending -> Succeeded | Failed`.
//!
//! A trigger snapshots the measurements and runs the exchange on a background
//! job thread. Completions come back over a channel and are applied by
//! [`PredictionController::poll`] on the owning thread, so the state is only
//! ever mutated from one place.

use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc,
        mpsc::{self, Receiver, RecvTimeoutError, Sender},
    },
    thread,
    time::{Duration, Instant},
};

use super::api::{PredictError, PredictionRequest, PredictionResult, PredictionService};
use super::species::{self, SpeciesProfile};
use crate::measurements::MeasurementSet;

/// What the presentation layer renders from.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum PredictionState {
    #[default]
    Idle,
    Pending,
    Succeeded {
        result: PredictionResult,
        profile: SpeciesProfile,
    },
    Failed(PredictError),
}

/// Whether the last exchange reached the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Unknown,
    Connected,
    Disconnected,
}

#[derive(Debug)]
struct PredictionJobResult {
    request_id: u64,
    result: Result<PredictionResult, PredictError>,
}

/// Owns the prediction state machine for one session.
pub struct PredictionController {
    service: Arc<dyn PredictionService>,
    state: PredictionState,
    connection: ConnectionStatus,
    last_request: Option<PredictionRequest>,
    pending_request_id: Option<u64>,
    next_request_id: u64,
    message_tx: Sender<PredictionJobResult>,
    message_rx: Receiver<PredictionJobResult>,
}

impl PredictionController {
    pub fn new(service: Arc<dyn PredictionService>) -> Self {
        let (message_tx, message_rx) = mpsc::channel();
        Self {
            service,
            state: PredictionState::Idle,
            connection: ConnectionStatus::Unknown,
            last_request: None,
            pending_request_id: None,
            next_request_id: 1,
            message_tx,
            message_rx,
        }
    }

    /// Snapshot `measurements`, clear the previous outcome and start one exchange.
    ///
    /// Overlapping triggers are not rejected here; callers gate on
    /// [`Self::can_trigger`]. If they do overlap, only the latest request may
    /// complete the state.
    pub fn trigger(&mut self, measurements: &MeasurementSet) -> u64 {
        let request = PredictionRequest::from(measurements);
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        if self.pending_request_id.is_some() {
            tracing::warn!(request_id, "Prediction triggered while another is pending");
        }
        self.pending_request_id = Some(request_id);
        self.last_request = Some(request.clone());
        self.state = PredictionState::Pending;
        tracing::debug!(request_id, features = ?request.features(), "Prediction started");

        let service = Arc::clone(&self.service);
        let tx = self.message_tx.clone();
        thread::spawn(move || {
            let result = catch_unwind(AssertUnwindSafe(|| service.predict(&request)))
                .unwrap_or_else(|payload| {
                    Err(PredictError::UnknownTransport(panic_message(&*payload)))
                });
            let _ = tx.send(PredictionJobResult { request_id, result });
        });
        request_id
    }

    /// Apply finished jobs without blocking. Returns true when the state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(message) = self.message_rx.try_recv() {
            changed |= self.apply(message);
        }
        changed
    }

    /// Block until the pending request completes or `timeout` elapses.
    ///
    /// Returns true when the controller is no longer pending.
    pub fn wait_for_completion(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.poll();
        while self.is_pending() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.message_rx.recv_timeout(remaining) {
                Ok(message) => {
                    self.apply(message);
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => break,
            }
        }
        !self.is_pending()
    }

    fn apply(&mut self, message: PredictionJobResult) -> bool {
        if self.pending_request_id != Some(message.request_id) {
            tracing::debug!(request_id = message.request_id, "Dropping stale prediction result");
            return false;
        }
        self.pending_request_id = None;
        match message.result {
            Ok(result) => {
                let profile = species::resolve(&result.species);
                tracing::info!(
                    request_id = message.request_id,
                    species = %result.species,
                    confidence = result.confidence,
                    known = profile.is_known(),
                    "Prediction succeeded"
                );
                self.connection = ConnectionStatus::Connected;
                self.state = PredictionState::Succeeded { result, profile };
            }
            Err(err) => {
                tracing::warn!(
                    request_id = message.request_id,
                    kind = err.kind(),
                    "Prediction failed: {err}"
                );
                self.connection = ConnectionStatus::Disconnected;
                self.state = PredictionState::Failed(err);
            }
        }
        true
    }

    pub fn state(&self) -> &PredictionState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, PredictionState::Pending)
    }

    /// False while a request is in flight; presentation disables its trigger on this.
    pub fn can_trigger(&self) -> bool {
        !self.is_pending()
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match &self.state {
            PredictionState::Succeeded { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn species_profile(&self) -> Option<&SpeciesProfile> {
        match &self.state {
            PredictionState::Succeeded { profile, .. } => Some(profile),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&PredictError> {
        match &self.state {
            PredictionState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.connection
    }

    /// Request sent by the most recent trigger.
    pub fn last_request(&self) -> Option<&PredictionRequest> {
        self.last_request.as_ref()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| "no details".to_string());
    format!("prediction job panicked: {detail}")
}
