use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use serde::de::DeserializeOwned;
use shared::{
    domain::AdviceKind,
    error::{ErrorDetail, TransportError},
};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info};

use crate::transport::{AdviceTransport, RequestBody};

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState<R> {
    Idle,
    Submitting,
    Succeeded(R),
    Failed(ErrorDetail),
}

impl<R> SubmissionState<R> {
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    pub fn response(&self) -> Option<&R> {
        match self {
            Self::Succeeded(response) => Some(response),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorDetail> {
        match self {
            Self::Failed(detail) => Some(detail),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<R> {
    Succeeded(R),
    Failed(ErrorDetail),
    /// Another request from this pipeline was still pending; nothing was sent.
    AlreadyInFlight,
    /// A reset or newer submission happened while this request was pending;
    /// its response was dropped.
    Superseded,
}

struct PipelineState<R> {
    state: SubmissionState<R>,
    generation: u64,
}

/// Held by `submit` while its request is pending. If the submit future is
/// dropped before the response is applied, the generation is recorded as
/// abandoned so the pipeline reads as `Idle` again.
struct InFlight<'a> {
    abandoned: &'a AtomicU64,
    generation: u64,
    armed: bool,
}

impl InFlight<'_> {
    fn settle(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.abandoned.store(self.generation, Ordering::SeqCst);
        }
    }
}

/// Drives one advice endpoint through `Idle -> Submitting -> Succeeded | Failed`.
///
/// At most one request is outstanding per pipeline. Every `submit` and
/// `reset` bumps a generation counter, and a response is only applied when
/// its generation is still current when it arrives.
pub struct SubmissionPipeline<R> {
    kind: AdviceKind,
    transport: Arc<dyn AdviceTransport>,
    inner: Mutex<PipelineState<R>>,
    abandoned: AtomicU64,
}

impl<R> SubmissionPipeline<R>
where
    R: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(kind: AdviceKind, transport: Arc<dyn AdviceTransport>) -> Self {
        Self {
            kind,
            transport,
            inner: Mutex::new(PipelineState {
                state: SubmissionState::Idle,
                generation: 0,
            }),
            abandoned: AtomicU64::new(0),
        }
    }

    pub fn kind(&self) -> AdviceKind {
        self.kind
    }

    pub async fn state(&self) -> SubmissionState<R> {
        self.lock().await.state.clone()
    }

    pub async fn is_submitting(&self) -> bool {
        self.lock().await.state.is_submitting()
    }

    pub async fn response(&self) -> Option<R> {
        self.lock().await.state.response().cloned()
    }

    /// Locks the state, first clearing a `Submitting` left behind by a
    /// dropped `submit` future.
    async fn lock(&self) -> MutexGuard<'_, PipelineState<R>> {
        let mut guard = self.inner.lock().await;
        if guard.state.is_submitting()
            && self.abandoned.load(Ordering::SeqCst) == guard.generation
        {
            debug!(kind = %self.kind, generation = guard.generation, "clearing abandoned submission");
            guard.state = SubmissionState::Idle;
        }
        guard
    }

    pub async fn submit(&self, body: RequestBody) -> SubmitOutcome<R> {
        let generation = {
            let mut guard = self.lock().await;
            if guard.state.is_submitting() {
                debug!(kind = %self.kind, "submission already in flight; ignoring");
                return SubmitOutcome::AlreadyInFlight;
            }
            guard.generation += 1;
            guard.state = SubmissionState::Submitting;
            guard.generation
        };

        let in_flight = InFlight {
            abandoned: &self.abandoned,
            generation,
            armed: true,
        };

        info!(kind = %self.kind, generation, "submitting advice request");
        let result = self
            .transport
            .post(self.kind, body)
            .await
            .and_then(|value| {
                serde_json::from_value::<R>(value).map_err(|err| TransportError::MalformedBody {
                    endpoint: self.kind.endpoint_path().to_string(),
                    reason: err.to_string(),
                })
            });

        let mut guard = self.inner.lock().await;
        in_flight.settle();
        if guard.generation != generation {
            debug!(
                kind = %self.kind,
                generation,
                current = guard.generation,
                "dropping stale advice response"
            );
            return SubmitOutcome::Superseded;
        }

        match result {
            Ok(response) => {
                info!(kind = %self.kind, generation, "advice request succeeded");
                guard.state = SubmissionState::Succeeded(response.clone());
                SubmitOutcome::Succeeded(response)
            }
            Err(err) => {
                error!(kind = %self.kind, generation, error = %err, "advice request failed");
                let detail = ErrorDetail::from_transport(self.kind, &err);
                guard.state = SubmissionState::Failed(detail.clone());
                SubmitOutcome::Failed(detail)
            }
        }
    }

    /// Returns to `Idle` and invalidates any response still on its way.
    pub async fn reset(&self) {
        let mut guard = self.inner.lock().await;
        guard.generation += 1;
        guard.state = SubmissionState::Idle;
        debug!(kind = %self.kind, generation = guard.generation, "submission reset");
    }
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;
