use std::{
    panic::AssertUnwindSafe,
    sync::{Arc, Weak},
};

use async_trait::async_trait;
use futures::FutureExt;
use shared::{
    domain::{QueryCriteria, QueryKind, RawCriteria, RequestHandle, RequestState},
    error::ClientError,
};
use tokio::{
    sync::{broadcast, watch, Mutex},
    task::JoinHandle,
};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

pub mod assessment;
pub mod http_client;
pub mod normalizer;
pub mod offline;
pub mod prompt;
pub mod validator;

pub use http_client::{HttpClientConfig, HttpRecommendationClient};
pub use offline::OfflineRecommendationClient;

const TRANSITION_CHANNEL_CAPACITY: usize = 256;

/// Backend able to answer one recommendation query.
///
/// Implementations perform a single call and report a typed failure. They do
/// not retry and do not track which request is current; the orchestrator
/// drops results for requests it no longer cares about.
#[async_trait]
pub trait RecommendationClient: Send + Sync {
    async fn query(&self, criteria: &QueryCriteria, kind: QueryKind)
        -> Result<String, ClientError>;
}

pub struct MissingRecommendationClient;

#[async_trait]
impl RecommendationClient for MissingRecommendationClient {
    async fn query(
        &self,
        _criteria: &QueryCriteria,
        kind: QueryKind,
    ) -> Result<String, ClientError> {
        Err(ClientError::Network(format!(
            "recommendation backend is unavailable for {kind} queries"
        )))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateTransition {
    pub from: RequestState,
    pub to: RequestState,
}

pub struct QueryOrchestrator {
    client: Arc<dyn RecommendationClient>,
    inner: Mutex<OrchestratorState>,
    state: watch::Sender<RequestState>,
    transitions: broadcast::Sender<StateTransition>,
}

struct OrchestratorState {
    next_handle: u64,
    current: Option<RequestHandle>,
    inflight: Option<InflightRequest>,
}

struct InflightRequest {
    handle: RequestHandle,
    kind: QueryKind,
    task: JoinHandle<()>,
}

impl OrchestratorState {
    fn allocate_handle(&mut self) -> RequestHandle {
        let handle = RequestHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn abandon_inflight(&mut self) -> Option<(RequestHandle, QueryKind)> {
        let inflight = self.inflight.take()?;
        inflight.task.abort();
        Some((inflight.handle, inflight.kind))
    }
}

impl QueryOrchestrator {
    pub fn new(client: Arc<dyn RecommendationClient>) -> Arc<Self> {
        let (state, _) = watch::channel(RequestState::Idle);
        let (transitions, _) = broadcast::channel(TRANSITION_CHANNEL_CAPACITY);
        Arc::new(Self {
            client,
            inner: Mutex::new(OrchestratorState {
                next_handle: 1,
                current: None,
                inflight: None,
            }),
            state,
            transitions,
        })
    }

    pub fn unconfigured() -> Arc<Self> {
        Self::new(Arc::new(MissingRecommendationClient))
    }

    pub fn state(&self) -> RequestState {
        self.state.borrow().clone()
    }

    pub async fn current_handle(&self) -> Option<RequestHandle> {
        self.inner.lock().await.current
    }

    /// Latest-value view of the state. Intermediate states may be skipped by
    /// slow readers; use [`Self::subscribe_transitions`] to see every step.
    pub fn subscribe_state(&self) -> watch::Receiver<RequestState> {
        self.state.subscribe()
    }

    pub fn state_stream(&self) -> WatchStream<RequestState> {
        WatchStream::new(self.state.subscribe())
    }

    pub fn subscribe_transitions(&self) -> broadcast::Receiver<StateTransition> {
        self.transitions.subscribe()
    }

    /// Starts a query, superseding any request still loading.
    ///
    /// Invalid criteria fail immediately without contacting the backend. The
    /// returned handle identifies the request in every state it reaches.
    pub async fn submit(self: &Arc<Self>, raw: &RawCriteria, kind: QueryKind) -> RequestHandle {
        let validated = validator::validate(raw);

        let mut guard = self.inner.lock().await;
        let handle = guard.allocate_handle();
        if let Some((previous, previous_kind)) = guard.abandon_inflight() {
            info!(
                handle = previous.0,
                kind = %previous_kind,
                superseded_by = handle.0,
                "query: request superseded"
            );
        }
        guard.current = Some(handle);

        let criteria = match validated {
            Ok(criteria) => criteria,
            Err(err) => {
                warn!(handle = handle.0, kind = %kind, error = %err, "query: criteria rejected");
                self.publish(RequestState::Failed(handle, err.into()));
                return handle;
            }
        };

        info!(
            handle = handle.0,
            kind = %kind,
            annual_income = criteria.annual_income,
            "query: request started"
        );
        self.publish(RequestState::Loading(handle));

        let orchestrator = Arc::downgrade(self);
        let client = Arc::clone(&self.client);
        let task = tokio::spawn(async move {
            let outcome = AssertUnwindSafe(client.query(&criteria, kind))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    Err(ClientError::Network(
                        "recommendation client panicked".to_string(),
                    ))
                });
            drop(criteria);
            Self::deliver(orchestrator, handle, kind, outcome).await;
        });
        guard.inflight = Some(InflightRequest { handle, kind, task });

        handle
    }

    /// Drops the current request, if any, and returns to `Idle`.
    pub async fn cancel(&self) {
        let mut guard = self.inner.lock().await;
        if let Some((handle, kind)) = guard.abandon_inflight() {
            info!(handle = handle.0, kind = %kind, "query: request cancelled");
        }
        guard.current = None;
        self.publish(RequestState::Idle);
    }

    /// Leaves a `Failed` state for `Idle`; any other state is kept.
    pub async fn clear_error(&self) {
        let mut guard = self.inner.lock().await;
        if !matches!(*self.state.borrow(), RequestState::Failed(..)) {
            return;
        }
        guard.current = None;
        self.publish(RequestState::Idle);
    }

    async fn deliver(
        orchestrator: Weak<Self>,
        handle: RequestHandle,
        kind: QueryKind,
        outcome: Result<String, ClientError>,
    ) {
        let Some(orchestrator) = orchestrator.upgrade() else {
            return;
        };

        let next = match outcome {
            Ok(raw) => match normalizer::normalize(&raw, kind) {
                Ok(result) => RequestState::Succeeded(handle, result),
                Err(err) => {
                    warn!(handle = handle.0, kind = %kind, error = %err, "query: unusable backend payload");
                    RequestState::Failed(handle, err.into())
                }
            },
            Err(err) => {
                warn!(handle = handle.0, kind = %kind, error = %err, "query: backend call failed");
                RequestState::Failed(handle, err.into())
            }
        };

        let mut guard = orchestrator.inner.lock().await;
        if guard.current != Some(handle) {
            debug!(handle = handle.0, kind = %kind, "query: discarding stale result");
            return;
        }
        if guard
            .inflight
            .as_ref()
            .is_some_and(|inflight| inflight.handle == handle)
        {
            guard.inflight = None;
        }
        info!(
            handle = handle.0,
            kind = %kind,
            outcome = next.label(),
            "query: request settled"
        );
        orchestrator.publish(next);
    }

    // Callers hold `inner`, so the handle check and the publish are one step.
    fn publish(&self, next: RequestState) {
        let mut previous = None;
        self.state.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            previous = Some(std::mem::replace(state, next.clone()));
            true
        });
        if let Some(from) = previous {
            let _ = self.transitions.send(StateTransition { from, to: next });
        }
    }
}

impl Drop for QueryOrchestrator {
    fn drop(&mut self) {
        self.inner.get_mut().abandon_inflight();
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
