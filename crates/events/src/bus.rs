//! Scoped publish/subscribe hub with replayable history.
//!
//! [`MeshBus`] is shared via `Arc<MeshBus>` across the application. Every
//! component publishes its state transitions here; observers subscribe to a
//! single job or to the global mesh scope and can replay history on
//! (re)connect.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};

use agentmesh_core::JobId;

use crate::event::MeshEvent;

/// Default number of events returned by a history query.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Identity of one subscription, used to unsubscribe explicitly.
pub type SubscriberId = uuid::Uuid;

/// Subscription scope. A subscription belongs to exactly one scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Every event on the bus, in global publish order.
    Mesh,
    /// Only events correlated with the given job, in per-job publish order.
    Job(JobId),
}

type Sender = mpsc::UnboundedSender<MeshEvent>;

#[derive(Default)]
struct BusState {
    /// Append-only ordered log. Retained for the process lifetime.
    history: Vec<MeshEvent>,
    mesh_subscribers: HashMap<SubscriberId, Sender>,
    job_subscribers: HashMap<JobId, HashMap<SubscriberId, Sender>>,
}

/// The mesh event bus.
///
/// Publishing appends to the history and best-effort delivers to the
/// event's job scope and to every global subscriber. A subscriber whose
/// receiver has gone away is silently dropped from its scope; publishing
/// never fails because an observer is unreachable.
pub struct MeshBus {
    state: RwLock<BusState>,
}

impl MeshBus {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(BusState::default()),
        }
    }

    /// Append `event` to the log and deliver it to the event's job-scope
    /// subscribers (if any) and to all mesh-scope subscribers.
    ///
    /// Events sharing a job are delivered to that job's subscribers in
    /// exactly the order they were published; mesh subscribers see the
    /// cross-job interleaving in global publish order.
    pub async fn publish(&self, event: MeshEvent) {
        let mut state = self.state.write().await;
        state.history.push(event.clone());

        if let Some(job_id) = event.job_id {
            if let Some(subs) = state.job_subscribers.get_mut(&job_id) {
                deliver(subs, &event);
                if subs.is_empty() {
                    state.job_subscribers.remove(&job_id);
                }
            }
        }

        deliver(&mut state.mesh_subscribers, &event);
    }

    /// Register a subscriber on the given scope.
    ///
    /// Returns the subscription id (for [`unsubscribe`](Self::unsubscribe))
    /// and the receiver half of the delivery channel.
    pub async fn subscribe(&self, scope: Scope) -> (SubscriberId, mpsc::UnboundedReceiver<MeshEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = uuid::Uuid::new_v4();

        let mut state = self.state.write().await;
        match scope {
            Scope::Mesh => {
                state.mesh_subscribers.insert(id, tx);
            }
            Scope::Job(job_id) => {
                state.job_subscribers.entry(job_id).or_default().insert(id, tx);
            }
        }
        (id, rx)
    }

    /// Remove a subscriber from its scope. Unknown ids are a no-op.
    pub async fn unsubscribe(&self, scope: Scope, subscriber_id: SubscriberId) {
        let mut state = self.state.write().await;
        match scope {
            Scope::Mesh => {
                state.mesh_subscribers.remove(&subscriber_id);
            }
            Scope::Job(job_id) => {
                if let Some(subs) = state.job_subscribers.get_mut(&job_id) {
                    subs.remove(&subscriber_id);
                    if subs.is_empty() {
                        state.job_subscribers.remove(&job_id);
                    }
                }
            }
        }
    }

    /// Return the most recent `limit` events in publish order, optionally
    /// filtered to a single job.
    ///
    /// Repeated calls without intervening publishes return an identical
    /// sequence.
    pub async fn history(&self, job_id: Option<JobId>, limit: usize) -> Vec<MeshEvent> {
        let state = self.state.read().await;
        let filtered: Vec<&MeshEvent> = match job_id {
            Some(id) => state
                .history
                .iter()
                .filter(|e| e.job_id == Some(id))
                .collect(),
            None => state.history.iter().collect(),
        };
        let start = filtered.len().saturating_sub(limit);
        filtered[start..].iter().map(|e| (*e).clone()).collect()
    }

    /// Total number of events published so far.
    pub async fn event_count(&self) -> usize {
        self.state.read().await.history.len()
    }

    /// Current number of live subscribers on a scope.
    pub async fn subscriber_count(&self, scope: Scope) -> usize {
        let state = self.state.read().await;
        match scope {
            Scope::Mesh => state.mesh_subscribers.len(),
            Scope::Job(job_id) => state
                .job_subscribers
                .get(&job_id)
                .map(|subs| subs.len())
                .unwrap_or(0),
        }
    }
}

impl Default for MeshBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Send `event` to every subscriber in the set, dropping the ones whose
/// receiver has been closed.
fn deliver(subscribers: &mut HashMap<SubscriberId, Sender>, event: &MeshEvent) {
    subscribers.retain(|id, tx| {
        let alive = tx.send(event.clone()).is_ok();
        if !alive {
            tracing::debug!(subscriber_id = %id, "Dropping dead subscriber");
        }
        alive
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
