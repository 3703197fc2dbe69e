//! In-memory agent registration and skill-based discovery.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use agentmesh_core::agent::fold_rating;
use agentmesh_core::{AgentId, AgentProfile, AgentStatus, CapabilityAgent, CoreError, Skill};

// ---------------------------------------------------------------------------
// Topology view
// ---------------------------------------------------------------------------

/// One directed handoff edge between two agents.
#[derive(Debug, Clone, Serialize)]
pub struct HandoffEdge {
    pub source: AgentId,
    pub target: AgentId,
}

/// Snapshot of the handoff graph for observers (e.g. a mesh visualizer).
#[derive(Debug, Clone, Serialize)]
pub struct MeshTopology {
    pub nodes: Vec<AgentId>,
    pub edges: Vec<HandoffEdge>,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

struct RegistryState {
    profiles: HashMap<AgentId, AgentProfile>,
    instances: HashMap<AgentId, Arc<dyn CapabilityAgent>>,
    /// Registration order; skill lookups iterate this so "first match"
    /// means "registered earliest".
    order: Vec<AgentId>,
    handoffs: HashMap<AgentId, Vec<AgentId>>,
}

/// Manages agent profiles and their associated runtime instances.
///
/// Thread-safe via an interior `RwLock`; designed to be wrapped in `Arc`
/// and shared across concurrently running jobs. Status writes are plain
/// last-writer-wins overwrites serialized by the lock; the window between
/// a skill lookup and a status flip is deliberately left open (see
/// [`set_status`](AgentRegistry::set_status)).
pub struct AgentRegistry {
    state: RwLock<RegistryState>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState {
                profiles: HashMap::new(),
                instances: HashMap::new(),
                order: Vec::new(),
                handoffs: HashMap::new(),
            }),
        }
    }

    /// Register an agent profile together with its runtime instance.
    ///
    /// The profile's declared handoff targets are recorded in the handoff
    /// graph. Fails only on malformed input (an empty skill set).
    pub async fn register(
        &self,
        profile: AgentProfile,
        instance: Arc<dyn CapabilityAgent>,
    ) -> Result<AgentId, CoreError> {
        profile.validate()?;

        let id = profile.id;
        let mut state = self.state.write().await;
        state.handoffs.insert(id, profile.handoff_targets.clone());
        tracing::info!(
            agent_id = %id,
            name = %profile.name,
            skills = ?profile.skills,
            "Agent registered",
        );
        state.profiles.insert(id, profile);
        state.instances.insert(id, instance);
        state.order.push(id);
        Ok(id)
    }

    pub async fn get_profile(&self, agent_id: AgentId) -> Option<AgentProfile> {
        self.state.read().await.profiles.get(&agent_id).cloned()
    }

    pub async fn get_instance(&self, agent_id: AgentId) -> Option<Arc<dyn CapabilityAgent>> {
        self.state.read().await.instances.get(&agent_id).cloned()
    }

    /// All profiles in registration order.
    pub async fn list_profiles(&self) -> Vec<AgentProfile> {
        let state = self.state.read().await;
        state
            .order
            .iter()
            .filter_map(|id| state.profiles.get(id).cloned())
            .collect()
    }

    /// All AVAILABLE agents declaring `skill`, in registration order.
    ///
    /// No load-balancing and no rating-based ranking: callers consistently
    /// take the first entry, so earlier-registered agents absorb more
    /// work. A known limitation of the selection policy, kept as stated
    /// contract.
    pub async fn find_by_skill(&self, skill: Skill) -> Vec<AgentProfile> {
        let state = self.state.read().await;
        state
            .order
            .iter()
            .filter_map(|id| state.profiles.get(id))
            .filter(|p| p.status == AgentStatus::Available && p.skills.contains(&skill))
            .cloned()
            .collect()
    }

    /// All AVAILABLE agents declaring *any* of `skills` (union match), in
    /// registration order.
    pub async fn find_by_skills(&self, skills: &[Skill]) -> Vec<AgentProfile> {
        let state = self.state.read().await;
        state
            .order
            .iter()
            .filter_map(|id| state.profiles.get(id))
            .filter(|p| {
                p.status == AgentStatus::Available && skills.iter().any(|s| p.skills.contains(s))
            })
            .cloned()
            .collect()
    }

    /// Unconditionally overwrite an agent's availability status.
    ///
    /// Last writer wins; there is no compare-and-swap. Two jobs that both
    /// saw the agent AVAILABLE can interleave their BUSY/AVAILABLE flips.
    /// Unknown ids are a no-op.
    pub async fn set_status(&self, agent_id: AgentId, status: AgentStatus) {
        let mut state = self.state.write().await;
        if let Some(profile) = state.profiles.get_mut(&agent_id) {
            tracing::debug!(agent_id = %agent_id, status = %status, "Agent status changed");
            profile.status = status;
        }
    }

    /// Resolve an agent's declared handoff targets to live profiles,
    /// dropping any that no longer exist.
    pub async fn get_handoff_targets(&self, agent_id: AgentId) -> Vec<AgentProfile> {
        let state = self.state.read().await;
        let Some(targets) = state.handoffs.get(&agent_id) else {
            return Vec::new();
        };
        targets
            .iter()
            .filter_map(|id| state.profiles.get(id).cloned())
            .collect()
    }

    /// Overwrite the handoff targets for an agent.
    pub async fn register_handoffs(&self, agent_id: AgentId, targets: Vec<AgentId>) {
        self.state.write().await.handoffs.insert(agent_id, targets);
    }

    /// The raw handoff adjacency.
    pub async fn handoff_graph(&self) -> HashMap<AgentId, Vec<AgentId>> {
        self.state.read().await.handoffs.clone()
    }

    /// Node/edge snapshot of the handoff graph for visualization.
    pub async fn topology(&self) -> MeshTopology {
        let state = self.state.read().await;
        let mut nodes: Vec<AgentId> = Vec::new();
        let mut edges: Vec<HandoffEdge> = Vec::new();
        for id in &state.order {
            if !nodes.contains(id) {
                nodes.push(*id);
            }
            if let Some(targets) = state.handoffs.get(id) {
                for target in targets {
                    if !nodes.contains(target) {
                        nodes.push(*target);
                    }
                    edges.push(HandoffEdge {
                        source: *id,
                        target: *target,
                    });
                }
            }
        }
        MeshTopology { nodes, edges }
    }

    /// Bump an agent's completed-job counter.
    pub async fn increment_jobs_completed(&self, agent_id: AgentId) {
        let mut state = self.state.write().await;
        if let Some(profile) = state.profiles.get_mut(&agent_id) {
            profile.jobs_completed += 1;
        }
    }

    /// Fold a client rating into an agent's rolling average.
    ///
    /// Uses the completed-job count as it stands; the counter was bumped
    /// at job completion, not here.
    pub async fn record_rating(&self, agent_id: AgentId, rating: f64) {
        let mut state = self.state.write().await;
        if let Some(profile) = state.profiles.get_mut(&agent_id) {
            profile.rating = fold_rating(profile.rating, profile.jobs_completed, rating);
            tracing::info!(
                agent_id = %agent_id,
                rating,
                rolling = profile.rating,
                "Agent rating updated",
            );
        }
    }

    /// Number of registered agents.
    pub async fn agent_count(&self) -> usize {
        self.state.read().await.order.len()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
