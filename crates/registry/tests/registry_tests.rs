//! Unit tests for `AgentRegistry`.
//!
//! These exercise registration, skill-based discovery, status flips, the
//! handoff graph, and the quality-metric updates, all against fresh
//! registry instances.

use std::sync::Arc;

use agentmesh_core::{
    AgentProfile, AgentStatus, CapabilityAgent, CoreError, Deliverable, DeliverableKind,
    ExecutionContext, Skill, Subtask,
};
use agentmesh_registry::AgentRegistry;

/// Minimal agent stub; the registry never calls into instances itself.
struct NullAgent;

#[async_trait::async_trait]
impl CapabilityAgent for NullAgent {
    async fn can_handle(&self, _subtask: &Subtask) -> bool {
        true
    }

    async fn estimate(&self, _subtask: &Subtask) -> u64 {
        1
    }

    async fn execute(
        &self,
        _subtask: &Subtask,
        _context: Option<&ExecutionContext>,
    ) -> Result<Deliverable, CoreError> {
        Ok(Deliverable::new(DeliverableKind::Text, "noop"))
    }
}

fn profile(name: &str, skills: Vec<Skill>) -> AgentProfile {
    AgentProfile::new(name, "Specialist", skills, "test agent")
}

async fn register(registry: &AgentRegistry, profile: AgentProfile) -> agentmesh_core::AgentId {
    registry
        .register(profile, Arc::new(NullAgent))
        .await
        .expect("registration should succeed")
}

// ---------------------------------------------------------------------------
// Test: registration and lookup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_and_fetch_profile() {
    let registry = AgentRegistry::new();
    let id = register(&registry, profile("Quill", vec![Skill::Writing])).await;

    let fetched = registry.get_profile(id).await.expect("profile exists");
    assert_eq!(fetched.name, "Quill");
    assert_eq!(fetched.status, AgentStatus::Available);
    assert!(registry.get_instance(id).await.is_some());
    assert_eq!(registry.agent_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: empty skill set is rejected
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_skill_set_rejected() {
    let registry = AgentRegistry::new();
    let result = registry
        .register(profile("Nobody", vec![]), Arc::new(NullAgent))
        .await;

    assert!(matches!(result, Err(CoreError::Validation(_))));
    assert_eq!(registry.agent_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: find_by_skill honors registration order
// ---------------------------------------------------------------------------

#[tokio::test]
async fn find_by_skill_in_registration_order() {
    let registry = AgentRegistry::new();
    let first = register(&registry, profile("First", vec![Skill::Writing])).await;
    let second = register(&registry, profile("Second", vec![Skill::Writing])).await;

    let found = registry.find_by_skill(Skill::Writing).await;
    let ids: Vec<_> = found.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![first, second]);
}

// ---------------------------------------------------------------------------
// Test: find_by_skill excludes busy and offline agents
// ---------------------------------------------------------------------------

#[tokio::test]
async fn find_by_skill_only_returns_available() {
    let registry = AgentRegistry::new();
    let busy = register(&registry, profile("Busy", vec![Skill::Image])).await;
    let offline = register(&registry, profile("Offline", vec![Skill::Image])).await;
    let free = register(&registry, profile("Free", vec![Skill::Image])).await;

    registry.set_status(busy, AgentStatus::Busy).await;
    registry.set_status(offline, AgentStatus::Offline).await;

    let found = registry.find_by_skill(Skill::Image).await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, free);
}

// ---------------------------------------------------------------------------
// Test: find_by_skill excludes non-holders
// ---------------------------------------------------------------------------

#[tokio::test]
async fn find_by_skill_requires_the_skill() {
    let registry = AgentRegistry::new();
    register(&registry, profile("Writer", vec![Skill::Writing])).await;

    assert!(registry.find_by_skill(Skill::Voice).await.is_empty());
}

// ---------------------------------------------------------------------------
// Test: find_by_skills is a union match
// ---------------------------------------------------------------------------

#[tokio::test]
async fn find_by_skills_union_match() {
    let registry = AgentRegistry::new();
    let writer = register(&registry, profile("Writer", vec![Skill::Writing])).await;
    let coder = register(&registry, profile("Coder", vec![Skill::Code])).await;
    register(&registry, profile("Painter", vec![Skill::Image])).await;

    let found = registry
        .find_by_skills(&[Skill::Writing, Skill::Code])
        .await;
    let ids: Vec<_> = found.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![writer, coder]);
}

// ---------------------------------------------------------------------------
// Test: set_status overwrites unconditionally, unknown id is a no-op
// ---------------------------------------------------------------------------

#[tokio::test]
async fn set_status_overwrites_and_ignores_unknown() {
    let registry = AgentRegistry::new();
    let id = register(&registry, profile("Flip", vec![Skill::Code])).await;

    registry.set_status(id, AgentStatus::Busy).await;
    assert_eq!(
        registry.get_profile(id).await.unwrap().status,
        AgentStatus::Busy
    );

    // Overwrite is unconditional: no transition check.
    registry.set_status(id, AgentStatus::Offline).await;
    assert_eq!(
        registry.get_profile(id).await.unwrap().status,
        AgentStatus::Offline
    );

    // Unknown id must not panic or alter anything.
    registry
        .set_status(uuid::Uuid::new_v4(), AgentStatus::Busy)
        .await;
    assert_eq!(registry.agent_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: handoff targets resolve to live profiles, dropping dangling ids
// ---------------------------------------------------------------------------

#[tokio::test]
async fn handoff_targets_drop_dangling_ids() {
    let registry = AgentRegistry::new();
    let voice = profile("Sonata", vec![Skill::Voice]);
    let voice_id = voice.id;
    let dangling = uuid::Uuid::new_v4();

    let writer = profile("Quill", vec![Skill::Writing])
        .with_handoff_targets(vec![voice_id, dangling]);
    let writer_id = register(&registry, writer).await;
    register(&registry, voice).await;

    let targets = registry.get_handoff_targets(writer_id).await;
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].id, voice_id);
}

// ---------------------------------------------------------------------------
// Test: topology reflects registered nodes and handoff edges
// ---------------------------------------------------------------------------

#[tokio::test]
async fn topology_has_nodes_and_edges() {
    let registry = AgentRegistry::new();
    let voice = profile("Sonata", vec![Skill::Voice]);
    let voice_id = voice.id;
    let writer = profile("Quill", vec![Skill::Writing]).with_handoff_targets(vec![voice_id]);
    let writer_id = register(&registry, writer).await;
    register(&registry, voice).await;

    let topology = registry.topology().await;
    assert!(topology.nodes.contains(&writer_id));
    assert!(topology.nodes.contains(&voice_id));
    assert_eq!(topology.edges.len(), 1);
    assert_eq!(topology.edges[0].source, writer_id);
    assert_eq!(topology.edges[0].target, voice_id);
}

// ---------------------------------------------------------------------------
// Test: quality metrics (completion count and rolling rating)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rating_folds_against_prior_completed_count() {
    let registry = AgentRegistry::new();
    let id = register(&registry, profile("Rated", vec![Skill::Writing])).await;

    registry.increment_jobs_completed(id).await;
    registry.record_rating(id, 4.0).await;

    let p = registry.get_profile(id).await.unwrap();
    assert_eq!(p.jobs_completed, 1);
    // (5.0 * 1 + 4.0) / 2
    assert!((p.rating - 4.5).abs() < f64::EPSILON);
}
