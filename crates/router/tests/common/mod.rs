//! Shared fixtures for router integration tests: fresh service instances
//! and canned capability agents.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;

use agentmesh_core::{
    AgentId, AgentProfile, CapabilityAgent, CoreError, Deliverable, DeliverableKind,
    ExecutionContext, JobDecomposition, JobId, Skill, Subtask,
};
use agentmesh_events::{EventPayload, MeshBus, MeshEvent, Scope};
use agentmesh_registry::AgentRegistry;
use agentmesh_router::JobRouter;

/// A fresh registry + bus + router per test.
pub struct TestMesh {
    pub registry: Arc<AgentRegistry>,
    pub mesh: Arc<MeshBus>,
    pub router: Arc<JobRouter>,
}

pub fn build() -> TestMesh {
    let registry = Arc::new(AgentRegistry::new());
    let mesh = Arc::new(MeshBus::new());
    let router = Arc::new(JobRouter::new(Arc::clone(&registry), Arc::clone(&mesh)));
    TestMesh {
        registry,
        mesh,
        router,
    }
}

pub fn profile(name: &str, skills: Vec<Skill>) -> AgentProfile {
    AgentProfile::new(name, "Specialist", skills, "test agent")
}

// ---------------------------------------------------------------------------
// Canned agents
// ---------------------------------------------------------------------------

/// Specialist producing a deliverable that embeds the subtask title and
/// any handed-in context, so tests can assert on the data flow.
pub struct EchoAgent {
    pub skill: Skill,
    pub kind: DeliverableKind,
}

#[async_trait::async_trait]
impl CapabilityAgent for EchoAgent {
    async fn can_handle(&self, subtask: &Subtask) -> bool {
        subtask.required_skill == self.skill
    }

    async fn estimate(&self, _subtask: &Subtask) -> u64 {
        1
    }

    async fn execute(
        &self,
        subtask: &Subtask,
        context: Option<&ExecutionContext>,
    ) -> Result<Deliverable, CoreError> {
        let content = match context.and_then(|c| c.input_text.as_deref()) {
            Some(input) => format!("{}: {} [input: {input}]", self.skill, subtask.title),
            None => format!("{}: {}", self.skill, subtask.title),
        };
        Ok(Deliverable::new(self.kind, content))
    }
}

/// Specialist whose every execution fails.
pub struct FailingAgent {
    pub skill: Skill,
}

#[async_trait::async_trait]
impl CapabilityAgent for FailingAgent {
    async fn can_handle(&self, subtask: &Subtask) -> bool {
        subtask.required_skill == self.skill
    }

    async fn estimate(&self, _subtask: &Subtask) -> u64 {
        1
    }

    async fn execute(
        &self,
        _subtask: &Subtask,
        _context: Option<&ExecutionContext>,
    ) -> Result<Deliverable, CoreError> {
        Err(CoreError::Execution("simulated generation failure".into()))
    }
}

/// Orchestration agent returning a fixed decomposition.
pub struct PlanAgent {
    pub decomposition: JobDecomposition,
}

#[async_trait::async_trait]
impl CapabilityAgent for PlanAgent {
    async fn can_handle(&self, subtask: &Subtask) -> bool {
        subtask.required_skill == Skill::Orchestration
    }

    async fn estimate(&self, _subtask: &Subtask) -> u64 {
        1
    }

    async fn execute(
        &self,
        _subtask: &Subtask,
        _context: Option<&ExecutionContext>,
    ) -> Result<Deliverable, CoreError> {
        let payload = serde_json::to_value(&self.decomposition)
            .expect("test decomposition must serialize");
        Ok(
            Deliverable::new(DeliverableKind::Text, self.decomposition.reasoning.clone())
                .with_metadata(serde_json::json!({ "decomposition": payload })),
        )
    }
}

/// Orchestration agent that raises instead of planning.
pub struct BrokenPlanner;

#[async_trait::async_trait]
impl CapabilityAgent for BrokenPlanner {
    async fn can_handle(&self, subtask: &Subtask) -> bool {
        subtask.required_skill == Skill::Orchestration
    }

    async fn estimate(&self, _subtask: &Subtask) -> u64 {
        1
    }

    async fn execute(
        &self,
        _subtask: &Subtask,
        _context: Option<&ExecutionContext>,
    ) -> Result<Deliverable, CoreError> {
        Err(CoreError::Execution("orchestrator crashed".into()))
    }
}

/// Orchestration agent whose deliverable carries no decomposition payload.
pub struct MalformedPlanner;

#[async_trait::async_trait]
impl CapabilityAgent for MalformedPlanner {
    async fn can_handle(&self, subtask: &Subtask) -> bool {
        subtask.required_skill == Skill::Orchestration
    }

    async fn estimate(&self, _subtask: &Subtask) -> u64 {
        1
    }

    async fn execute(
        &self,
        _subtask: &Subtask,
        _context: Option<&ExecutionContext>,
    ) -> Result<Deliverable, CoreError> {
        Ok(Deliverable::new(DeliverableKind::Text, "no plan here")
            .with_metadata(serde_json::json!({"agent": "malformed"})))
    }
}

// ---------------------------------------------------------------------------
// Registration + event helpers
// ---------------------------------------------------------------------------

/// Register an [`EchoAgent`] specialist and return its id.
pub async fn register_specialist(
    harness: &TestMesh,
    name: &str,
    skill: Skill,
    kind: DeliverableKind,
) -> AgentId {
    harness
        .registry
        .register(profile(name, vec![skill]), Arc::new(EchoAgent { skill, kind }))
        .await
        .expect("registration should succeed")
}

/// Subscribe to the global mesh scope. Do this *before* submitting so no
/// event is missed.
pub async fn mesh_subscriber(harness: &TestMesh) -> UnboundedReceiver<MeshEvent> {
    let (_, rx) = harness.mesh.subscribe(Scope::Mesh).await;
    rx
}

/// Drain events until the given job publishes its terminal event, then
/// return everything seen (all jobs, publish order).
pub async fn wait_for_terminal(
    rx: &mut UnboundedReceiver<MeshEvent>,
    job_id: JobId,
) -> Vec<MeshEvent> {
    let mut seen = Vec::new();
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for a terminal job event")
            .expect("bus closed before the job finished");
        let terminal = event.job_id == Some(job_id)
            && matches!(
                event.payload,
                EventPayload::JobCompleted { .. } | EventPayload::JobFailed { .. }
            );
        seen.push(event);
        if terminal {
            return seen;
        }
    }
}

/// Kind names of the events correlated with one job, in publish order.
pub fn kinds_for_job(events: &[MeshEvent], job_id: JobId) -> Vec<&'static str> {
    events
        .iter()
        .filter(|e| e.job_id == Some(job_id))
        .map(|e| e.kind())
        .collect()
}
