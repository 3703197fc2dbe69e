//! The canonical domain event envelope.
//!
//! [`MeshEvent`] serializes to the wire shape
//! `{id, type, data, job_id?, agent_id?, subtask_id?, timestamp}`; the
//! `type`/`data` pair comes from the tagged [`EventPayload`] enum, flattened
//! into the envelope. Transport collaborators deliver it verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agentmesh_core::{AgentId, AgentStatus, DeliverableKind, EventId, JobId, Skill, SubtaskId};

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Compact subtask descriptor carried in `job_decomposed` events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtaskSummary {
    pub title: String,
    pub skill: Skill,
}

/// The eleven domain event kinds, each with its typed payload.
///
/// Serializes adjacently tagged: the variant name becomes the `type` field
/// (snake_case) and the fields become the `data` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EventPayload {
    AgentRegistered {
        name: String,
        role: String,
        skills: Vec<Skill>,
    },
    AgentStatusChanged {
        status: AgentStatus,
    },
    JobCreated {
        title: String,
        skills: Vec<Skill>,
    },
    JobDecomposed {
        reasoning: String,
        subtask_count: usize,
        subtasks: Vec<SubtaskSummary>,
    },
    SubtaskAssigned {
        skill: Skill,
        agent_name: String,
    },
    SubtaskStarted {
        title: String,
    },
    SubtaskCompleted {
        title: String,
        deliverable_kind: DeliverableKind,
    },
    SubtaskFailed {
        title: String,
        error: String,
    },
    /// A completed dependency's deliverable was handed to the agent
    /// executing a dependent subtask.
    Handoff {
        from_agent: AgentId,
        to_agent: AgentId,
    },
    JobCompleted {
        deliverables_count: usize,
    },
    JobFailed {
        error: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        failed_subtasks: Vec<String>,
    },
}

impl EventPayload {
    /// Stable snake_case kind name, for log fields and filtering.
    pub fn kind(&self) -> &'static str {
        match self {
            EventPayload::AgentRegistered { .. } => "agent_registered",
            EventPayload::AgentStatusChanged { .. } => "agent_status_changed",
            EventPayload::JobCreated { .. } => "job_created",
            EventPayload::JobDecomposed { .. } => "job_decomposed",
            EventPayload::SubtaskAssigned { .. } => "subtask_assigned",
            EventPayload::SubtaskStarted { .. } => "subtask_started",
            EventPayload::SubtaskCompleted { .. } => "subtask_completed",
            EventPayload::SubtaskFailed { .. } => "subtask_failed",
            EventPayload::Handoff { .. } => "handoff",
            EventPayload::JobCompleted { .. } => "job_completed",
            EventPayload::JobFailed { .. } => "job_failed",
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// A domain event that occurred on the mesh.
///
/// Append-only: never mutated after creation. Constructed via
/// [`MeshEvent::new`] and enriched with the builder methods
/// [`with_job`](MeshEvent::with_job), [`with_agent`](MeshEvent::with_agent),
/// and [`with_subtask`](MeshEvent::with_subtask).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshEvent {
    pub id: EventId,

    /// Typed kind + payload, flattened to `type` and `data` on the wire.
    #[serde(flatten)]
    pub payload: EventPayload,

    /// Correlated job, if the event belongs to one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,

    /// Correlated agent, if the event concerns one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,

    /// Correlated subtask, if the event concerns one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtask_id: Option<SubtaskId>,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl MeshEvent {
    /// Create a new event with only the payload; correlation ids default
    /// to `None`.
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            payload,
            job_id: None,
            agent_id: None,
            subtask_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Correlate the event with a job.
    pub fn with_job(mut self, job_id: JobId) -> Self {
        self.job_id = Some(job_id);
        self
    }

    /// Correlate the event with an agent.
    pub fn with_agent(mut self, agent_id: AgentId) -> Self {
        self.agent_id = Some(agent_id);
        self
    }

    /// Correlate the event with a subtask.
    pub fn with_subtask(mut self, subtask_id: SubtaskId) -> Self {
        self.subtask_id = Some(subtask_id);
        self
    }

    /// Stable snake_case kind name of the payload.
    pub fn kind(&self) -> &'static str {
        self.payload.kind()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
