//! Subtask state model and transition table.

use serde::{Deserialize, Serialize};

use crate::deliverable::Deliverable;
use crate::skill::Skill;
use crate::types::{AgentId, JobId, SubtaskId, Timestamp};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle state of a subtask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtaskStatus {
    Pending,
    /// Has at least one dependency that is not yet completed.
    WaitingDependency,
    InProgress,
    Completed,
    Failed,
}

impl SubtaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubtaskStatus::Pending => "pending",
            SubtaskStatus::WaitingDependency => "waiting_dependency",
            SubtaskStatus::InProgress => "in_progress",
            SubtaskStatus::Completed => "completed",
            SubtaskStatus::Failed => "failed",
        }
    }

    /// Completed and Failed are terminal; no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubtaskStatus::Completed | SubtaskStatus::Failed)
    }
}

impl std::fmt::Display for SubtaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the set of valid target states reachable from `from`.
///
/// Terminal states return an empty slice.
pub fn valid_transitions(from: SubtaskStatus) -> &'static [SubtaskStatus] {
    match from {
        // A subtask may fail before ever starting (missing agent instance).
        SubtaskStatus::Pending => &[
            SubtaskStatus::WaitingDependency,
            SubtaskStatus::InProgress,
            SubtaskStatus::Failed,
        ],
        SubtaskStatus::WaitingDependency => &[SubtaskStatus::InProgress, SubtaskStatus::Failed],
        SubtaskStatus::InProgress => &[SubtaskStatus::Completed, SubtaskStatus::Failed],
        SubtaskStatus::Completed | SubtaskStatus::Failed => &[],
    }
}

/// Check whether a transition from `from` to `to` is valid.
pub fn can_transition(from: SubtaskStatus, to: SubtaskStatus) -> bool {
    valid_transitions(from).contains(&to)
}

// ---------------------------------------------------------------------------
// Subtask
// ---------------------------------------------------------------------------

/// One skill-homogeneous unit of work within a job's dependency graph.
///
/// Every id in `dependencies` references another subtask of the *same* job;
/// the router guarantees this by constructing dependencies from indices
/// into the decomposition's own subtask list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subtask {
    pub id: SubtaskId,
    pub job_id: JobId,
    pub title: String,
    pub description: String,
    /// Exactly one skill per subtask.
    pub required_skill: Skill,
    pub assigned_agent_id: Option<AgentId>,
    pub status: SubtaskStatus,
    #[serde(default)]
    pub dependencies: Vec<SubtaskId>,
    pub deliverable: Option<Deliverable>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

impl Subtask {
    /// Create a PENDING, unassigned subtask with no dependencies.
    pub fn new(
        job_id: JobId,
        title: impl Into<String>,
        description: impl Into<String>,
        required_skill: Skill,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            job_id,
            title: title.into(),
            description: description.into(),
            required_skill,
            assigned_agent_id: None,
            status: SubtaskStatus::Pending,
            dependencies: Vec::new(),
            deliverable: None,
            started_at: None,
            completed_at: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
