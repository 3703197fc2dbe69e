//! Job state model, transition table, and rating bounds.

use serde::{Deserialize, Serialize};

use crate::deliverable::Deliverable;
use crate::error::CoreError;
use crate::skill::Skill;
use crate::subtask::Subtask;
use crate::types::{AgentId, JobId, Timestamp};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    /// Orchestration path only: a decomposition request is in flight.
    Decomposing,
    InProgress,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Decomposing => "decomposing",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Completed and Failed are terminal; no retry or resubmission.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the set of valid target states reachable from `from`.
///
/// Terminal states return an empty slice.
pub fn valid_transitions(from: JobStatus) -> &'static [JobStatus] {
    match from {
        // Simple path goes straight to InProgress; a no-provider failure
        // or a missing-skill fallback can fail a job before it starts.
        JobStatus::Pending => &[
            JobStatus::Decomposing,
            JobStatus::InProgress,
            JobStatus::Failed,
        ],
        JobStatus::Decomposing => &[JobStatus::InProgress, JobStatus::Failed],
        JobStatus::InProgress => &[JobStatus::Completed, JobStatus::Failed],
        JobStatus::Completed | JobStatus::Failed => &[],
    }
}

/// Check whether a transition from `from` to `to` is valid.
pub fn can_transition(from: JobStatus, to: JobStatus) -> bool {
    valid_transitions(from).contains(&to)
}

// ---------------------------------------------------------------------------
// Rating bounds
// ---------------------------------------------------------------------------

pub const RATING_MIN: f64 = 1.0;
pub const RATING_MAX: f64 = 5.0;

/// Validate a client rating against the allowed range.
pub fn validate_rating(rating: f64) -> Result<(), CoreError> {
    if (RATING_MIN..=RATING_MAX).contains(&rating) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Rating must be between {RATING_MIN} and {RATING_MAX}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Request & Job
// ---------------------------------------------------------------------------

/// Client-submitted job request, before routing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub required_skills: Vec<Skill>,
    #[serde(default)]
    pub budget: f64,
    #[serde(default = "default_client_name")]
    pub client_name: String,
}

fn default_client_name() -> String {
    "Anonymous".to_string()
}

impl JobRequest {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            required_skills: Vec::new(),
            budget: 0.0,
            client_name: default_client_name(),
        }
    }

    pub fn with_skills(mut self, skills: Vec<Skill>) -> Self {
        self.required_skills = skills;
        self
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_client(mut self, client_name: impl Into<String>) -> Self {
        self.client_name = client_name.into();
        self
    }
}

/// A unit of client-requested work, possibly spanning multiple skills.
///
/// Owned and mutated exclusively by the router task driving it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub required_skills: Vec<Skill>,
    #[serde(default)]
    pub budget: f64,
    #[serde(default = "default_client_name")]
    pub client_name: String,
    pub status: JobStatus,
    /// Set on the simple path only; orchestrated jobs have per-subtask
    /// assignees instead.
    pub assigned_agent_id: Option<AgentId>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub deliverables: Vec<Deliverable>,
    pub rating: Option<f64>,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl Job {
    /// Materialize a PENDING job from a client request.
    pub fn from_request(request: JobRequest) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            title: request.title,
            description: request.description,
            required_skills: request.required_skills,
            budget: request.budget,
            client_name: request.client_name,
            status: JobStatus::Pending,
            assigned_agent_id: None,
            subtasks: Vec::new(),
            deliverables: Vec::new(),
            rating: None,
            created_at: chrono::Utc::now(),
            completed_at: None,
        }
    }

    /// A job needs orchestration if it requires more than one skill.
    pub fn needs_orchestration(&self) -> bool {
        self.required_skills.len() > 1
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
