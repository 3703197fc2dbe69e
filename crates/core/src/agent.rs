//! Capability provider profiles, availability, rating math, and the
//! execution interface every provider implements.

use serde::{Deserialize, Serialize};

use crate::deliverable::Deliverable;
use crate::error::CoreError;
use crate::skill::Skill;
use crate::subtask::Subtask;
use crate::types::{AgentId, Timestamp};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Availability state of a capability agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Available,
    Busy,
    Offline,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Available => "available",
            AgentStatus::Busy => "busy",
            AgentStatus::Offline => "offline",
        }
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Default rating for a freshly registered agent with no track record.
pub const DEFAULT_RATING: f64 = 5.0;

/// Registry-visible profile of a capability agent.
///
/// Created once by the seeding step at process start and mutated afterwards
/// only through the registry (status flips around execution, metric updates
/// at completion and rating time). Never deleted within a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    pub id: AgentId,
    pub name: String,
    pub role: String,
    /// Declared skill set. Must be non-empty to register.
    pub skills: Vec<Skill>,
    pub description: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub hourly_rate: f64,
    /// Rolling average of client ratings, `1.0..=5.0`.
    pub rating: f64,
    /// Number of jobs this agent completed as the sole assignee.
    pub jobs_completed: u32,
    pub status: AgentStatus,
    /// Other agents this one may hand work to.
    #[serde(default)]
    pub handoff_targets: Vec<AgentId>,
    pub created_at: Timestamp,
}

impl AgentProfile {
    /// Create a profile with a fresh id, AVAILABLE status, and default
    /// rating. Enrich with the `with_*` builder methods.
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        skills: Vec<Skill>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            name: name.into(),
            role: role.into(),
            skills,
            description: description.into(),
            avatar: String::new(),
            hourly_rate: 0.0,
            rating: DEFAULT_RATING,
            jobs_completed: 0,
            status: AgentStatus::Available,
            handoff_targets: Vec::new(),
            created_at: chrono::Utc::now(),
        }
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = avatar.into();
        self
    }

    pub fn with_hourly_rate(mut self, rate: f64) -> Self {
        self.hourly_rate = rate;
        self
    }

    /// Seed an existing track record (rating and completed-job count).
    pub fn with_track_record(mut self, rating: f64, jobs_completed: u32) -> Self {
        self.rating = rating;
        self.jobs_completed = jobs_completed;
        self
    }

    pub fn with_handoff_targets(mut self, targets: Vec<AgentId>) -> Self {
        self.handoff_targets = targets;
        self
    }

    /// Validate the profile for registration.
    ///
    /// The only malformed-input case is an empty skill set.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.skills.is_empty() {
            return Err(CoreError::Validation(
                "Agent must declare at least one skill".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Rating math
// ---------------------------------------------------------------------------

/// Fold a new client rating into an agent's rolling average.
///
/// Uses the agent's completed-job count *prior* to this rating; the counter
/// itself is bumped at job completion, not here.
pub fn fold_rating(current: f64, jobs_completed: u32, rating: f64) -> f64 {
    (current * jobs_completed as f64 + rating) / (jobs_completed as f64 + 1.0)
}

// ---------------------------------------------------------------------------
// Execution interface
// ---------------------------------------------------------------------------

/// Inputs carried from completed dependency subtasks into a dependent
/// subtask's execution.
///
/// When several dependencies supply the same field, the most recently
/// processed dependency wins (dependency declaration order).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Content of a dependency's deliverable, fed in as reference material.
    pub input_text: Option<String>,
    /// Additional free-text requirements from the caller.
    pub requirements: Option<String>,
}

impl ExecutionContext {
    pub fn is_empty(&self) -> bool {
        self.input_text.is_none() && self.requirements.is_none()
    }
}

/// The single narrow interface through which content-generation
/// collaborators are invoked.
///
/// The router only ever calls [`execute`](CapabilityAgent::execute);
/// `can_handle` and `estimate` are part of the registry's skill-matching
/// contract and exposed for future use.
#[async_trait::async_trait]
pub trait CapabilityAgent: Send + Sync {
    /// Whether this agent can take on the given subtask.
    async fn can_handle(&self, subtask: &Subtask) -> bool;

    /// Rough estimate in seconds to complete the subtask.
    async fn estimate(&self, subtask: &Subtask) -> u64;

    /// Execute the subtask, producing a deliverable.
    async fn execute(
        &self,
        subtask: &Subtask,
        context: Option<&ExecutionContext>,
    ) -> Result<Deliverable, CoreError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_profile_defaults() {
        let p = AgentProfile::new("Quill", "Content Writer", vec![Skill::Writing], "writes");
        assert_eq!(p.status, AgentStatus::Available);
        assert_eq!(p.rating, DEFAULT_RATING);
        assert_eq!(p.jobs_completed, 0);
        assert!(p.handoff_targets.is_empty());
    }

    #[test]
    fn empty_skill_set_rejected() {
        let p = AgentProfile::new("Nobody", "Generalist", vec![], "does nothing");
        assert!(p.validate().is_err());
    }

    #[test]
    fn non_empty_skill_set_accepted() {
        let p = AgentProfile::new("Quill", "Content Writer", vec![Skill::Writing], "writes");
        assert!(p.validate().is_ok());
    }

    // -- fold_rating ----------------------------------------------------------

    #[test]
    fn fold_rating_first_rating_with_no_history() {
        // 0 completed jobs: the new rating replaces the default entirely.
        assert_eq!(fold_rating(5.0, 0, 3.0), 3.0);
    }

    #[test]
    fn fold_rating_averages_against_prior_count() {
        // (5.0 * 1 + 4.0) / 2 = 4.5
        assert!((fold_rating(5.0, 1, 4.0) - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn fold_rating_large_history_moves_slowly() {
        let folded = fold_rating(4.8, 99, 1.0);
        // (4.8 * 99 + 1.0) / 100 = 4.762
        assert!((folded - 4.762).abs() < 1e-9);
    }

    #[test]
    fn execution_context_emptiness() {
        let mut ctx = ExecutionContext::default();
        assert!(ctx.is_empty());
        ctx.input_text = Some("script".into());
        assert!(!ctx.is_empty());
    }
}
