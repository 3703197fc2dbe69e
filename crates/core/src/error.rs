use crate::skill::Skill;

/// Domain error type shared across the workspace.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// No AVAILABLE agent declares the required skill. Fails the owning
    /// job or subtask immediately; there is no retry and no queueing.
    #[error("No available agent for skill: {0}")]
    NoAgentForSkill(Skill),

    /// The orchestration agent raised, or its structured result failed to
    /// parse. Fails the whole job.
    #[error("Decomposition failed: {0}")]
    Decomposition(String),

    /// A capability agent raised during `execute`. Fails only the subtask
    /// it was executing, not siblings already in flight.
    #[error("Execution failed: {0}")]
    Execution(String),
}
