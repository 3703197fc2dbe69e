//! Structured output of an orchestration agent's job analysis.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::skill::Skill;

/// Metadata key under which an orchestration deliverable carries its
/// decomposition payload.
pub const DECOMPOSITION_METADATA_KEY: &str = "decomposition";

fn default_estimate_minutes() -> u32 {
    5
}

/// One planned subtask within a decomposition.
///
/// `dependencies` are zero-based indices into the owning decomposition's
/// `subtasks` list, not subtask ids; the router translates them after
/// materialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtaskPlan {
    pub title: String,
    pub description: String,
    pub required_skill: Skill,
    #[serde(default)]
    pub dependencies: Vec<usize>,
}

/// Structured result of decomposing a job into subtasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDecomposition {
    /// Brief explanation of the decomposition strategy.
    pub reasoning: String,
    pub subtasks: Vec<SubtaskPlan>,
    #[serde(default = "default_estimate_minutes")]
    pub estimated_total_minutes: u32,
}

impl JobDecomposition {
    /// Extract and parse a decomposition from an orchestration
    /// deliverable's metadata.
    ///
    /// A missing key or a payload that does not match the expected shape
    /// is a decomposition failure: the job fails outright, with no
    /// partial credit.
    pub fn from_deliverable_metadata(metadata: &serde_json::Value) -> Result<Self, CoreError> {
        let payload = metadata
            .get(DECOMPOSITION_METADATA_KEY)
            .cloned()
            .unwrap_or_else(|| serde_json::Value::Object(Default::default()));
        serde_json::from_value(payload)
            .map_err(|e| CoreError::Decomposition(format!("invalid decomposition payload: {e}")))
    }
}
