//! Demo orchestrator: decomposes a job brief into a dependency-ordered
//! subtask plan.
//!
//! The decomposition is derived with the keyword classifier instead of an
//! LLM, but the output contract is identical: a structured
//! [`JobDecomposition`] under the deliverable's `decomposition` metadata
//! key. Narration depends on writing when both are present (a script must
//! exist before it can be voiced); image and code work runs independently.

use agentmesh_core::{
    CapabilityAgent, CoreError, Deliverable, DeliverableKind, ExecutionContext, JobDecomposition,
    Skill, Subtask, SubtaskPlan,
};

use crate::classify::detect_skills;

pub struct OrchestratorAgent;

/// Rough per-subtask estimate used for the plan total.
const MINUTES_PER_SUBTASK: u32 = 2;

impl OrchestratorAgent {
    /// Build a plan from a free-text brief.
    pub fn plan(brief: &str) -> JobDecomposition {
        let skills: Vec<Skill> = detect_skills(brief)
            .into_iter()
            .filter(|s| *s != Skill::Orchestration)
            .collect();

        let mut subtasks: Vec<SubtaskPlan> = Vec::new();
        let mut writing_index: Option<usize> = None;

        for skill in skills {
            let (title, description) = match skill {
                Skill::Writing => (
                    "Write the script".to_string(),
                    format!("Produce the written copy for: {brief}"),
                ),
                Skill::Voice => (
                    "Narrate the script".to_string(),
                    format!("Record a narration for: {brief}"),
                ),
                Skill::Image => (
                    "Create the visuals".to_string(),
                    format!("Produce the visual assets for: {brief}"),
                ),
                Skill::Code => (
                    "Implement the code".to_string(),
                    format!("Write the code for: {brief}"),
                ),
                Skill::Orchestration => continue,
            };

            let dependencies = match skill {
                // Narration waits for the written script when one is planned.
                Skill::Voice => writing_index.map(|i| vec![i]).unwrap_or_default(),
                _ => Vec::new(),
            };
            if skill == Skill::Writing {
                writing_index = Some(subtasks.len());
            }
            subtasks.push(SubtaskPlan {
                title,
                description,
                required_skill: skill,
                dependencies,
            });
        }

        let reasoning = format!(
            "Split the brief into {} specialist subtask(s); narration is \
             sequenced after writing, everything else runs in parallel.",
            subtasks.len()
        );
        let estimated_total_minutes = MINUTES_PER_SUBTASK * subtasks.len() as u32;

        JobDecomposition {
            reasoning,
            subtasks,
            estimated_total_minutes,
        }
    }
}

#[async_trait::async_trait]
impl CapabilityAgent for OrchestratorAgent {
    async fn can_handle(&self, subtask: &Subtask) -> bool {
        subtask.required_skill == Skill::Orchestration
    }

    async fn estimate(&self, _subtask: &Subtask) -> u64 {
        10
    }

    /// For the orchestrator, executing means decomposing the brief.
    async fn execute(
        &self,
        subtask: &Subtask,
        _context: Option<&ExecutionContext>,
    ) -> Result<Deliverable, CoreError> {
        let decomposition = Self::plan(&subtask.description);
        let payload = serde_json::to_value(&decomposition)
            .map_err(|e| CoreError::Execution(format!("decomposition did not serialize: {e}")))?;

        Ok(
            Deliverable::new(DeliverableKind::Text, decomposition.reasoning.clone())
                .with_metadata(serde_json::json!({
                    "agent": "orchestrator",
                    "decomposition": payload,
                })),
        )
    }
}
