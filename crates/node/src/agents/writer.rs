//! Demo writer: produces Markdown copy from the subtask brief.

use agentmesh_core::{
    CapabilityAgent, CoreError, Deliverable, DeliverableKind, ExecutionContext, Skill, Subtask,
};

pub struct WriterAgent;

#[async_trait::async_trait]
impl CapabilityAgent for WriterAgent {
    async fn can_handle(&self, subtask: &Subtask) -> bool {
        subtask.required_skill == Skill::Writing
    }

    async fn estimate(&self, _subtask: &Subtask) -> u64 {
        15
    }

    async fn execute(
        &self,
        subtask: &Subtask,
        context: Option<&ExecutionContext>,
    ) -> Result<Deliverable, CoreError> {
        let mut content = format!(
            "# {title}\n\n{description}\n",
            title = subtask.title,
            description = subtask.description,
        );
        if let Some(input) = context.and_then(|c| c.input_text.as_deref()) {
            content.push_str("\n## Reference material\n\n");
            content.push_str(input);
            content.push('\n');
        }
        if let Some(requirements) = context.and_then(|c| c.requirements.as_deref()) {
            content.push_str("\n## Requirements\n\n");
            content.push_str(requirements);
            content.push('\n');
        }

        Ok(Deliverable::new(DeliverableKind::Text, content)
            .with_metadata(serde_json::json!({"agent": "writer"})))
    }
}
