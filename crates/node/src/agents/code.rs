//! Demo code developer: emits a commented stub module for the brief.

use agentmesh_core::{
    CapabilityAgent, CoreError, Deliverable, DeliverableKind, ExecutionContext, Skill, Subtask,
};

pub struct CodeAgent;

#[async_trait::async_trait]
impl CapabilityAgent for CodeAgent {
    async fn can_handle(&self, subtask: &Subtask) -> bool {
        subtask.required_skill == Skill::Code
    }

    async fn estimate(&self, _subtask: &Subtask) -> u64 {
        25
    }

    async fn execute(
        &self,
        subtask: &Subtask,
        context: Option<&ExecutionContext>,
    ) -> Result<Deliverable, CoreError> {
        let mut content = format!(
            "// {title}\n// {description}\n\nfn main() {{\n    todo!(\"{title}\");\n}}\n",
            title = subtask.title,
            description = subtask.description,
        );
        if let Some(input) = context.and_then(|c| c.input_text.as_deref()) {
            content.push_str("\n// Based on:\n");
            for line in input.lines() {
                content.push_str("// ");
                content.push_str(line);
                content.push('\n');
            }
        }

        Ok(Deliverable::new(DeliverableKind::Code, content)
            .with_file("snippet.rs", "text/x-rust")
            .with_metadata(serde_json::json!({"agent": "code"})))
    }
}
