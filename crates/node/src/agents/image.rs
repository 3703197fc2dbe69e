//! Demo image creator: "renders" an illustration as an artifact reference
//! with the enhanced prompt exposed in metadata.

use agentmesh_core::{
    CapabilityAgent, CoreError, Deliverable, DeliverableKind, ExecutionContext, Skill, Subtask,
};

pub struct ImageAgent;

#[async_trait::async_trait]
impl CapabilityAgent for ImageAgent {
    async fn can_handle(&self, subtask: &Subtask) -> bool {
        subtask.required_skill == Skill::Image
    }

    async fn estimate(&self, _subtask: &Subtask) -> u64 {
        30
    }

    async fn execute(
        &self,
        subtask: &Subtask,
        context: Option<&ExecutionContext>,
    ) -> Result<Deliverable, CoreError> {
        let mut prompt = format!(
            "{}, professional quality, high resolution",
            subtask.description.trim()
        );
        if let Some(input) = context.and_then(|c| c.input_text.as_deref()) {
            prompt.push_str(", consistent with: ");
            prompt.push_str(input);
        }

        let filename = format!("render-{}.png", subtask.id);
        Ok(
            Deliverable::new(DeliverableKind::Image, format!("artifacts/{filename}"))
                .with_file(filename, "image/png")
                .with_metadata(serde_json::json!({
                    "agent": "image",
                    "enhanced_prompt": prompt,
                })),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exposes_the_enhanced_prompt() {
        let subtask = Subtask::new(
            uuid::Uuid::new_v4(),
            "Hero image",
            "A lighthouse at dawn",
            Skill::Image,
        );

        let deliverable = ImageAgent.execute(&subtask, None).await.unwrap();
        assert_eq!(deliverable.kind, DeliverableKind::Image);
        assert_eq!(deliverable.mime_type, "image/png");
        let prompt = deliverable.metadata["enhanced_prompt"].as_str().unwrap();
        assert!(prompt.starts_with("A lighthouse at dawn"));
    }
}
