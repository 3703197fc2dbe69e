//! Demo voice artist: "records" a narration as an artifact reference.
//!
//! The deliverable content is a reference to where the rendered audio
//! would be stored; the polished narration script travels in metadata.

use agentmesh_core::{
    CapabilityAgent, CoreError, Deliverable, DeliverableKind, ExecutionContext, Skill, Subtask,
};

pub struct VoiceAgent;

#[async_trait::async_trait]
impl CapabilityAgent for VoiceAgent {
    async fn can_handle(&self, subtask: &Subtask) -> bool {
        subtask.required_skill == Skill::Voice
    }

    async fn estimate(&self, _subtask: &Subtask) -> u64 {
        20
    }

    async fn execute(
        &self,
        subtask: &Subtask,
        context: Option<&ExecutionContext>,
    ) -> Result<Deliverable, CoreError> {
        // Narrate the handed-in script when there is one, otherwise the
        // subtask's own description.
        let script = context
            .and_then(|c| c.input_text.as_deref())
            .unwrap_or(&subtask.description);
        let narration = format!("[narration] {}", script.trim());

        let filename = format!("narration-{}.mp3", subtask.id);
        Ok(
            Deliverable::new(DeliverableKind::Audio, format!("artifacts/{filename}"))
                .with_file(filename, "audio/mpeg")
                .with_metadata(serde_json::json!({
                    "agent": "voice",
                    "narration_script": narration,
                })),
        )
    }
}
