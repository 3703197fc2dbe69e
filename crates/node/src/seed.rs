//! Startup seeding: register the demo agents and announce them on the
//! mesh.

use std::sync::Arc;

use agentmesh_core::{AgentProfile, CoreError, Skill};
use agentmesh_events::{EventPayload, MeshBus, MeshEvent};
use agentmesh_registry::AgentRegistry;

use crate::agents::{CodeAgent, ImageAgent, OrchestratorAgent, VoiceAgent, WriterAgent};

/// Register the five demo agents with profiles, runtime instances, and
/// the handoff topology, publishing an `agent_registered` event for each.
pub async fn seed_agents(
    registry: &Arc<AgentRegistry>,
    mesh: &Arc<MeshBus>,
) -> Result<Vec<AgentProfile>, CoreError> {
    let writer = AgentProfile::new(
        "Quill",
        "Content Writer",
        vec![Skill::Writing],
        "Writes blog posts, marketing copy, product descriptions, and scripts.",
    )
    .with_avatar("pencil")
    .with_hourly_rate(25.0)
    .with_track_record(4.9, 142);

    let voice = AgentProfile::new(
        "Sonata",
        "Voice Artist",
        vec![Skill::Voice],
        "Records natural-sounding voiceovers, narrations, and audio content.",
    )
    .with_avatar("microphone")
    .with_hourly_rate(35.0)
    .with_track_record(4.8, 89);

    let image = AgentProfile::new(
        "Prism",
        "Image Creator",
        vec![Skill::Image],
        "Produces logos, banners, illustrations, and hero images.",
    )
    .with_avatar("palette")
    .with_hourly_rate(30.0)
    .with_track_record(4.7, 203);

    let code = AgentProfile::new(
        "Forge",
        "Code Developer",
        vec![Skill::Code],
        "Handles code generation, reviews, debugging, and technical scaffolding.",
    )
    .with_avatar("terminal")
    .with_hourly_rate(45.0)
    .with_track_record(4.9, 167);

    let orchestrator = AgentProfile::new(
        "Atlas",
        "Orchestrator",
        vec![Skill::Orchestration],
        "Decomposes complex briefs into subtasks and routes them to specialists.",
    )
    .with_avatar("network")
    .with_hourly_rate(40.0)
    .with_track_record(5.0, 56);

    // Handoff topology: the orchestrator hands to every specialist, the
    // writer hands scripts to the voice artist, and the developer hands
    // code to the writer for documentation.
    let orchestrator =
        orchestrator.with_handoff_targets(vec![writer.id, voice.id, image.id, code.id]);
    let writer = writer.with_handoff_targets(vec![voice.id]);
    let code = code.with_handoff_targets(vec![writer.id]);

    let mut profiles = Vec::new();
    let roster: Vec<(AgentProfile, Arc<dyn agentmesh_core::CapabilityAgent>)> = vec![
        (writer, Arc::new(WriterAgent)),
        (voice, Arc::new(VoiceAgent)),
        (image, Arc::new(ImageAgent)),
        (code, Arc::new(CodeAgent)),
        (orchestrator, Arc::new(OrchestratorAgent)),
    ];

    for (profile, instance) in roster {
        registry.register(profile.clone(), instance).await?;
        mesh.publish(
            MeshEvent::new(EventPayload::AgentRegistered {
                name: profile.name.clone(),
                role: profile.role.clone(),
                skills: profile.skills.clone(),
            })
            .with_agent(profile.id),
        )
        .await;
        profiles.push(profile);
    }

    tracing::info!(count = profiles.len(), "Seeded demo agents");
    Ok(profiles)
}
