use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agentmesh_core::{JobRequest, Skill};
use agentmesh_events::{EventPayload, MeshBus, Scope};
use agentmesh_node::config::NodeConfig;
use agentmesh_node::seed;
use agentmesh_registry::AgentRegistry;
use agentmesh_router::JobRouter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "agentmesh_node=debug,agentmesh_router=debug,agentmesh_registry=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = NodeConfig::from_env();
    tracing::info!(
        history_replay_limit = config.history_replay_limit,
        demo_job = config.demo_job,
        "Loaded node configuration",
    );

    // --- Services (constructed once, injected everywhere) ---
    let registry = Arc::new(AgentRegistry::new());
    let mesh = Arc::new(MeshBus::new());
    let router = Arc::new(JobRouter::new(Arc::clone(&registry), Arc::clone(&mesh)));

    // --- Observer: log every mesh event as it is published ---
    let (_, mut all_events) = mesh.subscribe(Scope::Mesh).await;
    let observer = tokio::spawn(async move {
        while let Some(event) = all_events.recv().await {
            tracing::info!(
                kind = event.kind(),
                job_id = ?event.job_id,
                agent_id = ?event.agent_id,
                "mesh event",
            );
        }
    });

    // --- Seed demo agents ---
    seed::seed_agents(&registry, &mesh)
        .await
        .context("failed to seed demo agents")?;

    if config.demo_job {
        run_demo_job(&router, &mesh, &config).await?;
    }

    observer.abort();
    Ok(())
}

/// Submit a scripted multi-skill job, wait for its terminal event, then
/// replay the job's history.
async fn run_demo_job(
    router: &Arc<JobRouter>,
    mesh: &Arc<MeshBus>,
    config: &NodeConfig,
) -> anyhow::Result<()> {
    let (_, mut events) = mesh.subscribe(Scope::Mesh).await;

    let job = router
        .submit_job(
            JobRequest::new(
                "Launch announcement",
                "Write a launch script and narrate it as a voiceover",
            )
            .with_skills(vec![Skill::Writing, Skill::Voice])
            .with_client("demo"),
        )
        .await;
    tracing::info!(job_id = %job.id, title = %job.title, "Demo job submitted");

    // Wait for the terminal event.
    loop {
        let event = tokio::time::timeout(Duration::from_secs(30), events.recv())
            .await
            .context("demo job did not reach a terminal state in time")?
            .context("event bus closed before the demo job finished")?;
        if event.job_id != Some(job.id) {
            continue;
        }
        match event.payload {
            EventPayload::JobCompleted { .. } | EventPayload::JobFailed { .. } => break,
            _ => {}
        }
    }

    let finished = router
        .get_job(job.id)
        .await
        .context("demo job vanished from the router")?;
    tracing::info!(
        job_id = %finished.id,
        status = %finished.status,
        subtasks = finished.subtasks.len(),
        deliverables = finished.deliverables.len(),
        "Demo job finished",
    );
    for deliverable in &finished.deliverables {
        tracing::info!(
            kind = %deliverable.kind,
            content = %deliverable.content,
            "Deliverable",
        );
    }

    // Replay the job's history the way a late-joining observer would see it.
    let history = mesh
        .history(Some(job.id), config.history_replay_limit)
        .await;
    tracing::info!(events = history.len(), "Replaying job history");
    for event in history {
        tracing::debug!(kind = event.kind(), timestamp = %event.timestamp, "replay");
    }

    Ok(())
}
