//! Integration tests for the single-capability routing path.

mod common;

use assert_matches::assert_matches;

use agentmesh_core::{AgentStatus, DeliverableKind, JobRequest, JobStatus, Skill, SubtaskStatus};
use agentmesh_events::EventPayload;

use common::*;

// ---------------------------------------------------------------------------
// Test: single-skill job runs to completion with one deliverable
// ---------------------------------------------------------------------------

#[tokio::test]
async fn single_skill_job_completes() {
    let harness = build();
    let writer_id =
        register_specialist(&harness, "Quill", Skill::Writing, DeliverableKind::Text).await;
    let mut rx = mesh_subscriber(&harness).await;

    let submitted = harness
        .router
        .submit_job(
            JobRequest::new("Product blurb", "Write a short product blurb")
                .with_skills(vec![Skill::Writing]),
        )
        .await;
    assert_eq!(submitted.status, JobStatus::Pending);

    let events = wait_for_terminal(&mut rx, submitted.id).await;
    assert_eq!(
        kinds_for_job(&events, submitted.id),
        vec![
            "job_created",
            "subtask_assigned",
            "subtask_started",
            "subtask_completed",
            "job_completed",
        ]
    );

    let job = harness.router.get_job(submitted.id).await.unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.deliverables.len(), 1);
    assert_eq!(job.assigned_agent_id, Some(writer_id));
    assert!(job.completed_at.is_some());
    assert_eq!(job.subtasks.len(), 1);
    assert_eq!(job.subtasks[0].status, SubtaskStatus::Completed);
    assert!(job.subtasks[0].started_at.is_some());
    assert!(job.subtasks[0].completed_at.is_some());

    // The agent's completed-job count increments by exactly one and the
    // agent is released back to AVAILABLE.
    let writer = harness.registry.get_profile(writer_id).await.unwrap();
    assert_eq!(writer.jobs_completed, 1);
    assert_eq!(writer.status, AgentStatus::Available);
}

// ---------------------------------------------------------------------------
// Test: zero-skill job falls back to the writing skill
// ---------------------------------------------------------------------------

#[tokio::test]
async fn zero_skill_job_defaults_to_writing() {
    let harness = build();
    register_specialist(&harness, "Quill", Skill::Writing, DeliverableKind::Text).await;
    let mut rx = mesh_subscriber(&harness).await;

    let submitted = harness
        .router
        .submit_job(JobRequest::new("Untagged", "No skills declared"))
        .await;
    wait_for_terminal(&mut rx, submitted.id).await;

    let job = harness.router.get_job(submitted.id).await.unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.subtasks[0].required_skill, Skill::Writing);
}

// ---------------------------------------------------------------------------
// Test: no provider for the required skill fails the job immediately
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_provider_fails_job() {
    let harness = build();
    // Only a writer is registered; the job wants an image.
    register_specialist(&harness, "Quill", Skill::Writing, DeliverableKind::Text).await;
    let mut rx = mesh_subscriber(&harness).await;

    let submitted = harness
        .router
        .submit_job(JobRequest::new("Logo", "Design a logo").with_skills(vec![Skill::Image]))
        .await;
    let events = wait_for_terminal(&mut rx, submitted.id).await;

    let job = harness.router.get_job(submitted.id).await.unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.deliverables.is_empty());
    // The subtask was materialized but never started.
    assert_eq!(job.subtasks[0].status, SubtaskStatus::Pending);
    assert!(job.subtasks[0].assigned_agent_id.is_none());

    let kinds = kinds_for_job(&events, submitted.id);
    assert_eq!(kinds, vec!["job_created", "job_failed"]);
    let failure = events
        .iter()
        .find(|e| e.kind() == "job_failed")
        .expect("job_failed published");
    assert_matches!(&failure.payload, EventPayload::JobFailed { error, .. } => {
        assert_eq!(error, "No available agent for skill: image");
    });
}

// ---------------------------------------------------------------------------
// Test: a BUSY sole provider counts as unavailable
// ---------------------------------------------------------------------------

#[tokio::test]
async fn busy_provider_counts_as_unavailable() {
    let harness = build();
    let image_id =
        register_specialist(&harness, "Prism", Skill::Image, DeliverableKind::Image).await;
    harness.registry.set_status(image_id, AgentStatus::Busy).await;
    let mut rx = mesh_subscriber(&harness).await;

    let submitted = harness
        .router
        .submit_job(JobRequest::new("Banner", "Render a banner").with_skills(vec![Skill::Image]))
        .await;
    let events = wait_for_terminal(&mut rx, submitted.id).await;

    let job = harness.router.get_job(submitted.id).await.unwrap();
    assert_eq!(job.status, JobStatus::Failed);

    // Exactly one failure event, never a completion, and no subtask ever
    // reached IN_PROGRESS.
    let kinds = kinds_for_job(&events, submitted.id);
    assert_eq!(kinds.iter().filter(|k| **k == "job_failed").count(), 1);
    assert!(!kinds.contains(&"job_completed"));
    assert!(!kinds.contains(&"subtask_started"));
    assert_eq!(job.subtasks[0].status, SubtaskStatus::Pending);
}

// ---------------------------------------------------------------------------
// Test: a capability failure fails the job, with the agent released
// ---------------------------------------------------------------------------

#[tokio::test]
async fn execution_failure_fails_job() {
    let harness = build();
    let coder_id = harness
        .registry
        .register(
            profile("Forge", vec![Skill::Code]),
            std::sync::Arc::new(FailingAgent { skill: Skill::Code }),
        )
        .await
        .unwrap();
    let mut rx = mesh_subscriber(&harness).await;

    let submitted = harness
        .router
        .submit_job(JobRequest::new("Fix bug", "Fix the bug").with_skills(vec![Skill::Code]))
        .await;
    let events = wait_for_terminal(&mut rx, submitted.id).await;

    let job = harness.router.get_job(submitted.id).await.unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.subtasks[0].status, SubtaskStatus::Failed);
    assert!(job.deliverables.is_empty());

    let kinds = kinds_for_job(&events, submitted.id);
    assert!(kinds.contains(&"subtask_failed"));
    assert!(!kinds.contains(&"job_completed"));

    // No completed-job credit, and the agent is back to AVAILABLE.
    let coder = harness.registry.get_profile(coder_id).await.unwrap();
    assert_eq!(coder.jobs_completed, 0);
    assert_eq!(coder.status, AgentStatus::Available);
}

// ---------------------------------------------------------------------------
// Test: event history replays identically and honors the job filter
// ---------------------------------------------------------------------------

#[tokio::test]
async fn history_is_stable_after_completion() {
    let harness = build();
    register_specialist(&harness, "Quill", Skill::Writing, DeliverableKind::Text).await;
    let mut rx = mesh_subscriber(&harness).await;

    let submitted = harness
        .router
        .submit_job(JobRequest::new("Post", "Write a post").with_skills(vec![Skill::Writing]))
        .await;
    wait_for_terminal(&mut rx, submitted.id).await;

    let first = harness.mesh.history(Some(submitted.id), 100).await;
    let second = harness.mesh.history(Some(submitted.id), 100).await;
    let ids = |events: &[agentmesh_events::MeshEvent]| {
        events.iter().map(|e| e.id).collect::<Vec<_>>()
    };
    assert_eq!(ids(&first), ids(&second));
    assert!(first.iter().all(|e| e.job_id == Some(submitted.id)));
    assert_eq!(first.last().unwrap().kind(), "job_completed");
}
