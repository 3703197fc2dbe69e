//! Routes jobs to agents, manages decomposition, dependency-ordered
//! execution, and rating.
//!
//! Each submitted job is driven by exactly one spawned task; that task is
//! the only writer of the job's state. Agent availability and the event
//! bus are the cross-job shared state, reached through the injected
//! [`AgentRegistry`] and [`MeshBus`] handles.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use agentmesh_core::job::validate_rating;
use agentmesh_core::{
    AgentId, AgentStatus, CoreError, Deliverable, ExecutionContext, Job, JobDecomposition, JobId,
    JobRequest, JobStatus, Skill, Subtask, SubtaskId, SubtaskStatus,
};
use agentmesh_events::{EventPayload, MeshBus, MeshEvent, SubtaskSummary};
use agentmesh_registry::AgentRegistry;

use crate::graph;

/// Shared, mutable handle to one job's state.
type JobHandle = Arc<RwLock<Job>>;

/// The scheduler. Owns every job's lifecycle from submission to terminal
/// state.
pub struct JobRouter {
    driver: Arc<JobDriver>,
    jobs: RwLock<HashMap<JobId, JobHandle>>,
}

impl JobRouter {
    /// Create a router over the given registry and event bus.
    pub fn new(registry: Arc<AgentRegistry>, mesh: Arc<MeshBus>) -> Self {
        Self {
            driver: Arc::new(JobDriver { registry, mesh }),
            jobs: RwLock::new(HashMap::new()),
        }
    }

    // -----------------------------------------------------------------------
    // Public surface
    // -----------------------------------------------------------------------

    /// Submit a job for execution.
    ///
    /// Returns a snapshot immediately; the job continues asynchronously on
    /// its own task. A job with more than one required skill takes the
    /// orchestration path, otherwise the simple path.
    pub async fn submit_job(&self, request: JobRequest) -> Job {
        let job = Job::from_request(request);
        let snapshot = job.clone();
        let job_id = job.id;
        let orchestrated = job.needs_orchestration();

        let handle: JobHandle = Arc::new(RwLock::new(job));
        self.jobs.write().await.insert(job_id, Arc::clone(&handle));

        self.driver
            .mesh
            .publish(
                MeshEvent::new(EventPayload::JobCreated {
                    title: snapshot.title.clone(),
                    skills: snapshot.required_skills.clone(),
                })
                .with_job(job_id),
            )
            .await;
        tracing::info!(job_id = %job_id, orchestrated, "Job submitted");

        let driver = Arc::clone(&self.driver);
        tokio::spawn(async move {
            if orchestrated {
                driver.orchestrate_job(handle).await;
            } else {
                driver.route_simple_job(handle).await;
            }
        });

        snapshot
    }

    /// Snapshot of a job's current state.
    pub async fn get_job(&self, job_id: JobId) -> Option<Job> {
        let handle = self.jobs.read().await.get(&job_id).cloned()?;
        let job = handle.read().await.clone();
        Some(job)
    }

    /// Snapshots of all jobs submitted this run.
    pub async fn list_jobs(&self) -> Vec<Job> {
        let handles: Vec<JobHandle> = self.jobs.read().await.values().cloned().collect();
        let mut jobs = Vec::with_capacity(handles.len());
        for handle in handles {
            jobs.push(handle.read().await.clone());
        }
        jobs
    }

    /// Rate a completed job.
    ///
    /// Returns `None` (not found / not ratable) for an unknown job, a job
    /// not in COMPLETED status, or a rating outside `1.0..=5.0`; state is
    /// never mutated in those cases. The rating is stored on the job and
    /// folded into the assigned agent's rolling average.
    pub async fn rate_job(&self, job_id: JobId, rating: f64, review: &str) -> Option<Job> {
        if validate_rating(rating).is_err() {
            return None;
        }
        let handle = self.jobs.read().await.get(&job_id).cloned()?;

        let snapshot = {
            let mut job = handle.write().await;
            if job.status != JobStatus::Completed {
                return None;
            }
            job.rating = Some(rating);
            job.clone()
        };

        if let Some(agent_id) = snapshot.assigned_agent_id {
            self.driver.registry.record_rating(agent_id, rating).await;
        }
        tracing::info!(job_id = %job_id, rating, review, "Job rated");
        Some(snapshot)
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Drives a single job from routing to its terminal state.
///
/// One instance is shared (via `Arc`) by every spawned job task; it holds
/// only the cross-job service handles, never per-job state.
struct JobDriver {
    registry: Arc<AgentRegistry>,
    mesh: Arc<MeshBus>,
}

impl JobDriver {
    // -----------------------------------------------------------------------
    // Simple path
    // -----------------------------------------------------------------------

    /// Route a zero-or-one-skill job directly to the first available agent.
    async fn route_simple_job(&self, handle: JobHandle) {
        let (job_id, skill, subtask_id, title) = {
            let mut job = handle.write().await;
            let skill = job
                .required_skills
                .first()
                .copied()
                .unwrap_or(Skill::Writing);
            let subtask = Subtask::new(job.id, job.title.clone(), job.description.clone(), skill);
            let ids = (job.id, skill, subtask.id, subtask.title.clone());
            job.subtasks = vec![subtask];
            ids
        };

        let candidates = self.registry.find_by_skill(skill).await;
        let Some(agent) = candidates.into_iter().next() else {
            self.fail_job(
                &handle,
                CoreError::NoAgentForSkill(skill).to_string(),
                Vec::new(),
            )
            .await;
            return;
        };

        {
            let mut job = handle.write().await;
            if let Some(st) = job.subtasks.first_mut() {
                st.assigned_agent_id = Some(agent.id);
            }
            job.assigned_agent_id = Some(agent.id);
            job.status = JobStatus::InProgress;
        }
        self.mesh
            .publish(
                MeshEvent::new(EventPayload::SubtaskAssigned {
                    skill,
                    agent_name: agent.name.clone(),
                })
                .with_job(job_id)
                .with_agent(agent.id)
                .with_subtask(subtask_id),
            )
            .await;

        self.execute_subtask(&handle, subtask_id, agent.id, None)
            .await;

        let completed = {
            let mut job = handle.write().await;
            let deliverable = job.subtasks.first().and_then(|st| {
                if st.status == SubtaskStatus::Completed {
                    st.deliverable.clone()
                } else {
                    None
                }
            });
            match deliverable {
                Some(d) => {
                    job.deliverables = vec![d];
                    job.status = JobStatus::Completed;
                    job.completed_at = Some(Utc::now());
                    true
                }
                None => {
                    job.status = JobStatus::Failed;
                    false
                }
            }
        };

        if completed {
            self.registry.increment_jobs_completed(agent.id).await;
            self.mesh
                .publish(
                    MeshEvent::new(EventPayload::JobCompleted {
                        deliverables_count: 1,
                    })
                    .with_job(job_id),
                )
                .await;
            tracing::info!(job_id = %job_id, agent = %agent.name, "Job completed");
        } else {
            self.mesh
                .publish(
                    MeshEvent::new(EventPayload::JobFailed {
                        error: format!("Subtask failed: {title}"),
                        failed_subtasks: vec![title],
                    })
                    .with_job(job_id),
                )
                .await;
            tracing::warn!(job_id = %job_id, "Job failed");
        }
    }

    // -----------------------------------------------------------------------
    // Orchestration path
    // -----------------------------------------------------------------------

    /// Decompose a multi-skill job via an orchestration agent, then run
    /// the resulting subtask graph.
    async fn orchestrate_job(&self, handle: JobHandle) {
        let (job_id, title, description) = {
            let mut job = handle.write().await;
            job.status = JobStatus::Decomposing;
            (job.id, job.title.clone(), job.description.clone())
        };

        let orchestrators = self.registry.find_by_skill(Skill::Orchestration).await;
        let Some(orchestrator) = orchestrators.into_iter().next() else {
            // Fall back to simple routing on the first declared skill.
            tracing::debug!(job_id = %job_id, "No orchestration agent; routing as simple job");
            self.route_simple_job(handle).await;
            return;
        };

        let mut decompose_subtask = Subtask::new(
            job_id,
            "Decompose job",
            format!("Decompose this job: {title}\n\n{description}"),
            Skill::Orchestration,
        );
        decompose_subtask.assigned_agent_id = Some(orchestrator.id);

        let decomposition = match self.registry.get_instance(orchestrator.id).await {
            Some(instance) => match instance.execute(&decompose_subtask, None).await {
                Ok(deliverable) => {
                    JobDecomposition::from_deliverable_metadata(&deliverable.metadata)
                }
                Err(e) => Err(CoreError::Decomposition(e.to_string())),
            },
            None => Err(CoreError::Decomposition(format!(
                "orchestration agent {} has no runtime instance",
                orchestrator.id
            ))),
        };
        let decomposition = match decomposition {
            Ok(d) => d,
            Err(e) => {
                self.fail_job(&handle, e.to_string(), Vec::new()).await;
                return;
            }
        };

        let subtasks = graph::materialize_plans(job_id, &decomposition.subtasks);

        // Reject cyclic graphs up front instead of letting the scheduling
        // loop stall on them.
        if let Some(stuck) = graph::detect_cycle(&subtasks) {
            let titles: Vec<String> = subtasks
                .iter()
                .filter(|st| stuck.contains(&st.id))
                .map(|st| st.title.clone())
                .collect();
            let error = CoreError::Decomposition(format!(
                "dependency cycle among subtasks: {}",
                titles.join(", ")
            ));
            self.fail_job(&handle, error.to_string(), Vec::new()).await;
            return;
        }

        let summaries: Vec<SubtaskSummary> = subtasks
            .iter()
            .map(|st| SubtaskSummary {
                title: st.title.clone(),
                skill: st.required_skill,
            })
            .collect();
        {
            let mut job = handle.write().await;
            job.subtasks = subtasks.clone();
            job.status = JobStatus::InProgress;
        }
        self.mesh
            .publish(
                MeshEvent::new(EventPayload::JobDecomposed {
                    reasoning: decomposition.reasoning.clone(),
                    subtask_count: subtasks.len(),
                    subtasks: summaries,
                })
                .with_job(job_id),
            )
            .await;
        tracing::info!(
            job_id = %job_id,
            subtask_count = subtasks.len(),
            estimated_minutes = decomposition.estimated_total_minutes,
            "Job decomposed",
        );

        // Assign an agent per subtask, first available wins. A subtask
        // with no available agent stays unassigned and can never become
        // ready; the final judgment fails the job.
        for st in &subtasks {
            let candidates = self.registry.find_by_skill(st.required_skill).await;
            match candidates.into_iter().next() {
                Some(agent) => {
                    {
                        let mut job = handle.write().await;
                        if let Some(target) = job.subtasks.iter_mut().find(|s| s.id == st.id) {
                            target.assigned_agent_id = Some(agent.id);
                        }
                    }
                    self.mesh
                        .publish(
                            MeshEvent::new(EventPayload::SubtaskAssigned {
                                skill: st.required_skill,
                                agent_name: agent.name.clone(),
                            })
                            .with_job(job_id)
                            .with_agent(agent.id)
                            .with_subtask(st.id),
                        )
                        .await;
                }
                None => {
                    tracing::warn!(
                        job_id = %job_id,
                        subtask_id = %st.id,
                        skill = %st.required_skill,
                        "No available agent for subtask",
                    );
                }
            }
        }

        self.execute_subtask_graph(&handle).await;
    }

    /// Execute subtasks respecting dependency order, parallelizing each
    /// wave of ready subtasks.
    ///
    /// The loop runs one wave at a time: all currently ready subtasks fan
    /// out concurrently and the loop joins the whole batch before
    /// recomputing readiness. When an iteration finds nothing ready the
    /// loop exits: either everything is terminal or the graph is stuck
    /// (unassigned subtasks). The final judgment below tells the two
    /// apart by requiring every subtask to have completed.
    async fn execute_subtask_graph(&self, handle: &JobHandle) {
        let job_id = handle.read().await.id;
        let mut completed: HashSet<SubtaskId> = HashSet::new();
        let mut produced: HashMap<SubtaskId, Deliverable> = HashMap::new();

        loop {
            let wave = self.collect_wave(handle, &completed, &produced).await;
            if wave.is_empty() {
                break;
            }

            for entry in &wave {
                for &from_agent in &entry.handoff_sources {
                    self.mesh
                        .publish(
                            MeshEvent::new(EventPayload::Handoff {
                                from_agent,
                                to_agent: entry.agent_id,
                            })
                            .with_job(job_id)
                            .with_agent(entry.agent_id)
                            .with_subtask(entry.subtask_id),
                        )
                        .await;
                }
            }

            let executions = wave.iter().map(|entry| {
                self.execute_subtask(
                    handle,
                    entry.subtask_id,
                    entry.agent_id,
                    entry.context.clone(),
                )
            });
            futures::future::join_all(executions).await;

            let job = handle.read().await;
            for entry in &wave {
                if let Some(st) = job.subtasks.iter().find(|s| s.id == entry.subtask_id) {
                    if st.status == SubtaskStatus::Completed {
                        completed.insert(st.id);
                        if let Some(deliverable) = &st.deliverable {
                            produced.insert(st.id, deliverable.clone());
                        }
                    }
                }
            }
        }

        self.finish_graph_job(handle).await;
    }

    /// Gather the ready subtasks plus the context each one inherits from
    /// its completed dependencies.
    async fn collect_wave(
        &self,
        handle: &JobHandle,
        completed: &HashSet<SubtaskId>,
        produced: &HashMap<SubtaskId, Deliverable>,
    ) -> Vec<WaveEntry> {
        let job = handle.read().await;
        let ready = graph::ready_subtasks(&job.subtasks, completed);

        let mut wave = Vec::with_capacity(ready.len());
        for subtask_id in ready {
            let Some(st) = job.subtasks.iter().find(|s| s.id == subtask_id) else {
                continue;
            };
            let Some(agent_id) = st.assigned_agent_id else {
                continue;
            };

            // Dependency deliverables feed the dependent's context in
            // declaration order; the most recent one wins.
            let mut context = ExecutionContext::default();
            let mut handoff_sources = Vec::new();
            for dep_id in &st.dependencies {
                if let Some(deliverable) = produced.get(dep_id) {
                    context.input_text = Some(deliverable.content.clone());
                    if let Some(from_agent) = job
                        .subtasks
                        .iter()
                        .find(|s| s.id == *dep_id)
                        .and_then(|dep| dep.assigned_agent_id)
                    {
                        handoff_sources.push(from_agent);
                    }
                }
            }

            wave.push(WaveEntry {
                subtask_id,
                agent_id,
                context: (!context.is_empty()).then_some(context),
                handoff_sources,
            });
        }
        wave
    }

    /// Final judgment for an orchestrated job: aggregate deliverables in
    /// subtask order, then complete only if literally every subtask
    /// completed.
    async fn finish_graph_job(&self, handle: &JobHandle) {
        let (job_id, all_completed, deliverables, unfinished, total) = {
            let job = handle.read().await;
            let deliverables: Vec<Deliverable> = job
                .subtasks
                .iter()
                .filter(|st| st.status == SubtaskStatus::Completed)
                .filter_map(|st| st.deliverable.clone())
                .collect();
            let unfinished: Vec<String> = job
                .subtasks
                .iter()
                .filter(|st| st.status != SubtaskStatus::Completed)
                .map(|st| st.title.clone())
                .collect();
            (
                job.id,
                unfinished.is_empty(),
                deliverables,
                unfinished,
                job.subtasks.len(),
            )
        };

        {
            let mut job = handle.write().await;
            job.deliverables = deliverables.clone();
            if all_completed {
                job.status = JobStatus::Completed;
                job.completed_at = Some(Utc::now());
            } else {
                job.status = JobStatus::Failed;
            }
        }

        if all_completed {
            self.mesh
                .publish(
                    MeshEvent::new(EventPayload::JobCompleted {
                        deliverables_count: deliverables.len(),
                    })
                    .with_job(job_id),
                )
                .await;
            tracing::info!(
                job_id = %job_id,
                deliverables = deliverables.len(),
                "Job completed",
            );
        } else {
            let error = format!("{} of {total} subtasks did not complete", unfinished.len());
            tracing::warn!(job_id = %job_id, error = %error, "Job failed");
            self.mesh
                .publish(
                    MeshEvent::new(EventPayload::JobFailed {
                        error,
                        failed_subtasks: unfinished,
                    })
                    .with_job(job_id),
                )
                .await;
        }
    }

    // -----------------------------------------------------------------------
    // Subtask execution (both paths)
    // -----------------------------------------------------------------------

    /// Execute one subtask with the given agent.
    ///
    /// The agent is flipped BUSY for the duration of the capability call
    /// and back to AVAILABLE afterwards on success *and* failure.
    async fn execute_subtask(
        &self,
        handle: &JobHandle,
        subtask_id: SubtaskId,
        agent_id: AgentId,
        context: Option<ExecutionContext>,
    ) {
        let instance = self.registry.get_instance(agent_id).await;
        let profile = self.registry.get_profile(agent_id).await;
        let (Some(instance), Some(profile)) = (instance, profile) else {
            let mut job = handle.write().await;
            if let Some(st) = job.subtasks.iter_mut().find(|s| s.id == subtask_id) {
                st.status = SubtaskStatus::Failed;
            }
            tracing::error!(
                subtask_id = %subtask_id,
                agent_id = %agent_id,
                "Agent instance or profile missing; subtask failed",
            );
            return;
        };

        let (job_id, snapshot) = {
            let mut job = handle.write().await;
            let job_id = job.id;
            let Some(st) = job.subtasks.iter_mut().find(|s| s.id == subtask_id) else {
                return;
            };
            st.status = SubtaskStatus::InProgress;
            st.started_at = Some(Utc::now());
            (job_id, st.clone())
        };

        self.registry.set_status(agent_id, AgentStatus::Busy).await;
        self.mesh
            .publish(
                MeshEvent::new(EventPayload::AgentStatusChanged {
                    status: AgentStatus::Busy,
                })
                .with_agent(agent_id),
            )
            .await;
        self.mesh
            .publish(
                MeshEvent::new(EventPayload::SubtaskStarted {
                    title: snapshot.title.clone(),
                })
                .with_job(job_id)
                .with_agent(agent_id)
                .with_subtask(subtask_id),
            )
            .await;
        tracing::info!(
            job_id = %job_id,
            subtask_id = %subtask_id,
            agent = %profile.name,
            skill = %snapshot.required_skill,
            "Subtask started",
        );

        match instance.execute(&snapshot, context.as_ref()).await {
            Ok(deliverable) => {
                let kind = deliverable.kind;
                {
                    let mut job = handle.write().await;
                    if let Some(st) = job.subtasks.iter_mut().find(|s| s.id == subtask_id) {
                        st.deliverable = Some(deliverable);
                        st.status = SubtaskStatus::Completed;
                        st.completed_at = Some(Utc::now());
                    }
                }
                self.mesh
                    .publish(
                        MeshEvent::new(EventPayload::SubtaskCompleted {
                            title: snapshot.title.clone(),
                            deliverable_kind: kind,
                        })
                        .with_job(job_id)
                        .with_agent(agent_id)
                        .with_subtask(subtask_id),
                    )
                    .await;
                tracing::info!(job_id = %job_id, subtask_id = %subtask_id, "Subtask completed");
            }
            Err(e) => {
                {
                    let mut job = handle.write().await;
                    if let Some(st) = job.subtasks.iter_mut().find(|s| s.id == subtask_id) {
                        st.status = SubtaskStatus::Failed;
                    }
                }
                self.mesh
                    .publish(
                        MeshEvent::new(EventPayload::SubtaskFailed {
                            title: snapshot.title.clone(),
                            error: e.to_string(),
                        })
                        .with_job(job_id)
                        .with_agent(agent_id)
                        .with_subtask(subtask_id),
                    )
                    .await;
                tracing::warn!(
                    job_id = %job_id,
                    subtask_id = %subtask_id,
                    error = %e,
                    "Subtask failed",
                );
            }
        }

        // Release the agent regardless of outcome.
        self.registry
            .set_status(agent_id, AgentStatus::Available)
            .await;
        self.mesh
            .publish(
                MeshEvent::new(EventPayload::AgentStatusChanged {
                    status: AgentStatus::Available,
                })
                .with_agent(agent_id),
            )
            .await;
    }

    // -----------------------------------------------------------------------
    // Shared failure path
    // -----------------------------------------------------------------------

    /// Mark the job FAILED and publish the terminal failure event.
    async fn fail_job(&self, handle: &JobHandle, error: String, failed_subtasks: Vec<String>) {
        let job_id = {
            let mut job = handle.write().await;
            job.status = JobStatus::Failed;
            job.id
        };
        tracing::warn!(job_id = %job_id, error = %error, "Job failed");
        self.mesh
            .publish(
                MeshEvent::new(EventPayload::JobFailed {
                    error,
                    failed_subtasks,
                })
                .with_job(job_id),
            )
            .await;
    }
}

/// One ready subtask scheduled into the current wave.
struct WaveEntry {
    subtask_id: SubtaskId,
    agent_id: AgentId,
    context: Option<ExecutionContext>,
    /// Agents whose deliverables were handed into this execution.
    handoff_sources: Vec<AgentId>,
}
