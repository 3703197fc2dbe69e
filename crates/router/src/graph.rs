//! Subtask dependency-graph construction and scheduling predicates.
//!
//! Pure functions over subtask lists; the router drives them from its
//! scheduling loop.

use std::collections::{HashMap, HashSet};

use agentmesh_core::{JobId, Subtask, SubtaskId, SubtaskPlan, SubtaskStatus};

/// Materialize concrete subtasks from an ordered list of plans.
///
/// List order is preserved. Each plan's dependency *indices* (into the
/// same list) are translated into the dependency *identities* of the
/// corresponding materialized subtasks; out-of-range indices are dropped.
/// A subtask with at least one dependency starts in `WaitingDependency`.
pub fn materialize_plans(job_id: JobId, plans: &[SubtaskPlan]) -> Vec<Subtask> {
    let mut subtasks: Vec<Subtask> = plans
        .iter()
        .map(|plan| {
            Subtask::new(
                job_id,
                plan.title.clone(),
                plan.description.clone(),
                plan.required_skill,
            )
        })
        .collect();

    let ids: Vec<SubtaskId> = subtasks.iter().map(|st| st.id).collect();
    for (subtask, plan) in subtasks.iter_mut().zip(plans) {
        for &dep_index in &plan.dependencies {
            if dep_index < ids.len() {
                subtask.dependencies.push(ids[dep_index]);
                subtask.status = SubtaskStatus::WaitingDependency;
            }
        }
    }
    subtasks
}

/// Detect dependency cycles via Kahn's algorithm.
///
/// Returns the ids of the subtasks left unordered (the cycle members and
/// everything downstream of them), or `None` if the graph is acyclic.
/// Dependency ids not present in the list are treated as already satisfied.
pub fn detect_cycle(subtasks: &[Subtask]) -> Option<Vec<SubtaskId>> {
    let ids: HashSet<SubtaskId> = subtasks.iter().map(|st| st.id).collect();

    let mut in_degree: HashMap<SubtaskId, usize> = HashMap::new();
    let mut dependents: HashMap<SubtaskId, Vec<SubtaskId>> = HashMap::new();
    for st in subtasks {
        let local_deps = st.dependencies.iter().filter(|d| ids.contains(d)).count();
        in_degree.insert(st.id, local_deps);
        for dep in st.dependencies.iter().filter(|d| ids.contains(d)) {
            dependents.entry(*dep).or_default().push(st.id);
        }
    }

    let mut queue: Vec<SubtaskId> = subtasks
        .iter()
        .filter(|st| in_degree[&st.id] == 0)
        .map(|st| st.id)
        .collect();
    let mut ordered = 0usize;

    while let Some(id) = queue.pop() {
        ordered += 1;
        if let Some(next) = dependents.get(&id) {
            for dependent in next.clone() {
                if let Some(degree) = in_degree.get_mut(&dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push(dependent);
                    }
                }
            }
        }
    }

    if ordered == subtasks.len() {
        None
    } else {
        let stuck: Vec<SubtaskId> = subtasks
            .iter()
            .filter(|st| in_degree[&st.id] > 0)
            .map(|st| st.id)
            .collect();
        Some(stuck)
    }
}

/// Compute the subtasks ready to execute in this wave.
///
/// A subtask is ready when it is not yet started (`Pending` or
/// `WaitingDependency`), it has an assigned agent, and every dependency id
/// is in the completed set. Unassigned subtasks can never become ready.
pub fn ready_subtasks(subtasks: &[Subtask], completed: &HashSet<SubtaskId>) -> Vec<SubtaskId> {
    subtasks
        .iter()
        .filter(|st| {
            matches!(
                st.status,
                SubtaskStatus::Pending | SubtaskStatus::WaitingDependency
            ) && st.assigned_agent_id.is_some()
                && st.dependencies.iter().all(|dep| completed.contains(dep))
        })
        .map(|st| st.id)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
