//! Navigation over the resource tree.
//!
//! Pure functions: they read a tree view and return the id to select next,
//! leaving the actual selection to the caller. `None` means "no valid
//! target" (empty tree, or the current id is no longer present) and is
//! always a no-op for the caller. Nothing here indexes into a sequence
//! without checking it is non-empty.

use std::collections::HashSet;

use crate::tree::{OrganisationNode, WorkflowNode};
use crate::types::{EnvironmentId, WorkflowId};

/// Workflows currently shown expanded, keyed by id.
pub type ExpandedSet = HashSet<WorkflowId>;

/// Flatten the org tree into environment ids, org order then env order.
///
/// Organisations without environments contribute nothing, so they are
/// skipped over rather than treated as targets.
fn environment_ring(organisations: &[OrganisationNode]) -> Vec<&EnvironmentId> {
    organisations
        .iter()
        .flat_map(|node| node.environments.iter().map(|env| &env.id))
        .collect()
}

fn step<'a, T: PartialEq>(ring: &[&'a T], current: &T, forward: bool) -> Option<&'a T> {
    let len = ring.len();
    let position = ring.iter().position(|id| *id == current)?;
    let target = if forward {
        (position + 1) % len
    } else {
        (position + len - 1) % len
    };
    Some(ring[target])
}

/// First environment of the first organisation that has one.
pub fn first_environment(organisations: &[OrganisationNode]) -> Option<&EnvironmentId> {
    environment_ring(organisations).into_iter().next()
}

/// Successor of `current`, wrapping from the last environment of the last
/// organisation to the first environment of the first.
pub fn next_environment<'a>(
    organisations: &'a [OrganisationNode],
    current: &EnvironmentId,
) -> Option<&'a EnvironmentId> {
    step(&environment_ring(organisations), current, true)
}

/// Predecessor of `current`, wrapping from the first environment to the last.
pub fn prev_environment<'a>(
    organisations: &'a [OrganisationNode],
    current: &EnvironmentId,
) -> Option<&'a EnvironmentId> {
    step(&environment_ring(organisations), current, false)
}

/// Successor of `current` in the already sorted workflow slice, wrapping.
pub fn next_workflow<'a>(workflows: &'a [WorkflowNode], current: &WorkflowId) -> Option<&'a WorkflowId> {
    let ring: Vec<_> = workflows.iter().map(WorkflowNode::id).collect();
    step(&ring, current, true)
}

/// Predecessor of `current` in the already sorted workflow slice, wrapping.
pub fn prev_workflow<'a>(workflows: &'a [WorkflowNode], current: &WorkflowId) -> Option<&'a WorkflowId> {
    let ring: Vec<_> = workflows.iter().map(WorkflowNode::id).collect();
    step(&ring, current, false)
}

/// Flip membership of `workflow_id` in the expanded set.
pub fn toggle_expand(mut expanded: ExpandedSet, workflow_id: &WorkflowId) -> ExpandedSet {
    if !expanded.remove(workflow_id) {
        expanded.insert(workflow_id.clone());
    }
    expanded
}
