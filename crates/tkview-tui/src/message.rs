//! Messages into and commands out of the session update loop.
//!
//! Every fetch result carries the scope it was issued for, so the session can
//! tell a current result from one that arrived after the user moved on.

use tkview_core::error::Result;
use tkview_core::tree::{EnvironmentScope, OrganisationNode, WorkflowScope};
use tkview_core::types::{Agent, EnvironmentId, Execution, Workflow, WorkflowId};

use crate::event::Intent;

/// Everything the session reacts to, processed one at a time.
#[derive(Debug)]
pub enum Message {
    /// Startup: load the organisation tree
    Load,
    /// A routed key press
    Intent(Intent),
    /// Terminal resized
    Resize { width: u16, height: u16 },
    /// Periodic workflow refresh
    Tick,
    /// Organisation tree fetch completed
    OrganisationTreeLoaded(Result<Vec<OrganisationNode>>),
    /// Select an environment
    EnvironmentChanged(EnvironmentId),
    /// Agent fetch completed
    AgentsLoaded {
        scope: EnvironmentScope,
        result: Result<Vec<Agent>>,
    },
    /// Workflow tree fetch completed
    WorkflowTreeLoaded {
        scope: EnvironmentScope,
        result: Result<Vec<Workflow>>,
    },
    /// Select a workflow
    WorkflowChanged(WorkflowId),
    /// Execution fetch completed
    ExecutionsLoaded {
        scope: WorkflowScope,
        result: Result<Vec<Execution>>,
    },
}

/// Side effects requested by the session, executed by the app.
#[derive(Debug)]
pub enum Command {
    FetchOrganisationTree,
    FetchAgents(EnvironmentScope),
    FetchWorkflows(EnvironmentScope),
    FetchExecutions(WorkflowScope),
    /// Feed a follow-up message back into the queue
    Dispatch(Message),
    Quit,
}
