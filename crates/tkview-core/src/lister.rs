//! Data source capabilities consumed by the resource tree.
//!
//! Each trait returns a finite, ordered sequence of records for a given parent
//! key. Implementations must be stateless with respect to the session so that
//! several fetches can be in flight against one shared instance.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    Agent, Environment, EnvironmentId, Execution, Organisation, OrganisationId, Workflow,
    WorkflowId,
};

/// Lists organisations visible to the authenticated caller.
#[async_trait]
pub trait OrganisationLister: Send + Sync {
    async fn list_organisations(&self) -> Result<Vec<Organisation>>;
}

/// Lists environments of an organisation, in source order.
#[async_trait]
pub trait EnvironmentLister: Send + Sync {
    async fn list_environments(&self, organisation: &OrganisationId) -> Result<Vec<Environment>>;
}

/// Lists agents registered with an organisation.
#[async_trait]
pub trait AgentLister: Send + Sync {
    async fn list_agents(&self, organisation: &OrganisationId) -> Result<Vec<Agent>>;
}

/// Lists workflows of an environment and executions of a workflow.
#[async_trait]
pub trait WorkflowLister: Send + Sync {
    async fn list_workflows(
        &self,
        organisation: &OrganisationId,
        environment: &EnvironmentId,
    ) -> Result<Vec<Workflow>>;

    async fn list_executions(
        &self,
        organisation: &OrganisationId,
        environment: &EnvironmentId,
        workflow: &WorkflowId,
    ) -> Result<Vec<Execution>>;
}

/// The full capability set a dashboard session needs.
pub trait Lister: OrganisationLister + EnvironmentLister + AgentLister + WorkflowLister {}

impl<T> Lister for T where T: OrganisationLister + EnvironmentLister + AgentLister + WorkflowLister {}
