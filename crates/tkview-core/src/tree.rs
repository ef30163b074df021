//! Resource tree store.
//!
//! Owns the organisation → environment tree, the workflow → execution tree of
//! the selected environment, and the three "current" pointers (organisation,
//! environment, workflow). The store never performs I/O itself: fetches run
//! elsewhere and their results are applied here on the dispatch thread.
//!
//! Two failure policies apply:
//! - The organisation tree is all-or-nothing. [`fetch_organisation_tree`] never
//!   yields a tree with missing branches, and a failed load resets the store.
//! - The workflow tree is fail-soft. A failed refresh leaves the previous
//!   snapshot authoritative.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::error::{Result, TkviewError};
use crate::lister::{EnvironmentLister, OrganisationLister};
use crate::types::{
    Environment, EnvironmentId, Execution, Organisation, OrganisationId, Workflow, WorkflowId,
};

/// An organisation together with its environments, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganisationNode {
    pub organisation: Organisation,
    pub environments: Vec<Environment>,
}

/// A workflow together with its lazily fetched executions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowNode {
    pub workflow: Workflow,
    pub executions: Vec<Execution>,
}

impl WorkflowNode {
    pub fn id(&self) -> &WorkflowId {
        &self.workflow.id
    }
}

/// The (organisation, environment) pair a fetch was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvironmentScope {
    pub organisation: OrganisationId,
    pub environment: EnvironmentId,
}

impl fmt::Display for EnvironmentScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.organisation, self.environment)
    }
}

/// The (organisation, environment, workflow) triple a fetch was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkflowScope {
    pub environment: EnvironmentScope,
    pub workflow: WorkflowId,
}

impl fmt::Display for WorkflowScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.environment, self.workflow)
    }
}

/// Fetch every organisation and its environments.
///
/// Aborts on the first failing environment listing and returns the error;
/// a partially built tree is dropped, never returned.
pub async fn fetch_organisation_tree<L>(lister: &L) -> Result<Vec<OrganisationNode>>
where
    L: OrganisationLister + EnvironmentLister + ?Sized,
{
    let organisations = lister.list_organisations().await?;

    let mut tree = Vec::with_capacity(organisations.len());
    for organisation in organisations {
        let environments = lister.list_environments(&organisation.id).await?;
        tree.push(OrganisationNode {
            organisation,
            environments,
        });
    }

    Ok(tree)
}

/// Sort workflows most recent first; never-run workflows go last, stably.
pub fn sort_workflows(workflows: &mut [WorkflowNode]) {
    workflows.sort_by(|a, b| {
        b.workflow
            .last_execution_at
            .cmp(&a.workflow.last_execution_at)
    });
}

/// In-memory session tree and current selections.
#[derive(Debug, Default)]
pub struct TreeStore {
    organisations: Vec<OrganisationNode>,
    workflows: Vec<WorkflowNode>,
    current_organisation: Option<OrganisationId>,
    current_environment: Option<EnvironmentId>,
    current_workflow: Option<WorkflowId>,
}

impl TreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The organisation tree in source order.
    pub fn organisations(&self) -> &[OrganisationNode] {
        &self.organisations
    }

    /// The workflow tree, sorted by last execution descending.
    pub fn workflows(&self) -> &[WorkflowNode] {
        &self.workflows
    }

    // =========================================================================
    // Organisation tree
    // =========================================================================

    /// Replace the organisation tree with a freshly fetched one.
    ///
    /// The current selection is left untouched; if the selected environment
    /// moved to another organisation the organisation pointer follows it.
    pub fn replace_organisations(&mut self, tree: Vec<OrganisationNode>) -> &[OrganisationNode] {
        self.organisations = tree;

        let owner = self
            .current_environment
            .as_ref()
            .and_then(|env_id| self.find_environment(env_id))
            .map(|(org, _)| org.id.clone());
        if let Some(org_id) = owner {
            self.current_organisation = Some(org_id);
        }

        debug!(
            organisations = self.organisations.len(),
            "organisation tree replaced"
        );
        &self.organisations
    }

    /// Discard the organisation tree and everything scoped beneath it.
    pub fn reset_organisations(&mut self) {
        self.organisations.clear();
        self.workflows.clear();
        self.current_organisation = None;
        self.current_environment = None;
        self.current_workflow = None;
        debug!("organisation tree reset");
    }

    /// Drop every selection but keep the organisation tree.
    ///
    /// Used when a refreshed tree no longer offers any environment to select.
    pub fn clear_selection(&mut self) {
        self.workflows.clear();
        self.current_organisation = None;
        self.current_environment = None;
        self.current_workflow = None;
    }

    /// Make `env_id` the current environment.
    ///
    /// The first match wins. Moving to a different environment drops the
    /// workflow tree, since workflow ids are only unique per environment.
    pub fn select_environment(&mut self, env_id: &EnvironmentId) -> Result<()> {
        if self.organisations.is_empty() {
            return Err(TkviewError::NoTreeLoaded);
        }

        let (org_id, env_id) = match self.find_environment(env_id) {
            Some((org, env)) => (org.id.clone(), env.id.clone()),
            None => return Err(TkviewError::environment_not_found(env_id)),
        };

        if self.current_environment.as_ref() != Some(&env_id) {
            self.workflows.clear();
            self.current_workflow = None;
        }

        self.current_organisation = Some(org_id);
        self.current_environment = Some(env_id);
        Ok(())
    }

    /// The selected environment.
    ///
    /// Fails with `EnvironmentNotFound` when the selection has gone stale.
    pub fn current_environment(&self) -> Result<&Environment> {
        let env_id = self
            .current_environment
            .as_ref()
            .ok_or(TkviewError::NoSelection)?;

        self.find_environment(env_id)
            .map(|(_, env)| env)
            .ok_or_else(|| TkviewError::environment_not_found(env_id))
    }

    /// The organisation owning the selected environment.
    pub fn current_organisation(&self) -> Result<&Organisation> {
        let env_id = self
            .current_environment
            .as_ref()
            .ok_or(TkviewError::NoSelection)?;

        self.find_environment(env_id)
            .map(|(org, _)| org)
            .ok_or_else(|| TkviewError::environment_not_found(env_id))
    }

    /// Scope of the current selection, for tagging fetches.
    pub fn environment_scope(&self) -> Result<EnvironmentScope> {
        let organisation = self.current_organisation()?.id.clone();
        let environment = self.current_environment()?.id.clone();
        Ok(EnvironmentScope {
            organisation,
            environment,
        })
    }

    fn find_environment(&self, env_id: &EnvironmentId) -> Option<(&Organisation, &Environment)> {
        self.organisations.iter().find_map(|node| {
            node.environments
                .iter()
                .find(|env| &env.id == env_id)
                .map(|env| (&node.organisation, env))
        })
    }

    // =========================================================================
    // Workflow tree
    // =========================================================================

    /// Merge a freshly fetched workflow list into the workflow tree.
    ///
    /// Executions already fetched for a workflow id present in the previous
    /// snapshot are carried forward; new workflows start with none. The
    /// result is sorted by last execution, most recent first.
    pub fn replace_workflows(
        &mut self,
        scope: &EnvironmentScope,
        fetched: Vec<Workflow>,
    ) -> Result<&[WorkflowNode]> {
        match (&self.current_organisation, &self.current_environment) {
            (Some(org), Some(env)) if org == &scope.organisation && env == &scope.environment => {}
            (Some(_), Some(_)) => {
                return Err(TkviewError::StaleResult {
                    scope: scope.to_string(),
                });
            }
            _ => return Err(TkviewError::NoSelection),
        }

        let mut previous: HashMap<WorkflowId, Vec<Execution>> = std::mem::take(&mut self.workflows)
            .into_iter()
            .map(|node| (node.workflow.id, node.executions))
            .collect();

        let mut workflows: Vec<WorkflowNode> = fetched
            .into_iter()
            .map(|workflow| {
                let executions = previous.remove(&workflow.id).unwrap_or_default();
                WorkflowNode {
                    workflow,
                    executions,
                }
            })
            .collect();
        sort_workflows(&mut workflows);

        debug!(%scope, workflows = workflows.len(), "workflow tree replaced");
        self.workflows = workflows;
        Ok(&self.workflows)
    }

    /// Make `workflow_id` the current workflow.
    ///
    /// Returns the scope to fetch its executions with. A failed selection
    /// leaves the current workflow unchanged.
    pub fn select_workflow(&mut self, workflow_id: &WorkflowId) -> Result<WorkflowScope> {
        if self.workflows.is_empty() {
            return Err(TkviewError::NoTreeLoaded);
        }
        if !self.workflows.iter().any(|node| node.id() == workflow_id) {
            return Err(TkviewError::workflow_not_found(workflow_id));
        }

        let environment = self.environment_scope()?;
        self.current_workflow = Some(workflow_id.clone());

        Ok(WorkflowScope {
            environment,
            workflow: workflow_id.clone(),
        })
    }

    /// Forget the current workflow (used when the workflow tree is empty).
    pub fn clear_workflow_selection(&mut self) {
        self.current_workflow = None;
    }

    /// Attach fetched executions to the workflow they were fetched for.
    pub fn store_executions(&mut self, scope: &WorkflowScope, executions: Vec<Execution>) -> Result<()> {
        if self.environment_scope().ok().as_ref() != Some(&scope.environment) {
            return Err(TkviewError::StaleResult {
                scope: scope.to_string(),
            });
        }

        let node = self
            .workflows
            .iter_mut()
            .find(|node| node.id() == &scope.workflow)
            .ok_or_else(|| TkviewError::workflow_not_found(&scope.workflow))?;
        node.executions = executions;
        Ok(())
    }

    /// The selected workflow.
    ///
    /// Fails with `WorkflowNotFound` when the selection has gone stale.
    pub fn current_workflow(&self) -> Result<&WorkflowNode> {
        let workflow_id = self
            .current_workflow
            .as_ref()
            .ok_or(TkviewError::NoSelection)?;

        self.workflows
            .iter()
            .find(|node| node.id() == workflow_id)
            .ok_or_else(|| TkviewError::workflow_not_found(workflow_id))
    }

    /// Scope of the selected workflow.
    pub fn workflow_scope(&self) -> Result<WorkflowScope> {
        let workflow = self.current_workflow()?.id().clone();
        Ok(WorkflowScope {
            environment: self.environment_scope()?,
            workflow,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::{ExecutionId, Status};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    pub(crate) fn org(id: &str, envs: &[&str]) -> OrganisationNode {
        OrganisationNode {
            organisation: Organisation {
                id: id.into(),
                name: format!("Org {id}"),
            },
            environments: envs
                .iter()
                .map(|env| Environment {
                    id: (*env).into(),
                    name: format!("Env {env}"),
                })
                .collect(),
        }
    }

    pub(crate) fn workflow(id: &str, hour: Option<u32>, status: Status) -> Workflow {
        Workflow {
            id: id.into(),
            name: id.to_string(),
            last_execution_at: hour.map(|h| Utc.with_ymd_and_hms(2025, 3, 1, h, 0, 0).unwrap()),
            last_execution_status: status,
        }
    }

    fn execution(id: &str) -> Execution {
        Execution {
            id: ExecutionId::new(id),
            name: id.to_string(),
            started_at: None,
            status: Status::Passed,
        }
    }

    fn scope(org: &str, env: &str) -> EnvironmentScope {
        EnvironmentScope {
            organisation: org.into(),
            environment: env.into(),
        }
    }

    fn store_with_env() -> TreeStore {
        let mut store = TreeStore::new();
        store.replace_organisations(vec![org("o1", &["e1", "e2"])]);
        store.select_environment(&"e1".into()).unwrap();
        store
    }

    fn ids(store: &TreeStore) -> Vec<&str> {
        store.workflows().iter().map(|n| n.id().as_str()).collect()
    }

    struct FakeLister {
        organisations: Vec<OrganisationNode>,
        failing_org: Option<&'static str>,
    }

    #[async_trait]
    impl OrganisationLister for FakeLister {
        async fn list_organisations(&self) -> Result<Vec<Organisation>> {
            Ok(self
                .organisations
                .iter()
                .map(|n| n.organisation.clone())
                .collect())
        }
    }

    #[async_trait]
    impl EnvironmentLister for FakeLister {
        async fn list_environments(&self, organisation: &OrganisationId) -> Result<Vec<Environment>> {
            if self.failing_org == Some(organisation.as_str()) {
                return Err(TkviewError::transport("list environments", "connection reset"));
            }
            Ok(self
                .organisations
                .iter()
                .find(|n| &n.organisation.id == organisation)
                .map(|n| n.environments.clone())
                .unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn test_fetch_organisation_tree_preserves_order() {
        let lister = FakeLister {
            organisations: vec![org("o1", &["e2", "e1"]), org("o2", &[]), org("o3", &["e3"])],
            failing_org: None,
        };

        let tree = fetch_organisation_tree(&lister).await.unwrap();
        assert_eq!(tree, lister.organisations);
    }

    #[tokio::test]
    async fn test_fetch_organisation_tree_aborts_on_environment_failure() {
        let lister = FakeLister {
            organisations: vec![org("o1", &["e1"]), org("o2", &["e2"]), org("o3", &["e3"])],
            failing_org: Some("o2"),
        };

        let err = fetch_organisation_tree(&lister).await.unwrap_err();
        assert!(matches!(err, TkviewError::Transport { .. }));
    }

    #[test]
    fn test_replace_organisations_is_idempotent() {
        let mut store = TreeStore::new();
        let tree = vec![org("o1", &["e1", "e2"]), org("o2", &["e3"])];

        store.replace_organisations(tree.clone());
        store.select_environment(&"e3".into()).unwrap();
        let first = store.organisations().to_vec();

        store.replace_organisations(tree);
        assert_eq!(store.organisations(), first.as_slice());
        assert_eq!(store.current_environment().unwrap().id.as_str(), "e3");
        assert_eq!(store.current_organisation().unwrap().id.as_str(), "o2");
    }

    #[test]
    fn test_select_environment_requires_tree() {
        let mut store = TreeStore::new();
        let err = store.select_environment(&"e1".into()).unwrap_err();
        assert!(matches!(err, TkviewError::NoTreeLoaded));
    }

    #[test]
    fn test_select_environment_not_found() {
        let mut store = store_with_env();
        let err = store.select_environment(&"nope".into()).unwrap_err();
        assert!(matches!(err, TkviewError::EnvironmentNotFound { .. }));
        assert_eq!(store.current_environment().unwrap().id.as_str(), "e1");
    }

    #[test]
    fn test_select_environment_sets_org_and_env() {
        let mut store = TreeStore::new();
        store.replace_organisations(vec![org("o1", &["e1"]), org("o2", &["e2"])]);
        store.select_environment(&"e2".into()).unwrap();

        let scope = store.environment_scope().unwrap();
        assert_eq!(scope.organisation.as_str(), "o2");
        assert_eq!(scope.environment.as_str(), "e2");
    }

    #[test]
    fn test_current_environment_without_selection() {
        let store = TreeStore::new();
        assert!(matches!(
            store.current_environment().unwrap_err(),
            TkviewError::NoSelection
        ));
    }

    #[test]
    fn test_current_environment_stale_selection() {
        let mut store = store_with_env();
        store.replace_organisations(vec![org("o1", &["e2"])]);

        let err = store.current_environment().unwrap_err();
        assert!(err.is_stale_selection());
        assert!(err.to_string().contains("e1"));
    }

    #[test]
    fn test_reset_organisations_clears_everything() {
        let mut store = store_with_env();
        store
            .replace_workflows(&scope("o1", "e1"), vec![workflow("w1", Some(9), Status::Passed)])
            .unwrap();

        store.reset_organisations();
        assert!(store.organisations().is_empty());
        assert!(store.workflows().is_empty());
        assert!(matches!(
            store.current_environment().unwrap_err(),
            TkviewError::NoSelection
        ));
    }

    #[test]
    fn test_clear_selection_keeps_tree() {
        let mut store = store_with_env();
        store.clear_selection();

        assert_eq!(store.organisations().len(), 1);
        assert!(matches!(
            store.current_environment(),
            Err(TkviewError::NoSelection)
        ));
    }

    #[test]
    fn test_replace_workflows_requires_selection() {
        let mut store = TreeStore::new();
        store.replace_organisations(vec![org("o1", &["e1"])]);
        let err = store
            .replace_workflows(&scope("o1", "e1"), vec![workflow("w1", None, Status::Unknown)])
            .unwrap_err();
        assert!(matches!(err, TkviewError::NoSelection));
    }

    #[test]
    fn test_replace_workflows_rejects_other_scope() {
        let mut store = store_with_env();
        let err = store
            .replace_workflows(&scope("o1", "e2"), vec![workflow("w1", None, Status::Unknown)])
            .unwrap_err();
        assert!(matches!(err, TkviewError::StaleResult { .. }));
        assert!(store.workflows().is_empty());
    }

    #[test]
    fn test_replace_workflows_sorts_most_recent_first() {
        let mut store = store_with_env();
        store
            .replace_workflows(
                &scope("o1", "e1"),
                vec![
                    workflow("never", None, Status::Unknown),
                    workflow("w1", Some(10), Status::Failed),
                    workflow("never-2", None, Status::Unknown),
                    workflow("w2", Some(11), Status::Running),
                ],
            )
            .unwrap();

        assert_eq!(ids(&store), vec!["w2", "w1", "never", "never-2"]);
        let times: Vec<_> = store
            .workflows()
            .iter()
            .map(|n| n.workflow.last_execution_at)
            .collect();
        assert!(times.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn test_replace_workflows_carries_executions_forward() {
        let mut store = store_with_env();
        let scope = scope("o1", "e1");
        store
            .replace_workflows(
                &scope,
                vec![
                    workflow("w1", Some(10), Status::Failed),
                    workflow("w2", Some(11), Status::Running),
                ],
            )
            .unwrap();
        let w1 = store.select_workflow(&"w1".into()).unwrap();
        store
            .store_executions(&w1, vec![execution("x1"), execution("x2")])
            .unwrap();

        store
            .replace_workflows(
                &scope,
                vec![
                    workflow("w1", Some(12), Status::Passed),
                    workflow("w3", Some(8), Status::Queued),
                ],
            )
            .unwrap();

        assert_eq!(ids(&store), vec!["w1", "w3"]);
        let w1 = &store.workflows()[0];
        assert_eq!(w1.executions, vec![execution("x1"), execution("x2")]);
        assert_eq!(w1.workflow.last_execution_status, Status::Passed);
        assert!(store.workflows()[1].executions.is_empty());
    }

    #[test]
    fn test_select_workflow_requires_tree() {
        let mut store = store_with_env();
        let err = store.select_workflow(&"w1".into()).unwrap_err();
        assert!(matches!(err, TkviewError::NoTreeLoaded));
    }

    #[test]
    fn test_select_missing_workflow_keeps_selection() {
        let mut store = store_with_env();
        store
            .replace_workflows(&scope("o1", "e1"), vec![workflow("w1", Some(10), Status::Failed)])
            .unwrap();
        store.select_workflow(&"w1".into()).unwrap();

        let err = store.select_workflow(&"missing".into()).unwrap_err();
        assert!(matches!(err, TkviewError::WorkflowNotFound { .. }));
        assert_eq!(store.current_workflow().unwrap().id().as_str(), "w1");
    }

    #[test]
    fn test_select_workflow_returns_full_scope() {
        let mut store = store_with_env();
        store
            .replace_workflows(&scope("o1", "e1"), vec![workflow("w1", Some(10), Status::Failed)])
            .unwrap();

        let workflow_scope = store.select_workflow(&"w1".into()).unwrap();
        assert_eq!(workflow_scope.environment, scope("o1", "e1"));
        assert_eq!(workflow_scope.workflow.as_str(), "w1");
        assert_eq!(store.workflow_scope().unwrap(), workflow_scope);
    }

    #[test]
    fn test_changing_environment_drops_workflows() {
        let mut store = store_with_env();
        store
            .replace_workflows(&scope("o1", "e1"), vec![workflow("w1", Some(10), Status::Failed)])
            .unwrap();
        store.select_workflow(&"w1".into()).unwrap();

        store.select_environment(&"e1".into()).unwrap();
        assert_eq!(store.workflows().len(), 1);

        store.select_environment(&"e2".into()).unwrap();
        assert!(store.workflows().is_empty());
        assert!(matches!(
            store.current_workflow().unwrap_err(),
            TkviewError::NoSelection
        ));
    }

    #[test]
    fn test_current_workflow_stale_selection() {
        let mut store = store_with_env();
        let scope = scope("o1", "e1");
        store
            .replace_workflows(&scope, vec![workflow("w1", Some(10), Status::Failed)])
            .unwrap();
        store.select_workflow(&"w1".into()).unwrap();
        store
            .replace_workflows(&scope, vec![workflow("w2", Some(10), Status::Failed)])
            .unwrap();

        let err = store.current_workflow().unwrap_err();
        assert!(err.is_stale_selection());
    }

    #[test]
    fn test_store_executions_rejects_stale_scope() {
        let mut store = store_with_env();
        store
            .replace_workflows(&scope("o1", "e1"), vec![workflow("w1", Some(10), Status::Failed)])
            .unwrap();
        let stale = WorkflowScope {
            environment: scope("o1", "e2"),
            workflow: "w1".into(),
        };

        let err = store.store_executions(&stale, vec![execution("x1")]).unwrap_err();
        assert!(matches!(err, TkviewError::StaleResult { .. }));
        assert!(store.workflows()[0].executions.is_empty());
    }
}
