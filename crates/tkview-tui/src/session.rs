//! Session state and the update loop.
//!
//! [`Session`] owns every piece of dashboard state: the resource trees, the
//! loaded agents, the expanded workflows, pane focus and the status line.
//! It is driven exclusively through [`Session::update`], one message at a
//! time, and answers with [`Command`]s describing the side effects it wants.
//! Fetch results are tagged with the scope they were issued for; results
//! whose scope no longer matches the current selection are dropped.

use tracing::{debug, info, warn};

use tkview_core::error::{Result, TkviewError};
use tkview_core::nav::{self, ExpandedSet};
use tkview_core::tree::{
    EnvironmentScope, OrganisationNode, TreeStore, WorkflowNode, WorkflowScope,
};
use tkview_core::types::{Agent, EnvironmentId, Execution, Workflow, WorkflowId};

use crate::event::Intent;
use crate::message::{Command, Message};
use crate::view::Pane;

/// An error shown in the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub message: String,
    pub guidance: Option<&'static str>,
}

impl From<&TkviewError> for ErrorNotice {
    fn from(err: &TkviewError) -> Self {
        Self {
            message: err.to_string(),
            guidance: err.guidance(),
        }
    }
}

/// Fetches currently in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Loading {
    pub organisations: bool,
    pub agents: bool,
    pub workflows: bool,
}

impl Loading {
    pub fn any(&self) -> bool {
        self.organisations || self.agents || self.workflows
    }
}

/// Read-only view of the session handed to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub organisations: &'a [OrganisationNode],
    /// Selected environment, only while it is still in the tree
    pub current_environment: Option<&'a EnvironmentId>,
    pub agents: &'a [Agent],
    pub workflows: &'a [WorkflowNode],
    /// Selected workflow, only while it is still in the tree
    pub current_workflow: Option<&'a WorkflowId>,
    pub expanded: &'a ExpandedSet,
    pub focus: Pane,
    pub size: (u16, u16),
    pub loading: Loading,
    pub last_error: Option<&'a ErrorNotice>,
    pub show_help: bool,
}

impl Snapshot<'_> {
    pub fn is_expanded(&self, workflow_id: &WorkflowId) -> bool {
        self.expanded.contains(workflow_id)
    }

    /// True once a load finished without yielding any environment.
    pub fn is_tree_empty(&self) -> bool {
        !self.loading.organisations
            && !self
                .organisations
                .iter()
                .any(|node| !node.environments.is_empty())
    }
}

/// Dashboard session state.
#[derive(Debug, Default)]
pub struct Session {
    tree: TreeStore,
    agents: Vec<Agent>,
    expanded: ExpandedSet,
    focus: Pane,
    size: (u16, u16),
    loading: Loading,
    last_error: Option<ErrorNotice>,
    show_help: bool,
    should_quit: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> &TreeStore {
        &self.tree
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn focus(&self) -> Pane {
        self.focus
    }

    pub fn loading(&self) -> Loading {
        self.loading
    }

    pub fn last_error(&self) -> Option<&ErrorNotice> {
        self.last_error.as_ref()
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn is_expanded(&self, workflow_id: &WorkflowId) -> bool {
        self.expanded.contains(workflow_id)
    }

    /// Snapshot of everything the renderer needs.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            organisations: self.tree.organisations(),
            current_environment: self.tree.current_environment().ok().map(|env| &env.id),
            agents: &self.agents,
            workflows: self.tree.workflows(),
            current_workflow: self.tree.current_workflow().ok().map(WorkflowNode::id),
            expanded: &self.expanded,
            focus: self.focus,
            size: self.size,
            loading: self.loading,
            last_error: self.last_error.as_ref(),
            show_help: self.show_help,
        }
    }

    /// Apply one message and return the side effects it requires.
    pub fn update(&mut self, message: Message) -> Vec<Command> {
        match message {
            Message::Load => self.load(),
            Message::Intent(intent) => self.handle_intent(intent),
            Message::Resize { width, height } => {
                self.size = (width, height);
                Vec::new()
            }
            Message::Tick => self.refresh_workflows(),
            Message::OrganisationTreeLoaded(result) => self.on_organisation_tree(result),
            Message::EnvironmentChanged(env_id) => self.on_environment_changed(&env_id),
            Message::AgentsLoaded { scope, result } => self.on_agents(&scope, result),
            Message::WorkflowTreeLoaded { scope, result } => self.on_workflow_tree(&scope, result),
            Message::WorkflowChanged(workflow_id) => self.on_workflow_changed(&workflow_id),
            Message::ExecutionsLoaded { scope, result } => self.on_executions(&scope, result),
        }
    }

    // =========================================================================
    // Fetch results
    // =========================================================================

    fn load(&mut self) -> Vec<Command> {
        self.loading.organisations = true;
        vec![Command::FetchOrganisationTree]
    }

    fn on_organisation_tree(&mut self, result: Result<Vec<OrganisationNode>>) -> Vec<Command> {
        self.loading.organisations = false;

        let tree = match result {
            Ok(tree) => tree,
            Err(err) if err.is_no_data() => {
                debug!(error = %err, "organisation tree not available yet");
                return Vec::new();
            }
            Err(err) => {
                self.tree.reset_organisations();
                self.agents.clear();
                self.loading.agents = false;
                self.loading.workflows = false;
                self.surface(&err);
                return Vec::new();
            }
        };

        self.tree.replace_organisations(tree);
        self.last_error = None;
        info!(
            organisations = self.tree.organisations().len(),
            "organisation tree loaded"
        );

        let selection = self.tree.current_environment().map(|_| ());
        match selection {
            Ok(()) => Vec::new(),
            Err(err) => {
                if err.is_stale_selection() {
                    warn!(error = %err, "selected environment vanished, reselecting");
                }
                match nav::first_environment(self.tree.organisations()).cloned() {
                    Some(env_id) => vec![Command::Dispatch(Message::EnvironmentChanged(env_id))],
                    None => {
                        info!("organisation tree has no environments");
                        self.tree.clear_selection();
                        self.agents.clear();
                        self.loading.agents = false;
                        self.loading.workflows = false;
                        Vec::new()
                    }
                }
            }
        }
    }

    fn on_environment_changed(&mut self, env_id: &EnvironmentId) -> Vec<Command> {
        let previous_org = self.tree.current_organisation().ok().map(|org| org.id.clone());

        if let Err(err) = self.tree.select_environment(env_id) {
            return self.recover_environment(err);
        }
        let scope = match self.tree.environment_scope() {
            Ok(scope) => scope,
            Err(err) => return self.recover_environment(err),
        };

        if previous_org.as_ref() != Some(&scope.organisation) {
            self.agents.clear();
        }

        info!(%scope, "environment selected");
        self.loading.agents = true;
        self.loading.workflows = true;
        vec![
            Command::FetchAgents(scope.clone()),
            Command::FetchWorkflows(scope),
        ]
    }

    fn on_agents(&mut self, scope: &EnvironmentScope, result: Result<Vec<Agent>>) -> Vec<Command> {
        if !self.is_current_environment(scope) {
            debug!(%scope, "discarding agents for a stale scope");
            return Vec::new();
        }
        self.loading.agents = false;

        match result {
            Ok(agents) => self.agents = agents,
            Err(err) if err.is_no_data() => debug!(error = %err, "agents not available yet"),
            Err(err) => self.surface(&err),
        }
        Vec::new()
    }

    fn on_workflow_tree(
        &mut self,
        scope: &EnvironmentScope,
        result: Result<Vec<Workflow>>,
    ) -> Vec<Command> {
        if !self.is_current_environment(scope) {
            debug!(%scope, "discarding workflows for a stale scope");
            return Vec::new();
        }
        self.loading.workflows = false;

        let workflows = match result {
            Ok(workflows) => workflows,
            Err(err) if err.is_no_data() => {
                debug!(error = %err, "workflows not available yet");
                return Vec::new();
            }
            Err(err) => {
                self.surface(&err);
                return Vec::new();
            }
        };

        if let Err(err) = self.tree.replace_workflows(scope, workflows) {
            self.surface(&err);
            return Vec::new();
        }

        // A surviving selection keeps its carried-forward executions.
        if self.tree.current_workflow().is_ok() {
            return Vec::new();
        }

        match self.tree.workflows().first().map(|node| node.id().clone()) {
            Some(first) => vec![Command::Dispatch(Message::WorkflowChanged(first))],
            None => {
                self.tree.clear_workflow_selection();
                Vec::new()
            }
        }
    }

    fn on_workflow_changed(&mut self, workflow_id: &WorkflowId) -> Vec<Command> {
        match self.tree.select_workflow(workflow_id) {
            Ok(scope) => {
                debug!(%scope, "workflow selected");
                vec![Command::FetchExecutions(scope)]
            }
            Err(err) => self.recover_workflow(err),
        }
    }

    fn on_executions(&mut self, scope: &WorkflowScope, result: Result<Vec<Execution>>) -> Vec<Command> {
        if self.tree.workflow_scope().ok().as_ref() != Some(scope) {
            debug!(%scope, "discarding executions for a stale scope");
            return Vec::new();
        }

        match result {
            Ok(executions) => {
                if let Err(err) = self.tree.store_executions(scope, executions) {
                    self.surface(&err);
                }
            }
            Err(err) if err.is_no_data() => debug!(error = %err, "executions not available yet"),
            Err(err) => self.surface(&err),
        }
        Vec::new()
    }

    // =========================================================================
    // Intents
    // =========================================================================

    fn handle_intent(&mut self, intent: Intent) -> Vec<Command> {
        // Any key other than quit closes the help overlay.
        if self.show_help && intent != Intent::Quit {
            self.show_help = false;
            return Vec::new();
        }

        match intent {
            Intent::Quit => {
                self.should_quit = true;
                vec![Command::Quit]
            }
            Intent::Next => self.navigate(true),
            Intent::Prev => self.navigate(false),
            Intent::Toggle => self.toggle_current_workflow(),
            Intent::Focus(pane) => {
                self.focus = pane;
                Vec::new()
            }
            Intent::FocusNext => {
                self.focus = self.focus.next();
                Vec::new()
            }
            Intent::FocusPrev => {
                self.focus = self.focus.prev();
                Vec::new()
            }
            Intent::Refresh => self.refresh(),
            Intent::ToggleHelp => {
                self.show_help = true;
                Vec::new()
            }
            Intent::Cancel => {
                self.last_error = None;
                Vec::new()
            }
            Intent::None => Vec::new(),
        }
    }

    fn navigate(&mut self, forward: bool) -> Vec<Command> {
        match self.focus {
            Pane::Environments => {
                let current = self.tree.current_environment().map(|env| env.id.clone());
                let current = match current {
                    Ok(id) => id,
                    Err(TkviewError::NoSelection) => return Vec::new(),
                    Err(err) => return self.recover_environment(err),
                };

                let organisations = self.tree.organisations();
                let target = if forward {
                    nav::next_environment(organisations, &current)
                } else {
                    nav::prev_environment(organisations, &current)
                };
                target
                    .cloned()
                    .map(|id| vec![Command::Dispatch(Message::EnvironmentChanged(id))])
                    .unwrap_or_default()
            }
            Pane::Workflows => {
                let current = self.tree.current_workflow().map(|node| node.id().clone());
                let current = match current {
                    Ok(id) => id,
                    Err(TkviewError::NoSelection) => return Vec::new(),
                    Err(err) => return self.recover_workflow(err),
                };

                let workflows = self.tree.workflows();
                let target = if forward {
                    nav::next_workflow(workflows, &current)
                } else {
                    nav::prev_workflow(workflows, &current)
                };
                target
                    .cloned()
                    .map(|id| vec![Command::Dispatch(Message::WorkflowChanged(id))])
                    .unwrap_or_default()
            }
            Pane::Agents => Vec::new(),
        }
    }

    fn toggle_current_workflow(&mut self) -> Vec<Command> {
        let current = self.tree.current_workflow().map(|node| node.id().clone());
        match current {
            Ok(id) => {
                self.expanded = nav::toggle_expand(std::mem::take(&mut self.expanded), &id);
                Vec::new()
            }
            Err(TkviewError::NoSelection) => Vec::new(),
            Err(err) => self.recover_workflow(err),
        }
    }

    fn refresh(&mut self) -> Vec<Command> {
        self.loading.organisations = true;
        let mut commands = vec![Command::FetchOrganisationTree];

        if let Ok(scope) = self.tree.environment_scope() {
            self.loading.agents = true;
            self.loading.workflows = true;
            commands.push(Command::FetchAgents(scope.clone()));
            commands.push(Command::FetchWorkflows(scope));
        }
        commands
    }

    fn refresh_workflows(&mut self) -> Vec<Command> {
        match self.tree.environment_scope() {
            Ok(scope) => {
                self.loading.workflows = true;
                vec![Command::FetchWorkflows(scope)]
            }
            Err(_) => Vec::new(),
        }
    }

    // =========================================================================
    // Errors
    // =========================================================================

    fn is_current_environment(&self, scope: &EnvironmentScope) -> bool {
        self.tree.environment_scope().ok().as_ref() == Some(scope)
    }

    fn surface(&mut self, err: &TkviewError) {
        warn!(error = %err, "operation failed");
        self.last_error = Some(ErrorNotice::from(err));
    }

    /// A vanished environment means the tree is out of date: reload it.
    fn recover_environment(&mut self, err: TkviewError) -> Vec<Command> {
        self.surface(&err);
        if err.is_stale_selection() {
            self.loading.organisations = true;
            vec![Command::FetchOrganisationTree]
        } else {
            Vec::new()
        }
    }

    /// A vanished workflow means the workflow tree is out of date: reload it.
    fn recover_workflow(&mut self, err: TkviewError) -> Vec<Command> {
        self.surface(&err);
        if err.is_stale_selection() {
            self.refresh_workflows()
        } else {
            Vec::new()
        }
    }
}
