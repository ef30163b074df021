//! Wire types for the Testkube API.
//!
//! These mirror the JSON the API returns and are converted into the
//! `tkview_core::types` records before leaving this crate.

use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;

use tkview_core::types::{Agent, Environment, Execution, Organisation, Status, Workflow};

/// Paged list envelope used by the organisation-level endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub elements: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiOrganisation {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvironment {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAgent {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub agent_type: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub accessed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiWorkflowRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiWorkflowWithExecution {
    pub workflow: ApiWorkflowRef,
    #[serde(default)]
    pub latest_execution: Option<ApiExecution>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiExecution {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub result: Option<ApiExecutionResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiExecutionResult {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiExecutionsResult {
    #[serde(default)]
    pub results: Vec<ApiExecution>,
}

/// The API reports "never" as the zero time `0001-01-01T00:00:00Z`.
fn non_zero(ts: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    ts.filter(|t| t.year() > 1)
}

fn status_of(result: Option<&ApiExecutionResult>) -> Status {
    result
        .and_then(|r| r.status.as_deref())
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}

impl From<ApiOrganisation> for Organisation {
    fn from(org: ApiOrganisation) -> Self {
        Self {
            id: org.id.into(),
            name: org.name,
        }
    }
}

impl From<ApiEnvironment> for Environment {
    fn from(env: ApiEnvironment) -> Self {
        Self {
            id: env.id.into(),
            name: env.name,
        }
    }
}

impl From<ApiAgent> for Agent {
    fn from(agent: ApiAgent) -> Self {
        let agent_type = agent
            .agent_type
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Unknown".to_string());

        Self {
            id: agent.id.into(),
            name: agent.name,
            agent_type,
            version: agent.version.unwrap_or_default(),
            last_seen: non_zero(agent.accessed_at),
        }
    }
}

impl From<ApiWorkflowWithExecution> for Workflow {
    fn from(entry: ApiWorkflowWithExecution) -> Self {
        let latest = entry.latest_execution.as_ref();
        Self {
            id: entry.workflow.name.as_str().into(),
            name: entry.workflow.name,
            last_execution_at: non_zero(latest.and_then(|e| e.scheduled_at)),
            last_execution_status: status_of(latest.and_then(|e| e.result.as_ref())),
        }
    }
}

impl From<ApiExecution> for Execution {
    fn from(execution: ApiExecution) -> Self {
        let status = status_of(execution.result.as_ref());
        Self {
            id: execution.id.into(),
            name: execution.name,
            started_at: non_zero(execution.scheduled_at),
            status,
        }
    }
}
