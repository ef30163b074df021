//! HTTP client for the Testkube API.
//!
//! [`TestkubeClient`] implements every lister trait from `tkview_core` with
//! plain `GET` requests authenticated by a bearer token. It holds no session
//! state, so one instance can be shared by all in-flight fetches.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use tkview_core::config::Config;
use tkview_core::error::{Result, TkviewError};
use tkview_core::lister::{AgentLister, EnvironmentLister, OrganisationLister, WorkflowLister};
use tkview_core::types::{
    Agent, Environment, EnvironmentId, Execution, Organisation, OrganisationId, Workflow,
    WorkflowId,
};

use crate::api_types::{
    ApiAgent, ApiEnvironment, ApiExecutionsResult, ApiOrganisation, ApiWorkflowWithExecution,
    ListResponse,
};

/// Connection settings for [`TestkubeClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL at which the API is served
    pub base_url: String,
    /// Bearer token
    pub token: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            timeout_secs: 60,
        }
    }

    /// Build client settings from the dashboard configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let token = config
            .token
            .clone()
            .ok_or_else(|| TkviewError::ConfigMissingField {
                field: "token".into(),
            })?;

        Ok(Self {
            base_url: config.api_url.clone(),
            token,
            timeout_secs: config.request_timeout_secs,
        })
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Testkube API client.
#[derive(Debug, Clone)]
pub struct TestkubeClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl TestkubeClient {
    /// Create a client from connection settings.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| TkviewError::transport("parse API URL", e))?;
        if base_url.cannot_be_a_base() {
            return Err(TkviewError::transport(
                "parse API URL",
                format!("{} cannot be used as a base URL", config.base_url),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TkviewError::transport("build HTTP client", e))?;

        Ok(Self {
            http,
            base_url,
            token: config.token,
        })
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Issue a GET and decode the JSON body.
    async fn get<T: DeserializeOwned>(&self, operation: &str, segments: &[&str]) -> Result<T> {
        let url = self.endpoint(segments);
        debug!(operation, %url, "sending API request");

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| classify_send_error(operation, e))?;

        match response.status() {
            StatusCode::REQUEST_TIMEOUT => {
                return Err(TkviewError::RequestTimeout {
                    operation: operation.to_string(),
                });
            }
            status if !status.is_success() => {
                return Err(TkviewError::UnexpectedStatus {
                    operation: operation.to_string(),
                    status: status.as_u16(),
                });
            }
            _ => {}
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_send_error(operation, e))?;

        serde_json::from_slice(&body).map_err(|e| TkviewError::decode(operation, e))
    }
}

fn classify_send_error(operation: &str, err: reqwest::Error) -> TkviewError {
    if err.is_timeout() {
        TkviewError::RequestTimeout {
            operation: operation.to_string(),
        }
    } else {
        TkviewError::transport(operation, err)
    }
}

#[async_trait]
impl OrganisationLister for TestkubeClient {
    async fn list_organisations(&self) -> Result<Vec<Organisation>> {
        let list: ListResponse<ApiOrganisation> =
            self.get("list organisations", &["organizations"]).await?;
        Ok(list.elements.into_iter().map(Organisation::from).collect())
    }
}

#[async_trait]
impl EnvironmentLister for TestkubeClient {
    async fn list_environments(&self, organisation: &OrganisationId) -> Result<Vec<Environment>> {
        let list: ListResponse<ApiEnvironment> = self
            .get(
                "list environments",
                &["organizations", organisation.as_str(), "environments"],
            )
            .await?;
        Ok(list.elements.into_iter().map(Environment::from).collect())
    }
}

#[async_trait]
impl AgentLister for TestkubeClient {
    async fn list_agents(&self, organisation: &OrganisationId) -> Result<Vec<Agent>> {
        let list: ListResponse<ApiAgent> = self
            .get(
                "list agents",
                &["organizations", organisation.as_str(), "agents"],
            )
            .await?;
        Ok(list.elements.into_iter().map(Agent::from).collect())
    }
}

#[async_trait]
impl WorkflowLister for TestkubeClient {
    async fn list_workflows(
        &self,
        organisation: &OrganisationId,
        environment: &EnvironmentId,
    ) -> Result<Vec<Workflow>> {
        let entries: Vec<ApiWorkflowWithExecution> = self
            .get(
                "list workflows",
                &[
                    "organizations",
                    organisation.as_str(),
                    "environments",
                    environment.as_str(),
                    "agent",
                    "test-workflow-with-executions",
                ],
            )
            .await?;
        Ok(entries.into_iter().map(Workflow::from).collect())
    }

    async fn list_executions(
        &self,
        organisation: &OrganisationId,
        environment: &EnvironmentId,
        workflow: &WorkflowId,
    ) -> Result<Vec<Execution>> {
        let result: ApiExecutionsResult = self
            .get(
                "list executions",
                &[
                    "organizations",
                    organisation.as_str(),
                    "environments",
                    environment.as_str(),
                    "agent",
                    "test-workflows",
                    workflow.as_str(),
                    "executions",
                ],
            )
            .await?;
        Ok(result.results.into_iter().map(Execution::from).collect())
    }
}
