//! Resource records shared across TKView crates.
//!
//! Identifiers are opaque strings, unique within their parent scope and stable
//! across refreshes. Each level gets its own newtype so an environment id can
//! never be passed where a workflow id is expected.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! resource_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

resource_id!(
    /// Unique identifier of an organisation.
    OrganisationId
);
resource_id!(
    /// Unique identifier of an environment.
    EnvironmentId
);
resource_id!(
    /// Unique identifier of an agent.
    AgentId
);
resource_id!(
    /// Unique identifier of a workflow within its environment.
    WorkflowId
);
resource_id!(
    /// Unique identifier of a workflow execution.
    ExecutionId
);

/// An organisation visible to the authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organisation {
    pub id: OrganisationId,
    pub name: String,
}

/// An environment belonging to exactly one organisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub id: EnvironmentId,
    pub name: String,
}

/// An agent registered with an organisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub agent_type: String,
    pub version: String,
    pub last_seen: Option<DateTime<Utc>>,
}

/// A workflow with a summary of its most recent execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub name: String,
    /// `None` when the workflow has never run.
    pub last_execution_at: Option<DateTime<Utc>>,
    pub last_execution_status: Status,
}

/// A single run of a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution {
    pub id: ExecutionId,
    pub name: String,
    pub started_at: Option<DateTime<Utc>>,
    pub status: Status,
}

/// Workflow and execution status as reported by the platform.
///
/// Only drives display glyphs, never control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Queued,
    Pending,
    Starting,
    Scheduling,
    Pausing,
    Resuming,
    Stopping,
    Running,
    Paused,
    Aborted,
    Canceled,
    Passed,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Status {
    /// Returns the status indicator emoji for TUI display.
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Queued | Self::Pending => "🚶",
            Self::Starting | Self::Scheduling | Self::Pausing | Self::Resuming | Self::Stopping => {
                "⏳"
            }
            Self::Running => "🔄",
            Self::Paused => "⏸️",
            Self::Aborted | Self::Canceled => "🛑",
            Self::Passed => "✅",
            Self::Failed => "❌",
            Self::Unknown => "❓",
        }
    }

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Pending => "pending",
            Self::Starting => "starting",
            Self::Scheduling => "scheduling",
            Self::Pausing => "pausing",
            Self::Resuming => "resuming",
            Self::Stopping => "stopping",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Aborted => "aborted",
            Self::Canceled => "canceled",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

impl FromStr for Status {
    type Err = std::convert::Infallible;

    /// Case-insensitive; anything unrecognised maps to [`Status::Unknown`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let status = match s.trim().to_ascii_lowercase().as_str() {
            "queued" => Self::Queued,
            "pending" => Self::Pending,
            "starting" => Self::Starting,
            "scheduling" => Self::Scheduling,
            "pausing" => Self::Pausing,
            "resuming" => Self::Resuming,
            "stopping" => Self::Stopping,
            "running" => Self::Running,
            "paused" => Self::Paused,
            "aborted" => Self::Aborted,
            "canceled" | "cancelled" => Self::Canceled,
            "passed" => Self::Passed,
            "failed" => Self::Failed,
            _ => Self::Unknown,
        };
        Ok(status)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
