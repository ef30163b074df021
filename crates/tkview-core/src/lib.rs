//! # tkview-core
//!
//! Core types, errors and the session tree for TKView.
//!
//! This crate provides:
//! - [`TkviewError`] - Error taxonomy shared by every TKView crate
//! - [`types`] - Organisation, environment, agent, workflow and execution records
//! - [`lister`] - Capability traits implemented by the remote data source
//! - [`tree`] - The resource tree store and its current selections
//! - [`nav`] - Next/previous navigation and workflow expansion
//! - [`config`] - YAML configuration
//! - [`logging`] - Tracing setup
//!
//! ## Example
//!
//! ```
//! use tkview_core::tree::{OrganisationNode, TreeStore};
//! use tkview_core::types::{Environment, Organisation};
//! use tkview_core::nav;
//!
//! let mut store = TreeStore::new();
//! store.replace_organisations(vec![OrganisationNode {
//!     organisation: Organisation { id: "o1".into(), name: "Acme".into() },
//!     environments: vec![
//!         Environment { id: "e1".into(), name: "dev".into() },
//!         Environment { id: "e2".into(), name: "prod".into() },
//!     ],
//! }]);
//! store.select_environment(&"e2".into()).unwrap();
//!
//! let next = nav::next_environment(store.organisations(), &"e2".into());
//! assert_eq!(next.map(|id| id.as_str()), Some("e1"));
//! ```

pub mod config;
pub mod error;
pub mod lister;
pub mod logging;
pub mod nav;
pub mod tree;
pub mod types;

// Re-export main types for convenience
pub use config::Config;
pub use error::{Result, TkviewError};
pub use lister::{AgentLister, EnvironmentLister, Lister, OrganisationLister, WorkflowLister};
pub use logging::{LogGuard, init_logging};
pub use tree::{EnvironmentScope, OrganisationNode, TreeStore, WorkflowNode, WorkflowScope};
