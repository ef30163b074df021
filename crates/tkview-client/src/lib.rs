//! # tkview-client
//!
//! Testkube API client implementing the `tkview_core` lister traits.
//!
//! ## Example
//!
//! ```no_run
//! use tkview_client::{ClientConfig, TestkubeClient};
//! use tkview_core::lister::OrganisationLister;
//!
//! # async fn example() -> tkview_core::Result<()> {
//! let client = TestkubeClient::new(ClientConfig::new("https://api.testkube.io", "tkcapi_token"))?;
//! for org in client.list_organisations().await? {
//!     println!("{} ({})", org.name, org.id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api_types;
pub mod client;

pub use client::{ClientConfig, TestkubeClient};
