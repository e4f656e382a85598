//! # searchctx reconcile
//!
//! Provisions and reconciles the access-control context of Organizations
//! and Spaces in the search backend.
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use searchctx_core::RoleTemplates;
//! use searchctx_reconcile::{ContextConfig, ContextService};
//!
//! let config = ContextConfig::from_env()?;
//! let http = config.http_client()?;
//! let auth = config.service_auth(http.clone());
//! let service = ContextService::new(RoleTemplates::load()?, Arc::new(config.directory(http)));
//!
//! let session = config.access_control_client()?.session(auth.access_token().await?);
//! let report = service.sync_all(&session).await?;
//! ```

pub mod config;
pub mod directory;
pub mod engine;

pub use config::{ConfigError, ContextConfig};
pub use directory::{Directory, HttpDirectory};
pub use engine::{ContextService, SyncReport};
