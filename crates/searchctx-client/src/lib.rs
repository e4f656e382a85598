//! HTTP client for the search backend's access-control API.
//!
//! All calls of one reconciliation run go through a single
//! [`AccessControlSession`], which is bound to one bearer token. Outcomes are
//! classified here, once: 2xx is [`Outcome::Applied`], a tolerated status is
//! [`Outcome::AlreadyInDesiredState`], everything else is a [`ClientError`].

pub mod auth;
pub mod client;
pub mod endpoint;
pub mod error;

pub use auth::{ServiceAuth, ServiceCredentials};
pub use client::{AccessControlClient, AccessControlSession, Outcome};
pub use endpoint::SecurityEndpoints;
pub use error::{ClientError, ClientResult};
