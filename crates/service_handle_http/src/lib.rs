//! JSON-over-HTTP implementation of the `service_handle` contract.
//!
//! Methods come from a JSON manifest rather than a schema file. Each call is a
//! `POST <scheme>://<ip>:<port>/<package>.<Service>/<Method>` whose body is
//! the JSON params and whose 2xx body is the JSON result.

pub mod client;
pub mod config;
pub mod error;
pub mod manifest;

pub use client::HttpService;
pub use config::HttpServiceConfig;
pub use error::{parse_error_message, HttpServiceError};
pub use manifest::{MethodDecl, ServiceDecl, ServiceManifest};
