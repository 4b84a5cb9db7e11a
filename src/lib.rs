//! Resilient API client for the hospital website backend

pub mod auth;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod resources;

pub use auth::{CredentialStore, Credentials, Role, Session};
pub use config::schema::ClientConfig;
pub use health::{ConnectionSnapshot, ConnectionStatus, HealthMonitor, MonitorHandle};
pub use http::{ApiClient, ApiError, ApiResult};
pub use lifecycle::Shutdown;
