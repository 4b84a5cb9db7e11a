//! Credentials and session handling.
//!
//! The bearer token and role are read by the request interceptor on every
//! call. A 401 from the backend ends the session through `Session::expire`.

pub mod credentials;
pub mod session;

pub use credentials::{CredentialError, CredentialStore, Credentials, Role};
pub use session::{is_login_route, Session, SessionEvent};
