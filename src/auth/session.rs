//! Session teardown on authentication failure.
//!
//! # Responsibilities
//! - Track the route the host application is showing
//! - On 401: clear credentials and redirect to the role's login route
//! - Publish redirects so the host can navigate
//!
//! # Design Decisions
//! - Never redirect while already on a login route (no redirect loops)
//! - Credential file errors during teardown are logged, not propagated

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;

use crate::auth::credentials::{CredentialError, CredentialStore, Credentials, Role};

/// Events the host application should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Credentials were rejected; navigate to `login_route`.
    Expired { login_route: String },
}

/// True for `/login`, `/admin/login`, `/doctor/login`, with or without a query.
pub fn is_login_route(route: &str) -> bool {
    let path = route.split(['?', '#']).next().unwrap_or_default();
    let path = path.trim_end_matches('/');
    path == "/login" || path.ends_with("/login")
}

/// Credentials plus the host's current route.
#[derive(Debug)]
pub struct Session {
    credentials: CredentialStore,
    current_route: Mutex<String>,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    pub fn new(credentials: CredentialStore) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            credentials,
            current_route: Mutex::new("/".to_string()),
            events,
        }
    }

    pub fn credentials(&self) -> Option<Arc<Credentials>> {
        self.credentials.get()
    }

    pub fn login(&self, credentials: Credentials) -> Result<(), CredentialError> {
        tracing::info!(role = ?credentials.role, "Session started");
        self.credentials.store(credentials)
    }

    pub fn logout(&self) -> Result<(), CredentialError> {
        tracing::info!("Session ended");
        self.credentials.clear()
    }

    /// Record the route the host is currently showing.
    pub fn navigate(&self, route: impl Into<String>) {
        *self
            .current_route
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = route.into();
    }

    pub fn current_route(&self) -> String {
        self.current_route
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Tear down the session after the backend rejected the credentials.
    ///
    /// Returns the login route redirected to, or `None` when already on one.
    pub fn expire(&self) -> Option<String> {
        let role = self
            .credentials
            .get()
            .map(|c| c.role)
            .unwrap_or(Role::User);

        if let Err(e) = self.credentials.clear() {
            tracing::error!(error = %e, "Failed to clear stored credentials");
        }

        let mut current = self
            .current_route
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if is_login_route(&current) {
            tracing::debug!(route = %current, "Already on a login route, not redirecting");
            return None;
        }

        let login_route = role.login_route().to_string();
        tracing::warn!(from = %current, to = %login_route, "Session expired, redirecting to login");
        *current = login_route.clone();
        drop(current);

        // No subscribers is fine; the route is still recorded.
        let _ = self.events.send(SessionEvent::Expired {
            login_route: login_route.clone(),
        });
        Some(login_route)
    }
}
