//! Session identity. Login is a local stand-in: any identity passed to
//! [`AuthStore::login`] is accepted and persisted. It is not a security
//! boundary.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use uuid::Uuid;

use crate::{
    dto::auth::LoginRequest,
    error::{AppError, AppResult},
    models::User,
    storage::Storage,
};

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// Persisted identity has not been loaded yet.
    NotHydrated,
    Unauthenticated,
    Authenticated(User),
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_hydrated(&self) -> bool {
        !matches!(self, AuthState::NotHydrated)
    }
}

/// Notified synchronously after every auth transition, including hydration.
pub trait AuthListener: Send + Sync {
    fn auth_changed(&self, state: &AuthState);
}

pub struct AuthStore {
    storage: Storage,
    state: RwLock<AuthState>,
    listeners: RwLock<Vec<Arc<dyn AuthListener>>>,
    /// Held across persistence, the state write and listener fan-out, so
    /// listeners observe transitions in the order they were applied.
    transitions: Mutex<()>,
}

impl AuthStore {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            state: RwLock::new(AuthState::NotHydrated),
            listeners: RwLock::new(Vec::new()),
            transitions: Mutex::new(()),
        }
    }

    fn serialize(&self) -> MutexGuard<'_, ()> {
        self.transitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self, listener: Arc<dyn AuthListener>) {
        let _serial = self.serialize();
        let state = self.state();
        if state.is_hydrated() {
            listener.auth_changed(&state);
        }
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub fn state(&self) -> AuthState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state().user().cloned()
    }

    pub fn hydrate(&self) {
        let _serial = self.serialize();
        let next = match self.storage.get_user() {
            Some(user) => AuthState::Authenticated(user),
            None => AuthState::Unauthenticated,
        };
        tracing::debug!(authenticated = next.user().is_some(), "auth hydrated");
        self.transition(next);
    }

    pub fn login(&self, user: User) {
        let _serial = self.serialize();
        self.storage.save_user(&user);
        tracing::debug!(user_id = %user.id, "user logged in");
        self.transition(AuthState::Authenticated(user));
    }

    pub fn logout(&self) {
        let _serial = self.serialize();
        self.storage.clear_user();
        tracing::debug!("user logged out");
        self.transition(AuthState::Unauthenticated);
    }

    /// Callers hold the transition lock.
    fn transition(&self, next: AuthState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = next.clone();
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener.auth_changed(&next);
        }
    }
}

/// Builds the mock identity for a login form submission.
pub fn user_from_login(payload: LoginRequest) -> AppResult<User> {
    let email = payload.email.trim().to_string();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AppError::BadRequest("email must contain '@'".into()));
    };
    if local.is_empty() || domain.is_empty() {
        return Err(AppError::BadRequest("email is invalid".into()));
    }

    let name = payload
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| local.to_string());

    Ok(User {
        id: Uuid::new_v4(),
        email,
        name,
    })
}
