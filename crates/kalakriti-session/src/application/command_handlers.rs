//! Command handlers for the Session context.

use std::sync::{Arc, PoisonError, RwLock};

use kalakriti_core::command::Command;
use kalakriti_core::error::DomainError;
use kalakriti_core::storage::{self, KeyValueStore, SESSION_STORAGE_KEY};
use tracing::{info, instrument, warn};

use crate::domain::aggregates::{AuthSession, UserProfile};
use crate::domain::commands::{SignIn, SignOut};

/// The signed-in user, backed by a durable key-value store.
pub struct SessionStore {
    current: RwLock<Option<AuthSession>>,
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Loads the persisted session from `store`.
    ///
    /// A missing session means signed out. An unreadable or invalid one is
    /// logged, removed from the store, and also treated as signed out.
    #[must_use]
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let loaded: Option<AuthSession> =
            storage::load_best_effort(store.as_ref(), SESSION_STORAGE_KEY);
        let current = match loaded {
            Some(session) if session.validate().is_empty() => Some(session),
            Some(_) => {
                warn!("discarding incomplete stored session");
                storage::remove_best_effort(store.as_ref(), SESSION_STORAGE_KEY);
                None
            }
            None => {
                if matches!(store.get(SESSION_STORAGE_KEY), Ok(Some(_))) {
                    storage::remove_best_effort(store.as_ref(), SESSION_STORAGE_KEY);
                }
                None
            }
        };
        Self {
            current: RwLock::new(current),
            store,
        }
    }

    /// Handles the `SignIn` command, replacing any current session.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the user id or token is blank.
    #[instrument(skip(self, command), fields(user_id = %command.session.user.id))]
    pub fn handle_sign_in(&self, command: &SignIn) -> Result<UserProfile, DomainError> {
        command.session.validate().into_result()?;
        storage::save_best_effort(self.store.as_ref(), SESSION_STORAGE_KEY, &command.session);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) =
            Some(command.session.clone());
        info!(
            command = command.command_type(),
            correlation_id = %command.correlation_id(),
            "user signed in"
        );
        Ok(command.session.user.clone())
    }

    /// Handles the `SignOut` command. Signing out when signed out is a no-op.
    #[instrument(skip(self, command))]
    pub fn handle_sign_out(&self, command: &SignOut) {
        let previous = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            storage::remove_best_effort(self.store.as_ref(), SESSION_STORAGE_KEY);
        }
        info!(
            command = command.command_type(),
            correlation_id = %command.correlation_id(),
            was_signed_in = previous.is_some(),
            "user signed out"
        );
    }

    /// The current session, if signed in.
    #[must_use]
    pub fn current(&self) -> Option<AuthSession> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Unauthenticated` when signed out.
    pub fn require_user(&self) -> Result<UserProfile, DomainError> {
        self.current()
            .map(|session| session.user)
            .ok_or(DomainError::Unauthenticated)
    }
}
