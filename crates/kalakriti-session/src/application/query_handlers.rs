//! Query handlers for the Session context.

use serde::Serialize;

use crate::application::command_handlers::SessionStore;
use crate::domain::aggregates::UserProfile;

/// Read-only view of the session. Never includes the token.
#[derive(Debug, Serialize)]
pub struct SessionView {
    /// Whether a user is signed in.
    pub authenticated: bool,
    /// The signed-in user.
    pub user: Option<UserProfile>,
}

/// Retrieves the current session.
#[must_use]
pub fn get_session(sessions: &SessionStore) -> SessionView {
    let user = sessions.current().map(|session| session.user);
    SessionView {
        authenticated: user.is_some(),
        user,
    }
}
