//! Commands for the Session context.

use kalakriti_core::command::Command;
use uuid::Uuid;

use super::aggregates::AuthSession;

/// Command to record a successful sign-in.
#[derive(Debug, Clone)]
pub struct SignIn {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user and token returned by the backend.
    pub session: AuthSession,
}

/// Command to forget the signed-in user.
#[derive(Debug, Clone)]
pub struct SignOut {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for SignIn {
    fn command_type(&self) -> &'static str {
        "session.sign_in"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

impl Command for SignOut {
    fn command_type(&self) -> &'static str {
        "session.sign_out"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
