//! Routes for the Session bounded context.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use kalakriti_core::command::new_correlation_id;
use kalakriti_session::application::query_handlers::{self, SessionView};
use kalakriti_session::domain::aggregates::AuthSession;
use kalakriti_session::domain::commands;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::routes::run_blocking;
use crate::state::AppState;

/// GET /
#[instrument(skip(state))]
async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(query_handlers::get_session(&state.sessions))
}

/// POST /sign-in
#[instrument(skip(state, session), fields(user_id = %session.user.id))]
async fn sign_in(
    State(state): State<AppState>,
    Json(session): Json<AuthSession>,
) -> Result<Json<SessionView>, ApiError> {
    let command = commands::SignIn {
        correlation_id: new_correlation_id(),
        session,
    };

    info!(correlation_id = %command.correlation_id, "handling sign_in command");

    let sessions = Arc::clone(&state.sessions);
    run_blocking(move || sessions.handle_sign_in(&command)).await??;
    Ok(Json(query_handlers::get_session(&state.sessions)))
}

/// POST /sign-out
#[instrument(skip(state))]
async fn sign_out(State(state): State<AppState>) -> Result<Json<SessionView>, ApiError> {
    let command = commands::SignOut {
        correlation_id: new_correlation_id(),
    };

    info!(correlation_id = %command.correlation_id, "handling sign_out command");

    let sessions = Arc::clone(&state.sessions);
    run_blocking(move || sessions.handle_sign_out(&command)).await?;
    Ok(Json(query_handlers::get_session(&state.sessions)))
}

/// Returns the router for the session context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_session))
        .route("/sign-in", post(sign_in))
        .route("/sign-out", post(sign_out))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::testing::{send, test_app_state};

    fn credentials(token: &str) -> serde_json::Value {
        json!({
            "user": { "id": "user-7", "name": "Meera Iyer", "email": "meera@example.com" },
            "token": token
        })
    }

    #[tokio::test]
    async fn test_get_session_when_signed_out() {
        let app = router().with_state(test_app_state());

        let (status, json) = send(app, "GET", "/", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["authenticated"], false);
        assert!(json["user"].is_null());
    }

    #[tokio::test]
    async fn test_sign_in_then_sign_out() {
        // Arrange
        let state = test_app_state();

        // Act
        let (status, signed_in) = send(
            router().with_state(state.clone()),
            "POST",
            "/sign-in",
            Some(credentials("tok-1")),
        )
        .await;
        let (_, signed_out) = send(router().with_state(state.clone()), "POST", "/sign-out", None).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(signed_in["authenticated"], true);
        assert_eq!(signed_in["user"]["id"], "user-7");
        assert_eq!(signed_out["authenticated"], false);
        assert!(state.sessions.current().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_never_echoes_token() {
        let app = router().with_state(test_app_state());

        let (_, json) = send(app, "POST", "/sign-in", Some(credentials("tok-secret"))).await;

        assert!(!json.to_string().contains("tok-secret"));
    }

    #[tokio::test]
    async fn test_sign_in_with_blank_token_returns_422() {
        let app = router().with_state(test_app_state());

        let (status, json) = send(app, "POST", "/sign-in", Some(credentials("  "))).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"], "validation_error");
        assert!(json["fields"]["token"].is_string());
    }
}
