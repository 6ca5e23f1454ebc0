//! The backend's `{success, data, message}` response envelope.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::backend::BackendError;

/// Every backend response body is wrapped in this envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    /// Whether the backend accepted the request.
    #[serde(default)]
    pub success: bool,
    /// Payload on success.
    pub data: Option<T>,
    /// Human-readable outcome, mostly set on failure.
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwraps the payload of an accepted response.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Rejected` when `success` is false, and
    /// `BackendError::Parse` when an accepted response carries no data.
    pub fn into_data(self) -> Result<T, BackendError> {
        if !self.success {
            return Err(BackendError::Rejected(
                self.message.unwrap_or_else(|| "request rejected".to_owned()),
            ));
        }
        self.data
            .ok_or_else(|| BackendError::Parse("response has no data".to_owned()))
    }
}

/// Decodes a response body received with HTTP `status`.
///
/// A non-2xx status is an API error carrying the envelope's message when the
/// body has one. A 2xx status still fails when the envelope reports
/// `success: false`.
///
/// # Errors
///
/// Returns `BackendError::Api`, `BackendError::Rejected` or
/// `BackendError::Parse` as described above.
pub fn decode<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, BackendError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<Envelope<serde_json::Value>>(body)
            .ok()
            .and_then(|envelope| envelope.message)
            .unwrap_or_else(|| body.chars().take(200).collect());
        return Err(BackendError::Api { status, message });
    }

    serde_json::from_str::<Envelope<T>>(body)
        .map_err(|e| BackendError::Parse(format!("Failed to parse response: {e}")))?
        .into_data()
}
