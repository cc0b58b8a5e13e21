//! JSON payloads exchanged with the authority server.

use keybox_core::{EventType, TagEvent};
use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, Result};

/// Body of the key status endpoint.
///
/// Only `keyTaken` is required; the server also reports the current holder,
/// the last event and a timestamp, which are kept for logging. The last
/// event is stored as raw JSON since its shape belongs to the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyStatusResponse {
    pub key_taken: bool,

    #[serde(default)]
    pub current_holder: Option<String>,

    #[serde(default)]
    pub last_event: Option<serde_json::Value>,

    #[serde(default)]
    pub timestamp: Option<String>,
}

impl KeyStatusResponse {
    /// Parse a status body.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::MalformedResponse` if the body is not JSON or
    /// `keyTaken` is missing or not a boolean.
    pub fn parse(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| NetworkError::malformed(e.to_string()))
    }
}

/// Body posted to the event endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest<'a> {
    pub rfid: &'a str,
    pub event_type: EventType,
}

impl<'a> From<&'a TagEvent> for EventRequest<'a> {
    fn from(event: &'a TagEvent) -> Self {
        Self {
            rfid: event.tag_id().as_str(),
            event_type: event.event_type(),
        }
    }
}

/// Decide whether an HTTP 200 body from the event endpoint is an acceptance.
///
/// The server answers `{"success": true, ...}` on insert and
/// `{"error": ...}` (still with status 200) when it refuses the payload.
/// Bodies that are not JSON objects count as accepted, since the status line
/// already said 200.
pub fn event_accepted(body: &str) -> bool {
    let Ok(serde_json::Value::Object(fields)) = serde_json::from_str::<serde_json::Value>(body)
    else {
        return true;
    };

    if fields.get("error").is_some_and(|e| !e.is_null()) {
        return false;
    }

    !matches!(fields.get("success"), Some(serde_json::Value::Bool(false)))
}
