//! Request DTOs.
//!
//! Fields are optional so a missing field surfaces as `INVALID_INPUT` from
//! the engine rather than a framework rejection.

use serde::{Deserialize, Serialize};

/// `{status}` body for request and session decisions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusBody {
    /// Requested status, e.g. `"accepted"`.
    pub status: Option<String>,
}

/// `{feedback}` body for completing a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompleteSessionBody {
    /// Free-form feedback, stored as given.
    pub feedback: Option<serde_json::Value>,
}

/// Query string of the WebSocket handshake.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WsQuery {
    /// JWT access token.
    pub token: Option<String>,
}
