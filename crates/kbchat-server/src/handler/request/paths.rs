//! Path parameter types for HTTP handlers.

use serde::{Deserialize, Serialize};

/// Path parameters for session operations.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPathParams {
    /// Client-supplied conversation identifier.
    pub user_id: String,
}
