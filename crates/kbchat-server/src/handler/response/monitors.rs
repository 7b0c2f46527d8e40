//! Monitor response types.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// System monitoring status response.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStatus {
    /// Timestamp when this status was generated.
    pub updated_at: Timestamp,
    /// Overall system health status.
    pub is_healthy: bool,
    /// Number of live chat sessions.
    pub sessions: usize,
    /// Documents in the knowledge base.
    pub documents: usize,
    /// Indexed chunks in the knowledge base.
    pub chunks: usize,
    /// When the knowledge base was built.
    pub indexed_at: Timestamp,
    /// Application version.
    pub version: String,
}
