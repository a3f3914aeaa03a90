use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Optional cross-call context reused across renders, e.g. a cloned voice.
///
/// Created on first use, updated only by explicit calls — rendering never
/// mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub voice_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}
