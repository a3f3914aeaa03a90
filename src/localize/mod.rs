pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use http::HttpLocalizer;

use crate::error::ProviderError;

/// Input to one translation call: a moment's on-screen copy plus the target
/// language and optional voice context.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizeRequest {
    pub hook: String,
    pub caption: String,
    pub target_language: String,
    pub voice_reference: Option<String>,
}

/// Localized copy for one (moment, language) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedCopy {
    pub hook: String,
    pub caption: String,
    /// Synthesized narration (file path or URL), when the provider produced
    /// one against the session's voice reference.
    pub narration_ref: Option<String>,
}

/// Translation/voice-localization seam. Pure per call: implementations hold
/// no mutable state shared between languages, so concurrent jobs cannot
/// interfere.
#[async_trait]
pub trait Localizer: Send + Sync {
    async fn translate(&self, request: &LocalizeRequest) -> Result<LocalizedCopy, ProviderError>;
}
