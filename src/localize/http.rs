use std::time::Duration;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::localize::{LocalizeRequest, LocalizedCopy, Localizer};

/// JSON-over-HTTP localization provider.
///
/// Timeouts, 429 and 5xx responses classify as transient (the orchestrator
/// retries the owning job); any other non-success status is terminal —
/// an unsupported target language comes back as a 4xx and is not retried.
pub struct HttpLocalizer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpLocalizer {
    pub fn new(endpoint: String, api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl Localizer for HttpLocalizer {
    async fn translate(&self, request: &LocalizeRequest) -> Result<LocalizedCopy, ProviderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|err| {
                ProviderError::Transient(format!("localization request failed: {err}"))
            })?;

        let status = response.status();
        if status.is_server_error() || status.as_u16() == 429 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Transient(format!(
                "localization provider error ({status}): {body}"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Terminal(format!(
                "localization rejected for '{}' ({status}): {body}",
                request.target_language
            )));
        }

        response.json().await.map_err(|err| {
            ProviderError::Transient(format!("unparseable localization reply: {err}"))
        })
    }
}
