//! Telephony provider REST client
//!
//! Token issuance and call origination against the provider's API. The
//! secret API key lives here, server-side; the browser only ever sees
//! the short-lived WebRTC token.

use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

use crate::DialpadConfig;

/// Client for the provider's WebRTC token and Calls APIs.
pub struct ProviderClient {
    api_key: String,
    base_url: String,
    caller_number: String,
    calls_configuration_id: String,
    application_id: String,
    webrtc_token: Option<String>,
    http_client: reqwest::Client,
}

impl ProviderClient {
    pub fn new(config: &DialpadConfig) -> Self {
        Self {
            api_key: config.provider_api_key.clone(),
            base_url: config.provider_base_url.clone(),
            caller_number: config.caller_number.clone(),
            calls_configuration_id: config.calls_configuration_id.clone(),
            application_id: config.application_id.clone(),
            webrtc_token: config.webrtc_token.clone(),
            http_client: reqwest::Client::new(),
        }
    }

    fn authorization(&self) -> String {
        format!("App {}", self.api_key)
    }

    /// Request body for token issuance. The identity is unique per
    /// request; the provider scopes the token to it.
    pub(crate) fn token_payload(&self) -> Value {
        json!({
            "identity": format!("browser-{}", Utc::now().timestamp_millis()),
            "name": "Browser User",
            "applicationId": self.application_id,
        })
    }

    /// Issue a short-lived WebRTC token.
    pub async fn request_token(&self) -> Result<String, ProviderError> {
        let key_prefix: String = self.api_key.chars().take(10).collect();
        debug!(key_prefix = %key_prefix, "Requesting WebRTC token");

        let response = self
            .http_client
            .post(format!("{}/webrtc/1/token", self.base_url))
            .header("Authorization", self.authorization())
            .header("Accept", "application/json")
            .json(&self.token_payload())
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let ok = response.status().is_success();
        let status = response.status().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        debug!(status = %status, "Token response received");
        parse_token_response(ok, &status, &body)
    }

    /// Request body for call origination.
    pub(crate) fn call_payload(&self, phone_number: &str) -> Value {
        let mut webrtc = json!({ "enabled": true });
        if let Some(token) = &self.webrtc_token {
            webrtc["token"] = json!(token);
        }

        json!({
            "endpoint": {
                "type": "PHONE",
                "phoneNumber": phone_number,
            },
            "from": self.caller_number,
            "callsConfigurationId": self.calls_configuration_id,
            "platform": {
                "applicationId": self.application_id,
            },
            "webrtc": webrtc,
        })
    }

    /// Originate an outbound call; returns the provider's response body.
    pub async fn initiate_call(&self, phone_number: &str) -> Result<Value, ProviderError> {
        let response = self
            .http_client
            .post(format!("{}/calls/1/calls", self.base_url))
            .header("Authorization", self.authorization())
            .json(&self.call_payload(phone_number))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let ok = response.status().is_success();
        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Invalid(e.to_string()))?;

        if !ok {
            return Err(ProviderError::Api("Failed to initiate call".to_string()));
        }

        Ok(body)
    }
}

/// Lenient parse of the token response: the provider reports failures
/// in several shapes.
pub(crate) fn parse_token_response(
    ok: bool,
    status: &str,
    body: &str,
) -> Result<String, ProviderError> {
    let data: Value =
        serde_json::from_str(body).map_err(|e| ProviderError::Invalid(e.to_string()))?;

    if !ok {
        let message = data["requestError"]["serviceException"]["text"]
            .as_str()
            .or_else(|| data["requestError"]["serviceException"]["messageId"].as_str())
            .or_else(|| data["message"].as_str())
            .unwrap_or(status);
        return Err(ProviderError::Api(format!(
            "Failed to get token: {}",
            message
        )));
    }

    match data["token"].as_str() {
        Some(token) => Ok(token.to_string()),
        None => Err(ProviderError::MissingToken),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    Api(String),

    #[error("Invalid response format")]
    Invalid(String),

    #[error("No token in response")]
    MissingToken,
}
