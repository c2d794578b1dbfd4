//! Vendor WebRTC client seam
//!
//! The traits the external SDK is consumed through. The vendor ships the
//! transport and signaling; this crate only sequences it.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::call::PhoneCall;

/// Options passed when constructing a client from a token.
#[derive(Debug, Clone)]
pub struct RtcOptions {
    pub debug: bool,
    pub audio: bool,
}

impl Default for RtcOptions {
    fn default() -> Self {
        Self {
            debug: false,
            audio: true,
        }
    }
}

/// Options for placing a phone call.
#[derive(Debug, Clone, Default)]
pub struct PhoneCallOptions {
    /// Caller ID presented to the callee.
    pub from: Option<String>,
    pub audio: bool,
}

/// Connection-level events emitted by the vendor client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientEvent {
    Connected,
    Disconnected,
}

/// Connection status as reported by the vendor client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientStatus {
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        };
        write!(f, "{}", s)
    }
}

/// A connected (or connecting) vendor WebRTC client.
#[async_trait]
pub trait RtcClient: Send + Sync {
    /// Open the connection to the vendor's WebRTC service.
    async fn connect(&self) -> Result<(), RtcError>;

    /// Place an outbound phone call.
    fn call_phone(
        &self,
        phone_number: &str,
        options: PhoneCallOptions,
    ) -> Result<Arc<dyn PhoneCall>, RtcError>;

    /// Subscribe to connection lifecycle events.
    fn subscribe(&self) -> broadcast::Receiver<ClientEvent>;

    fn status(&self) -> ClientStatus;
}

#[derive(Debug, thiserror::Error)]
pub enum RtcError {
    #[error("SDK not available: {0}")]
    SdkUnavailable(String),

    #[error("Connect failed: {0}")]
    Connect(String),

    #[error("Call failed: {0}")]
    Call(String),

    #[error("Hangup failed: {0}")]
    Hangup(String),

    #[error("Mute failed: {0}")]
    Mute(String),
}
