//! Call session manager
//!
//! Sequences the call lifecycle against the vendor SDK: wait for the SDK
//! to load, open the microphone, fetch a token from the gateway, connect,
//! place the call and relay its events. Failures abort with a descriptive
//! error; nothing is retried.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

use webdial_core::{CallId, PhoneNumber};

use crate::call::{CallEvent, CallStatus, PhoneCall};
use crate::client::{ClientEvent, PhoneCallOptions, RtcClient, RtcError, RtcOptions};
use crate::loader::SdkLoader;
use crate::media::{CaptureOptions, MediaError, MediaGateway};

/// How often the loader is re-checked while the vendor SDK loads.
const SDK_POLL_INTERVAL: Duration = Duration::from_millis(500);
const SDK_LOAD_TIMEOUT: Duration = Duration::from_secs(15);
/// Extra wait after the SDK reports loaded, before using it.
const SDK_SETTLE_DELAY: Duration = Duration::from_secs(1);

const CONNECT_POLL_INTERVAL: Duration = Duration::from_millis(100);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Extra wait after the connected event, before placing calls.
const CONNECT_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Supplies short-lived WebRTC tokens.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> Result<String, SessionError>;
}

/// Fetches tokens from the gateway's proxy endpoint, which holds the
/// provider API key.
pub struct GatewayTokenSource {
    base_url: String,
    http_client: reqwest::Client,
}

impl GatewayTokenSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl TokenSource for GatewayTokenSource {
    async fn fetch_token(&self) -> Result<String, SessionError> {
        let response = self
            .http_client
            .get(format!("{}/api/webrtc-token", self.base_url))
            .send()
            .await
            .map_err(|e| SessionError::Token(e.to_string()))?;

        let ok = response.status().is_success();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SessionError::Token(e.to_string()))?;

        match body["token"].as_str() {
            Some(token) if ok => Ok(token.to_string()),
            _ => Err(SessionError::Token(
                body["error"]
                    .as_str()
                    .unwrap_or("Failed to get WebRTC token")
                    .to_string(),
            )),
        }
    }
}

/// The active call handle plus the bookkeeping the UI reads.
struct ActiveCall {
    id: CallId,
    number: String,
    call: Arc<dyn PhoneCall>,
    started_at: DateTime<Utc>,
    established_at: Option<DateTime<Utc>>,
    muted: bool,
}

/// Read-only view of the active call.
#[derive(Debug, Clone, Serialize)]
pub struct CallSnapshot {
    pub id: CallId,
    pub number: String,
    pub status: CallStatus,
    pub started_at: DateTime<Utc>,
    pub established_at: Option<DateTime<Utc>>,
    pub muted: bool,
}

/// Orchestrates a single outbound call through the vendor SDK.
pub struct CallSessionManager {
    loader: SdkLoader,
    media: Arc<dyn MediaGateway>,
    tokens: Arc<dyn TokenSource>,
    caller_id: String,
    client: Mutex<Option<Arc<dyn RtcClient>>>,
    connected: Arc<AtomicBool>,
    microphone: Mutex<Option<Arc<dyn crate::media::AudioStream>>>,
    active: Mutex<Option<ActiveCall>>,
}

impl CallSessionManager {
    pub fn new(
        loader: SdkLoader,
        media: Arc<dyn MediaGateway>,
        tokens: Arc<dyn TokenSource>,
        caller_id: impl Into<String>,
    ) -> Self {
        Self {
            loader,
            media,
            tokens,
            caller_id: caller_id.into(),
            client: Mutex::new(None),
            connected: Arc::new(AtomicBool::new(false)),
            microphone: Mutex::new(None),
            active: Mutex::new(None),
        }
    }

    /// Whether the vendor client connection is currently up.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Bring the vendor client up: SDK load wait, microphone, token,
    /// connect. Safe to call again after a disconnect.
    pub async fn initialize(&self) -> Result<(), SessionError> {
        match self.try_initialize().await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.connected.store(false, Ordering::SeqCst);
                error!(error = %e, "Failed to initialize RTC client");
                Err(e)
            }
        }
    }

    async fn try_initialize(&self) -> Result<(), SessionError> {
        self.connected.store(false, Ordering::SeqCst);

        let factory = self.wait_for_sdk().await?;

        let microphone = self.media.open_microphone(CaptureOptions::default()).await?;
        *self.microphone.lock().await = Some(microphone);
        info!("Microphone access granted");

        let token = self.tokens.fetch_token().await?;

        let client = factory.create(
            &token,
            RtcOptions {
                debug: true,
                audio: true,
            },
        )?;

        let connected = self.connected.clone();
        let mut events = client.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(ClientEvent::Connected) => {
                        debug!("WebRTC client connected");
                        connected.store(true, Ordering::SeqCst);
                    }
                    Ok(ClientEvent::Disconnected) => {
                        debug!("WebRTC client disconnected");
                        connected.store(false, Ordering::SeqCst);
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        debug!("Connecting to WebRTC service...");
        client.connect().await?;
        self.wait_for_connection(client.as_ref()).await?;

        *self.client.lock().await = Some(client);
        info!("RTC client initialized and connected");
        Ok(())
    }

    /// Poll the loader until the vendor SDK has installed its factory.
    async fn wait_for_sdk(&self) -> Result<Arc<dyn crate::loader::RtcClientFactory>, SessionError> {
        let deadline = Instant::now() + SDK_LOAD_TIMEOUT;
        while !self.loader.is_loaded() {
            if Instant::now() >= deadline {
                return Err(SessionError::SdkUnavailable);
            }
            debug!("Waiting for vendor SDK to load...");
            sleep(SDK_POLL_INTERVAL).await;
        }

        // The SDK flips its flag before it finishes installing itself.
        sleep(SDK_SETTLE_DELAY).await;

        self.loader.factory().ok_or(SessionError::SdkUnavailable)
    }

    /// Poll the connected flag until the connect event lands.
    async fn wait_for_connection(&self, client: &dyn RtcClient) -> Result<(), SessionError> {
        let started = Instant::now();
        let mut last_logged_secs = 0;

        while !self.connected.load(Ordering::SeqCst) {
            if started.elapsed() >= CONNECT_TIMEOUT {
                return Err(SessionError::ConnectTimeout);
            }
            let elapsed_secs = started.elapsed().as_secs();
            if elapsed_secs > last_logged_secs {
                last_logged_secs = elapsed_secs;
                debug!(status = %client.status(), "Waiting for WebRTC connection...");
            }
            sleep(CONNECT_POLL_INTERVAL).await;
        }

        sleep(CONNECT_SETTLE_DELAY).await;
        debug!(status = %client.status(), "Connection established");
        Ok(())
    }

    /// Place a call and wait for it to be established.
    ///
    /// Resolves only once the established event fires. A hangup that
    /// arrives first tears the call down but leaves this future pending.
    pub async fn make_call(&self, phone_number: &str) -> Result<Arc<dyn PhoneCall>, SessionError> {
        let needs_init = {
            let client = self.client.lock().await;
            client.is_none() || !self.connected.load(Ordering::SeqCst)
        };
        if needs_init {
            self.initialize().await?;
        }

        let number = PhoneNumber::new(phone_number).dialable();
        info!(number = %number, "Placing phone call");

        self.media.start_ringback();

        let client = {
            let guard = self.client.lock().await;
            guard.clone().ok_or(SessionError::NotInitialized)?
        };

        let call = match client.call_phone(
            &number,
            PhoneCallOptions {
                from: Some(self.caller_id.clone()),
                audio: true,
            },
        ) {
            Ok(call) => call,
            Err(e) => {
                self.media.stop_ringback();
                *self.active.lock().await = None;
                return Err(e.into());
            }
        };

        *self.active.lock().await = Some(ActiveCall {
            id: CallId::generate(),
            number,
            call: call.clone(),
            started_at: Utc::now(),
            established_at: None,
            muted: false,
        });

        let mut events = call.subscribe();
        loop {
            match events.recv().await {
                Ok(CallEvent::Established { stream }) => {
                    info!("Call established");
                    {
                        let mut active = self.active.lock().await;
                        if let Some(active) = active.as_mut() {
                            active.established_at = Some(Utc::now());
                        }
                    }
                    if let Some(stream) = stream {
                        if let Err(e) = self.media.play_remote(stream) {
                            error!(error = %e, "Error playing remote audio");
                        }
                    }
                    debug!(audio = ?self.media.debug_info(), "Audio state after establishment");
                    self.media.stop_ringback();
                    return Ok(call);
                }
                Ok(CallEvent::Hangup) => {
                    info!("Call ended");
                    self.media.stop_remote();
                    self.media.stop_ringback();
                    {
                        let mut active = self.active.lock().await;
                        *active = None;
                    }
                    // TODO: surface pre-establishment hangups to the
                    // caller instead of parking this future; today the
                    // UI only recovers through its own hangup handler.
                    std::future::pending::<()>().await;
                }
                Ok(CallEvent::Error(message)) => {
                    warn!(error = %message, "Call error event");
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    std::future::pending::<()>().await;
                }
            }
        }
    }

    /// Hang up and release everything. Always clears the active call and
    /// the microphone, even when the vendor hangup fails.
    pub async fn end_call(&self) {
        let taken = self.active.lock().await.take();
        if let Some(active) = taken {
            if let Err(e) = active.call.hangup().await {
                error!(error = %e, "Error ending call");
            }
        }

        self.media.stop_ringback();
        self.media.stop_remote();

        if let Some(microphone) = self.microphone.lock().await.take() {
            microphone.stop();
        }
    }

    /// Mute or unmute the active call. Reports whether the change took.
    pub async fn set_muted(&self, muted: bool) -> bool {
        let mut guard = self.active.lock().await;
        match guard.as_mut() {
            Some(active) => match active.call.mute(muted) {
                Ok(()) => {
                    active.muted = muted;
                    debug!(muted, "Call mute toggled");
                    true
                }
                Err(e) => {
                    error!(error = %e, "Error setting mute state");
                    false
                }
            },
            None => false,
        }
    }

    pub async fn active_call(&self) -> Option<CallSnapshot> {
        let guard = self.active.lock().await;
        guard.as_ref().map(|active| CallSnapshot {
            id: active.id.clone(),
            number: active.number.clone(),
            status: active.call.status(),
            started_at: active.started_at,
            established_at: active.established_at,
            muted: active.muted,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Vendor SDK not available after loading")]
    SdkUnavailable,

    #[error("Timeout waiting for WebRTC connection")]
    ConnectTimeout,

    #[error("RTC client not initialized")]
    NotInitialized,

    #[error("Token fetch failed: {0}")]
    Token(String),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Rtc(#[from] RtcError),
}
