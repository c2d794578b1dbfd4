//! Audio device gateway
//!
//! Microphone access, ring-back tone and remote playback live behind one
//! seam; the embedding shell supplies the real devices.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Microphone capture constraints.
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
        }
    }
}

/// Opaque handle to the remote party's audio stream, delivered with the
/// established event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteStream {
    pub id: String,
}

/// Snapshot of the receive-side audio path, for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioDebugInfo {
    pub has_audio_track: bool,
    pub track_enabled: bool,
    pub track_muted: bool,
    pub track_ready_state: String,
}

/// A live capture stream. Stopping releases the device.
pub trait AudioStream: Send + Sync {
    fn stop(&self);

    fn is_active(&self) -> bool;
}

/// Access to the local audio devices.
#[async_trait]
pub trait MediaGateway: Send + Sync {
    /// Whether microphone permission is (or can be) granted.
    async fn check_permissions(&self) -> bool;

    async fn open_microphone(
        &self,
        options: CaptureOptions,
    ) -> Result<Arc<dyn AudioStream>, MediaError>;

    /// Attach the remote party's stream to the speaker path.
    fn play_remote(&self, stream: RemoteStream) -> Result<(), MediaError>;

    fn stop_remote(&self);

    /// Looping ring-back tone while a call is connecting.
    fn start_ringback(&self);

    fn stop_ringback(&self);

    fn debug_info(&self) -> AudioDebugInfo;
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Microphone permission denied")]
    PermissionDenied,

    #[error("Audio device unavailable: {0}")]
    Device(String),

    #[error("Playback failed: {0}")]
    Playback(String),
}
