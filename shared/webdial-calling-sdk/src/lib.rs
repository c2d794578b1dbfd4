//! Webdial Calling SDK
//!
//! Client-side calling for the Webdial Platform: the seam to the
//! externally supplied vendor WebRTC SDK, the call session manager that
//! orchestrates it, and the dial pad state model.

pub mod call;
pub mod client;
pub mod dialpad;
pub mod loader;
pub mod media;
pub mod session;


pub use call::{CallEvent, CallStatus, PhoneCall};
pub use client::{ClientEvent, ClientStatus, PhoneCallOptions, RtcClient, RtcError, RtcOptions};
pub use dialpad::{DialPad, DIAL_KEYS};
pub use loader::{RtcClientFactory, SdkLoader};
pub use media::{AudioDebugInfo, AudioStream, CaptureOptions, MediaError, MediaGateway, RemoteStream};
pub use session::{CallSessionManager, CallSnapshot, GatewayTokenSource, SessionError, TokenSource};
