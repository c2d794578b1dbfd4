//! Call handle and lifecycle status

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::client::RtcError;
use crate::media::RemoteStream;

/// Status of a phone call.
///
/// The vendor SDK reports status through opaque event names; this keeps
/// them as an enumerated status with an explicit transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Connecting,
    Established,
    Ended,
}

impl CallStatus {
    /// Legal follow-up statuses from each state. `Ended` is terminal.
    pub fn next_statuses(self) -> &'static [CallStatus] {
        match self {
            Self::Connecting => &[Self::Established, Self::Ended],
            Self::Established => &[Self::Ended],
            Self::Ended => &[],
        }
    }

    pub fn can_transition(self, next: CallStatus) -> bool {
        self.next_statuses().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.next_statuses().is_empty()
    }
}

/// Lifecycle events emitted by the vendor call object.
#[derive(Debug, Clone)]
pub enum CallEvent {
    /// The callee answered; media is flowing.
    Established { stream: Option<RemoteStream> },
    /// The call ended (either side, any phase).
    Hangup,
    Error(String),
}

/// An in-progress voice call, exposing control methods and lifecycle
/// events.
#[async_trait]
pub trait PhoneCall: Send + Sync {
    /// Subscribe to call lifecycle events.
    fn subscribe(&self) -> broadcast::Receiver<CallEvent>;

    async fn hangup(&self) -> Result<(), RtcError>;

    fn mute(&self, muted: bool) -> Result<(), RtcError>;

    fn muted(&self) -> bool;

    fn status(&self) -> CallStatus;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connecting_can_establish_or_end() {
        assert!(CallStatus::Connecting.can_transition(CallStatus::Established));
        assert!(CallStatus::Connecting.can_transition(CallStatus::Ended));
    }

    #[test]
    fn established_can_only_end() {
        assert!(CallStatus::Established.can_transition(CallStatus::Ended));
        assert!(!CallStatus::Established.can_transition(CallStatus::Connecting));
        assert!(!CallStatus::Established.can_transition(CallStatus::Established));
    }

    #[test]
    fn ended_is_terminal() {
        assert!(CallStatus::Ended.is_terminal());
        assert!(!CallStatus::Ended.can_transition(CallStatus::Connecting));
        assert!(!CallStatus::Ended.can_transition(CallStatus::Established));
    }

    #[test]
    fn no_backwards_transitions() {
        assert!(!CallStatus::Connecting.can_transition(CallStatus::Connecting));
        assert!(!CallStatus::Established.can_transition(CallStatus::Connecting));
    }
}
