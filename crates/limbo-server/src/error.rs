use crate::encryption::EncryptionError;
use crate::forwarding::ForwardingError;
use limbo_protocol_core::{CodecError, ConnectionError, ConnectionState, ProtocolError, TimeoutError};
use limbo_types::TextComponent;
use thiserror::Error;

/// Anything that can end (or interrupt) one client session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Timeout(#[from] TimeoutError),
    #[error("forwarding rejected: {0}")]
    Forwarding(#[from] ForwardingError),
    #[error("encryption failed: {0}")]
    Encryption(#[from] EncryptionError),
}

impl SessionError {
    /// Only a field that fails to decode inside an intact Play frame can be
    /// dropped; the frame boundary is still known there.
    pub fn is_fatal(&self, state: ConnectionState) -> bool {
        !matches!((self, state), (SessionError::Codec(_), ConnectionState::Play))
    }

    /// Whether the stream can still carry a disconnect packet.
    pub fn can_notify(&self) -> bool {
        !matches!(
            self,
            SessionError::Connection(_) | SessionError::Timeout(TimeoutError::Write(_))
        )
    }

    /// Text shown to the player on the disconnect screen.
    pub fn reason(&self) -> TextComponent {
        match self {
            SessionError::Protocol(ProtocolError::Rejected(reason)) => {
                TextComponent::colored(reason.clone(), "red")
            }
            SessionError::Timeout(TimeoutError::KeepAlive(_)) => TextComponent::plain("Timed out"),
            SessionError::Forwarding(_) => TextComponent::colored(
                "This server only accepts players forwarded by its proxy",
                "red",
            ),
            other => TextComponent::colored(format!("Disconnected: {}", other), "red"),
        }
    }
}
