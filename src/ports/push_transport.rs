//! PushTransport port - the persistent server-push channel.
//!
//! Opening a transport yields a [`PushChannel`]: an outbound sender for
//! text and close frames, and an inbound receiver of frames and the
//! final close or failure. Closing the inbound side is how the adapter
//! says the handle is gone.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::connection::TransportError;

/// Frame written by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    Text(String),
    Close { code: u16, reason: String },
}

/// Observation reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Frame(String),
    Closed { code: u16, reason: String },
    Failed(TransportError),
}

/// Both halves of one open transport handle.
#[derive(Debug)]
pub struct PushChannel {
    pub outbound: mpsc::UnboundedSender<OutboundFrame>,
    pub inbound: mpsc::UnboundedReceiver<TransportEvent>,
}

/// Port for opening push connections.
///
/// `open` resolves once the handshake completes. Retryable failures
/// (refused, reset, handshake rejected) are returned as
/// [`TransportError::Io`]; an endpoint that can never work is
/// [`TransportError::Fatal`].
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn open(&self, url: &str) -> Result<PushChannel, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn PushTransport) {}
}
