//! In-memory push transport for tests.
//!
//! Every successful `open` creates a [`ServerEnd`] the test can use to
//! push frames, close the handle, or read what the client sent. Opens can
//! be scripted to fail.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

use crate::domain::connection::TransportError;
use crate::domain::events::Envelope;
use crate::ports::{OutboundFrame, PushChannel, PushTransport, TransportEvent};

#[derive(Default)]
struct Inner {
    refusals: VecDeque<TransportError>,
    refuse_all: Option<TransportError>,
    servers: Vec<ServerEnd>,
    urls: Vec<String>,
}

/// Scriptable push transport.
#[derive(Clone, Default)]
pub struct InMemoryTransport {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // === Test Helpers ===

    /// Fails the next `open` with `error`.
    pub fn refuse_next(&self, error: TransportError) {
        self.lock().refusals.push_back(error);
    }

    /// Fails every `open` with `error` until cleared.
    pub fn refuse_all(&self, error: Option<TransportError>) {
        self.lock().refuse_all = error;
    }

    /// Number of `open` calls, successful or not.
    pub fn open_attempts(&self) -> usize {
        self.lock().urls.len()
    }

    /// Server side of every handle opened so far, oldest first.
    pub fn servers(&self) -> Vec<ServerEnd> {
        self.lock().servers.clone()
    }

    pub fn last_server(&self) -> Option<ServerEnd> {
        self.lock().servers.last().cloned()
    }

    pub fn urls(&self) -> Vec<String> {
        self.lock().urls.clone()
    }
}

#[async_trait]
impl PushTransport for InMemoryTransport {
    async fn open(&self, url: &str) -> Result<PushChannel, TransportError> {
        let mut inner = self.lock();
        inner.urls.push(url.to_string());

        if let Some(error) = inner.refusals.pop_front() {
            return Err(error);
        }
        if let Some(error) = inner.refuse_all.clone() {
            return Err(error);
        }

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        inner.servers.push(ServerEnd {
            to_client: inbound_tx,
            from_client: Arc::new(Mutex::new(outbound_rx)),
        });

        Ok(PushChannel {
            outbound: outbound_tx,
            inbound: inbound_rx,
        })
    }
}

/// The server's view of one in-memory handle.
#[derive(Clone)]
pub struct ServerEnd {
    to_client: mpsc::UnboundedSender<TransportEvent>,
    from_client: Arc<Mutex<mpsc::UnboundedReceiver<OutboundFrame>>>,
}

impl ServerEnd {
    /// Delivers a raw text frame. False once the client side is gone.
    pub fn push_text(&self, text: impl Into<String>) -> bool {
        self.to_client.send(TransportEvent::Frame(text.into())).is_ok()
    }

    pub fn push_envelope(&self, envelope: &Envelope) -> bool {
        match envelope.to_json() {
            Ok(text) => self.push_text(text),
            Err(_) => false,
        }
    }

    pub fn close(&self, code: u16, reason: impl Into<String>) -> bool {
        self.to_client
            .send(TransportEvent::Closed {
                code,
                reason: reason.into(),
            })
            .is_ok()
    }

    pub fn fail(&self, error: TransportError) -> bool {
        self.to_client.send(TransportEvent::Failed(error)).is_ok()
    }

    /// Frames the client has sent since the last drain.
    pub fn drain_sent(&self) -> Vec<OutboundFrame> {
        let mut receiver = self
            .from_client
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut frames = Vec::new();
        while let Ok(frame) = receiver.try_recv() {
            frames.push(frame);
        }
        frames
    }

    /// Text frames decoded as envelopes.
    pub fn sent_envelopes(&self) -> Vec<Envelope> {
        self.drain_sent()
            .into_iter()
            .filter_map(|frame| match frame {
                OutboundFrame::Text(text) => Envelope::parse(&text).ok(),
                OutboundFrame::Close { .. } => None,
            })
            .collect()
    }

    /// True when the client dropped its receiving half.
    pub fn is_client_gone(&self) -> bool {
        self.to_client.is_closed()
    }
}
