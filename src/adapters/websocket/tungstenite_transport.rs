//! Websocket push transport over tokio-tungstenite.
//!
//! Each opened handle gets one pump task that owns the socket. It
//! forwards text frames inbound, writes outbound frames, answers pings,
//! and reports exactly one terminal event (`Closed` or `Failed`) before
//! exiting.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::domain::connection::{TransportError, ABNORMAL_CLOSURE};
use crate::ports::{OutboundFrame, PushChannel, PushTransport, TransportEvent};

/// RFC 6455 "no status received".
const NO_STATUS: u16 = 1005;

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Production push transport.
#[derive(Debug, Clone, Default)]
pub struct TungsteniteTransport;

impl TungsteniteTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PushTransport for TungsteniteTransport {
    async fn open(&self, url: &str) -> Result<PushChannel, TransportError> {
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(TransportError::Fatal(format!(
                "push url must use ws:// or wss://, got '{url}'"
            )));
        }

        let (socket, response) = connect_async(url).await.map_err(map_connect_error)?;
        tracing::debug!(status = %response.status(), url, "websocket handshake complete");

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        tokio::spawn(pump(socket, outbound_rx, inbound_tx));

        Ok(PushChannel {
            outbound: outbound_tx,
            inbound: inbound_rx,
        })
    }
}

fn map_connect_error(error: WsError) -> TransportError {
    match error {
        WsError::Url(e) => TransportError::Fatal(e.to_string()),
        other => TransportError::Io(other.to_string()),
    }
}

async fn pump(
    socket: Socket,
    mut outbound: mpsc::UnboundedReceiver<OutboundFrame>,
    inbound: mpsc::UnboundedSender<TransportEvent>,
) {
    let (mut write, mut read) = socket.split();

    let terminal = loop {
        tokio::select! {
            frame = outbound.recv() => match frame {
                Some(OutboundFrame::Text(text)) => {
                    if let Err(e) = write.send(Message::Text(text)).await {
                        break TransportEvent::Failed(TransportError::Io(e.to_string()));
                    }
                }
                Some(OutboundFrame::Close { code, reason }) => {
                    let frame = CloseFrame {
                        code: CloseCode::from(code),
                        reason: reason.clone().into(),
                    };
                    if let Err(e) = write.send(Message::Close(Some(frame))).await {
                        tracing::debug!(error = %e, "close frame not delivered");
                    }
                    break TransportEvent::Closed { code, reason };
                }
                None => {
                    // Every sender dropped: the owner is gone.
                    let _ = write.send(Message::Close(None)).await;
                    return;
                }
            },
            message = read.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    if inbound.send(TransportEvent::Frame(text)).is_err() {
                        let _ = write.send(Message::Close(None)).await;
                        return;
                    }
                }
                Some(Ok(Message::Ping(payload))) => {
                    if let Err(e) = write.send(Message::Pong(payload)).await {
                        break TransportEvent::Failed(TransportError::Io(e.to_string()));
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = frame
                        .map(|f| (u16::from(f.code), f.reason.into_owned()))
                        .unwrap_or((NO_STATUS, String::new()));
                    break TransportEvent::Closed { code, reason };
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => break TransportEvent::Failed(TransportError::Io(e.to_string())),
                None => {
                    break TransportEvent::Closed {
                        code: ABNORMAL_CLOSURE,
                        reason: "stream ended".to_string(),
                    }
                }
            },
        }
    };

    let _ = inbound.send(terminal);
}
