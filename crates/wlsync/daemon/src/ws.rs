//! OneBot websocket transport

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use wlsync_engine::{FrameChannel, FrameConnector, TransportError};

/// Dials the OneBot websocket API
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
    token: Option<String>,
}

impl WsConnector {
    pub fn new(url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            url: url.into(),
            token,
        }
    }
}

#[async_trait]
impl FrameConnector for WsConnector {
    type Channel = WsChannel;

    async fn connect(&self) -> Result<WsChannel, TransportError> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| TransportError::Rejected(format!("invalid chat url: {e}")))?;

        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| TransportError::Rejected(format!("invalid token: {e}")))?;
            request.headers_mut().insert("Authorization", value);
        }

        let (stream, _response) = connect_async(request).await.map_err(|e| match e {
            tungstenite::Error::Http(response) => {
                TransportError::Rejected(format!("handshake returned {}", response.status()))
            }
            other => TransportError::Connect(other.to_string()),
        })?;

        tracing::info!(url = %self.url, "chat connected");
        Ok(WsChannel { stream })
    }
}

/// One open websocket
pub struct WsChannel {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl FrameChannel for WsChannel {
    async fn recv(&mut self) -> Result<String, TransportError> {
        loop {
            let message = self
                .stream
                .next()
                .await
                .ok_or_else(|| TransportError::Closed("stream ended".to_string()))?
                .map_err(|e| TransportError::Closed(e.to_string()))?;

            match message {
                Message::Text(text) => return Ok(text),
                Message::Binary(data) => match String::from_utf8(data) {
                    Ok(text) => return Ok(text),
                    Err(e) => tracing::warn!(error = %e, "dropping non-utf8 chat frame"),
                },
                Message::Ping(data) => {
                    self.stream
                        .send(Message::Pong(data))
                        .await
                        .map_err(|e| TransportError::Closed(e.to_string()))?;
                }
                Message::Close(frame) => {
                    return Err(TransportError::Closed(format!("peer closed: {frame:?}")));
                }
                Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }

    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        self.stream
            .send(Message::Text(frame))
            .await
            .map_err(|e| TransportError::Closed(e.to_string()))
    }
}
