use std::io::ErrorKind;
use std::net::TcpStream;

use tracing::{debug, trace};
use tungstenite::client::IntoClientRequest;
use tungstenite::http::HeaderValue;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{connect, Error, Message as Frame, WebSocket};
use url::Url;

use super::Message;

pub const PROTOCOL_HEADER: &str = "Sec-WebSocket-Protocol";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    #[error("invalid sub-protocol \"{0}\"")]
    InvalidProtocol(String),
    #[error("handshake with {url} failed: {reason}")]
    Handshake { url: String, reason: String },
    #[error("peer did not agree to sub-protocol \"{0}\"")]
    ProtocolRejected(String),
    #[error("could not configure socket: {0}")]
    Socket(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("connection closed")]
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    Text(String),
    Closed,
}

/// The session's only way to talk to its peer.
pub trait Transport {
    fn send(&mut self, message: &Message) -> Result<(), ConnectionError>;

    /// non-blocking: `Ok(None)` if nothing has arrived yet
    fn receive(&mut self) -> Result<Option<Received>, ConnectionError>;

    fn close(&mut self);
}

/*====================================================================================================================*/

pub struct Connection {
    websocket: WebSocket<MaybeTlsStream<TcpStream>>,
}

impl Connection {
    pub fn new(url: &Url, protocol: &str) -> Result<Self, ConnectionError> {
        let handshake_error = |reason: String| ConnectionError::Handshake {
            url: url.to_string(),
            reason,
        };

        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|err| handshake_error(err.to_string()))?;
        let header = HeaderValue::from_str(protocol).map_err(|_| ConnectionError::InvalidProtocol(protocol.to_owned()))?;
        request.headers_mut().insert(PROTOCOL_HEADER, header);

        let (mut websocket, response) = connect(request).map_err(|err| handshake_error(err.to_string()))?;

        let agreed = response
            .headers()
            .get(PROTOCOL_HEADER)
            .and_then(|value| value.to_str().ok())
            .map_or(false, |value| value.trim() == protocol);
        if !agreed {
            return Err(ConnectionError::ProtocolRejected(protocol.to_owned()));
        }

        match websocket.get_mut() {
            MaybeTlsStream::Plain(s) => s.set_nonblocking(true),
            MaybeTlsStream::NativeTls(s) => s.get_mut().set_nonblocking(true),
            _ => return Err(ConnectionError::Socket("unsupported stream type".to_owned())),
        }
        .map_err(|err| ConnectionError::Socket(err.to_string()))?;

        Ok(Connection { websocket })
    }

    // frames queued by a write that hit WouldBlock
    fn flush(&mut self) -> Result<(), ConnectionError> {
        match self.websocket.write_pending() {
            Ok(()) => Ok(()),
            Err(Error::Io(err)) if err.kind() == ErrorKind::WouldBlock => Ok(()),
            Err(Error::ConnectionClosed | Error::AlreadyClosed) => Err(ConnectionError::Closed),
            Err(err) => Err(ConnectionError::Transport(err.to_string())),
        }
    }
}

impl Transport for Connection {
    fn send(&mut self, message: &Message) -> Result<(), ConnectionError> {
        let msg = message.to_string();
        trace!("> {msg}");

        match self.websocket.write_message(Frame::Text(msg)) {
            Ok(()) => Ok(()),
            // still queued inside the websocket, goes out with the next flush
            Err(Error::Io(err)) if err.kind() == ErrorKind::WouldBlock => Ok(()),
            Err(Error::ConnectionClosed | Error::AlreadyClosed) => Err(ConnectionError::Closed),
            Err(err) => Err(ConnectionError::Transport(err.to_string())),
        }
    }

    fn receive(&mut self) -> Result<Option<Received>, ConnectionError> {
        match self.flush() {
            Err(ConnectionError::Closed) => return Ok(Some(Received::Closed)),
            Err(err) => return Err(err),
            Ok(()) => {}
        }

        match self.websocket.read_message() {
            Ok(Frame::Text(msg)) => {
                trace!("< {msg}");
                Ok(Some(Received::Text(msg)))
            }
            Ok(Frame::Close(frame)) => {
                debug!(?frame, "peer closed the connection");
                Ok(Some(Received::Closed))
            }
            // pings are answered by tungstenite itself
            Ok(_) => Ok(None),
            Err(Error::Io(err)) if err.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(Error::ConnectionClosed | Error::AlreadyClosed) => Ok(Some(Received::Closed)),
            Err(err) => Err(ConnectionError::Transport(err.to_string())),
        }
    }

    fn close(&mut self) {
        if let Err(err) = self.websocket.close(None) {
            debug!(%err, "close handshake failed");
        }
        if let Err(err) = self.flush() {
            debug!(%err, "could not flush close frame");
        }
    }
}
