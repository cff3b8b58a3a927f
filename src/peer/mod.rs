//! A websocket peer that plays the other end of the session protocol: it keeps the game
//! with full rules and reports turns and results back to the client.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};

use threadpool::ThreadPool;
use tracing::{debug, error, info, warn};
use tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tungstenite::http::{HeaderValue, StatusCode};
use tungstenite::{accept_hdr, Message as Frame};

use crate::protocol::PROTOCOL_HEADER;

mod game;

pub use game::{PeerGame, INVALID_MOVE};

#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    #[error("could not bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },
    #[error("handshake failed: {0}")]
    Handshake(String),
    #[error(transparent)]
    WebSocket(#[from] tungstenite::Error),
}

#[derive(Debug, Clone)]
pub struct PeerConfig {
    pub bind: SocketAddr,
    pub protocol: String,
}

/// Accepts connections until the listener fails, one game per connection.
pub fn serve(config: &PeerConfig) -> Result<(), PeerError> {
    let listener = TcpListener::bind(config.bind).map_err(|source| PeerError::Bind {
        addr: config.bind,
        source,
    })?;

    let workers = num_cpus::get();
    let pool = ThreadPool::with_name("peer".to_owned(), workers);

    info!(addr = %config.bind, protocol = %config.protocol, workers, "peer listening");

    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(err) => {
                warn!(%err, "could not accept connection");
                continue;
            }
        };

        let protocol = config.protocol.clone();
        pool.execute(move || {
            let addr = stream.peer_addr().ok();
            if let Err(err) = handle_connection(stream, &protocol) {
                error!(?addr, %err, "connection ended with error");
            }
        });
    }

    pool.join();
    Ok(())
}

fn offers(request: &Request, protocol: &str) -> bool {
    request
        .headers()
        .get_all(PROTOCOL_HEADER)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|offered| offered.trim() == protocol)
}

fn rejection(reason: String) -> ErrorResponse {
    let mut response = ErrorResponse::new(Some(reason));
    *response.status_mut() = StatusCode::BAD_REQUEST;
    response
}

fn handle_connection(stream: TcpStream, protocol: &str) -> Result<(), PeerError> {
    let callback = |request: &Request, mut response: Response| -> Result<Response, ErrorResponse> {
        if !offers(request, protocol) {
            return Err(rejection(format!("sub-protocol \"{protocol}\" required")));
        }

        let header = HeaderValue::from_str(protocol).map_err(|err| rejection(err.to_string()))?;
        response.headers_mut().insert(PROTOCOL_HEADER, header);
        Ok(response)
    };

    let mut websocket = accept_hdr(stream, callback).map_err(|err| PeerError::Handshake(err.to_string()))?;
    info!("client connected");

    let mut game = PeerGame::new();

    loop {
        let text = match websocket.read_message() {
            Ok(Frame::Text(text)) => text,
            Ok(Frame::Close(frame)) => {
                info!(?frame, "client closed the connection");
                continue;
            }
            // pings are answered by tungstenite itself
            Ok(_) => continue,
            Err(tungstenite::Error::ConnectionClosed) => {
                debug!("connection closed");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        debug!("< {text}");

        for reply in game.respond(&text) {
            debug!("> {reply}");
            websocket.write_message(Frame::Text(reply))?;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use tungstenite::client::IntoClientRequest;
    use tungstenite::connect;

    use super::*;

    fn spawn_peer() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let _ = handle_connection(stream, "rust-websocket");
            }
        });

        addr
    }

    #[test]
    fn handshake_requires_sub_protocol() {
        let addr = spawn_peer();
        let url = format!("ws://{addr}");

        assert!(connect(url.as_str()).is_err());

        let mut request = url.as_str().into_client_request().unwrap();
        request
            .headers_mut()
            .insert(PROTOCOL_HEADER, HeaderValue::from_static("rust-websocket"));
        let (mut websocket, response) = connect(request).unwrap();
        assert_eq!(response.headers().get(PROTOCOL_HEADER).unwrap(), "rust-websocket");

        websocket.write_message(Frame::Text("e2e4".to_owned())).unwrap();
        assert_eq!(websocket.read_message().unwrap(), Frame::Text("OK".to_owned()));
        assert_eq!(websocket.read_message().unwrap(), Frame::Text("!black".to_owned()));

        websocket.write_message(Frame::Text("e2e4".to_owned())).unwrap();
        assert_eq!(websocket.read_message().unwrap(), Frame::Text(INVALID_MOVE.to_owned()));
    }
}
