mod message;
mod network;

pub use message::{Directive, Message, ProtocolError, ACK, DIRECTIVE_PREFIX};
pub use network::{Connection, ConnectionError, Received, Transport, PROTOCOL_HEADER};
