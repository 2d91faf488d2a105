//! Client-side RPC transport for the libvirt remote protocol.
//!
//! This crate frames XDR-encoded request/response packets over a reliable
//! byte stream (a Unix socket, typically `/var/run/libvirt/libvirt-sock`),
//! multiplexes many concurrent in-flight calls over that single connection
//! by a per-request serial number, routes asynchronous event notifications
//! to per-subscription sinks, and implements full-duplex streaming attached
//! to an ongoing call.
//!
//! It does not know the shape of any particular libvirt procedure's
//! arguments or return value -- those are opaque, XDR-encoded byte payloads
//! supplied by a caller (typically generated per-procedure bindings) along
//! with a `(program, procedure)` pair. Connection establishment,
//! authentication, and the generated bindings themselves live above this
//! crate.
//!
//! # Example
//!
//! ```ignore
//! use libvirt_pure::Connection;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let conn = Connection::connect_system().await?;
//!     let payload = libvirt_xdr::to_bytes(&())?;
//!     let response = conn.request(66 /* REMOTE_PROC_CONNECT_GET_VERSION */, payload.into()).await?;
//!     Ok(())
//! }
//! ```

mod call_registry;
mod connection;
pub mod constants;
mod error;
mod event;
mod event_registry;
mod packet;
mod reader;
mod request;
mod rpcerror;
mod serial;
mod transport;
mod writer;

pub use connection::{Connection, SESSION_SOCKET_PATH, SYSTEM_SOCKET_PATH};
pub use error::{Error, Result};
pub use event::DomainEvent;
pub use event_registry::EventReceiver;
pub use packet::{
    Header, MessageType, Packet, PacketError, Status, HEADER_SIZE, MAX_PACKET_SIZE,
    MAX_STREAM_CHUNK,
};
pub use rpcerror::ServerErrorRecord;
