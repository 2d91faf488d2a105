//! Error types for the libvirt client.

use crate::rpcerror::ServerErrorRecord;

/// Result type for libvirt operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during libvirt transport operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// XDR serialization/deserialization error.
    #[error("XDR error: {0}")]
    Xdr(#[from] libvirt_xdr::Error),

    /// I/O error from the underlying reader or writer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unsupported URI scheme passed to a connection helper.
    #[error("unsupported URI: {0}")]
    UnsupportedUri(String),

    /// The connection was closed, either by the peer or by the reader loop
    /// exiting, while a call or subscription was still outstanding.
    #[error("connection closed")]
    ConnectionClosed,

    /// The server replied with a `Reply`/status=Error carrying a decoded
    /// server error record.
    #[error("server error: {0}")]
    Server(ServerErrorRecord),

    /// The server rejected the call because it does not recognize the
    /// procedure. Decoded from a server error record whose message names an
    /// unknown procedure.
    #[error("unsupported procedure: {0}")]
    Unsupported(String),

    /// A `Stream` packet with status=Error was received from the server
    /// while draining a call's stream.
    #[error("stream aborted: {0:?}")]
    StreamAborted(Option<ServerErrorRecord>),

    /// A packet's header or status/type failed to decode. The reader loop's
    /// policy is to drop the offending packet and keep running; this variant
    /// exists for callers (and tests) that decode packets directly.
    #[error("malformed packet: {0}")]
    MalformedPacket(#[from] crate::packet::PacketError),

    /// Reading from, or writing to, a caller-supplied streaming source/sink
    /// failed.
    #[error("stream I/O error: {0}")]
    StreamIo(std::io::Error),
}

impl Error {
    /// Returns true iff this is a server error whose code matches libvirt's
    /// well-known "no such domain" code.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Server(rec) if rec.code == crate::constants::VIR_ERR_NO_DOMAIN)
    }
}
