//! Connecting a Unix socket and splitting it into owned read/write halves.
//!
//! The transport proper ([`crate::Connection`]) only needs *some*
//! `AsyncRead + Unpin + Send + 'static` and `AsyncWrite + Unpin + Send +
//! 'static` pair; this module supplies that pair for the common case of a
//! local libvirtd Unix socket. TCP/TLS transports would plug in here the
//! same way, but are out of this crate's scope.

use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;

use crate::error::Result;

/// Connect to a Unix socket at `path` and split it into owned halves ready
/// to be handed to [`crate::Connection::new`].
pub async fn connect_unix(path: &str) -> Result<(OwnedReadHalf, OwnedWriteHalf)> {
    let stream = UnixStream::connect(path).await?;
    Ok(stream.into_split())
}
