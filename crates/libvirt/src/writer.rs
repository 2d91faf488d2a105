//! Serialized access to the underlying writer half.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::packet::Packet;

/// Guards a single writer so that an entire packet (length + header +
/// payload) is written and flushed within one critical section, never
/// interleaved with another packet on the wire.
pub struct Writer<W> {
    inner: Mutex<W>,
}

impl<W: AsyncWrite + Unpin> Writer<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: Mutex::new(writer),
        }
    }

    /// Encode and write `packet`, flushing before releasing the lock.
    pub async fn write_packet(&self, packet: &Packet) -> Result<()> {
        let encoded = packet.encode();
        let mut guard = self.inner.lock().await;
        guard.write_all(&encoded).await?;
        guard.flush().await?;
        Ok(())
    }
}
