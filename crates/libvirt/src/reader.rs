//! The reader loop: a single long-lived task with exclusive ownership of
//! the read half, demultiplexing packets to the call and event registries.

use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::call_registry::{CallRegistry, Response};
use crate::constants::is_event_procedure;
use crate::event;
use crate::event_registry::EventRegistry;
use crate::packet::{MessageType, Packet, PacketError, HEADER_SIZE, MAX_PACKET_SIZE};

/// Read one complete framed packet: a 4-byte big-endian total length
/// followed by `length - 4` bytes of header+payload.
///
/// Returns `Ok(None)` on clean EOF (no bytes read for the length prefix).
async fn read_framed<R: AsyncRead + Unpin>(reader: &mut R) -> std::io::Result<Option<Bytes>> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }
    let total_len = u32::from_be_bytes(len_buf) as usize;

    if total_len > MAX_PACKET_SIZE {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            PacketError::TooLarge(total_len),
        ));
    }
    if total_len < 4 + HEADER_SIZE {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            PacketError::LengthTooSmall(total_len as u32),
        ));
    }

    let body_len = total_len - 4;
    let mut buf = BytesMut::zeroed(body_len);
    reader.read_exact(&mut buf).await?;
    Ok(Some(buf.freeze()))
}

/// Run the reader loop until EOF or an I/O error. Dispatches every packet to
/// the event registry or the call registry, and closes both registries on
/// exit so no caller is left waiting forever.
pub async fn run<R: AsyncRead + Unpin>(
    mut reader: R,
    calls: Arc<CallRegistry>,
    events: Arc<EventRegistry>,
) {
    tracing::debug!("reader loop started");
    loop {
        match read_framed(&mut reader).await {
            Ok(Some(body)) => {
                dispatch(body, &calls, &events);
            }
            Ok(None) => {
                tracing::debug!("reader loop exiting: connection closed by peer");
                break;
            }
            Err(e) => {
                tracing::warn!(error = %e, "reader loop exiting: I/O error");
                break;
            }
        }
    }
    calls.close_all();
    events.close_all();
    tracing::debug!("reader loop stopped");
}

fn dispatch(body: Bytes, calls: &CallRegistry, events: &EventRegistry) {
    let packet = match Packet::decode(body) {
        Ok(p) => p,
        Err(e) => {
            // Current policy: a malformed packet is dropped, the loop keeps
            // running. Framing has already consumed exactly one packet's
            // worth of bytes, so the stream stays in sync even though this
            // one packet is lost.
            tracing::warn!(error = %e, "dropping malformed packet");
            return;
        }
    };

    let header = packet.header;
    if header.msg_type == MessageType::Message
        && is_event_procedure(header.program, header.procedure)
    {
        match event::decode_event(packet.payload) {
            Ok(domain_event) => events.deliver(domain_event),
            Err(e) => tracing::warn!(error = %e, "dropping malformed event payload"),
        }
        return;
    }

    calls.deliver(
        header.serial,
        Response {
            status: header.status,
            payload: packet.payload,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{QEMU_PROC_DOMAIN_MONITOR_EVENT, QEMU_PROGRAM, REMOTE_PROGRAM};
    use crate::packet::{Header, Status};

    fn encode(header: Header, payload: &[u8]) -> Bytes {
        Packet {
            header,
            payload: Bytes::copy_from_slice(payload),
        }
        .encode()
        .freeze()
    }

    #[tokio::test]
    async fn routes_reply_by_serial() {
        let calls = Arc::new(CallRegistry::new());
        let events = Arc::new(EventRegistry::new());
        let mut rx = calls.register(1);

        let (client, mut server) = tokio::io::duplex(4096);
        let handle = tokio::spawn(run(client, calls.clone(), events.clone()));

        let packet = encode(
            Header {
                program: REMOTE_PROGRAM,
                version: 1,
                procedure: 42,
                msg_type: MessageType::Reply,
                serial: 1,
                status: Status::Ok,
            },
            b"abba",
        );
        use tokio::io::AsyncWriteExt;
        server.write_all(&packet).await.unwrap();

        let resp = rx.recv().await.unwrap();
        assert_eq!(resp.payload, Bytes::from_static(b"abba"));

        drop(server);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn routes_message_to_event_registry() {
        let calls = Arc::new(CallRegistry::new());
        let events = Arc::new(EventRegistry::new());
        let mut rx = events.subscribe(7);

        let (client, mut server) = tokio::io::duplex(4096);
        let handle = tokio::spawn(run(client, calls.clone(), events.clone()));

        let mut payload = Vec::new();
        payload.extend_from_slice(&7i32.to_be_bytes());
        payload.extend_from_slice(b"evt");

        let packet = encode(
            Header {
                program: QEMU_PROGRAM,
                version: 1,
                procedure: QEMU_PROC_DOMAIN_MONITOR_EVENT,
                msg_type: MessageType::Message,
                serial: 0,
                status: Status::Ok,
            },
            &payload,
        );
        use tokio::io::AsyncWriteExt;
        server.write_all(&packet).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.callback_id, 7);
        assert_eq!(event.body, Bytes::from_static(b"evt"));

        drop(server);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn eof_closes_registries() {
        let calls = Arc::new(CallRegistry::new());
        let events = Arc::new(EventRegistry::new());
        let mut rx = calls.register(1);

        let (client, server) = tokio::io::duplex(4096);
        drop(server);
        run(client, calls.clone(), events.clone()).await;

        assert!(rx.recv().await.is_none());
    }
}
