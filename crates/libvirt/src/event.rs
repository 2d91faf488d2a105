//! Decoding the routing portion of an asynchronous event payload.
//!
//! libvirt/QEMU callback-style events all lead with a `callback_id` field
//! (an XDR `int`, i.e. a 4-byte big-endian signed integer) identifying which
//! subscription the event belongs to; everything after it is one of the
//! thousands of out-of-scope, procedure-specific event bodies. This crate
//! extracts just the routing key and hands the remainder through unparsed.

use bytes::{Buf, Bytes};

use crate::error::{Error, Result};

/// A domain event as routed by callback-id. `body` is the event-specific
/// payload, untouched, for the subscriber to decode.
#[derive(Debug, Clone)]
pub struct DomainEvent {
    pub callback_id: i32,
    pub body: Bytes,
}

/// Decode `callback_id` from the front of an event [`Message`](crate::packet::MessageType::Message)
/// payload and return it alongside the remaining body.
///
/// Named `decode_event` rather than `decode_callback_id`: callers always
/// need the leftover body too, so returning the bare `i32` would just make
/// every caller re-slice `payload` themselves to get it back.
pub fn decode_event(mut payload: Bytes) -> Result<DomainEvent> {
    if payload.len() < 4 {
        return Err(Error::MalformedPacket(crate::packet::PacketError::TooShort));
    }
    let callback_id = payload.get_i32();
    Ok(DomainEvent {
        callback_id,
        body: payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn decodes_callback_id_and_keeps_body() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&7i32.to_be_bytes());
        raw.extend_from_slice(b"payload");

        let event = decode_event(Bytes::from(raw)).unwrap();
        assert_eq!(event.callback_id, 7);
        assert_eq!(event.body, Bytes::from_static(b"payload"));
    }

    #[test]
    fn rejects_short_payload() {
        assert!(decode_event(Bytes::from_static(b"ab")).is_err());
    }
}
