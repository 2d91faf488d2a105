//! libvirt RPC packet encoding/decoding.
//!
//! The libvirt RPC protocol uses a simple packet format:
//!
//! ```plaintext
//! +------------+------------+------------+------------+
//! | length (4) | program(4) | version(4) |procedure(4)|
//! +------------+------------+------------+------------+
//! |  type (4)  | serial (4) | status (4) |   payload  |
//! +------------+------------+------------+------------+
//! ```
//!
//! All multi-byte values are big-endian. The length field counts itself,
//! the 24-byte header, and the payload.

use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Packet header size in bytes (not including the length field).
pub const HEADER_SIZE: usize = 24;

/// Maximum packet size on the wire (4 MiB), matching libvirtd's
/// `VIR_NET_MESSAGE_MAX` limit.
pub const MAX_PACKET_SIZE: usize = 4 * 1024 * 1024;

/// Largest payload a single outgoing `Stream`/`Continue` chunk may carry.
pub const MAX_STREAM_CHUNK: usize = MAX_PACKET_SIZE - HEADER_SIZE;

/// RPC message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MessageType {
    /// Request/call message.
    Call = 0,
    /// Reply message.
    Reply = 1,
    /// Asynchronous event message.
    Message = 2,
    /// Stream data belonging to an ongoing call.
    Stream = 3,
    /// A call that carries attached file descriptors.
    CallWithFds = 4,
    /// A reply that carries attached file descriptors.
    ReplyWithFds = 5,
}

impl MessageType {
    fn from_u32(v: u32) -> Option<Self> {
        match v {
            0 => Some(Self::Call),
            1 => Some(Self::Reply),
            2 => Some(Self::Message),
            3 => Some(Self::Stream),
            4 => Some(Self::CallWithFds),
            5 => Some(Self::ReplyWithFds),
            _ => None,
        }
    }
}

/// RPC message status. Meaning depends on the packet's [`MessageType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Status {
    /// Success (Reply), end-of-stream (Stream).
    Ok = 0,
    /// Error (Reply), abort (Stream).
    Error = 1,
    /// More data to come (Stream only).
    Continue = 2,
}

impl Status {
    fn from_u32(v: u32) -> Option<Self> {
        match v {
            0 => Some(Self::Ok),
            1 => Some(Self::Error),
            2 => Some(Self::Continue),
            _ => None,
        }
    }
}

/// A decoded packet header, the 24 bytes following the length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Program ID (e.g. [`crate::constants::REMOTE_PROGRAM`]).
    pub program: u32,
    /// Protocol version for `program`.
    pub version: u32,
    /// Procedure number within `program`.
    pub procedure: u32,
    /// Message type.
    pub msg_type: MessageType,
    /// Caller-assigned serial correlating replies/stream packets with a call.
    pub serial: i32,
    /// Status, meaning depends on `msg_type`.
    pub status: Status,
}

impl Header {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u32(self.program);
        buf.put_u32(self.version);
        buf.put_u32(self.procedure);
        buf.put_u32(self.msg_type as u32);
        buf.put_i32(self.serial);
        buf.put_u32(self.status as u32);
    }

    fn decode(data: &mut Bytes) -> Result<Self, PacketError> {
        if data.len() < HEADER_SIZE {
            return Err(PacketError::TooShort);
        }
        let program = data.get_u32();
        let version = data.get_u32();
        let procedure = data.get_u32();
        let msg_type = data.get_u32();
        let serial = data.get_i32();
        let status = data.get_u32();

        let msg_type =
            MessageType::from_u32(msg_type).ok_or(PacketError::InvalidMessageType(msg_type))?;
        let status = Status::from_u32(status).ok_or(PacketError::InvalidStatus(status))?;

        Ok(Self {
            program,
            version,
            procedure,
            msg_type,
            serial,
            status,
        })
    }
}

/// An RPC packet: header plus opaque payload.
#[derive(Debug, Clone)]
pub struct Packet {
    /// The decoded header.
    pub header: Header,
    /// Payload bytes (opaque to the transport except for error/event
    /// decoding).
    pub payload: Bytes,
}

impl Packet {
    /// Create a new `Call` packet, status always OK on the wire.
    pub fn new_call(program: u32, version: u32, procedure: u32, serial: i32, payload: Bytes) -> Self {
        Self {
            header: Header {
                program,
                version,
                procedure,
                msg_type: MessageType::Call,
                serial,
                status: Status::Ok,
            },
            payload,
        }
    }

    /// Create a new `Stream` packet belonging to an ongoing call.
    pub fn new_stream(
        program: u32,
        version: u32,
        procedure: u32,
        serial: i32,
        status: Status,
        payload: Bytes,
    ) -> Self {
        Self {
            header: Header {
                program,
                version,
                procedure,
                msg_type: MessageType::Stream,
                serial,
                status,
            },
            payload,
        }
    }

    /// Create a new `Reply` packet (server-side direction; used by tests
    /// that simulate a libvirtd peer).
    pub fn new_reply(
        program: u32,
        version: u32,
        procedure: u32,
        serial: i32,
        status: Status,
        payload: Bytes,
    ) -> Self {
        Self {
            header: Header {
                program,
                version,
                procedure,
                msg_type: MessageType::Reply,
                serial,
                status,
            },
            payload,
        }
    }

    /// Create a new `Message` (async event) packet (server-side direction;
    /// used by tests that simulate a libvirtd peer).
    pub fn new_message(program: u32, version: u32, procedure: u32, payload: Bytes) -> Self {
        Self {
            header: Header {
                program,
                version,
                procedure,
                msg_type: MessageType::Message,
                serial: 0,
                status: Status::Ok,
            },
            payload,
        }
    }

    /// Encode length prefix + header + payload.
    pub fn encode(&self) -> BytesMut {
        let total_len = 4 + HEADER_SIZE + self.payload.len();
        let mut buf = BytesMut::with_capacity(total_len);
        buf.put_u32(total_len as u32);
        self.header.encode(&mut buf);
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// Decode a packet body (header + payload), NOT including the length
    /// prefix, which the framer strips before calling this.
    pub fn decode(mut data: Bytes) -> Result<Self, PacketError> {
        let header = Header::decode(&mut data)?;
        Ok(Self {
            header,
            payload: data,
        })
    }
}

/// Packet parsing/encoding error.
#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error("packet too short")]
    TooShort,
    #[error("invalid message type: {0}")]
    InvalidMessageType(u32),
    #[error("invalid status: {0}")]
    InvalidStatus(u32),
    #[error("total length {0} is below the minimum of 28 bytes")]
    LengthTooSmall(u32),
    #[error("packet too large: {0} bytes")]
    TooLarge(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_encode_decode() {
        let payload = Bytes::from_static(b"hello");
        let packet = Packet::new_call(0x2000_8086, 1, 42, 1, payload.clone());

        let encoded = packet.encode();

        // Skip the length prefix; that's the framer's job.
        let data = Bytes::copy_from_slice(&encoded[4..]);
        let decoded = Packet::decode(data).unwrap();

        assert_eq!(decoded.header.program, 0x2000_8086);
        assert_eq!(decoded.header.version, 1);
        assert_eq!(decoded.header.procedure, 42);
        assert_eq!(decoded.header.msg_type, MessageType::Call);
        assert_eq!(decoded.header.serial, 1);
        assert_eq!(decoded.header.status, Status::Ok);
        assert_eq!(decoded.payload, payload);
    }

    #[test]
    fn test_decode_too_short() {
        let data = Bytes::from_static(b"short");
        assert!(matches!(Packet::decode(data), Err(PacketError::TooShort)));
    }

    #[test]
    fn test_decode_invalid_status() {
        let mut buf = BytesMut::new();
        buf.put_u32(0x2000_8086);
        buf.put_u32(1);
        buf.put_u32(42);
        buf.put_u32(MessageType::Reply as u32);
        buf.put_i32(1);
        buf.put_u32(99); // invalid status
        let data = buf.freeze();
        assert!(matches!(
            Packet::decode(data),
            Err(PacketError::InvalidStatus(99))
        ));
    }
}
