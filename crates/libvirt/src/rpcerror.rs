//! Decoding and classifying the server error record carried by a `Reply`
//! with status=Error (and, for aborted streams, a `Stream` with
//! status=Error).

use serde::Deserialize;

use crate::constants::VIR_ERR_OK;
use crate::error::{Error, Result};

/// XDR-encoded error record libvirtd sends on a failed call.
///
/// Field order matters: XDR has no field names on the wire, so
/// `libvirt_xdr`'s derive-based codec relies on struct declaration order
/// matching the wire layout exactly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerErrorRecord {
    /// `virErrorNumber` code.
    pub code: u32,
    /// Error domain (which libvirt subsystem raised it).
    pub domain: u32,
    /// Reserved/alignment slot in the wire layout.
    pub reserved: u32,
    /// Human-readable message.
    pub message: String,
    /// `virErrorLevel`.
    pub level: u32,
}

impl std::fmt::Display for ServerErrorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Decode an error-reply payload and classify it per the transport's small
/// error taxonomy.
///
/// Returns `Ok(())` if the record decodes to the well-known "no error" code
/// (some servers use status=Error to carry an advisory record that isn't
/// actually fatal); otherwise returns the classified [`Error`].
pub fn decode_server_error(payload: &[u8]) -> Result<()> {
    let record: ServerErrorRecord = libvirt_xdr::from_bytes(payload)?;

    if record.code == VIR_ERR_OK {
        return Ok(());
    }

    if record.message.contains("unknown procedure") {
        return Err(Error::Unsupported(record.message));
    }

    Err(Error::Server(record))
}

/// Decode a `Stream`/status=Error payload into [`Error::StreamAborted`].
///
/// Distinct from [`decode_server_error`]: a mid-stream abort is not the same
/// failure as a call-level error reply, even though both carry the same
/// record shape, so callers draining a stream get a `StreamAborted` rather
/// than a `Server`/`Unsupported` classification.
pub fn decode_stream_abort(payload: &[u8]) -> Result<()> {
    if payload.is_empty() {
        return Err(Error::StreamAborted(None));
    }

    let record: ServerErrorRecord = libvirt_xdr::from_bytes(payload)?;
    if record.code == VIR_ERR_OK {
        return Ok(());
    }

    Err(Error::StreamAborted(Some(record)))
}
