//! Program/procedure/status constants the core transport needs to know
//! about directly.
//!
//! Everything else in the libvirt wire protocol -- the thousands of
//! procedure-specific argument/return shapes -- is generated glue that lives
//! above this crate and is handed to [`crate::Connection`] as an opaque
//! `(program, procedure, payload)` triple. The handful of values below are
//! the exceptions the transport itself must recognize: the two programs it
//! multiplexes, and the one procedure it must special-case to route
//! asynchronous domain events instead of treating them as call replies.

/// The main libvirt RPC program number (`REMOTE_PROGRAM` in libvirt's
/// `remote_protocol.x`).
pub const REMOTE_PROGRAM: u32 = 0x2000_8086;

/// Protocol version for [`REMOTE_PROGRAM`].
pub const REMOTE_PROTOCOL_VERSION: u32 = 1;

/// The QEMU driver extension RPC program number (`QEMU_PROGRAM` in
/// libvirt's `qemu_protocol.x`).
pub const QEMU_PROGRAM: u32 = 0x2000_8087;

/// Protocol version for [`QEMU_PROGRAM`].
pub const QEMU_PROGRAM_VERSION: u32 = 1;

/// Procedure number of `QEMU_PROC_DOMAIN_MONITOR_EVENT`, the asynchronous
/// notification libvirtd uses to forward QEMU monitor JSON events to
/// subscribers. This is the one (program, procedure) pair the reader loop
/// hardcodes for event routing; every other event-style procedure a caller
/// cares about is out of this crate's scope and must be added by the
/// generated bindings layer, not here.
pub const QEMU_PROC_DOMAIN_MONITOR_EVENT: u32 = 14;

/// `VIR_ERR_OK`: the server error record's code for "no error", seen when a
/// reply with status=Error is used to smuggle a benign informational
/// record (rare, but the wire format allows it).
pub const VIR_ERR_OK: u32 = 0;

/// `VIR_ERR_NO_DOMAIN`: the well-known libvirt error code for "domain not
/// found", used by [`crate::Error::is_not_found`].
pub const VIR_ERR_NO_DOMAIN: u32 = 42;

/// Returns true iff the reader loop should treat a packet with this
/// `(program, procedure)` pair as an asynchronous event rather than a call
/// reply.
pub fn is_event_procedure(program: u32, procedure: u32) -> bool {
    program == QEMU_PROGRAM && procedure == QEMU_PROC_DOMAIN_MONITOR_EVENT
}
