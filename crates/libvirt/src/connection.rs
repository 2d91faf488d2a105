//! Public transport handle: wires the reader loop, call registry, event
//! registry and request engine together over an owned reader/writer pair.

use std::sync::Arc;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::call_registry::CallRegistry;
use crate::constants::{QEMU_PROGRAM, QEMU_PROGRAM_VERSION, REMOTE_PROGRAM, REMOTE_PROTOCOL_VERSION};
use crate::error::{Error, Result};
use crate::event_registry::{EventReceiver, EventRegistry};
use crate::reader;
use crate::request::RequestEngine;
use crate::transport;
use crate::writer::Writer;

/// Default Unix socket path for system (root) connections.
pub const SYSTEM_SOCKET_PATH: &str = "/var/run/libvirt/libvirt-sock";

/// Default Unix socket path for session (per-user) connections, relative to
/// `XDG_RUNTIME_DIR`.
pub const SESSION_SOCKET_PATH: &str = "libvirt/libvirt-sock";

/// A libvirt RPC transport: one multiplexed connection supporting unary
/// calls, streaming calls, and event subscriptions.
///
/// Cloning a `Connection` is cheap and shares the same underlying
/// connection; all clones see the same in-flight calls and subscriptions.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

struct ConnectionInner {
    engine: RequestEngine<Box<dyn AsyncWrite + Unpin + Send>>,
    events: Arc<EventRegistry>,
}

impl Connection {
    /// Build a transport from an already-connected, already-authenticated
    /// reader/writer pair. Spawns the reader loop immediately.
    pub fn new<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let calls = Arc::new(CallRegistry::new());
        let events = Arc::new(EventRegistry::new());

        let boxed_writer: Box<dyn AsyncWrite + Unpin + Send> = Box::new(writer);
        let shared_writer = Arc::new(Writer::new(boxed_writer));
        let engine = RequestEngine::new(shared_writer, calls.clone());

        tokio::spawn(reader::run(reader, calls, events.clone()));

        Self {
            inner: Arc::new(ConnectionInner { engine, events }),
        }
    }

    /// Connect to a libvirt daemon over a Unix socket at `path`.
    pub async fn connect_unix(path: &str) -> Result<Self> {
        let (reader, writer) = transport::connect_unix(path).await?;
        Ok(Self::new(reader, writer))
    }

    /// Connect to the system (root) libvirt daemon.
    pub async fn connect_system() -> Result<Self> {
        Self::connect_unix(SYSTEM_SOCKET_PATH).await
    }

    /// Connect to the session (per-user) libvirt daemon.
    pub async fn connect_session() -> Result<Self> {
        let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
        let path = format!("{runtime_dir}/{SESSION_SOCKET_PATH}");
        Self::connect_unix(&path).await
    }

    /// Unary call against the main libvirt program.
    pub async fn request(&self, procedure: u32, payload: Bytes) -> Result<Bytes> {
        self.inner
            .engine
            .call(REMOTE_PROGRAM, REMOTE_PROTOCOL_VERSION, procedure, payload)
            .await
    }

    /// Unary call against the QEMU driver extension program.
    pub async fn request_qemu(&self, procedure: u32, payload: Bytes) -> Result<Bytes> {
        self.inner
            .engine
            .call(QEMU_PROGRAM, QEMU_PROGRAM_VERSION, procedure, payload)
            .await
    }

    /// Call with an optional outgoing and/or incoming stream, against the
    /// main libvirt program.
    pub async fn request_stream<O, I>(
        &self,
        procedure: u32,
        payload: Bytes,
        outgoing: Option<O>,
        incoming: Option<I>,
    ) -> Result<Bytes>
    where
        O: tokio::io::AsyncRead + Unpin + Send + 'static,
        I: tokio::io::AsyncWrite + Unpin + Send + 'static,
    {
        self.inner
            .engine
            .call_stream(
                REMOTE_PROGRAM,
                REMOTE_PROTOCOL_VERSION,
                procedure,
                payload,
                outgoing,
                incoming,
            )
            .await
    }

    /// Route events bearing `callback_id` to a freshly created sink, whose
    /// receiving half is returned. The caller is responsible for issuing
    /// whatever RPC makes the server start tagging events with
    /// `callback_id`; this method only wires up local routing.
    pub fn subscribe(&self, callback_id: i32) -> EventReceiver {
        self.inner.events.subscribe(callback_id)
    }

    /// Stop routing events for `callback_id`.
    pub fn unsubscribe(&self, callback_id: i32) {
        self.inner.events.unsubscribe(callback_id);
    }

    /// True iff `err` is a server error reporting "no such domain".
    pub fn is_not_found(err: &Error) -> bool {
        err.is_not_found()
    }
}
