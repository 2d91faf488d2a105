//! The request engine: the three composable call shapes built on top of the
//! serial allocator, call registry, and writer path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Notify;

use crate::call_registry::{CallRegistry, Response};
use crate::error::{Error, Result};
use crate::packet::{Packet, Status, MAX_STREAM_CHUNK};
use crate::rpcerror;
use crate::serial::SerialAllocator;
use crate::writer::Writer;

/// Shared state the public `Connection` API calls into for every request.
/// Generic over the writer so tests can drive it over an in-memory duplex.
pub struct RequestEngine<W> {
    serials: SerialAllocator,
    calls: Arc<CallRegistry>,
    writer: Arc<Writer<W>>,
}

/// One-shot abort signal shared between the receive side and the outgoing
/// stream sender. `Notify` delivers at most one permit per `notified()`
/// call, which is exactly the "first signal wins" semantics an abort needs.
#[derive(Default)]
struct AbortSignal {
    fired: AtomicBool,
    notify: Notify,
}

impl AbortSignal {
    fn trigger(&self) {
        if !self.fired.swap(true, Ordering::SeqCst) {
            self.notify.notify_one();
        }
    }

    async fn wait(&self) {
        if self.fired.load(Ordering::SeqCst) {
            return;
        }
        self.notify.notified().await;
    }
}

impl<W: AsyncWrite + Unpin + Send + 'static> RequestEngine<W> {
    pub fn new(writer: Arc<Writer<W>>, calls: Arc<CallRegistry>) -> Self {
        Self {
            serials: SerialAllocator::new(),
            calls,
            writer,
        }
    }

    /// Unary call: send `payload`, return the first reply's payload.
    pub async fn call(&self, program: u32, version: u32, procedure: u32, payload: Bytes) -> Result<Bytes> {
        let serial = self.serials.next();
        let mut rx = self.calls.register(serial);

        let call_packet = Packet::new_call(program, version, procedure, serial, payload);
        if let Err(e) = self.writer.write_packet(&call_packet).await {
            self.calls.deregister(serial);
            return Err(e);
        }

        let result = self.recv_first(&mut rx).await;
        self.calls.deregister(serial);
        result
    }

    /// Call with an optional outgoing stream (read from `outgoing` in
    /// chunks and sent as `Stream` packets) and/or an optional incoming
    /// stream (received `Stream` packets written to `incoming`). Passing
    /// both `None` is equivalent to [`RequestEngine::call`], except the
    /// caller must still pick concrete (possibly never-constructed) type
    /// parameters -- `tokio::io::empty()`/`tokio::io::sink()` are natural
    /// choices.
    pub async fn call_stream<O, I>(
        &self,
        program: u32,
        version: u32,
        procedure: u32,
        payload: Bytes,
        outgoing: Option<O>,
        mut incoming: Option<I>,
    ) -> Result<Bytes>
    where
        O: AsyncRead + Unpin + Send + 'static,
        I: AsyncWrite + Unpin + Send + 'static,
    {
        let serial = self.serials.next();
        let mut rx = self.calls.register(serial);

        let call_packet = Packet::new_call(program, version, procedure, serial, payload);
        if let Err(e) = self.writer.write_packet(&call_packet).await {
            self.calls.deregister(serial);
            return Err(e);
        }

        let first = match self.recv_first(&mut rx).await {
            Ok(payload) => payload,
            Err(e) => {
                self.calls.deregister(serial);
                return Err(e);
            }
        };

        if outgoing.is_none() && incoming.is_none() {
            self.calls.deregister(serial);
            return Ok(first);
        }

        let abort = Arc::new(AbortSignal::default());

        let sender = outgoing.map(|source| {
            let abort = abort.clone();
            let writer = self.writer.clone();
            tokio::spawn(async move {
                send_outgoing_stream(&writer, program, version, procedure, serial, source, abort)
                    .await
            })
        });

        let drain_result = self
            .drain_incoming(&mut rx, incoming.as_mut())
            .await;

        if drain_result.is_err() {
            abort.trigger();
        }

        let sender_result = if let Some(handle) = sender {
            match handle.await {
                Ok(res) => res,
                Err(_) => Err(Error::ConnectionClosed),
            }
        } else {
            Ok(())
        };

        self.calls.deregister(serial);

        drain_result?;
        sender_result?;
        Ok(first)
    }

    /// Receive the first response for a call and translate its status into
    /// success/error.
    async fn recv_first(&self, rx: &mut tokio::sync::mpsc::Receiver<Response>) -> Result<Bytes> {
        let response = rx.recv().await.ok_or(Error::ConnectionClosed)?;
        match response.status {
            Status::Ok => Ok(response.payload),
            Status::Error => {
                rpcerror::decode_server_error(&response.payload)?;
                Ok(Bytes::new())
            }
            Status::Continue => Err(Error::ConnectionClosed),
        }
    }

    /// Drain `Stream` packets for an ongoing call until end-of-stream,
    /// writing chunks to `incoming` if present.
    async fn drain_incoming<I>(
        &self,
        rx: &mut tokio::sync::mpsc::Receiver<Response>,
        mut incoming: Option<&mut I>,
    ) -> Result<()>
    where
        I: AsyncWrite + Unpin,
    {
        loop {
            let response = rx.recv().await.ok_or(Error::ConnectionClosed)?;
            match response.status {
                Status::Ok => return Ok(()),
                // A known server quirk terminates a stream with an empty
                // Continue instead of Ok; treat it identically.
                Status::Continue if response.payload.is_empty() => return Ok(()),
                Status::Error => {
                    rpcerror::decode_stream_abort(&response.payload)?;
                    return Ok(());
                }
                Status::Continue => {
                    if let Some(sink) = incoming.as_deref_mut() {
                        sink.write_all(&response.payload)
                            .await
                            .map_err(Error::StreamIo)?;
                    } else {
                        tracing::warn!("dropping unexpected stream data: no incoming sink");
                    }
                }
            }
        }
    }
}

/// Reads `source` in chunks no larger than [`MAX_STREAM_CHUNK`] and writes
/// each as a `Stream`/`Continue` packet. On EOF sends `Stream`/`Ok`; on a
/// source read error, or on receiving the abort signal, sends
/// `Stream`/`Error` and returns the failure.
async fn send_outgoing_stream<W, O>(
    writer: &Writer<W>,
    program: u32,
    version: u32,
    procedure: u32,
    serial: i32,
    mut source: O,
    abort: Arc<AbortSignal>,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
    O: AsyncRead + Unpin,
{
    let mut buf = BytesMut::zeroed(MAX_STREAM_CHUNK);

    loop {
        let read = tokio::select! {
            biased;
            _ = abort.wait() => {
                writer
                    .write_packet(&Packet::new_stream(
                        program, version, procedure, serial, Status::Error, Bytes::new(),
                    ))
                    .await?;
                return Err(Error::ConnectionClosed);
            }
            result = source.read(&mut buf) => result,
        };

        match read {
            Ok(0) => {
                writer
                    .write_packet(&Packet::new_stream(
                        program, version, procedure, serial, Status::Ok, Bytes::new(),
                    ))
                    .await?;
                return Ok(());
            }
            Ok(n) => {
                let chunk = Bytes::copy_from_slice(&buf[..n]);
                writer
                    .write_packet(&Packet::new_stream(
                        program,
                        version,
                        procedure,
                        serial,
                        Status::Continue,
                        chunk,
                    ))
                    .await?;
            }
            Err(e) => {
                let _ = writer
                    .write_packet(&Packet::new_stream(
                        program, version, procedure, serial, Status::Error, Bytes::new(),
                    ))
                    .await;
                return Err(Error::StreamIo(e));
            }
        }
    }
}
