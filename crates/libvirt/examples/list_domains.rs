//! Example: a call with an incoming stream, e.g. the shape of
//! `DOMAIN_SCREENSHOT` or `STORAGE_VOL_DOWNLOAD`-style procedures that reply
//! once and then push `Stream` packets of data until end-of-stream.

use libvirt_pure::Connection;

const SOME_STREAMING_PROCEDURE: u32 = 1000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let conn = Connection::connect_system().await?;

    let args = libvirt_xdr::to_bytes(&())?;

    // A real caller would hand in a file or an in-memory buffer; here we
    // just discard the streamed body to keep the example self-contained.
    let reply = conn
        .request_stream(
            SOME_STREAMING_PROCEDURE,
            args.into(),
            None::<tokio::io::Empty>,
            Some(tokio::io::sink()),
        )
        .await?;

    println!("initial reply: {} bytes", reply.len());
    Ok(())
}
