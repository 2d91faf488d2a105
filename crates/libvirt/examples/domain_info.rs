//! Example: make a unary call against the main libvirt program.
//!
//! This crate only implements the transport: framing, multiplexing, event
//! routing and streaming. It has no knowledge of what procedure 66
//! ("REMOTE_PROC_CONNECT_GET_VERSION" in upstream libvirt) means, or how to
//! decode its reply -- that's the job of a generated bindings layer sitting
//! above `Connection`. This example plays that role by hand, to show the
//! shape of the contract: caller picks the procedure number and encodes the
//! argument payload, the transport ships opaque bytes.

use libvirt_pure::Connection;

const REMOTE_PROC_CONNECT_GET_VERSION: u32 = 66;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let conn = match Connection::connect_system().await {
        Ok(c) => c,
        Err(e) => {
            eprintln!("failed to connect to {}: {e}", libvirt_pure::SYSTEM_SOCKET_PATH);
            eprintln!("falling back to the session daemon");
            Connection::connect_session().await?
        }
    };

    // REMOTE_PROC_CONNECT_GET_VERSION takes no arguments.
    let args = libvirt_xdr::to_bytes(&())?;
    let reply = conn
        .request(REMOTE_PROC_CONNECT_GET_VERSION, args.into())
        .await?;

    // The real reply is a struct { hyper hv_ver; }; here we just show the
    // raw byte count, since decoding it is out of this crate's scope.
    println!("got a {}-byte reply for GetVersion", reply.len());
    Ok(())
}
