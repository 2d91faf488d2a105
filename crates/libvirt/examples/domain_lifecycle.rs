//! Example: subscribe to asynchronous domain events.
//!
//! In the real protocol, a caller first issues an RPC such as
//! `QEMU_PROC_CONNECT_DOMAIN_MONITOR_EVENT_REGISTER` and the server replies
//! with a server-assigned callback-id; the caller then tells the transport
//! to start routing `Message` packets tagged with that id. Since issuing
//! that particular RPC is out of this crate's scope (it's one of the
//! thousands of procedure-specific shapes generated bindings own), this
//! example shows only the second half: registering local routing and
//! draining events as they arrive.

use libvirt_pure::Connection;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let conn = Connection::connect_system().await?;

    // Pretend the server just handed us callback-id 7 in response to a
    // monitor-event-register call we issued above this crate.
    let callback_id = 7;
    let mut events = conn.subscribe(callback_id);

    println!("listening for events on callback-id {callback_id}; Ctrl-C to stop");
    while let Some(event) = events.recv().await {
        println!(
            "event for callback {}: {} bytes of domain-specific body",
            event.callback_id,
            event.body.len()
        );
    }

    conn.unsubscribe(callback_id);
    Ok(())
}
