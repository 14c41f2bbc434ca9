use std::sync::{Arc, Mutex};

use actix_web::rt::net::UdpSocket;
use anyhow::{anyhow, Result};
use log::{info, warn};
use tokio::signal;

use crate::db::Db;
use crate::packet::Packet;

/// Appends every valid datagram as a new sample until ctrl-c.
pub async fn listen(sock: UdpSocket, db: Arc<Mutex<Db>>) -> Result<()> {
    let mut buf = [0; 1024];
    info!("Listening for samples on {}", sock.local_addr()?);
    loop {
        tokio::select! {
            res = sock.recv_from(&mut buf) => match res {
                Ok((len, addr)) => {
                    if let Err(e) = store_datagram(&db, &buf[..len]) {
                        warn!("Dropped datagram from {addr}: {e:#}");
                    }
                }
                Err(e) => warn!("Receive failed: {e}"),
            },
            Ok(()) = signal::ctrl_c() => { break; }
        }
    }
    info!("Ingest listener stopped");
    Ok(())
}

fn store_datagram(db: &Mutex<Db>, data: &[u8]) -> Result<i32> {
    let packet = Packet::decode(data)?;
    let mut db = db.lock().map_err(|_| anyhow!("database lock poisoned"))?;
    db.insert_sample(packet.timestamp, &packet.payload)
}
