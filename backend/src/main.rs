use std::sync::{Arc, Mutex};

use actix_web::rt::net::UdpSocket;
use anyhow::Result;
use log::error;

mod aggregate;
mod api;
mod config;
mod db;
mod ingest;
mod packet;
mod sample;
mod schema;
mod snapshot;

#[actix_web::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config::Config::from_env()?;
    let db = Arc::new(Mutex::new(db::Db::connect(&config.database_url)?));
    let sock = UdpSocket::bind(config.ingest_addr).await?;

    let ingest_db = db.clone();
    let task = actix_web::rt::spawn(async move {
        if let Err(e) = ingest::listen(sock, ingest_db).await {
            error!("Ingest listener failed: {e:#}");
        }
    });

    let (server, _) = tokio::join!(api::new_http_server(db, &config), task);
    server?;
    Ok(())
}
