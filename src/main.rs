use crate::config::Config;
use crate::session::SessionManager;
use crate::ws::accept_connection;
use std::net::{Ipv4Addr, SocketAddrV4};
use tokio::net::TcpListener;

mod client;
mod config;
mod error;
mod game;
mod session;
mod time;
mod ws;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::try_init().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("Invalid configuration: {}", err);
            return;
        }
    };

    let db = match sled::open(&config.database_path) {
        Ok(db) => db,
        Err(err) => {
            log::error!("Could not open database {}: {}", config.database_path, err);
            return;
        }
    };
    let manager = match SessionManager::new(db) {
        Ok(manager) => manager,
        Err(err) => {
            log::error!("Could not open game store: {}", err);
            return;
        }
    };
    let manager: &'static SessionManager = Box::leak(Box::new(manager));

    let addr = SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), config.port);
    let Ok(listener) = TcpListener::bind(addr).await else {
        log::error!("Could not bind to address: {:?}", addr);
        return;
    };
    log::info!("Listening on: {:?}", addr);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(config.purge_interval);
        loop {
            interval.tick().await;
            manager.purge_games(config.session_ttl);
            log::debug!("{} games in memory", manager.num_games());
        }
    });

    while let Ok((stream, _)) = listener.accept().await {
        tokio::spawn(accept_connection(stream, manager));
    }
}
