use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::app::Engine;
use crate::http::connection::Connection;

pub async fn run(engine: Arc<Engine>, addr: &str) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    loop {
        let (socket, peer) = listener.accept().await?;
        info!("Accepted connection from {}", peer);

        let engine = engine.clone();
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, engine);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {}", peer, e);
            }
        });
    }
}
