//! Runnable classroom server.
//!
//! Starts an EcoPulse server with the classroom defaults: campus data
//! every 5 seconds, rule scan every 2 seconds, 3-minute charger limit,
//! 6:00-18:00 daytime window.
//!
//! ```sh
//! ECOPULSE_ADDR=0.0.0.0:5000 cargo run -p classroom
//! ```
//!
//! Set `RUST_LOG=debug` to watch every event flow through.

use ecopulse::prelude::*;

#[tokio::main]
async fn main() -> Result<(), EcoPulseError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let addr = std::env::var("ECOPULSE_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:5000".to_string());

    let server = EcoPulseServerBuilder::new().bind(&addr).build().await?;
    tracing::info!(%addr, "EcoPulse classroom server ready");
    server.run().await
}
