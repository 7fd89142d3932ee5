/// Canal CDC client example
///
/// Connects to a canal server, subscribes an optional table filter and
/// prints every change event as one JSON line.
use rust_canal::cdc_engine::{CdcConfig, CdcEngine};
use rust_canal::config::CanalConfig;
use std::env;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = CdcConfig {
        connection: CanalConfig {
            hostname: env::var("CANAL_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("CANAL_PORT")
                .unwrap_or_else(|_| "11111".to_string())
                .parse()
                .unwrap_or(11111),
            destination: env::var("CANAL_DESTINATION").unwrap_or_else(|_| "example".to_string()),
            client_id: env::var("CANAL_CLIENT_ID").unwrap_or_else(|_| "1001".to_string()),
            username: env::var("CANAL_USER").unwrap_or_default(),
            password: env::var("CANAL_PASSWORD").unwrap_or_default(),
            ..Default::default()
        },
        filter: env::var("CANAL_FILTER").ok(),
        fetch_size: 100,
        poll_interval: Duration::from_secs(3),
        include_ddl: true,
    };

    info!(
        "Connecting to canal server at {}:{} (destination {})",
        config.connection.hostname, config.connection.port, config.connection.destination
    );

    let mut engine = CdcEngine::new(config);
    engine.start().await?;

    let mut events = engine.stream_events()?;
    info!("Listening for change events...");

    while let Some(event) = events.recv().await {
        info!(
            "{} {}.{} at {}",
            event.op.as_str(),
            event.database,
            event.table,
            event.timestamp
        );
        println!("{}", serde_json::to_string(&event)?);
    }

    engine.stop().await?;
    Ok(())
}
