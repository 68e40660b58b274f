//! Talentgate HTTP server
//!
//! Starts an Axum web server fronting the recruiting-services chat assistant.

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use talentgate::assistant::OpenAiAssistant;
use talentgate::cli::{Cli, Command, generate_config_template};
use talentgate::config::Config;
use talentgate::handlers::{self, AppState};
use talentgate::store::MemoryStore;
use talentgate::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Command::Config { output }) = cli.command {
        match output {
            Some(path) => {
                std::fs::write(&path, generate_config_template())?;
                println!("Wrote configuration template to {}", path);
            }
            None => print!("{}", generate_config_template()),
        }
        return Ok(());
    }

    let config = Config::from_file(&cli.config)?;
    telemetry::init(&config.observability.log_level);

    let assistant = Arc::new(OpenAiAssistant::from_env(&config.assistant)?);
    let store = Arc::new(MemoryStore::new());

    let addr = SocketAddr::from((
        config
            .server
            .host
            .parse::<std::net::IpAddr>()
            .unwrap_or_else(|_| std::net::IpAddr::from([0, 0, 0, 0])),
        config.server.port,
    ));

    let state = AppState::new(config, store, assistant);
    let app = handlers::router(state);

    tracing::info!("Listening on {}", addr);
    tracing::info!("Chat endpoint at http://{}/chat", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
