pub mod api;
pub mod aws;
pub mod config;
pub mod core_state;
pub mod pipeline;
pub mod storage;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::ServerError;
use crate::config::{EnvFile, GatewayConfig};
use crate::core_state::CoreState;

/// Start the gateway and serve until Ctrl-C or SIGTERM.
pub async fn run() -> Result<(), ServerError> {
    // Before tracing init so RUST_LOG may come from the file
    let env_file = config::load_env_file();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    match &env_file {
        EnvFile::Loaded(path) => tracing::info!(path = %path.display(), "Loaded .env file"),
        EnvFile::NotFound => tracing::info!("No .env file found; using process environment"),
        EnvFile::Invalid(reason) => tracing::warn!(reason = %reason, "Ignoring unreadable .env file"),
    }

    let config = GatewayConfig::from_env()?;
    log_configuration(&config);

    let clients = aws::connect(&config).await;
    let core = Arc::new(CoreState::new(config, clients));

    let availability = core.availability();
    tracing::info!(
        storage = availability.storage,
        knowledge_base = availability.knowledge_base,
        strategy_model = availability.strategy_model,
        "Service availability"
    );

    let bind_addr = core.config.bind_addr;
    let mut server = api::start_server(core, bind_addr).await?;

    api::server::termination_signal().await;
    server.shutdown();
    server.wait().await
}

fn log_configuration(config: &GatewayConfig) {
    tracing::info!(
        bind_addr = %config.bind_addr,
        region = %config.region,
        uploads_bucket = %config.uploads_bucket,
        results_bucket = %config.results_bucket,
        knowledge_base_id = %config.knowledge_base_id,
        model_arn = %config.model_arn,
        strategy_model_id = %config.strategy_model_id,
        static_credentials = config.credentials.is_some(),
        "Configuration loaded"
    );
    tracing::debug!(origins = ?config.allowed_origins, max_upload_bytes = config.max_upload_bytes, "HTTP limits");
}
