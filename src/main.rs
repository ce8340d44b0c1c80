use std::sync::Arc;

use anyhow::Context;

use email_classifier::api::api_routes;
use email_classifier::config::ServerConfig;
use email_classifier::pipeline::EmailProcessor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::from_env().context("invalid configuration")?;

    if config.llm.api_key.is_none() {
        tracing::warn!(
            env_var = config.llm.backend.api_key_var(),
            "No API key set; classification requests will fail until it is configured"
        );
    }

    tracing::info!(
        backend = config.llm.backend.label(),
        model = %config.llm.model,
        frontend = %config.frontend_url,
        "Email classifier v{}",
        env!("CARGO_PKG_VERSION")
    );

    let processor = Arc::new(EmailProcessor::new(
        Arc::new(config.llm.clone()),
        config.signature.clone(),
    ));
    let app = api_routes(processor, &config);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, "HTTP server started");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
