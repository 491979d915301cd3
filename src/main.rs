//! tracectrl - Entry point for the web server

use std::sync::Arc;

use tracectrl::config::Settings;
use tracectrl::web;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting tracectrl");

    if let Err(e) = run().await {
        tracing::error!("Application error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;
    let ctx = Arc::new(web::AppContext::from_settings(settings)?);
    web::serve(ctx).await
}
