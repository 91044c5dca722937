//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful during development when only the HTTP surface is needed. The workspace's main
//! `longevity-run` binary serves the same router and also loads a `.env` file.

use longevity_core::{CoreConfig, FixtureStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the longevity REST API server.
///
/// # Environment Variables
/// - `LONGEVITY_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `LONGEVITY_FIXTURES`: Fixture document to serve instead of the built-in demo data
/// - `LONGEVITY_DEFAULT_CLINICIAN`: Clinician served when a panel request names none
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration or fixture document is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("longevity_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("LONGEVITY_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = CoreConfig::from_env_values(
        std::env::var("LONGEVITY_FIXTURES").ok(),
        std::env::var("LONGEVITY_DEFAULT_CLINICIAN").ok(),
    )?;
    let store = FixtureStore::from_config(&cfg)?;

    tracing::info!("-- Starting longevity REST API on {}", addr);

    let app = api_rest::router(api_rest::AppState::new(cfg, store));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
