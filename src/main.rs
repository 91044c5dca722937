use longevity_core::{CoreConfig, FixtureStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the longevity dashboard backend
///
/// Loads `.env` if present, resolves configuration once, loads the fixture store and serves
/// the REST API until interrupted.
///
/// # Environment Variables
/// - `LONGEVITY_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `LONGEVITY_FIXTURES`: Fixture document overriding the built-in demo data
/// - `LONGEVITY_DEFAULT_CLINICIAN`: Clinician served when a panel request names none
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration, fixture loading or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("longevity_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("longevity_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("LONGEVITY_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = CoreConfig::from_env_values(
        std::env::var("LONGEVITY_FIXTURES").ok(),
        std::env::var("LONGEVITY_DEFAULT_CLINICIAN").ok(),
    )?;
    let store = FixtureStore::from_config(&cfg)?;

    tracing::info!("++ Starting longevity REST on {}", rest_addr);
    tracing::info!(
        fixtures = %cfg
            .fixtures_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in demo".into()),
        default_clinician = cfg.default_clinician_id(),
        "configuration resolved"
    );

    let app = api_rest::router(api_rest::AppState::new(cfg, store));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- Longevity REST stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {:?}", e);
        std::future::pending::<()>().await;
    }
}
