use classhub::logging::{init_tracing, shutdown_tracer};
use classhub::metrics::init_metrics;
use classhub::router::init_router;
use classhub::state::init_app_state;
use classhub_config::ServerConfig;
use dotenvy::dotenv;

#[tokio::main]
async fn main() {
    dotenv().ok();

    if let Err(e) = init_tracing() {
        eprintln!("❌ Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Server exited with error");
        eprintln!("❌ {:#}", e);
        shutdown_tracer().await;
        std::process::exit(1);
    }

    shutdown_tracer().await;
}

async fn run() -> anyhow::Result<()> {
    let metrics = init_metrics()?;
    let config = ServerConfig::from_env();
    let state = init_app_state(&config).await?;
    let app = init_router(state, metrics);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    let local = listener.local_addr()?;

    tracing::info!(address = %local, backend = ?config.store_backend, "Server listening");
    println!("🚀 Server running on http://{}", local);
    println!("📚 Swagger UI available at http://{}/swagger-ui", local);
    println!("📖 Scalar UI available at http://{}/scalar", local);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
