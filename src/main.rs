use expense_tracker::{
    router, series::load_and_render_series, storage::FileStore, AppState, Config, ExpenseStore,
};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    let storage = FileStore::open(&config.data_dir)?;
    let store = ExpenseStore::load_or_default(Box::new(storage));
    info!(
        count = store.len(),
        "loaded expenses from {}",
        config.data_dir.display()
    );

    let state = AppState::new(&config, store);

    if let Some(url) = config.series_url.clone() {
        let canvas = state.series.clone();
        tokio::spawn(async move {
            let client = reqwest::Client::new();
            load_and_render_series(&client, &url, &*canvas).await;
        });
    }

    let app = router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
