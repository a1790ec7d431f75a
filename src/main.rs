use std::path::PathBuf;
use std::sync::Arc;

use crop_predictor::model::ModelBundle;
use crop_predictor::server::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let models_dir = PathBuf::from(
        std::env::var("MODELS_DIR").unwrap_or_else(|_| "models".to_string()),
    );
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    // Fail fast: the process must not come up healthy with partial state.
    let bundle = ModelBundle::load(&models_dir)?;
    bundle.warmup()?;
    tracing::info!("warmup forward ok");
    tracing::info!(
        "loaded model bundle from {}; classes[{}]: {:?}",
        models_dir.display(),
        bundle.classes().len(),
        bundle.classes()
    );

    let state = AppState {
        bundle: Some(Arc::new(bundle)),
    };
    let app = router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
