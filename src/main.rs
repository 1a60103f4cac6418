//src/main.rs

use std::time::Duration;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use ambientar::{build_router, config::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controla o nível; padrão "info"
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new().await?;
    let addr = app_state.bind_addr.clone();

    // Descarta sessões de rascunho abandonadas
    let _idle_sweep = app_state.sessions.spawn_idle_sweep(Duration::from_secs(5 * 60));

    let app = build_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
