pub mod config;
pub mod discovery;
pub mod handlers;
pub mod state;

use anyhow::{Context, Result};
use common::Layout;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::CoordinatorConfig;
use crate::state::AppState;

/// Descubre los inputs y arma el estado inicial con todas las tareas.
pub fn build_state(config: &CoordinatorConfig) -> Result<AppState> {
    let files = discovery::discover_input_files(&config.input_dir)
        .with_context(|| format!("descubriendo inputs en {}", config.input_dir.display()))?;

    let layout = Layout::new(&config.work_dir);
    let state = AppState::new(
        &files,
        config.map_tasks,
        config.reduce_tasks,
        &layout,
        config.barrier,
    );

    let params = state.parameters();
    info!(
        "{} archivos de entrada, N={} (pedido {}), M={}, barrera={:?}",
        files.len(),
        params.map_tasks,
        config.map_tasks,
        params.reduce_tasks,
        state.barrier()
    );

    Ok(state)
}

/// Sirve el protocolo hasta que el listener falle.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let app = handlers::build_router(state);
    axum::serve(listener, app)
        .await
        .context("el servidor HTTP terminó con error")
}
