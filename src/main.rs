use file_store_server::{config, logger, server, storage};
use std::sync::Arc;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> Result<(), BoxError> {
    // Config file path (without extension) may be given as the first argument
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg.logging)?;

    // Build the Tokio runtime, sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), BoxError> {
    let addr = cfg.get_socket_addr()?;

    let store = storage::DiskStore::open_root(config::STORAGE_ROOT).await?;
    let listener = server::create_reusable_listener(addr)?;
    logger::log_server_start(&addr, &cfg, store.root());

    let state = Arc::new(config::AppState::new(cfg, Arc::new(store)));
    server::start_server_loop(listener, state, server::shutdown_signal()).await;
    Ok(())
}
