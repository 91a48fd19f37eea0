use std::sync::Arc;

use career_portal::config::{AppState, Config};
use career_portal::routing::site_router;
use career_portal::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;
    logger::init(&cfg)?;

    // A conflicting route table aborts startup before anything is bound
    let router = site_router()?;

    // Create the Tokio runtime, sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        logger::log_info(&format!("[CONFIG] Using {workers} worker threads"));
    } else {
        logger::log_info("[CONFIG] Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg, router))
}

async fn async_main(
    cfg: Config,
    router: career_portal::routing::Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let listener = server::create_reusable_listener(addr, server::LISTEN_BACKLOG)?;

    logger::log_server_start(&addr, &cfg, &router);

    let state = Arc::new(AppState::new(cfg, router));
    server::run_server(
        listener,
        state,
        server::shutdown_signal(),
        server::server_loop::DRAIN_WINDOW,
    )
    .await;

    Ok(())
}
