//! Magpie Shell - scale activation for a screen magnifier
//!
//! This is the main entry point for the magpie-shell application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use magpie_shell::{
    api::create_router,
    config::Config,
    controller::ControllerDeps,
    platform,
    services::LoopbackRuntime,
    shell::Shell,
    state::AppState,
    tasks::event_log_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("magpie_shell={},tower_http=info", config.log_level()))
        .init();

    info!("Starting magpie-shell v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, down_count={}s, auto_restore={}",
          config.host, config.port, config.down_count, config.auto_restore);

    let settings = Arc::new(config.app_settings());
    let (desktop, hooks) = platform::native();

    // No magnification engine is linked in; the loopback runtime stands in for it
    let runtime = Arc::new(LoopbackRuntime::new());

    let shell = Shell::launch(ControllerDeps {
        runtime,
        desktop,
        hooks,
        settings: Arc::clone(&settings),
        host_window: config.host_window,
    });

    tokio::spawn(event_log_task(shell.subscribe()));

    let state = Arc::new(AppState::new(
        shell.dispatcher(),
        shell.snapshots(),
        settings,
        config.port,
        config.host.clone(),
    ));
    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Control API running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /hotkey/scale       - Toggle magnification");
    info!("  POST /hotkey/overlay     - Toggle the overlay");
    info!("  POST /countdown/start    - Magnify the foreground window after the countdown");
    info!("  POST /countdown/stop     - Cancel the countdown");
    info!("  POST /auto-restore/on    - Enable auto-restore");
    info!("  POST /auto-restore/off   - Disable auto-restore");
    info!("  POST /restore-target/clear - Dismiss the pending restore");
    info!("  GET  /status             - Controller status");
    info!("  GET  /health             - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    shell.shutdown().await;
    info!("Shutdown complete");
    Ok(())
}
