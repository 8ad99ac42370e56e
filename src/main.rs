//! acqview - Main Entry Point
//!
//! Starts the acquisition worker thread and runs the egui viewer.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use acqview::{
    config::{self, Preferences},
    frontend::{AcqViewApp, AppOptions},
    model::lifecycle::APP_TITLE,
    transport::{
        mock::{MockTransport, MockTransportConfig},
        TransportBridge,
    },
};

#[derive(Parser, Debug)]
#[command(name = "acqview", version, about = "Live data-acquisition viewer")]
struct Args {
    /// Project (.mbs), data (.csv) or register definition (.mbc) file to open
    file: Option<PathBuf>,

    /// Channels to create at start-up
    #[arg(long, default_value_t = 4)]
    mock_channels: usize,

    /// Poll interval of the simulated device in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Log to stderr and, when the data directory is available, a daily file
    let (file_layer, _log_guard) = match config::ensure_app_data_dir() {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "acqview.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!("File logging disabled: {}", e);
            (None, None)
        }
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,acqview=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    tracing::info!("Starting {}", APP_TITLE);

    let preferences = Preferences::load_or_default();

    // Acquisition worker
    let (bridge, cmd_rx, msg_tx) = TransportBridge::new();
    let running = Arc::new(AtomicBool::new(true));
    let transport = MockTransport::new(
        MockTransportConfig {
            poll_interval: std::time::Duration::from_millis(args.poll_ms.max(1)),
            ..Default::default()
        },
        cmd_rx,
        msg_tx,
        Arc::clone(&running),
    );
    let worker = transport
        .spawn()
        .context("Failed to spawn acquisition thread")?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_drag_and_drop(true)
            .with_title(APP_TITLE),
        ..Default::default()
    };

    let options = AppOptions {
        open_file: args.file,
        initial_channels: args.mock_channels,
    };

    let result = eframe::run_native(
        APP_TITLE,
        native_options,
        Box::new(move |cc| {
            if preferences.dark_mode {
                cc.egui_ctx.set_visuals(egui::Visuals::dark());
            } else {
                cc.egui_ctx.set_visuals(egui::Visuals::light());
            }
            Ok(Box::new(AcqViewApp::new(cc, bridge, preferences, options)))
        }),
    );

    tracing::info!("Shutting down...");
    running.store(false, Ordering::SeqCst);
    if worker.join().is_err() {
        tracing::warn!("Acquisition thread panicked");
    }

    result.map_err(|e| anyhow::anyhow!("{}", e))
}
