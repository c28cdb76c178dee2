mod app;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;
use clap::Parser;
use contract_flow::config::EditorConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON file used as session storage for the wallet snapshot.
    #[arg(long)]
    session_file: Option<PathBuf>,

    /// Quiet period in milliseconds before edits are written to the session file.
    #[arg(long, default_value_t = EditorConfig::DEFAULT_AUTOSAVE_MS)]
    autosave_ms: u64,

    /// Start from the default wallet instead of the stored snapshot.
    #[arg(long)]
    fresh: bool,
}

impl Args {
    fn into_config(self) -> EditorConfig {
        let defaults = EditorConfig::default();
        EditorConfig {
            session_file: self.session_file.unwrap_or_else(EditorConfig::default_session_file),
            autosave_debounce: Duration::from_millis(self.autosave_ms),
            fresh_start: self.fresh,
            ..defaults
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "contract_flow=info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Args::parse().into_config();
    tracing::info!(session_file = %config.session_file.display(), "starting contract builder");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "contract-flow",
        options,
        Box::new(move |cc| Ok(Box::new(app::ContractBuilderApp::new(cc, config)))),
    )
    .map_err(|error| anyhow!("editor window failed: {error}"))
}
