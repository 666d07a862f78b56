//! Bird Classification Server - Main Entry Point

use api::{init_logging, install_metrics, run_server, ServerConfig};
use clap::{CommandFactory, Parser, Subcommand};
use inference_engine::{OnnxModelLoader, Preprocess};
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "aviary", version, about = "Bird species classification server")]
struct Cli {
    /// Configuration file (defaults to $AVIARY_CONFIG or ./aviary.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch and load the model, then serve HTTP
    Serve,
    #[command(external_subcommand)]
    Other(Vec<String>),
}

/// What a command line asks for
#[derive(Debug)]
enum Invocation {
    Serve { config: Option<PathBuf> },
    /// Print the text and exit successfully, leaving the listener down
    Idle(String),
}

fn invocation<I, T>(args: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(Cli {
            config,
            command: Some(Command::Serve),
        }) => Invocation::Serve { config },
        Ok(Cli {
            command: Some(Command::Other(args)),
            ..
        }) => {
            let name = args.first().map(String::as_str).unwrap_or_default();
            Invocation::Idle(format!(
                "Ignoring unknown command `{}`\n\n{}",
                name,
                Cli::command().render_help()
            ))
        }
        Ok(Cli { command: None, .. }) => Invocation::Idle(Cli::command().render_help().to_string()),
        // Usage errors, --help and --version alike
        Err(e) => Invocation::Idle(e.render().to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = match invocation(std::env::args_os()) {
        Invocation::Serve { config } => config,
        Invocation::Idle(text) => {
            println!("{}", text.trim_end());
            return Ok(());
        }
    };

    let config = match &config_path {
        Some(path) => ServerConfig::load_from(path)?,
        None => ServerConfig::load()?,
    };
    init_logging(&config.logging);

    info!("=== Aviary v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Model artifact: {}", config.artifact.path().display());

    let metrics = match install_metrics() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Metrics exporter disabled: {}", e);
            None
        }
    };

    let loader = Arc::new(OnnxModelLoader::new(Preprocess::new(config.model.input_size)));
    if let Err(e) = run_server(config, loader, metrics).await {
        error!("Server failed: {}", e);
        return Err(e.into());
    }

    Ok(())
}
