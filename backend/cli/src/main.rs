mod ping_cmd;
mod run_cmd;
mod runtime;
mod serve_cmd;
mod status_cmd;
mod terminal_output;
mod tools_cmd;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use copilot_config::{config_dir, config_file_path, load_and_prepare};
use run_cmd::InputSource;
use runtime::Runtime;
use terminal_output::note_error;

#[derive(Parser)]
#[command(name = "copilot")]
#[command(about = "Resolve Copilot: chat and tool automation for DaVinci Resolve")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $COPILOT_CONFIG_DIR/config.yaml or ~/.resolve-copilot/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// List the available Resolve tools
    Tools {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a Resolve tool directly, without the model
    Run {
        /// Tool id, e.g. run-python-script
        tool_id: String,
        /// Inline input for the tool
        #[arg(short, long, conflicts_with = "file")]
        input: Option<String>,
        /// Read the input from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Check that the Resolve bridge answers
    Ping,
    /// Show the status of a running gateway
    Status {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            note_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    let path = cli
        .config
        .unwrap_or_else(|| config_file_path(&config_dir()));
    let config = load_and_prepare(&path).await?;

    // Logs go to stderr; one-shot commands only report warnings.
    let level = match cli.command {
        Commands::Serve { .. } => config.log_level(),
        _ => "warn",
    };
    copilot_logging::init_logger(config.log_dir(), level, config.log_json());

    match cli.command {
        Commands::Serve { port } => {
            let runtime = Runtime::build(&config)?;
            serve_cmd::run(&config, runtime, port).await?;
            Ok(true)
        }
        Commands::Tools { json } => {
            let runtime = Runtime::build(&config)?;
            tools_cmd::run(&runtime.registry, json)?;
            Ok(true)
        }
        Commands::Run {
            tool_id,
            input,
            file,
        } => {
            let runtime = Runtime::build(&config)?;
            let source = match (input, file) {
                (Some(text), _) => InputSource::Inline(text),
                (None, Some(path)) => InputSource::File(path),
                (None, None) => InputSource::None,
            };
            run_cmd::run(&runtime.registry, &runtime.dispatcher, &tool_id, source).await
        }
        Commands::Ping => {
            let runtime = Runtime::build(&config)?;
            ping_cmd::run(&runtime.registry, &runtime.dispatcher).await
        }
        Commands::Status { port } => {
            let host = match config.gateway_bind() {
                "0.0.0.0" => "127.0.0.1",
                bind => bind,
            };
            status_cmd::run(host, port.unwrap_or(config.gateway_port())).await
        }
    }
}
