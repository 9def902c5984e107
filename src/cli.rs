use std::error::Error;
use std::io::{self, Read};
use std::process::ExitCode;
use std::time::Duration;

use atty::Stream;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::io::BufReader;
use tokio::signal;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use whichlang_rs::{
    ClientConfig, DEFAULT_BASE_URL, DEFAULT_ENDPOINT, DisplayState, ResponseFormat,
    TerminalDisplay, run_interactive, run_once,
};

#[derive(Parser, Debug)]
#[command(
    name = "whichlang-rs",
    about = "Send text to a classification server and show the label",
    version
)]
pub struct Cli {
    /// Emit JSON instead of human-readable output (classify only).
    #[arg(long, global = true)]
    json: bool,

    /// Base URL of the classification server.
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    server: String,

    /// Path of the classification endpoint.
    #[arg(long, global = true, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// How to read the response body: json, text or auto.
    #[arg(long, global = true, default_value_t = ResponseFormat::Json)]
    format: ResponseFormat,

    /// Give up on a request after this many seconds.
    #[arg(long, global = true, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: u64,

    /// Hide the output instead of printing "Loading..." while waiting.
    #[arg(long, global = true)]
    no_loading: bool,

    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify the given text, or all of stdin when no text is given.
    Classify {
        /// Words to classify; joined with single spaces.
        text: Vec<String>,
    },
    /// Classify every line typed on stdin; a new line supersedes the previous one.
    Interactive,
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.server.clone(),
            endpoint: self.endpoint.clone(),
            format: self.format,
            show_loading: !self.no_loading,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

pub fn run() -> Result<ExitCode, Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = cli.client_config();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    match cli.command {
        Command::Classify { text } => {
            let text = if text.is_empty() {
                read_stdin()?
            } else {
                text.join(" ")
            };
            runtime.block_on(handle_classify(config, text, cli.json))
        }
        Command::Interactive => runtime.block_on(handle_interactive(config)),
    }
}

async fn handle_classify(
    config: ClientConfig,
    text: String,
    as_json: bool,
) -> Result<ExitCode, Box<dyn Error>> {
    let format = config.format;
    let state = if as_json {
        let state = run_once(config, text.clone(), TerminalDisplay::new(io::sink())).await?;
        let report = ClassifyReport::new(&text, format, &state);
        println!("{}", serde_json::to_string_pretty(&report)?);
        state
    } else {
        run_once(config, text, TerminalDisplay::stdout()).await?
    };
    Ok(exit_code(&state))
}

fn exit_code(state: &DisplayState) -> ExitCode {
    match state {
        DisplayState::Failed(_) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}

async fn handle_interactive(config: ClientConfig) -> Result<ExitCode, Box<dyn Error>> {
    if atty::is(Stream::Stdin) {
        eprintln!(
            "Classifying each line via {}. Ctrl-D or Ctrl-C to quit.",
            config.url_for(&config.endpoint)
        );
    }
    let reader = BufReader::new(tokio::io::stdin());
    run_interactive(config, reader, TerminalDisplay::stdout(), shutdown_signal()).await?;
    Ok(ExitCode::SUCCESS)
}

#[derive(Debug, Serialize)]
struct ClassifyReport<'a> {
    input: &'a str,
    format: ResponseFormat,
    label: Option<&'a str>,
    error: Option<String>,
}

impl<'a> ClassifyReport<'a> {
    fn new(input: &'a str, format: ResponseFormat, state: &'a DisplayState) -> Self {
        Self {
            input,
            format,
            label: state.label(),
            error: state.error().map(|err| err.to_string()),
        }
    }
}

fn read_stdin() -> Result<String, Box<dyn Error>> {
    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;
    Ok(text)
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

async fn shutdown_signal() {
    // A handler that fails to install must not end the session on its own.
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Ctrl-C handler unavailable");
            std::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
