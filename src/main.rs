use clap::Parser;
use smirc_dispatch::config::Config;
use smirc_dispatch::models::{DispatchReport, Invocation, ResultCode};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit status for failures outside the dispatch itself (bad settings,
/// unreadable stdin). Sits above the fixed result codes.
const SETUP_FAILURE: u8 = 64;

#[derive(Parser)]
#[command(
    name = "smirc-dispatch",
    about = "Post a message to IRC through the smirc tool",
    version
)]
struct Cli {
    /// Send to the host's private channel
    #[arg(long)]
    private: bool,
    /// Send to the shared public channel
    #[arg(long)]
    public: bool,
    /// Pass --bot through to smirc
    #[arg(long)]
    bot: bool,
    /// smirc config file, passed through as --config
    #[arg(long, value_name = "PATH")]
    config: Option<String>,
    /// Recipient, passed through as --to
    #[arg(long, value_name = "RECIPIENT")]
    to: Option<String>,
    /// Dispatcher settings file (defaults to ~/.config/smirc-dispatch/config.toml)
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,
    /// Override the wait budget in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
    /// Print the outcome as JSON on stdout
    #[arg(long)]
    json: bool,
    /// Message body; read from stdin when omitted
    message: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.settings {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    if let Some(secs) = cli.timeout {
        config.timeout = Duration::from_secs(secs);
        config.validate()?;
    }
    Ok(config)
}

/// Returns the positional message, or all of stdin with trailing line
/// endings stripped so `echo msg | smirc-dispatch` sends `msg`.
fn read_message(arg: Option<String>) -> anyhow::Result<String> {
    if let Some(message) = arg {
        return Ok(message);
    }
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    Ok(trim_trailing_newline(input))
}

fn trim_trailing_newline(mut s: String) -> String {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
    s
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(SETUP_FAILURE);
        }
    };

    let message = match read_message(cli.message) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Failed to read message from stdin: {e}");
            return ExitCode::from(SETUP_FAILURE);
        }
    };

    let invocation = Invocation {
        config: cli.config,
        private: cli.private,
        public: cli.public,
        bot: cli.bot,
        to: cli.to,
        message,
    };

    let result = match config.dispatcher().run(&invocation) {
        Ok(()) => ResultCode::Success,
        Err(e) => {
            if !cli.json {
                eprintln!("Error: {e}");
            }
            e.code()
        }
    };

    if cli.json {
        match serde_json::to_string(&DispatchReport::from(result)) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::warn!("Failed to serialize report: {e}"),
        }
    }

    // Codes are 0..=4.
    ExitCode::from(u8::try_from(result.code()).unwrap_or(SETUP_FAILURE))
}
