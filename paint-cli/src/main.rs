//! # Paint CLI
//!
//! Converts between hex payloads and clipboard strokes, and inspects, edits
//! and dry-run submits the persisted paint session.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use paint_cli::{commands, read_input, DryRunSubmitter};
use paint_core::SubmitOutcome;

#[derive(Debug, Parser)]
#[command(name = "paint", version, about = "Sparse pixel-canvas tooling")]
struct Cli {
    /// JSON configuration file.
    #[arg(long, env = "PAINT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Directory holding the persisted session.
    #[arg(long, env = "PAINT_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// JSON theme file (`{"name", "palette", "size"}`).
    #[arg(long, global = true)]
    theme: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Clipboard stroke JSON to hex payload.
    Encode {
        /// Input file, or `-` for stdin.
        #[arg(default_value = "-")]
        input: PathBuf,
        /// Prefix the output with `0x`.
        #[arg(long)]
        prefix: bool,
    },
    /// Hex payload to clipboard stroke JSON.
    Decode {
        /// Hex payload, optionally `0x`-prefixed.
        hex: String,
        /// Fail on malformed payloads instead of skipping bad pixels.
        #[arg(long)]
        strict: bool,
    },
    /// Print per-frame animation strokes of the saved session.
    Animation,
    /// Print the hex payloads a submission would send, one per line.
    Payloads {
        /// Override the session's animation flag.
        #[arg(long)]
        animation: Option<bool>,
    },
    /// Summarize the saved session as JSON.
    Inspect {
        /// Brush strength, to report what is left.
        #[arg(long)]
        strength: Option<u64>,
        /// Strength already used today.
        #[arg(long, default_value_t = 0)]
        used: u64,
    },
    /// Apply a JSON array of edit actions to the saved session.
    Apply {
        /// Input file, or `-` for stdin.
        #[arg(default_value = "-")]
        input: PathBuf,
    },
    /// Delete the saved session.
    Reset,
    /// Walk through a submission without sending anything.
    Submit {
        /// Day number.
        #[arg(long)]
        day: u64,
        /// Brush token id.
        #[arg(long)]
        brush: u64,
    },
}

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,paint_cli=debug,paint_core=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,paint_cli=debug,paint_core=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref(), cli.data_dir.as_deref())?;

    match cli.command {
        Command::Encode { input, prefix } => {
            let text = read_input(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            println!("{}", commands::encode(&text, prefix)?);
        }
        Command::Decode { hex, strict } => {
            println!("{}", commands::decode(&hex, strict)?);
        }
        Command::Animation => {
            let theme = commands::load_theme(cli.theme.as_deref(), &config)?;
            let session = commands::open_session(&config, theme)?;
            println!("{}", commands::animation(&session)?);
        }
        Command::Payloads { animation } => {
            let theme = commands::load_theme(cli.theme.as_deref(), &config)?;
            let session = commands::open_session(&config, theme)?;
            for payload in commands::payloads(&session, animation)? {
                println!("{payload}");
            }
        }
        Command::Inspect { strength, used } => {
            let theme = commands::load_theme(cli.theme.as_deref(), &config)?;
            let session = commands::open_session(&config, theme)?;
            let summary = commands::inspect(&session, strength.map(|s| (s, used)));
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Apply { input } => {
            let text = read_input(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let theme = commands::load_theme(cli.theme.as_deref(), &config)?;
            let mut session = commands::open_session(&config, theme)?;
            let changed = commands::apply_actions(&mut session, &text)?;
            println!("{changed}");
        }
        Command::Reset => {
            if !commands::reset(&config)? {
                tracing::info!("No saved session to clear");
            }
        }
        Command::Submit { day, brush } => {
            let theme = commands::load_theme(cli.theme.as_deref(), &config)?;
            let mut session = commands::open_session(&config, theme)?;
            let submitter = DryRunSubmitter::new();
            match commands::submit(&mut session, &submitter, day, brush).await? {
                SubmitOutcome::Submitted { payloads } => {
                    tracing::info!("Dry run would send {payloads} payloads");
                }
                SubmitOutcome::Empty => tracing::info!("Canvas is empty, nothing to send"),
                SubmitOutcome::Cancelled { payloads } => {
                    tracing::info!("Cancelled after {payloads} payloads");
                }
            }
            for payload in submitter.payloads() {
                println!("0x{}", payload.hex);
            }
        }
    }

    Ok(())
}
