mod commands;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use oxrecur_core::config::OxRecurConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oxrecur")]
#[command(about = "Transcode recurrence patterns, RRULEs and free-busy data")]
struct Cli {
    /// Log codec activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a pattern string and print it as JSON
    Decode { pattern: String },
    /// Convert a pattern string to an RRULE
    ToRrule {
        pattern: String,

        /// Zone the series end refers to (defaults to the configured zone)
        #[arg(long)]
        tz: Option<String>,
    },
    /// Convert an RRULE to a pattern string
    FromRrule {
        rrule: String,

        /// Series start (RFC 3339, or YYYY-MM-DD[THH:MM[:SS]] in --tz)
        #[arg(short, long)]
        start: String,

        /// Zone of the series (defaults to the configured zone)
        #[arg(long)]
        tz: Option<String>,

        /// Print the decoded pattern as JSON instead of a pattern string
        #[arg(long)]
        json: bool,
    },
    /// Convert free-busy data to and from VFREEBUSY
    Freebusy {
        #[command(subcommand)]
        action: FreebusyAction,
    },
}

#[derive(Subcommand)]
enum FreebusyAction {
    /// Read free-busy JSON (file or "-" for stdin) and print VFREEBUSY
    Generate {
        input: String,

        /// Coalesce overlapping slots of the same type first
        #[arg(long)]
        merge: bool,
    },
    /// Read VFREEBUSY (file or "-" for stdin) and print free-busy JSON
    Parse { input: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Decode { pattern } => commands::decode::run(&pattern),
        Commands::ToRrule { pattern, tz } => {
            let tz = utils::resolve_timezone(tz.as_deref(), load_config)?;
            commands::to_rrule::run(&pattern, tz)
        }
        Commands::FromRrule {
            rrule,
            start,
            tz,
            json,
        } => {
            let tz = utils::resolve_timezone(tz.as_deref(), load_config)?;
            commands::from_rrule::run(&rrule, &start, tz, json)
        }
        Commands::Freebusy { action } => match action {
            FreebusyAction::Generate { input, merge } => {
                commands::freebusy::generate(&input, merge)
            }
            FreebusyAction::Parse { input } => commands::freebusy::parse(&input),
        },
    }
}

fn load_config() -> Result<OxRecurConfig> {
    Ok(OxRecurConfig::load()?)
}

/// RUST_LOG wins; otherwise warnings only, or debug with --verbose.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
