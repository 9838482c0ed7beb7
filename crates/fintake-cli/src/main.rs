mod commands;
mod output;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use commands::InputArgs;

#[derive(Parser)]
#[command(
    name = "fintake",
    version,
    about = "Normalize spreadsheet exports of financial statements into a multi-period model"
)]
struct Cli {
    /// Log more detail to stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a spreadsheet (xlsx, xls, ods or csv) into per-period statements
    Parse {
        #[command(flatten)]
        input: InputArgs,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the parse result to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Show ratios, health score and period-over-period variance
    Ratios {
        #[command(flatten)]
        input: InputArgs,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Inspect and validate line-item mappings
    Mapping {
        #[command(subcommand)]
        action: MappingAction,
    },
}

#[derive(Subcommand)]
enum MappingAction {
    /// List built-in mappings
    List,
    /// Print the rules of a built-in mapping in priority order
    Show {
        /// Preset name (e.g., "default")
        preset: String,
    },
    /// Validate a custom mapping file
    Validate {
        /// Path to JSON mapping file
        file: PathBuf,
    },
    /// Print the mapping file format with an example
    Schema,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    // Logs go to stderr so JSON on stdout stays clean
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Parse { input, output, out } => commands::parse::run(&input, &output, out),
        Commands::Ratios { input, output } => commands::ratios::run(&input, &output),
        Commands::Mapping { action } => match action {
            MappingAction::List => commands::mapping::list(),
            MappingAction::Show { preset } => commands::mapping::show(&preset),
            MappingAction::Validate { file } => commands::mapping::validate(&file),
            MappingAction::Schema => commands::mapping::schema(),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
