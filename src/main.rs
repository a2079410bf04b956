use anyhow::Result;
use clap::{Parser, Subcommand};
use query_perf::{replay, Config, SortKey};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "query-perf")]
#[command(about = "Advisory diagnostics for DOM-query usage")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded call trace and report on it
    Replay {
        /// Path to the JSON trace file
        trace: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "console")]
        format: OutputFormat,

        /// Sort the ranked tables by this column
        #[arg(long)]
        sort: Option<SortColumn>,
    },
    /// Initialize query-perf.toml config
    Init,
    /// List available analyzers
    Rules,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Console,
    Json,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum SortColumn {
    Name,
    Calls,
    Total,
    Average,
}

impl From<SortColumn> for SortKey {
    fn from(column: SortColumn) -> SortKey {
        match column {
            SortColumn::Name => SortKey::Name,
            SortColumn::Calls => SortKey::Calls,
            SortColumn::Total => SortKey::TotalMillis,
            SortColumn::Average => SortKey::AverageMillis,
        }
    }
}

fn main() -> ExitCode {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            trace,
            format,
            sort,
        } => run_replay(&trace, format, sort),
        Commands::Init => run_init(Path::new(".")),
        Commands::Rules => run_list_rules(),
    }
}

fn run_replay(trace_path: &Path, format: OutputFormat, sort: Option<SortColumn>) -> Result<()> {
    let config = Config::load_or_default(trace_path)?;
    let entries = replay::load_trace(trace_path)?;

    // Replay drives a fresh context; a sort request re-ranks both tables the
    // way a renderer column click would.
    let report = match sort {
        None => replay::replay(&entries, &config)?,
        Some(column) => replay::replay_sorted(&entries, &config, column.into())?,
    };

    match format {
        OutputFormat::Console => {
            query_perf::reporter::console::report(&report);
        }
        OutputFormat::Json => {
            query_perf::reporter::json::report(&report)?;
        }
    }

    Ok(())
}

fn run_init(path: &Path) -> Result<()> {
    let config_path = path.join("query-perf.toml");
    if config_path.exists() {
        anyhow::bail!("query-perf.toml already exists");
    }
    std::fs::write(&config_path, Config::default_toml())?;
    println!("Created {}", config_path.display());
    Ok(())
}

fn run_list_rules() -> Result<()> {
    use query_perf::AnalyzerRegistry;

    let registry = AnalyzerRegistry::with_defaults(&Config::default());

    println!("Available analyzers:\n");
    for (id, description) in registry.describe() {
        println!("  {:<20} {}", id, description);
    }
    println!("\nDisable any of them under [analyzers] in query-perf.toml.");
    Ok(())
}
