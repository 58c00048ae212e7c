use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tempo_core::{OutputFormat, RenderMode, TempoConfig};
use tempo_report::render::renderer_for;
use tempo_report::report::analyze;
use tempo_series::table::{LoadOptions, SeriesTable};

const CONFIG_FILE: &str = ".tempo.toml";

#[derive(Parser)]
#[command(
    name = "tempo",
    version,
    about = "Regression diagnostics for hourly commit-frequency series",
    long_about = "Fits a linear trend to one hourly time block of a commit-frequency table and\n\
                   checks the regression assumptions: linearity, independence of errors\n\
                   (Durbin-Watson), homoscedasticity, and normality of residuals.\n\n\
                   Examples:\n  \
                     tempo commits.csv 9                  Diagnose the 10th hourly block\n  \
                     tempo commits.csv 9 --render text    Print plot data instead of charts\n  \
                     tempo commits.csv 9 --format json    Machine-readable report\n  \
                     tempo init                           Write a default .tempo.toml",
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// CSV table of commit counts (hours as rows, periods as columns)
    #[arg(required = true)]
    file: Option<PathBuf>,

    /// Zero-based row index of the hourly block to analyze
    #[arg(required = true)]
    time_block: Option<usize>,

    /// Path to configuration file (default: .tempo.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        default_value = "text",
        long_help = "Output format for the report.\n\n\
                       Formats:\n  \
                         text      The Durbin-Watson statistic line (default)\n  \
                         json      Full report as JSON with camelCase keys\n  \
                         markdown  Coefficient table and statistic"
    )]
    format: OutputFormat,

    /// How to present diagnostic plots [auto, terminal, text, none]
    #[arg(long)]
    render: Option<RenderMode>,

    /// Number of residual histogram bins
    #[arg(long)]
    bins: Option<usize>,

    /// Enable debug logging on stderr
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Create a default .tempo.toml configuration file
    #[command(long_about = "Create a default .tempo.toml configuration file.\n\n\
        Generates a commented template with all available options.\n\
        Fails if .tempo.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

const DEFAULT_CONFIG: &str = r#"# Tempo Configuration

[input]
# Field delimiter, a single ASCII character
# delimiter = ","
# Trim whitespace around cells
# trim = true

[diagnostics]
# Equal-width bins in the residual histogram
# histogram_bins = 20

[render]
# auto | terminal | text | none
# auto draws charts when stdout is a terminal and skips them otherwise
# mode = "auto"
"#;

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Command::Init) => {
            let path = Path::new(CONFIG_FILE);
            if path.exists() {
                miette::bail!("{CONFIG_FILE} already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created {CONFIG_FILE} with default configuration");
            Ok(())
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "tempo", &mut std::io::stdout());
            Ok(())
        }
        None => {
            let config = load_config(cli.config.as_deref())?;
            let (Some(file), Some(time_block)) = (cli.file, cli.time_block) else {
                miette::bail!("FILE and TIME_BLOCK are required");
            };
            run(&file, time_block, cli.format, cli.render, cli.bins, &config)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(explicit: Option<&Path>) -> Result<TempoConfig> {
    match explicit {
        Some(path) => Ok(TempoConfig::from_file(path)?),
        None => {
            let default_path = Path::new(CONFIG_FILE);
            if default_path.exists() {
                Ok(TempoConfig::from_file(default_path)?)
            } else {
                Ok(TempoConfig::default())
            }
        }
    }
}

fn run(
    file: &Path,
    time_block: usize,
    format: OutputFormat,
    render: Option<RenderMode>,
    bins: Option<usize>,
    config: &TempoConfig,
) -> Result<()> {
    let mode = render.unwrap_or(config.render.mode);
    let bins = bins.unwrap_or(config.diagnostics.histogram_bins);
    if bins == 0 {
        miette::bail!("--bins must be at least 1");
    }
    debug!(%format, %mode, bins, "resolved options");

    let table = SeriesTable::from_path(file, LoadOptions::from(&config.input))?;
    let report = analyze(&file.display().to_string(), &table, time_block, bins)?;
    let mut renderer = renderer_for(mode)?;

    renderer.render(&report.linearity_figure())?;

    match format {
        OutputFormat::Text => println!("{report}"),
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Markdown => print!("{}", report.to_markdown()),
    }

    for figure in report.residual_figures() {
        renderer.render(&figure)?;
    }

    Ok(())
}
