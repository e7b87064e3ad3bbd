//! CLI command definitions, routing, and tracing setup.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use insolvencycheck_core::{ProgressReporter, ReportOutcome, ReportRunConfig, generate_report};
use insolvencycheck_report::PdfWriter;
use insolvencycheck_shared::{AppConfig, EvidenceGap, api_key, init_config, load_config};
use tracing::info;

const NOT_FOUND_MESSAGE: &str = "Company not found. Please check the name and try again.";

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// InsolvencyCheck: insolvency evidence reports for UK companies.
#[derive(Parser)]
#[command(
    name = "insolvency-check",
    version,
    about = "Build an insolvency evidence report for a UK company.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate a report for one company.
    Report {
        /// Company name to look up. Prompted for when omitted.
        name: Option<String>,

        /// Output directory (overrides `[report].output_dir`).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print a JSON run summary instead of the plain message.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "insolvencycheck=info,insolvency_check=info",
        1 => "insolvencycheck=debug,insolvency_check=debug",
        _ => "insolvencycheck=trace,insolvency_check=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Report { name, out, json } => cmd_report(name, out, json).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_report(name: Option<String>, out: Option<PathBuf>, json: bool) -> Result<()> {
    // Credential first: no prompt, no requests without it
    let config = load_config()?;
    let key = api_key(&config)?;

    let company_name = match name {
        Some(name) => name,
        None => prompt_company_name()?,
    };

    let run_config = ReportRunConfig::from_app_config(&config, key, out)?;
    info!(
        company_name = %company_name.trim(),
        output_dir = %run_config.output_dir.display(),
        "generating report"
    );

    let reporter = CliProgress::new(!json);
    let result = generate_report(&run_config, &company_name, &PdfWriter, &reporter).await;
    reporter.clear();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) if e.is_not_found() => {
            println!("{NOT_FOUND_MESSAGE}");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    for gap in &outcome.gaps {
        println!("  Note: {gap} (treated as no records)");
    }
    println!("Report generated: {}", outcome.report.path.display());

    Ok(())
}

/// Ask for a company name on stdin, as `Enter Company Name: `.
fn prompt_company_name() -> Result<String> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "Enter Company Name: ")?;
    stdout.flush()?;

    let mut line = String::new();
    let read = std::io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Err(eyre!("no company name given"));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new(visible: bool) -> Self {
        if !visible {
            return Self {
                spinner: ProgressBar::hidden(),
            };
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn clear(&self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn gap(&self, gap: &EvidenceGap) {
        self.spinner.set_message(format!("{} unavailable", gap.source));
    }

    fn done(&self, _outcome: &ReportOutcome) {
        self.spinner.finish_and_clear();
    }
}
