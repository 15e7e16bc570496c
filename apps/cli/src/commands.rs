//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use classfetch_core::{ProgressReporter, read_report, write_report};
use classfetch_shared::{AppConfig, ScanReport, init_config, load_config};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// classfetch: find the attachments on a classroom page.
#[derive(Parser)]
#[command(
    name = "classfetch",
    version,
    about = "Discover classroom attachments and plan their downloads.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
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
    /// Scan a saved page for attachments.
    Scan {
        /// Saved HTML file or http(s) URL.
        source: String,

        /// Print the full report as JSON instead of a table.
        #[arg(long)]
        json: bool,

        /// Also write the JSON report to this file.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Turn a scan report into download requests.
    Plan {
        /// Report written by `scan --out`.
        report: PathBuf,

        /// Attachment indices to download (comma-separated). Defaults to all.
        #[arg(short, long, value_delimiter = ',')]
        select: Option<Vec<usize>>,

        /// Destination folder (overrides the configured one).
        #[arg(short, long)]
        folder: Option<String>,
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
        0 => "classfetch=info",
        1 => "classfetch=debug",
        _ => "classfetch=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so stdout stays clean for JSON output.
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
        Command::Scan { source, json, out } => cmd_scan(&source, json, out.as_deref()).await,
        Command::Plan {
            report,
            select,
            folder,
        } => cmd_plan(&report, select.as_deref(), folder.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_scan(source: &str, json: bool, out: Option<&Path>) -> Result<()> {
    let config = load_config()?;

    info!(source, "scanning page");

    let reporter = CliProgress::new();
    let report = classfetch_core::scan(source, &config, &reporter).await?;

    if let Some(path) = out {
        write_report(path, &report)?;
        info!(path = %path.display(), "report saved");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_table(&report));
    }

    Ok(())
}

fn cmd_plan(report_path: &Path, select: Option<&[usize]>, folder: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let report = read_report(report_path)?;

    info!(
        report = %report_path.display(),
        attachments = report.attachments.len(),
        "planning downloads"
    );

    let plan = classfetch_core::plan(&report, select, folder, &config)?;
    println!("{}", serde_json::to_string_pretty(&plan)?);

    Ok(())
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

/// Human-readable listing of a report's attachments, one per line.
fn render_table(report: &ScanReport) -> String {
    if report.attachments.is_empty() {
        return format!("\n  No attachments found in {}\n\n", report.source);
    }

    let type_width = report
        .attachments
        .iter()
        .map(|a| a.kind.as_str().len())
        .max()
        .unwrap_or(0);
    let index_width = (report.attachments.len() - 1).to_string().len();

    let mut out = format!(
        "\n  {} attachment(s) in {} (run {})\n\n",
        report.attachments.len(),
        report.source,
        report.run_id
    );
    for (index, attachment) in report.attachments.iter().enumerate() {
        out.push_str(&format!(
            "  {index:>index_width$}  {:<type_width$}  {}\n      {}\n",
            attachment.kind.as_str(),
            attachment.title,
            attachment.url,
        ));
    }
    out.push('\n');
    out
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _report: &ScanReport) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classfetch_shared::{Attachment, AttachmentType, RunId};

    #[test]
    fn plan_parses_comma_separated_selection() {
        let cli = Cli::try_parse_from([
            "classfetch",
            "plan",
            "report.json",
            "--select",
            "0,2,5",
            "--folder",
            "Biology",
        ])
        .unwrap();

        match cli.command {
            Command::Plan {
                select, folder, ..
            } => {
                assert_eq!(select, Some(vec![0, 2, 5]));
                assert_eq!(folder.as_deref(), Some("Biology"));
            }
            _ => panic!("expected plan"),
        }
    }

    #[test]
    fn global_flags_apply_after_subcommand() {
        let cli = Cli::try_parse_from(["classfetch", "scan", "page.html", "-vv", "--log-format", "json"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.log_format, LogFormat::Json));
    }

    #[test]
    fn bad_selection_is_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["classfetch", "plan", "r.json", "--select", "1,x"]).is_err());
    }

    #[test]
    fn table_lists_index_type_and_title() {
        let report = ScanReport {
            run_id: RunId::new(),
            source: "stream.html".into(),
            scanned_at: chrono::Utc::now(),
            attachments: vec![Attachment {
                url: "https://drive.google.com/file/d/XYZ789/view".into(),
                title: "photo.png".into(),
                kind: AttachmentType::Image,
            }],
        };

        let table = render_table(&report);

        assert!(table.contains("0  IMAGE  photo.png"));
        assert!(table.contains("https://drive.google.com/file/d/XYZ789/view"));
    }
}
