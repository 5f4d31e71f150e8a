// countboard - inventory count reconciliation reports from the command line

mod columns;
mod exit_codes;
mod input;
mod report;
mod sources;
mod util;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use countboard_config::ConfigError;
use countboard_io::{ExportError, LoadError};
use countboard_recon::ReconError;
use tracing_subscriber::EnvFilter;

use exit_codes::{
    EXIT_CONFIG, EXIT_ERROR, EXIT_LOAD, EXIT_OUTPUT, EXIT_SUCCESS, EXIT_UNRESOLVED, EXIT_USAGE,
};

/// Log filter variable, e.g. `COUNTBOARD_LOG=countboard_io=debug`.
const LOG_ENV: &str = "COUNTBOARD_LOG";

#[derive(Parser)]
#[command(name = "countboard")]
#[command(about = "Reconcile counted stock against system stock from a count export")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Debug logging on stderr (overrides COUNTBOARD_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the reconciliation report for a count export
    #[command(after_help = "\
Examples:
  countboard report conteo.xlsx
  countboard report conteo.csv --top 5 --json
  countboard report --source bodega-norte --detail --filter Contador=ana,luis
  countboard report 'https://tenant.sharepoint.com/:x:/g/doc?e=Xy12' --export reporte.xlsx")]
    Report(report::ReportArgs),

    /// List the columns of a count export and the role each one resolves to
    #[command(after_help = "\
Examples:
  countboard columns conteo.xlsx
  countboard columns conteo.xlsx --sheet Hoja2")]
    Columns(input::InputArgs),

    /// Manage saved download links
    #[command(subcommand)]
    Sources(sources::SourcesCommands),
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("COUNTBOARD_COMMIT"), ")",
            "\nbuild:   debug",
            "\ntarget:  ", env!("COUNTBOARD_TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("COUNTBOARD_COMMIT"), ")",
            "\nbuild:   release",
            "\ntarget:  ", env!("COUNTBOARD_TARGET"),
        )
    }
}

/// Install the stderr subscriber. `log` records from the library crates are
/// bridged into it.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A second init (tests, embedding) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Report(args) => report::cmd_report(args),
        Commands::Columns(args) => columns::cmd_columns(args),
        Commands::Sources(cmd) => sources::cmd_sources(cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self::new(EXIT_OUTPUT, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<LoadError> for CliError {
    fn from(err: LoadError) -> Self {
        let hint = match &err {
            LoadError::HttpStatus { status: 401 | 403, .. } => {
                Some("the link may require sign-in; share it as 'anyone with the link'".to_string())
            }
            LoadError::SheetNotFound { .. } => Some("pass --sheet with one of the sheets above".to_string()),
            _ => None,
        };
        Self { code: EXIT_LOAD, message: err.to_string(), hint }
    }
}

impl From<ExportError> for CliError {
    fn from(err: ExportError) -> Self {
        Self::output(err.to_string())
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        match err {
            ReconError::UnresolvedRoles { .. } => Self::new(EXIT_UNRESOLVED, err.to_string())
                .with_hint("run `countboard columns` on the same input to see how headers resolve"),
            ReconError::MissingColumn { .. } => Self::new(EXIT_UNRESOLVED, err.to_string()),
            ReconError::InvalidOptions(_) => Self::args(err.to_string()),
            ReconError::RaggedColumns { .. } | ReconError::RowOutOfRange { .. } => {
                Self::new(EXIT_ERROR, err.to_string())
            }
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Write { .. } => Self::output(err.to_string()),
            _ => Self::new(EXIT_CONFIG, err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use countboard_recon::Role;
    use std::path::PathBuf;

    #[test]
    fn unresolved_roles_map_to_their_own_code() {
        let err: CliError = ReconError::UnresolvedRoles {
            missing: vec![Role::CountTarget],
            available: vec!["Cantidad".into()],
        }
        .into();
        assert_eq!(err.code, EXIT_UNRESOLVED);
        assert!(err.message.contains("count target"), "{}", err.message);
        assert!(err.hint.is_some());
    }

    #[test]
    fn load_and_export_errors_are_distinct() {
        let load: CliError = LoadError::Empty.into();
        assert_eq!(load.code, EXIT_LOAD);

        let export: CliError = ExportError {
            path: PathBuf::from("r.xlsx"),
            message: "disk full".into(),
        }
        .into();
        assert_eq!(export.code, EXIT_OUTPUT);
    }

    #[test]
    fn forbidden_download_gets_a_hint() {
        let err: CliError = LoadError::HttpStatus {
            status: 403,
            url: "https://example.com/x?download=1".into(),
        }
        .into();
        assert_eq!(err.code, EXIT_LOAD);
        assert!(err.hint.is_some());
    }

    #[test]
    fn config_errors() {
        let err: CliError = ConfigError::Invalid("top_n".into()).into();
        assert_eq!(err.code, EXIT_CONFIG);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
