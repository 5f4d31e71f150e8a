//! Input selection shared by `report` and `columns`: settings, source
//! resolution (path, link, saved name, configured default) and loading.

use std::path::PathBuf;

use clap::Args;
use countboard_config::{Settings, SourceRegistry};
use countboard_io::{LoadOptions, Source};
use countboard_recon::Dataset;

use crate::CliError;

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Count export: a local .xlsx/.xls/.ods/.csv file or an http(s) share link
    pub source: Option<String>,

    /// Use a saved link by name (see `countboard sources list`)
    #[arg(long = "source", value_name = "NAME", conflicts_with = "source")]
    pub saved: Option<String>,

    /// Worksheet to read (default: first sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Settings file (default: <config dir>/countboard/settings.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

pub(crate) fn load_settings(args: &InputArgs) -> Result<Settings, CliError> {
    let settings = match &args.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    Ok(settings)
}

pub(crate) fn resolve_source(args: &InputArgs, settings: &Settings) -> Result<Source, CliError> {
    if let Some(s) = &args.source {
        return Ok(Source::parse(s));
    }

    let name = match (&args.saved, &settings.default_source) {
        (Some(name), _) => name,
        (None, Some(name)) => {
            log::debug!("using default source '{name}' from settings");
            name
        }
        (None, None) => {
            return Err(CliError::args("no input given")
                .with_hint("pass a file or link, or --source NAME for a saved link"));
        }
    };

    let registry = SourceRegistry::load(&SourceRegistry::config_path())?;
    match registry.get(name) {
        Some(link) => Ok(Source::parse(link)),
        None => {
            let known: Vec<&str> = registry.iter().map(|e| e.name.as_str()).collect();
            let hint = if known.is_empty() {
                "no saved sources; add one with `countboard sources add NAME LINK`".to_string()
            } else {
                format!("saved sources: {}", known.join(", "))
            };
            Err(CliError::args(format!("unknown saved source '{name}'")).with_hint(hint))
        }
    }
}

/// Settings, resolved source and parsed dataset for one invocation.
pub(crate) struct Loaded {
    pub settings: Settings,
    pub source: Source,
    pub dataset: Dataset,
}

pub(crate) fn load(args: &InputArgs) -> Result<Loaded, CliError> {
    let settings = load_settings(args)?;
    let source = resolve_source(args, &settings)?;

    let opts = LoadOptions {
        sheet: args.sheet.clone().or_else(|| settings.sheet.clone()),
        timeout_secs: settings.fetch.timeout_secs,
    };
    let dataset = countboard_io::load(&source, &opts)?;

    Ok(Loaded { settings, source, dataset })
}
