//! `countboard sources`: saved download links in `<config dir>/countboard/sources.csv`.

use clap::Subcommand;
use countboard_config::SourceRegistry;
use countboard_io::fetch::download_url;

use crate::util::{display_width, pad_right};
use crate::CliError;

#[derive(Subcommand)]
pub enum SourcesCommands {
    /// List saved links
    List,

    /// Save a link under NAME (replaces an existing link with the same name)
    #[command(after_help = "\
Examples:
  countboard sources add bodega-norte 'https://tenant.sharepoint.com/:x:/g/doc?e=Xy12'
  countboard report --source bodega-norte")]
    Add {
        name: String,
        link: String,
    },

    /// Forget the link saved under NAME
    Remove {
        name: String,
    },
}

pub fn cmd_sources(cmd: SourcesCommands) -> Result<(), CliError> {
    let path = SourceRegistry::config_path();
    let mut registry = SourceRegistry::load(&path)?;

    match cmd {
        SourcesCommands::List => {
            if registry.is_empty() {
                eprintln!("no saved sources ({})", path.display());
                return Ok(());
            }
            print!("{}", render_list(&registry));
        }
        SourcesCommands::Add { name, link } => {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(CliError::args("source name must not be empty"));
            }
            // Reject links that could never be downloaded
            download_url(&link).map_err(|e| CliError::args(e.to_string()))?;

            let replaced = registry.add(name.clone(), link.trim());
            registry.save(&path)?;
            match replaced {
                Some(_) => eprintln!("updated '{name}'"),
                None => eprintln!("saved '{name}'"),
            }
        }
        SourcesCommands::Remove { name } => {
            if registry.remove(&name).is_none() {
                return Err(CliError::args(format!("unknown saved source '{name}'")));
            }
            registry.save(&path)?;
            eprintln!("removed '{name}'");
        }
    }
    Ok(())
}

fn render_list(registry: &SourceRegistry) -> String {
    let width = registry
        .iter()
        .map(|e| display_width(&e.name))
        .max()
        .unwrap_or(0)
        .min(30);
    registry
        .iter()
        .map(|e| format!("{}  {}\n", pad_right(&e.name, width), e.link))
        .collect()
}
