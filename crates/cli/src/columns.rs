//! `countboard columns`: show how each header of an export resolves.

use countboard_recon::{resolve_roles, ResolvedRoles, Role};

use crate::input::{self, InputArgs};
use crate::util::{display_width, pad_right};
use crate::CliError;

pub fn cmd_columns(args: InputArgs) -> Result<(), CliError> {
    let loaded = input::load(&args)?;
    let names = loaded.dataset.column_names();
    let resolved = resolve_roles(&names);
    print!("{}", render_columns(&names, &resolved));
    Ok(())
}

fn render_columns(names: &[String], resolved: &ResolvedRoles) -> String {
    let name_width = names
        .iter()
        .map(|n| display_width(n))
        .chain(std::iter::once(display_width("Column")))
        .max()
        .unwrap_or(0)
        .min(40);
    let idx_width = names.len().to_string().len().max(1);

    let mut out = format!(
        "{}  {}  Role\n",
        pad_right("#", idx_width),
        pad_right("Column", name_width)
    );
    for (i, name) in names.iter().enumerate() {
        let roles: Vec<&str> = Role::ALL
            .iter()
            .filter(|r| resolved.get(**r) == Some(name.as_str()))
            .map(|r| r.label())
            .collect();
        let line = format!(
            "{}  {}  {}",
            pad_right(&(i + 1).to_string(), idx_width),
            pad_right(name, name_width),
            roles.join(", ")
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }

    let missing = resolved.missing_required();
    if !missing.is_empty() {
        let labels: Vec<&str> = missing.iter().map(|r| r.label()).collect();
        out.push_str(&format!("\nmissing: {}\n", labels.join(", ")));
    }
    out
}
