//! `template` command

use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::*;

use crate::import::EntityKind;
use crate::import::excel::write_template;

/// Default template file name, e.g. `products-template.xlsx`
pub fn default_template_path(kind: EntityKind) -> PathBuf {
    PathBuf::from(format!("{}-template.xlsx", kind.plural()))
}

pub fn handle_template_command(kind: EntityKind, output: Option<&Path>) -> Result<()> {
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_template_path(kind));

    write_template(kind, &path)?;
    println!(
        "{} {} template written to {}",
        "✓".bright_green(),
        kind,
        path.display().to_string().bright_green()
    );
    println!("Columns: {}", kind.schema().labels().join(", ").dimmed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_path() {
        assert_eq!(
            default_template_path(EntityKind::Category),
            PathBuf::from("categories-template.xlsx")
        );
    }
}
