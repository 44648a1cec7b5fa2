use anyhow::{Context, Result};
use ensure_parser::parse_constraints_file;
use ensure_validator::Engine;
use std::path::Path;
use tracing::info;

use crate::{Format, output};

pub fn execute(constraints_path: &str, format: Format) -> Result<()> {
    info!("Checking constraint document: {}", constraints_path);

    let constraints = parse_constraints_file(Path::new(constraints_path))
        .with_context(|| format!("Failed to load constraint document: {}", constraints_path))?;

    let summary = Engine::new()
        .check_definition(&constraints)
        .context("Constraint document is not usable")?;

    output::print_definition_summary(constraints_path, &summary, format);
    Ok(())
}
