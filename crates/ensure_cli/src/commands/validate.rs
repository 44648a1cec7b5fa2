use anyhow::{Context, Result};
use ensure_core::{EngineConfig, LabelStyle};
use ensure_parser::{parse_constraints_file, parse_params_file};
use ensure_validator::Engine;
use std::path::Path;
use tracing::info;

use crate::{Format, output};

/// Engine settings taken from the command line.
pub struct Options {
    pub start_case: bool,
    pub with_paths: bool,
    pub max_depth: usize,
}

impl Options {
    fn engine_config(&self) -> EngineConfig {
        let label_style = if self.start_case {
            LabelStyle::StartCase
        } else {
            LabelStyle::FieldName
        };

        EngineConfig::new()
            .with_max_depth(self.max_depth)
            .with_label_style(label_style)
            .with_paths_in_messages(self.with_paths)
    }
}

pub fn execute(constraints_path: &str, params_path: &str, format: Format, options: Options) -> Result<()> {
    info!("Validating {} against {}", params_path, constraints_path);

    let constraints = parse_constraints_file(Path::new(constraints_path))
        .with_context(|| format!("Failed to load constraint document: {}", constraints_path))?;
    let params = parse_params_file(Path::new(params_path))
        .with_context(|| format!("Failed to load parameter document: {}", params_path))?;

    if format == Format::Text {
        output::print_info(&format!(
            "Constraints loaded: {} field rule(s) from {}",
            constraints.len(),
            constraints_path
        ));
    }

    let engine = Engine::new().with_config(options.engine_config());
    let report = engine
        .report(&params, &constraints)
        .context("Constraint document is not usable")?;

    output::print_validation_report(&report, format, options.with_paths);

    if !report.passed {
        std::process::exit(1);
    }

    Ok(())
}
