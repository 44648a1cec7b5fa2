use crate::Format;
use colored::*;
use ensure_core::ValidationReport;
use ensure_validator::DefinitionSummary;
use serde_json::json;

pub fn print_validation_report(report: &ValidationReport, format: Format, with_paths: bool) {
    match format {
        Format::Json => print_json_report(report, with_paths),
        Format::Text => print_text_report(report, with_paths),
    }
}

fn print_text_report(report: &ValidationReport, with_paths: bool) {
    println!("\n{}", "═".repeat(60));
    println!("{}", "  VALIDATION REPORT".bold());
    println!("{}", "═".repeat(60));

    if report.passed {
        println!(
            "\n{} {}",
            "✓".green().bold(),
            "Validation PASSED".green().bold()
        );
    } else {
        println!(
            "\n{} {}",
            "✗".red().bold(),
            "Validation FAILED".red().bold()
        );
    }

    if !report.errors.is_empty() {
        println!("\n{}", "Errors:".red().bold());
        for (i, error) in report.errors.flatten(with_paths).iter().enumerate() {
            println!("  {}. {}", i + 1, error.red());
        }
    }

    println!("\n{}", "Summary:".bold());
    println!("  Failing paths:         {}", report.errors.len());
    println!("  Total errors:          {}", report.error_count());
    println!("  Fields checked:        {}", report.stats.fields_checked);
    println!("  Constraints evaluated: {}", report.stats.constraints_evaluated);
    println!("{}", "═".repeat(60));
}

fn print_json_report(report: &ValidationReport, with_paths: bool) {
    let output = json!({
        "passed": report.passed,
        "errors": report.errors,
        "messages": report.errors.flatten(with_paths),
        "summary": {
            "failing_paths": report.errors.len(),
            "error_count": report.error_count(),
            "fields_checked": report.stats.fields_checked,
            "constraints_evaluated": report.stats.constraints_evaluated,
            "duration_ms": report.stats.duration_ms,
        }
    });

    println!("{:#}", output);
}

pub fn print_definition_summary(path: &str, summary: &DefinitionSummary, format: Format) {
    match format {
        Format::Json => {
            let output = json!({
                "valid": true,
                "path": path,
                "fields": summary.fields,
                "constraints": summary.constraints,
                "max_depth": summary.max_depth,
                "kinds": summary.kinds,
            });
            println!("{:#}", output);
        }
        Format::Text => {
            print_success("Constraint document is valid");

            println!("\nConstraint Summary:");
            println!("  Document:    {}", path);
            println!("  Fields:      {}", summary.fields);
            println!("  Constraints: {}", summary.constraints);
            println!("  Max depth:   {}", summary.max_depth);
            println!(
                "  Kinds:       {}",
                summary.kinds.iter().cloned().collect::<Vec<_>>().join(", ")
            );
        }
    }
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}
