//! Validate command implementation.

use clap::Args;
use std::path::PathBuf;

use sclschema_validator::{Diagnostic, Severity, Validator};

use crate::loader;

/// Validate an SCL instance document against an NSD namespace schema
#[derive(Args)]
pub struct ValidateCommand {
    /// Namespace schema file (JSON or YAML)
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Instance document file (JSON or YAML)
    #[arg(short, long)]
    pub document: PathBuf,

    /// Treat warnings as failures
    #[arg(long)]
    pub warnings_as_errors: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl ValidateCommand {
    /// Execute the validate command
    pub fn execute(&self) -> anyhow::Result<()> {
        println!(
            "Validating {} against schema {}",
            self.document.display(),
            self.schema.display()
        );

        // Load the namespace schema and report authoring defects
        let (registry, build_diagnostics) = loader::load_schema(&self.schema)?;
        if !build_diagnostics.is_empty() {
            println!(
                "Schema loaded with {} issue(s):",
                build_diagnostics.len()
            );
            for diagnostic in &build_diagnostics {
                print_diagnostic(diagnostic);
            }
        }

        // Load the instance document
        let document = loader::load_document(&self.document)?;

        // Validate
        let validator = Validator::new(registry);
        let outcome = validator.validate_document(&document);

        // Report results
        if outcome.success {
            println!("Validation successful");
        } else {
            println!(
                "Validation failed with {} finding(s):",
                outcome.diagnostics.len()
            );
        }
        for diagnostic in &outcome.diagnostics {
            print_diagnostic(diagnostic);
        }

        // Display statistics
        if self.verbose {
            println!("\nValidation statistics:");
            println!(
                "  Containers validated: {}",
                outcome.stats.containers_validated
            );
            println!("  Slots checked: {}", outcome.stats.slots_checked);
            println!("  Values validated: {}", outcome.stats.values_validated);
            println!(
                "  Enum definitions validated: {}",
                outcome.stats.enum_defs_validated
            );
            println!("  Duration: {}ms", outcome.stats.duration_ms);
        }

        let warnings_failed = self.warnings_as_errors
            && outcome
                .diagnostics
                .iter()
                .chain(build_diagnostics.iter())
                .any(|d| d.severity == Severity::Warning);

        // Exit with error code if validation failed
        if !outcome.success || warnings_failed {
            std::process::exit(1);
        }

        Ok(())
    }
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    let location = diagnostic
        .location
        .map(|l| format!(" at {}", l))
        .unwrap_or_default();

    println!(
        "  [{}] {} ({}){}: {}",
        diagnostic.severity.to_string().to_uppercase(),
        diagnostic.element,
        diagnostic.code,
        location,
        diagnostic.message
    );
}
