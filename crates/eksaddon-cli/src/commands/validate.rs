//! Validate command - check an addon spec against the provider configuration

use console::style;
use eksaddon_core::validate_tags;
use std::path::Path;

use super::{load_provider, load_spec};
use crate::error::{CliError, Result};

pub fn run(spec_path: &Path, provider: Option<&Path>, json_output: bool) -> Result<()> {
    let policy = load_provider(provider)?.tag_policy();
    let spec = load_spec(spec_path)?;

    let mut errors = Vec::new();
    if let Err(e) = spec.validate() {
        errors.push(e.to_string());
    }
    match policy.effective_tags(&spec.tags) {
        // Defaults may push the combined set over the per-resource limit
        Ok(tags_all) => {
            if let Err(e) = validate_tags(&tags_all) {
                errors.push(e.to_string());
            }
        }
        Err(e) => errors.push(e.to_string()),
    }
    errors.dedup();

    let id = spec.id().ok();

    if json_output {
        let output = serde_json::json!({
            "valid": errors.is_empty(),
            "id": id,
            "errors": errors,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if errors.is_empty() {
        let name = id.map(|id| id.to_string()).unwrap_or_default();
        println!("{} {} is valid", style("✓").green(), style(name).bold());
    } else {
        println!(
            "{} {}",
            style("✗").red(),
            style(spec_path.display()).bold()
        );
        for error in &errors {
            println!("  {} {}", style("✗").red(), error);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(CliError::ValidationFailed {
            errors: errors.len(),
        })
    }
}
