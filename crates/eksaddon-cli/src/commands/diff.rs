//! Diff command - tag changes needed to converge remote tags on a spec

use console::style;
use std::path::Path;

use super::{load_provider, load_spec, load_tags};
use crate::display::{delta_summary, print_delta};
use crate::error::Result;

pub fn run(
    spec_path: &Path,
    remote_path: &Path,
    provider: Option<&Path>,
    json_output: bool,
) -> Result<()> {
    let policy = load_provider(provider)?.tag_policy();
    let spec = load_spec(spec_path)?;
    let id = spec.id()?;
    let remote = load_tags(remote_path)?;

    let desired = policy.effective_tags(&spec.tags)?;
    let delta = policy.diff(&remote, &desired);

    if json_output {
        let output = serde_json::json!({
            "id": id,
            "changed": !delta.is_empty(),
            "delta": delta,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if delta.is_empty() {
        println!(
            "{} Tags for {} are up to date",
            style("✓").green(),
            style(&id).bold()
        );
        return Ok(());
    }

    println!(
        "{} Tag changes for {}",
        style("→").blue(),
        style(&id).bold()
    );
    print_delta(&delta, &remote);
    println!();
    println!("{}", delta_summary(&delta));

    Ok(())
}
