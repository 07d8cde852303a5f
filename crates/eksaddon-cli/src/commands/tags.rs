//! Tags command - show the effective tags for an addon spec

use console::style;
use std::collections::BTreeSet;
use std::path::Path;

use super::{load_provider, load_spec};
use crate::display::print_tags;
use crate::error::Result;

pub fn run(spec_path: &Path, provider: Option<&Path>, json_output: bool) -> Result<()> {
    let policy = load_provider(provider)?.tag_policy();
    let spec = load_spec(spec_path)?;
    let id = spec.id()?;
    let tags_all = policy.effective_tags(&spec.tags)?;

    if json_output {
        let output = serde_json::json!({
            "id": id,
            "tags": spec.tags,
            "tagsAll": tags_all,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} Effective tags for {}",
        style("→").blue(),
        style(&id).bold()
    );
    print_tags(&tags_all);

    let ignored: BTreeSet<&String> = spec
        .tags
        .keys()
        .chain(policy.default_tags.keys())
        .filter(|k| policy.ignore.is_ignored(k))
        .collect();
    if !ignored.is_empty() {
        println!();
        println!(
            "  {} {} key(s) ignored by provider configuration",
            style("⚠").yellow(),
            ignored.len()
        );
    }

    Ok(())
}
