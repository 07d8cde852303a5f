//! Terminal rendering of tag sets and tag deltas

use console::style;
use eksaddon_core::{TagDelta, Tags};

/// Print a tag set as aligned `key = value` lines
pub fn print_tags(tags: &Tags) {
    if tags.is_empty() {
        println!("  {}", style("(no tags)").dim());
        return;
    }

    let width = tags.keys().map(String::len).max().unwrap_or(0);
    for (key, value) in tags {
        println!("  {:width$} = {}", style(key).cyan(), value, width = width);
    }
}

/// Print a tag delta against the remote tags it was computed from
pub fn print_delta(delta: &TagDelta, remote: &Tags) {
    for key in &delta.to_remove {
        let old = remote.get(key).map(String::as_str).unwrap_or_default();
        println!("  {} {} = {}", style("-").red(), style(key).red(), old);
    }
    for (key, value) in &delta.to_update {
        let old = remote.get(key).map(String::as_str).unwrap_or_default();
        println!(
            "  {} {} = {} {} {}",
            style("~").yellow(),
            style(key).yellow(),
            style(old).dim(),
            style("→").dim(),
            value
        );
    }
    for (key, value) in &delta.to_create {
        println!("  {} {} = {}", style("+").green(), style(key).green(), value);
    }
}

/// One-line summary, e.g. `1 to add, 0 to change, 2 to remove`
pub fn delta_summary(delta: &TagDelta) -> String {
    format!(
        "{} to add, {} to change, {} to remove",
        delta.to_create.len(),
        delta.to_update.len(),
        delta.to_remove.len()
    )
}
