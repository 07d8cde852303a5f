//! Id commands - encode and decode addon resource IDs

use eksaddon_core::AddonId;

use crate::error::Result;

pub fn encode(cluster_name: &str, addon_name: &str, json_output: bool) -> Result<()> {
    let id = AddonId::new(cluster_name, addon_name)?;
    print_id(&id, json_output)
}

pub fn decode(raw: &str, json_output: bool) -> Result<()> {
    let id = AddonId::parse(raw)?;

    if json_output {
        print_id(&id, true)
    } else {
        println!("cluster_name: {}", id.cluster_name());
        println!("addon_name:   {}", id.addon_name());
        Ok(())
    }
}

fn print_id(id: &AddonId, json_output: bool) -> Result<()> {
    if json_output {
        let output = serde_json::json!({
            "id": id,
            "clusterName": id.cluster_name(),
            "addonName": id.addon_name(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", id);
    }
    Ok(())
}
