//! Applying tag deltas through the tagging capability

use eksaddon_core::{IgnoreTags, TagDelta, Tags, diff};
use tracing::debug;

use crate::client::TaggingClient;
use crate::error::{AwsError, Result};

/// Apply a delta to the resource at `arn`.
///
/// Stale keys are removed first, then created and updated keys are written in
/// a single call. Failures surface as [`AwsError::RemoteTagging`] and are not
/// retried.
pub async fn apply_tag_delta<C>(client: &C, arn: &str, delta: &TagDelta) -> Result<()>
where
    C: TaggingClient + ?Sized,
{
    if delta.is_empty() {
        return Ok(());
    }

    if !delta.to_remove.is_empty() {
        debug!(arn, keys = ?delta.to_remove, "removing tags");
        client
            .untag_resource(arn, &delta.to_remove)
            .await
            .map_err(|e| into_tagging_error(arn, e))?;
    }

    let upserts = delta.upserts();
    if !upserts.is_empty() {
        debug!(
            arn,
            created = delta.to_create.len(),
            updated = delta.to_update.len(),
            "setting tags"
        );
        client
            .tag_resource(arn, &upserts)
            .await
            .map_err(|e| into_tagging_error(arn, e))?;
    }

    Ok(())
}

/// Move a resource's tags from `old` to `new` and return the applied delta
pub async fn update_tags<C>(client: &C, arn: &str, old: &Tags, new: &Tags) -> Result<TagDelta>
where
    C: TaggingClient + ?Sized,
{
    let delta = diff(old, new, &IgnoreTags::default());
    apply_tag_delta(client, arn, &delta).await?;
    Ok(delta)
}

fn into_tagging_error(arn: &str, err: AwsError) -> AwsError {
    match err {
        AwsError::RemoteTagging { .. } => err,
        other => AwsError::RemoteTagging {
            arn: arn.to_string(),
            message: other.to_string(),
        },
    }
}
