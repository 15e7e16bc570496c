//! Turning a user's selection into concrete download requests.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use classfetch_shared::{Attachment, ConflictAction, DownloadRequest, FileTypeSettings};

use crate::resolve_download;

/// Requests to hand to the transfer layer, plus what was filtered out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadPlan {
    /// One request per enabled attachment, in selection order.
    pub requests: Vec<DownloadRequest>,
    /// Attachments whose category is disabled.
    pub skipped: Vec<Attachment>,
}

/// Attachments whose category is enabled, in their original order.
pub fn filter_enabled(attachments: &[Attachment], settings: &FileTypeSettings) -> Vec<Attachment> {
    attachments
        .iter()
        .filter(|a| settings.allows(a.kind))
        .cloned()
        .collect()
}

/// Resolve every enabled attachment in `selection` into a download request.
#[instrument(skip_all, fields(selected = selection.len(), folder = folder_name))]
pub fn plan_downloads(
    selection: &[Attachment],
    settings: &FileTypeSettings,
    folder_name: &str,
) -> DownloadPlan {
    let mut plan = DownloadPlan::default();

    for attachment in selection {
        if !settings.allows(attachment.kind) {
            info!(kind = %attachment.kind, title = %attachment.title, "type disabled, skipping");
            plan.skipped.push(attachment.clone());
            continue;
        }

        let resolved = resolve_download(attachment, folder_name);
        plan.requests.push(DownloadRequest {
            fetch_url: resolved.fetch_url,
            destination_path: resolved.destination_path,
            conflict_action: ConflictAction::Uniquify,
        });
    }

    info!(
        requests = plan.requests.len(),
        skipped = plan.skipped.len(),
        "download plan ready"
    );
    plan
}
