//! End-to-end workflows: source → snapshot → attachments → report, and
//! report → selection → download plan.

use std::time::Instant;

use chrono::Utc;
use tracing::{info, instrument};

use classfetch_discovery::{SnapshotTree, extract_fresh};
use classfetch_resolver::{DownloadPlan, plan_downloads};
use classfetch_shared::{AppConfig, ClassFetchError, Result, RunId, ScanReport};

use crate::page::load_page;

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the scan completes.
    fn done(&self, report: &ScanReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _report: &ScanReport) {}
}

/// Scan a saved page (path or URL) for attachments.
///
/// A snapshot cannot load more content or expand items, so this is a single
/// fresh extraction over the page as captured.
#[instrument(skip_all, fields(source = source))]
pub async fn scan(
    source: &str,
    config: &AppConfig,
    progress: &dyn ProgressReporter,
) -> Result<ScanReport> {
    let start = Instant::now();
    let run_id = RunId::new();

    info!(%run_id, "starting scan");

    progress.phase("Loading page");
    let page = load_page(source).await?;

    progress.phase("Extracting attachments");
    let tree = SnapshotTree::parse(&page.html, page.base_url);
    let attachments = extract_fresh(&tree, &config.expansion.link_selector).await;

    let report = ScanReport {
        run_id,
        source: source.to_string(),
        scanned_at: Utc::now(),
        attachments,
    };

    info!(
        attachments = report.attachments.len(),
        elements = tree.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "scan complete"
    );
    progress.done(&report);

    Ok(report)
}

/// Plan downloads for the selected attachments of a report.
///
/// `selection` holds indices into `report.attachments`; `None` selects
/// everything. Duplicate indices are planned once, in first-seen order.
/// `folder_name` overrides the configured destination folder.
#[instrument(skip_all, fields(run_id = %report.run_id))]
pub fn plan(
    report: &ScanReport,
    selection: Option<&[usize]>,
    folder_name: Option<&str>,
    config: &AppConfig,
) -> Result<DownloadPlan> {
    let selected = match selection {
        None => report.attachments.clone(),
        Some(indices) => {
            let mut picked = Vec::with_capacity(indices.len());
            let mut seen = std::collections::HashSet::new();
            for &index in indices {
                let attachment = report.attachments.get(index).ok_or_else(|| {
                    ClassFetchError::validation(format!(
                        "selection index {index} out of range (report has {} attachments)",
                        report.attachments.len()
                    ))
                })?;
                if seen.insert(index) {
                    picked.push(attachment.clone());
                }
            }
            picked
        }
    };

    let folder = folder_name.unwrap_or_else(|| config.downloads.resolved_folder_name());
    Ok(plan_downloads(&selected, &config.file_types, folder))
}
