//! Reading and writing scan reports.

use std::path::Path;

use tracing::debug;

use classfetch_shared::{ClassFetchError, Result, ScanReport};

/// Load a report previously written by [`write_report`].
pub fn read_report(path: &Path) -> Result<ScanReport> {
    let content = std::fs::read_to_string(path).map_err(|e| ClassFetchError::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| ClassFetchError::parse(format!("{}: invalid scan report: {e}", path.display())))
}

/// Write a report as pretty JSON, creating parent directories as needed.
pub fn write_report(path: &Path, report: &ScanReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ClassFetchError::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(report)
        .map_err(|e| ClassFetchError::parse(format!("failed to serialize report: {e}")))?;
    std::fs::write(path, json).map_err(|e| ClassFetchError::io(path, e))?;

    debug!(path = %path.display(), "report written");
    Ok(())
}
