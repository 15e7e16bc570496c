//! Application configuration for classfetch.
//!
//! User config lives at `~/.classfetch/classfetch.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClassFetchError, Result};
use crate::types::{DEFAULT_FOLDER_NAME, FileTypeSettings};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "classfetch.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".classfetch";

// ---------------------------------------------------------------------------
// Config structs (matching classfetch.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Download destination settings.
    #[serde(default)]
    pub downloads: DownloadsConfig,

    /// Per-category enable flags.
    #[serde(default)]
    pub file_types: FileTypeSettings,

    /// Page expansion timings and selectors.
    #[serde(default)]
    pub expansion: ExpansionPoliciesConfig,
}

/// `[downloads]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadsConfig {
    /// Folder (relative to the host's download directory) receiving all files.
    #[serde(default = "default_folder_name")]
    pub folder_name: String,
}

impl Default for DownloadsConfig {
    fn default() -> Self {
        Self {
            folder_name: default_folder_name(),
        }
    }
}

impl DownloadsConfig {
    /// The configured folder name, or the default when it is blank.
    pub fn resolved_folder_name(&self) -> &str {
        resolve_folder_name(Some(&self.folder_name))
    }
}

fn default_folder_name() -> String {
    DEFAULT_FOLDER_NAME.into()
}

/// Trim a folder name, falling back to [`DEFAULT_FOLDER_NAME`] if unset or blank.
pub fn resolve_folder_name(folder_name: Option<&str>) -> &str {
    match folder_name.map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => DEFAULT_FOLDER_NAME,
    }
}

/// `[expansion]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionPoliciesConfig {
    /// Delay between polls for the "load more" control.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Number of polls before concluding there is nothing more to load.
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,

    /// Wait after activating "load more".
    #[serde(default = "default_load_more_settle")]
    pub load_more_settle_ms: u64,

    /// Wait after expanding a collapsed item.
    #[serde(default = "default_item_settle")]
    pub item_settle_ms: u64,

    /// Upper bound on "load more" activations in one run.
    #[serde(default = "default_max_load_more_rounds")]
    pub max_load_more_rounds: u32,

    /// CSS selector for the "load more" control.
    #[serde(default = "default_load_more_selector")]
    pub load_more_selector: String,

    /// CSS selector for collapsed, expandable items.
    #[serde(default = "default_collapsed_item_selector")]
    pub collapsed_item_selector: String,

    /// CSS selector for candidate attachment links.
    #[serde(default = "default_link_selector")]
    pub link_selector: String,
}

impl Default for ExpansionPoliciesConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            poll_attempts: default_poll_attempts(),
            load_more_settle_ms: default_load_more_settle(),
            item_settle_ms: default_item_settle(),
            max_load_more_rounds: default_max_load_more_rounds(),
            load_more_selector: default_load_more_selector(),
            collapsed_item_selector: default_collapsed_item_selector(),
            link_selector: default_link_selector(),
        }
    }
}

fn default_poll_interval() -> u64 {
    500
}
fn default_poll_attempts() -> u32 {
    10
}
fn default_load_more_settle() -> u64 {
    2000
}
fn default_item_settle() -> u64 {
    800
}
fn default_max_load_more_rounds() -> u32 {
    50
}
fn default_load_more_selector() -> String {
    r#"button[aria-label^="View more"], [role="button"][aria-label^="View more"]"#.into()
}
fn default_collapsed_item_selector() -> String {
    r#"[aria-expanded="false"]"#.into()
}
fn default_link_selector() -> String {
    "a[href]".into()
}

// ---------------------------------------------------------------------------
// Expansion config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime expansion configuration, derived from the `[expansion]` section.
#[derive(Debug, Clone)]
pub struct ExpansionConfig {
    /// Delay between "load more" polls.
    pub poll_interval: Duration,
    /// Polls per "load more" round.
    pub poll_attempts: u32,
    /// Wait after a "load more" activation.
    pub load_more_settle: Duration,
    /// Wait after each collapsed item is expanded.
    pub item_settle: Duration,
    /// Cap on "load more" activations.
    pub max_load_more_rounds: u32,
    pub load_more_selector: String,
    pub collapsed_item_selector: String,
    pub link_selector: String,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self::from(&ExpansionPoliciesConfig::default())
    }
}

impl From<&ExpansionPoliciesConfig> for ExpansionConfig {
    fn from(policies: &ExpansionPoliciesConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(policies.poll_interval_ms),
            poll_attempts: policies.poll_attempts,
            load_more_settle: Duration::from_millis(policies.load_more_settle_ms),
            item_settle: Duration::from_millis(policies.item_settle_ms),
            max_load_more_rounds: policies.max_load_more_rounds,
            load_more_selector: policies.load_more_selector.clone(),
            collapsed_item_selector: policies.collapsed_item_selector.clone(),
            link_selector: policies.link_selector.clone(),
        }
    }
}

impl From<&AppConfig> for ExpansionConfig {
    fn from(config: &AppConfig) -> Self {
        Self::from(&config.expansion)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.classfetch/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ClassFetchError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.classfetch/classfetch.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ClassFetchError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ClassFetchError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ClassFetchError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ClassFetchError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ClassFetchError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("folder_name"));
        assert!(toml_str.contains("Classroom_Downloads"));
        assert!(toml_str.contains("poll_attempts"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.expansion.poll_attempts, 10);
        assert_eq!(parsed.downloads.folder_name, "Classroom_Downloads");
        assert_eq!(parsed.file_types, FileTypeSettings::default());
    }

    #[test]
    fn partial_file_types_keep_other_defaults() {
        let toml_str = r#"
[file_types]
doc = false
video = false
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert!(!config.file_types.doc);
        assert!(!config.file_types.video);
        assert!(config.file_types.pdf);
        assert!(config.file_types.binary);
        assert_eq!(config.downloads.folder_name, "Classroom_Downloads");
    }

    #[test]
    fn expansion_config_from_app_config() {
        let app = AppConfig::default();
        let expansion = ExpansionConfig::from(&app);
        assert_eq!(expansion.poll_interval, Duration::from_millis(500));
        assert_eq!(expansion.poll_attempts, 10);
        assert_eq!(expansion.load_more_settle, Duration::from_secs(2));
        assert_eq!(expansion.item_settle, Duration::from_millis(800));
        assert_eq!(expansion.link_selector, "a[href]");
    }

    #[test]
    fn poll_budget_is_about_five_seconds() {
        let expansion = ExpansionConfig::default();
        let budget = expansion.poll_interval * expansion.poll_attempts;
        assert_eq!(budget, Duration::from_secs(5));
    }

    #[test]
    fn blank_folder_name_falls_back() {
        assert_eq!(resolve_folder_name(None), "Classroom_Downloads");
        assert_eq!(resolve_folder_name(Some("   ")), "Classroom_Downloads");
        assert_eq!(resolve_folder_name(Some(" Biology ")), "Biology");

        let downloads = DownloadsConfig {
            folder_name: String::new(),
        };
        assert_eq!(downloads.resolved_folder_name(), "Classroom_Downloads");
    }

    #[test]
    fn missing_config_file_is_an_io_error() {
        let path = std::env::temp_dir().join("classfetch-does-not-exist.toml");
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ClassFetchError::Io { .. }));
    }
}
