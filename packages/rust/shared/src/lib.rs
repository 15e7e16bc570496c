//! Shared types, error model, and configuration for classfetch.
//!
//! This crate is the foundation depended on by all other classfetch crates.
//! It provides:
//! - [`ClassFetchError`]: the unified error type
//! - Domain types ([`Attachment`], [`AttachmentType`], [`FileTypeSettings`], [`ScanReport`])
//! - Configuration ([`AppConfig`], [`ExpansionConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DownloadsConfig, ExpansionConfig, ExpansionPoliciesConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, resolve_folder_name,
};
pub use error::{ClassFetchError, Result};
pub use types::{
    Attachment, AttachmentType, ConflictAction, DEFAULT_FOLDER_NAME, DownloadRequest,
    FileCategory, FileTypeSettings, RunId, ScanReport, UNKNOWN_TITLE,
};
