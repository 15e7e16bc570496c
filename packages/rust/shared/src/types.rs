//! Core domain types for classfetch attachments and download plans.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Destination folder used when none is configured.
pub const DEFAULT_FOLDER_NAME: &str = "Classroom_Downloads";

/// Title used when no extraction strategy yields one.
pub const UNKNOWN_TITLE: &str = "Unknown File";

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one discovery run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// AttachmentType / FileCategory
// ---------------------------------------------------------------------------

/// Semantic document type of a discovered attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttachmentType {
    /// Native Google document.
    Doc,
    /// Native Google spreadsheet.
    Sheet,
    /// Native Google presentation.
    Slide,
    /// Uploaded Word document.
    OfficeDoc,
    /// Uploaded Excel workbook.
    OfficeSheet,
    /// Uploaded PowerPoint deck.
    OfficeSlide,
    Pdf,
    Image,
    Video,
    Zip,
    /// Drive file whose title carries no recognised extension.
    Binary,
    /// Drive `open?id=` link.
    DriveLink,
}

impl AttachmentType {
    /// Every variant, in declaration order.
    pub const ALL: [AttachmentType; 12] = [
        Self::Doc,
        Self::Sheet,
        Self::Slide,
        Self::OfficeDoc,
        Self::OfficeSheet,
        Self::OfficeSlide,
        Self::Pdf,
        Self::Image,
        Self::Video,
        Self::Zip,
        Self::Binary,
        Self::DriveLink,
    ];

    /// Wire name, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Doc => "DOC",
            Self::Sheet => "SHEET",
            Self::Slide => "SLIDE",
            Self::OfficeDoc => "OFFICE_DOC",
            Self::OfficeSheet => "OFFICE_SHEET",
            Self::OfficeSlide => "OFFICE_SLIDE",
            Self::Pdf => "PDF",
            Self::Image => "IMAGE",
            Self::Video => "VIDEO",
            Self::Zip => "ZIP",
            Self::Binary => "BINARY",
            Self::DriveLink => "DRIVE_LINK",
        }
    }

    /// The settings category that enables or disables this type.
    pub fn category(self) -> FileCategory {
        match self {
            Self::Doc | Self::OfficeDoc => FileCategory::Doc,
            Self::Sheet | Self::OfficeSheet => FileCategory::Sheet,
            Self::Slide | Self::OfficeSlide => FileCategory::Slide,
            Self::Pdf => FileCategory::Pdf,
            Self::Image => FileCategory::Image,
            Self::Video => FileCategory::Video,
            Self::Zip => FileCategory::Zip,
            Self::Binary | Self::DriveLink => FileCategory::Binary,
        }
    }

    /// Native editor formats, which are always fetched as a PDF export.
    pub fn exports_as_pdf(self) -> bool {
        matches!(self, Self::Doc | Self::Sheet | Self::Slide)
    }
}

impl std::fmt::Display for AttachmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse category toggled on or off in [`FileTypeSettings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Pdf,
    Doc,
    Sheet,
    Slide,
    Image,
    Video,
    Zip,
    Binary,
}

/// Which categories the user wants listed and downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTypeSettings {
    #[serde(default = "enabled")]
    pub pdf: bool,
    #[serde(default = "enabled")]
    pub doc: bool,
    #[serde(default = "enabled")]
    pub sheet: bool,
    #[serde(default = "enabled")]
    pub slide: bool,
    #[serde(default = "enabled")]
    pub image: bool,
    #[serde(default = "enabled")]
    pub video: bool,
    #[serde(default = "enabled")]
    pub zip: bool,
    #[serde(default = "enabled")]
    pub binary: bool,
}

fn enabled() -> bool {
    true
}

impl Default for FileTypeSettings {
    fn default() -> Self {
        Self {
            pdf: true,
            doc: true,
            sheet: true,
            slide: true,
            image: true,
            video: true,
            zip: true,
            binary: true,
        }
    }
}

impl FileTypeSettings {
    /// Whether the given category is enabled.
    pub fn is_enabled(&self, category: FileCategory) -> bool {
        match category {
            FileCategory::Pdf => self.pdf,
            FileCategory::Doc => self.doc,
            FileCategory::Sheet => self.sheet,
            FileCategory::Slide => self.slide,
            FileCategory::Image => self.image,
            FileCategory::Video => self.video,
            FileCategory::Zip => self.zip,
            FileCategory::Binary => self.binary,
        }
    }

    /// Whether attachments of the given type pass this filter.
    pub fn allows(&self, kind: AttachmentType) -> bool {
        self.is_enabled(kind.category())
    }
}

// ---------------------------------------------------------------------------
// Attachment
// ---------------------------------------------------------------------------

/// A classified, titled reference to a downloadable document on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Canonical absolute URL (parse-and-reserialize form).
    pub url: String,
    /// Display title; never empty.
    pub title: String,
    /// Semantic document type.
    #[serde(rename = "type")]
    pub kind: AttachmentType,
}

// ---------------------------------------------------------------------------
// ScanReport
// ---------------------------------------------------------------------------

/// Result of one scan, persisted as JSON between `scan` and `plan`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Identifier of the discovery run that produced this report.
    pub run_id: RunId,
    /// The page source (file path or URL) that was scanned.
    pub source: String,
    /// When the scan completed.
    pub scanned_at: DateTime<Utc>,
    /// Attachments in discovery order.
    pub attachments: Vec<Attachment>,
}

// ---------------------------------------------------------------------------
// DownloadRequest
// ---------------------------------------------------------------------------

/// What the host should do when the destination file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictAction {
    /// Pick a new, unique filename.
    #[default]
    Uniquify,
    Overwrite,
    Prompt,
}

/// A concrete fetch for the transfer layer to issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    /// Direct-download URL.
    pub fetch_url: String,
    /// `<folder>/<sanitized filename>`.
    pub destination_path: String,
    #[serde(default)]
    pub conflict_action: ConflictAction,
}
