//! Attachment type classification.
//!
//! Classification is an ordered rule table evaluated top to bottom; the first
//! rule that matches decides the type. Native editor URLs are checked before
//! title extensions, and bare Drive file/open URLs only after them. A
//! candidate that matches no rule is not an attachment and gets `None`.

use classfetch_shared::AttachmentType;
use url::Url;

/// What a rule inspects.
#[derive(Debug, Clone, Copy)]
enum Predicate {
    /// URL path contains the fragment.
    PathContains(&'static str),
    /// Lower-cased title ends with one of the extensions (dot included).
    TitleExtension(&'static [&'static str]),
    /// First URL path segment equals the value.
    FirstSegment(&'static str),
}

impl Predicate {
    fn matches(self, path: &str, title_lower: &str) -> bool {
        match self {
            Self::PathContains(fragment) => path.contains(fragment),
            Self::TitleExtension(exts) => exts.iter().any(|ext| title_lower.ends_with(ext)),
            Self::FirstSegment(segment) => {
                path.trim_start_matches('/').split('/').next() == Some(segment)
            }
        }
    }
}

pub(crate) const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp"];
pub(crate) const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".mov", ".avi", ".mkv", ".webm"];
pub(crate) const ARCHIVE_EXTENSIONS: &[&str] = &[".zip", ".rar", ".7z", ".tar", ".gz"];

/// Rules in priority order.
const RULES: &[(Predicate, AttachmentType)] = &[
    (Predicate::PathContains("/document/d/"), AttachmentType::Doc),
    (Predicate::PathContains("/spreadsheets/d/"), AttachmentType::Sheet),
    (Predicate::PathContains("/presentation/d/"), AttachmentType::Slide),
    (Predicate::TitleExtension(&[".doc", ".docx"]), AttachmentType::OfficeDoc),
    (Predicate::TitleExtension(&[".xls", ".xlsx"]), AttachmentType::OfficeSheet),
    (Predicate::TitleExtension(&[".ppt", ".pptx"]), AttachmentType::OfficeSlide),
    (Predicate::TitleExtension(&[".pdf"]), AttachmentType::Pdf),
    (Predicate::TitleExtension(IMAGE_EXTENSIONS), AttachmentType::Image),
    (Predicate::TitleExtension(VIDEO_EXTENSIONS), AttachmentType::Video),
    (Predicate::TitleExtension(ARCHIVE_EXTENSIONS), AttachmentType::Zip),
    (Predicate::PathContains("/file/d/"), AttachmentType::Binary),
    (Predicate::FirstSegment("open"), AttachmentType::DriveLink),
];

/// Classify a candidate link by its URL and derived title.
///
/// Returns `None` when no rule matches; such links are excluded from results.
pub fn classify(url: &Url, title: &str) -> Option<AttachmentType> {
    let path = url.path();
    let title_lower = title.trim().to_lowercase();

    RULES
        .iter()
        .find(|(predicate, _)| predicate.matches(path, &title_lower))
        .map(|(_, kind)| *kind)
}
