//! Download resolution for discovered attachments.
//!
//! This crate provides:
//! - [`resolve_download`]: fetch URL and destination path for one attachment
//! - [`plan_downloads`] / [`filter_enabled`]: applying file-type settings to a selection
//!
//! Everything here is pure: no I/O, no failure modes.

mod download_url;
mod filename;
mod plan;

use serde::{Deserialize, Serialize};

use classfetch_shared::{Attachment, resolve_folder_name};

pub use download_url::{extract_file_id, path_file_id, resolve_fetch_url};
pub use filename::{resolve_filename, sanitize_filename};
pub use plan::{DownloadPlan, filter_enabled, plan_downloads};

/// Where to fetch an attachment from and where to save it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDownload {
    pub fetch_url: String,
    /// `<folder>/<filename>`, relative to the downloads root.
    pub destination_path: String,
}

/// Resolve an attachment against a destination folder.
///
/// A blank folder name falls back to the default folder.
pub fn resolve_download(attachment: &Attachment, folder_name: &str) -> ResolvedDownload {
    let folder = resolve_folder_name(Some(folder_name));
    let filename = resolve_filename(&attachment.title, attachment.kind);

    ResolvedDownload {
        fetch_url: resolve_fetch_url(&attachment.url, attachment.kind),
        destination_path: format!("{folder}/{filename}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classfetch_shared::AttachmentType;

    #[test]
    fn google_doc_resolves_to_pdf_export() {
        let attachment = Attachment {
            url: "https://docs.google.com/document/d/ABC123/edit".into(),
            title: "Essay.docx".into(),
            kind: AttachmentType::Doc,
        };

        let resolved = resolve_download(&attachment, "Classroom_Downloads");

        assert_eq!(
            resolved.fetch_url,
            "https://docs.google.com/document/d/ABC123/export?format=pdf"
        );
        assert_eq!(resolved.destination_path, "Classroom_Downloads/Essay.docx.pdf");
    }

    #[test]
    fn drive_image_resolves_to_direct_download() {
        let attachment = Attachment {
            url: "https://drive.google.com/file/d/XYZ789/view".into(),
            title: "photo.png".into(),
            kind: AttachmentType::Image,
        };

        let resolved = resolve_download(&attachment, "  ");

        assert_eq!(
            resolved.fetch_url,
            "https://drive.google.com/uc?export=download&id=XYZ789"
        );
        assert_eq!(resolved.destination_path, "Classroom_Downloads/photo.png");
    }

    #[test]
    fn folder_name_is_trimmed_and_title_sanitized() {
        let attachment = Attachment {
            url: "https://drive.google.com/file/d/Z/view".into(),
            title: "Q1: results/final?.zip".into(),
            kind: AttachmentType::Zip,
        };

        let resolved = resolve_download(&attachment, " Physics ");

        assert_eq!(resolved.destination_path, "Physics/Q1_ results_final_.zip");
    }
}
