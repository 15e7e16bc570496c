//! Direct-download URL resolution.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use classfetch_shared::AttachmentType;

static FILE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/d/([A-Za-z0-9_-]+)").expect("valid file id regex"));

const DRIVE_DOWNLOAD_BASE: &str = "https://drive.google.com/uc";

/// The file identifier in a `/d/<ID>` path segment.
pub fn path_file_id(url: &Url) -> Option<String> {
    FILE_ID_RE
        .captures(url.path())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// The `/d/<ID>` identifier, falling back to the `id` query parameter.
pub fn extract_file_id(url: &Url) -> Option<String> {
    path_file_id(url).or_else(|| {
        url.query_pairs()
            .find(|(key, _)| key == "id")
            .map(|(_, value)| value.into_owned())
            .filter(|id| !id.is_empty())
    })
}

/// Resolve the URL the transfer layer should fetch for an attachment.
///
/// Native editor formats become their PDF export endpoint. Everything else
/// becomes a Drive direct download. When no identifier can be found, or the
/// URL does not parse, the original URL is returned unchanged.
pub fn resolve_fetch_url(url: &str, kind: AttachmentType) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_string();
    };

    let resolved = match kind {
        AttachmentType::Doc => path_file_id(&parsed)
            .map(|id| format!("https://docs.google.com/document/d/{id}/export?format=pdf")),
        AttachmentType::Sheet => path_file_id(&parsed).map(|id| {
            format!(
                "https://docs.google.com/spreadsheets/d/{id}/export?format=pdf&portrait=true&size=A4"
            )
        }),
        AttachmentType::Slide => path_file_id(&parsed)
            .map(|id| format!("https://docs.google.com/presentation/d/{id}/export/pdf")),
        _ => extract_file_id(&parsed).and_then(|id| drive_download_url(&id)),
    };

    resolved.unwrap_or_else(|| url.to_string())
}

fn drive_download_url(id: &str) -> Option<String> {
    Url::parse_with_params(DRIVE_DOWNLOAD_BASE, &[("export", "download"), ("id", id)])
        .ok()
        .map(String::from)
}
