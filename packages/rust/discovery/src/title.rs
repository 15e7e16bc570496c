//! Display-title derivation for candidate links.
//!
//! Titles come from an ordered chain of strategies; each either yields a
//! non-empty title or defers to the next:
//! 1. the first line of the link's own text that looks like a filename
//! 2. the `aria-label`, minus a leading `Attachment:` prefix
//! 3. a descendant whose class mentions `title` or `name`
//! 4. the first non-empty line of the link's own text
//! 5. the [`UNKNOWN_TITLE`] sentinel

use std::sync::LazyLock;

use regex::Regex;

use classfetch_shared::UNKNOWN_TITLE;

use crate::dom::DocumentTree;

/// Selector for descendants that usually hold the file name.
pub(crate) const TITLE_HINT_SELECTOR: &str = r#"[class*="title"], [class*="name"]"#;

/// Label prefix Classroom puts in front of attachment names.
const ARIA_PREFIX: &str = "Attachment:";

/// Matches a line ending in a known file extension.
static FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\.(pdf|docx?|xlsx?|pptx?|jpe?g|png|gif|webp|mp4|mov|avi|mkv|webm|zip|rar|7z|tar|gz|txt|csv|rtf|odt|ods|odp)$",
    )
    .expect("filename regex")
});

/// Which strategy produced a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSource {
    FilenameLine,
    AriaLabel,
    Descendant,
    FirstLine,
    Fallback,
}

/// A derived title and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedTitle {
    pub value: String,
    pub source: TitleSource,
}

/// Run the title chain for one link element.
pub async fn derive_title<T>(tree: &T, element: &T::Element) -> DerivedTitle
where
    T: DocumentTree + ?Sized,
{
    let text = tree.inner_text(element).await;

    if let Some(value) = filename_line(&text) {
        return DerivedTitle {
            value,
            source: TitleSource::FilenameLine,
        };
    }

    let label = tree.attribute(element, "aria-label").await;
    if let Some(value) = label.as_deref().and_then(from_aria_label) {
        return DerivedTitle {
            value,
            source: TitleSource::AriaLabel,
        };
    }

    for hint in tree.query_within(element, TITLE_HINT_SELECTOR).await {
        if let Some(value) = first_line(&tree.inner_text(&hint).await) {
            return DerivedTitle {
                value,
                source: TitleSource::Descendant,
            };
        }
    }

    match first_line(&text) {
        Some(value) => DerivedTitle {
            value,
            source: TitleSource::FirstLine,
        },
        None => DerivedTitle {
            value: UNKNOWN_TITLE.to_string(),
            source: TitleSource::Fallback,
        },
    }
}

/// First trimmed line that ends in a known file extension.
pub(crate) fn filename_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| FILENAME_RE.is_match(line))
        .map(String::from)
}

/// Strip the `Attachment:` prefix from an accessible label.
pub(crate) fn from_aria_label(label: &str) -> Option<String> {
    let label = label.trim();
    let label = label.strip_prefix(ARIA_PREFIX).unwrap_or(label).trim();
    (!label.is_empty()).then(|| label.to_string())
}

/// First non-empty trimmed line.
pub(crate) fn first_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(String::from)
}
