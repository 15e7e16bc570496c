//! Destination filename resolution.

use classfetch_shared::{AttachmentType, UNKNOWN_TITLE};

/// Characters that are not allowed in a downloaded filename.
const RESERVED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replace reserved and control characters with `_` and trim.
///
/// An empty result becomes [`UNKNOWN_TITLE`].
pub fn sanitize_filename(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| {
            if RESERVED.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = replaced.trim();
    if trimmed.is_empty() {
        UNKNOWN_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Sanitized filename for an attachment, with `.pdf` appended to native
/// editor formats unless already present.
pub fn resolve_filename(title: &str, kind: AttachmentType) -> String {
    let name = sanitize_filename(title);
    if kind.exports_as_pdf() && !name.to_lowercase().ends_with(".pdf") {
        format!("{name}.pdf")
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_characters_are_replaced() {
        let name = sanitize_filename(r#"a<b>c:d"e/f\g|h?i*j"#);
        assert_eq!(name, "a_b_c_d_e_f_g_h_i_j");
        assert!(!name.contains(RESERVED));
    }

    #[test]
    fn control_characters_are_replaced_and_edges_trimmed() {
        assert_eq!(sanitize_filename("  Lab\t1 "), "Lab_1");
    }

    #[test]
    fn empty_names_fall_back() {
        assert_eq!(sanitize_filename(""), UNKNOWN_TITLE);
        assert_eq!(sanitize_filename("   "), UNKNOWN_TITLE);
    }

    #[test]
    fn native_formats_get_a_single_pdf_suffix() {
        assert_eq!(resolve_filename("Essay.docx", AttachmentType::Doc), "Essay.docx.pdf");
        assert_eq!(resolve_filename("Budget.PDF", AttachmentType::Sheet), "Budget.PDF");
        assert_eq!(resolve_filename("Deck", AttachmentType::Slide), "Deck.pdf");

        let once = resolve_filename("Notes", AttachmentType::Doc);
        assert_eq!(resolve_filename(&once, AttachmentType::Doc), once);
    }

    #[test]
    fn uploaded_files_keep_their_name() {
        assert_eq!(resolve_filename("photo.png", AttachmentType::Image), "photo.png");
        assert_eq!(resolve_filename("report.docx", AttachmentType::OfficeDoc), "report.docx");
    }
}
