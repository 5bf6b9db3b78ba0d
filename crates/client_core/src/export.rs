//! Plain-text export of the generated documents.

/// Separator placed between the improved résumé and the cover letter in
/// the combined download.
pub const DOCUMENT_DELIMITER: &str = "\n\n---\n\n";

/// Suggested filename for the combined download.
pub const EXPORT_FILENAME: &str = "resume-and-cover-letter.txt";

/// Assembles the combined download body. Returns `None` when neither
/// document has been generated yet; otherwise both parts appear around
/// the delimiter, an absent one as an empty section.
pub fn combined_document(improved_resume: &str, cover_letter: &str) -> Option<String> {
    if improved_resume.is_empty() && cover_letter.is_empty() {
        return None;
    }
    Some(format!(
        "{improved_resume}{DOCUMENT_DELIMITER}{cover_letter}"
    ))
}
