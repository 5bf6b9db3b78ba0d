use crate::export::{combined_document, DOCUMENT_DELIMITER, EXPORT_FILENAME};

#[test]
fn nothing_to_export_when_both_documents_are_empty() {
    assert_eq!(combined_document("", ""), None);
}

#[test]
fn both_documents_are_joined_by_the_delimiter() {
    let body = combined_document("resume text", "letter text").expect("document");
    assert_eq!(body, format!("resume text{DOCUMENT_DELIMITER}letter text"));
}

#[test]
fn a_single_document_still_exports_with_an_empty_section() {
    let body = combined_document("resume text", "").expect("document");
    assert!(body.starts_with("resume text"));
    assert!(body.ends_with(DOCUMENT_DELIMITER));
}

#[test]
fn export_filename_matches_the_download_contract() {
    assert_eq!(EXPORT_FILENAME, "resume-and-cover-letter.txt");
}
