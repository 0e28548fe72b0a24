//! Download-filename derivation from the extracted full name.

/// Suffix appended to the normalised name to form the artifact filename.
pub const ARTIFACT_SUFFIX: &str = "_resume_parsed.json";

/// Turn a display name into a filesystem-safe base name.
///
/// Everything from the last `.` onward is dropped (treated as an accidental
/// extension-like suffix), then whitespace runs collapse to single
/// underscores. Leading and trailing whitespace disappears; an empty or
/// whitespace-only name yields `""`.
///
/// ```
/// use resume_parser::filename::clean_name_for_file;
///
/// assert_eq!(clean_name_for_file("Jane Doe"), "Jane_Doe");
/// assert_eq!(clean_name_for_file("John Q. Public"), "John_Q");
/// ```
pub fn clean_name_for_file(name: &str) -> String {
    let stem = match name.rfind('.') {
        Some(idx) => &name[..idx],
        None => name,
    };
    stem.split_whitespace().collect::<Vec<_>>().join("_")
}

/// `<normalised name>_resume_parsed.json`.
pub fn artifact_filename(full_name: &str) -> String {
    format!("{}{}", clean_name_for_file(full_name), ARTIFACT_SUFFIX)
}
