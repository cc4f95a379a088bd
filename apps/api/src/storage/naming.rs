//! Filename rules for uploads and their `.tex` artifacts.
//!
//! Upload:   `{epoch_millis}_{sanitized_original_name}`
//! Artifact: `{epoch_millis}_{sanitized_stem}.tex`

use crate::errors::AppError;

pub const ARTIFACT_EXTENSION: &str = "tex";

/// The pair of names produced for one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadNames {
    pub timestamp: i64,
    /// Sanitized original name, without timestamp.
    pub sanitized: String,
    pub upload_name: String,
    pub artifact_name: String,
}

impl UploadNames {
    pub fn new(timestamp: i64, original_name: &str) -> Self {
        let sanitized = sanitize_file_name(original_name);
        let upload_name = format!("{timestamp}_{sanitized}");
        let artifact_name = format!(
            "{timestamp}_{}.{ARTIFACT_EXTENSION}",
            stem_or_default(strip_extension(&sanitized))
        );
        Self {
            timestamp,
            sanitized,
            upload_name,
            artifact_name,
        }
    }
}

/// Replaces every character outside `[A-Za-z0-9.-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        "resume".to_string()
    } else {
        sanitized
    }
}

/// Drops the final `.ext` when there is one (a trailing bare dot is kept).
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => &name[..idx],
        _ => name,
    }
}

/// A bare extension such as `.txt` leaves no stem; those artifacts are `resume`.
fn stem_or_default(stem: &str) -> &str {
    if stem.is_empty() {
        "resume"
    } else {
        stem
    }
}

/// Rejects anything that is not a single plain path component.
pub fn validate_plain_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Missing fileName".to_string()));
    }
    if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(AppError::Validation(format!(
            "Invalid fileName '{name}': must be a plain file name"
        )));
    }
    Ok(name)
}

/// Reconstructs the artifact name from a stored upload or artifact name.
///
/// The timestamp is the first underscore-delimited token; the remainder is
/// rejoined with underscores: `1700000000000_jane_doe.tex` →
/// `1700000000000_jane_doe.tex`, `1700000000000_jane_doe.pdf` → same.
pub fn artifact_name_from_file_name(file_name: &str) -> Result<String, AppError> {
    let file_name = validate_plain_name(file_name)?;
    let stem = strip_extension(file_name);

    let (timestamp, name) = stem.split_once('_').ok_or_else(|| {
        AppError::Validation(format!(
            "Invalid fileName '{file_name}': expected '{{timestamp}}_{{name}}'"
        ))
    })?;

    if timestamp.is_empty() || !timestamp.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(format!(
            "Invalid fileName '{file_name}': timestamp prefix must be numeric"
        )));
    }

    Ok(format!(
        "{timestamp}_{}.{ARTIFACT_EXTENSION}",
        stem_or_default(name)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_disallowed_characters() {
        assert_eq!(sanitize_file_name("Jane Doe (CV).pdf"), "Jane_Doe__CV_.pdf");
        assert_eq!(sanitize_file_name("résumé-v2.docx"), "r_sum_-v2.docx");
        assert_eq!(sanitize_file_name("../etc/passwd"), ".._etc_passwd");
    }

    #[test]
    fn test_upload_names_share_timestamp_and_stem() {
        let names = UploadNames::new(1_700_000_000_000, "jane doe.pdf");
        assert_eq!(names.upload_name, "1700000000000_jane_doe.pdf");
        assert_eq!(names.artifact_name, "1700000000000_jane_doe.tex");
        assert_eq!(names.sanitized, "jane_doe.pdf");
    }

    #[test]
    fn test_upload_without_extension_still_gets_tex() {
        let names = UploadNames::new(42, "resume");
        assert_eq!(names.artifact_name, "42_resume.tex");
    }

    #[test]
    fn test_artifact_name_round_trips_through_split() {
        assert_eq!(
            artifact_name_from_file_name("1700000000000_jane_doe.tex").unwrap(),
            "1700000000000_jane_doe.tex"
        );
        assert_eq!(
            artifact_name_from_file_name("1700000000000_jane_doe.docx").unwrap(),
            "1700000000000_jane_doe.tex"
        );
    }

    #[test]
    fn test_artifact_name_rejects_malformed_names() {
        assert!(artifact_name_from_file_name("jane_doe.tex").is_err());
        assert!(artifact_name_from_file_name("1700000000000.tex").is_err());
        assert!(artifact_name_from_file_name("").is_err());
    }

    #[test]
    fn test_bare_extension_upload_round_trips() {
        let names = UploadNames::new(42, ".txt");
        assert_eq!(names.upload_name, "42_.txt");
        assert_eq!(names.artifact_name, "42_resume.tex");

        assert_eq!(
            artifact_name_from_file_name(&names.upload_name).unwrap(),
            names.artifact_name
        );
        assert_eq!(
            artifact_name_from_file_name(&names.artifact_name).unwrap(),
            names.artifact_name
        );
    }

    #[test]
    fn test_plain_name_rejects_traversal() {
        assert!(validate_plain_name("../secret.tex").is_err());
        assert!(validate_plain_name("a/b.tex").is_err());
        assert!(validate_plain_name("a\\b.tex").is_err());
        assert!(validate_plain_name("..").is_err());
        assert_eq!(validate_plain_name(" 1_a.tex ").unwrap(), "1_a.tex");
        assert_eq!(validate_plain_name("1_a..b.tex").unwrap(), "1_a..b.tex");
    }

    #[test]
    fn test_strip_extension_only_drops_last_segment() {
        assert_eq!(strip_extension("a.b.tex"), "a.b");
        assert_eq!(strip_extension("noext"), "noext");
        assert_eq!(strip_extension("trailing."), "trailing.");
    }
}
