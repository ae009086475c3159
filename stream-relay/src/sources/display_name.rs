//! Cosmetic title for a stored filename.

use std::sync::LazyLock;

use regex::Regex;

static VERSION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(v\d+(\.\d+)*|\(\d+\)|\(?copy\)?|rev\d+)$").expect("version marker regex compiles")
});

/// Turns `Employee_Handbook-v2 (1).pdf` into `Employee Handbook`.
///
/// Strips a short extension, turns `_`/`-` runs into spaces, drops version
/// markers and collapses whitespace. Falls back to the trimmed input when
/// nothing would be left.
pub fn display_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let stem = strip_extension(trimmed);

    let title = stem
        .replace(['_', '-'], " ")
        .split_whitespace()
        .filter(|token| !VERSION_MARKER.is_match(token))
        .collect::<Vec<_>>()
        .join(" ");

    if title.is_empty() {
        trimmed.to_string()
    } else {
        title
    }
}

fn strip_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && (1..=5).contains(&ext.len())
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            stem
        }
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_extension_and_markers() {
        assert_eq!(display_name("Employee_Handbook-v2 (1).pdf"), "Employee Handbook");
        assert_eq!(display_name("  travel   policy_v1.3.docx "), "travel policy");
        assert_eq!(display_name("report copy.md"), "report");
    }

    #[test]
    fn keeps_names_it_cannot_improve() {
        assert_eq!(display_name("README"), "README");
        assert_eq!(display_name(".env"), ".env");
        assert_eq!(display_name("v2.pdf"), "v2.pdf");
        assert_eq!(display_name("archive.tar.gz"), "archive.tar");
    }
}
