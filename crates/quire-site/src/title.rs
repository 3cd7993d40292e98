//! Display titles derived from file and folder names.

use std::sync::LazyLock;

use regex::Regex;

/// Leading ordering prefix such as `01 - `, `010.2_` or `3 `. Digits are
/// ASCII only, the same set [`starts_with_ordinal`] accepts.
static ORDINAL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[0-9][0-9._\-\s]*[-_.\s]\s*").unwrap());

/// Whether a name starts with an ASCII digit, as top-level vault folders must.
pub(crate) fn starts_with_ordinal(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_digit())
}

/// Strip a leading ordinal prefix from a file stem or folder name.
///
/// Returns the trimmed remainder, or the trimmed input when stripping would
/// leave nothing. Applying it twice gives the same result as applying it once.
///
/// ```
/// use quire_site::canonical_title;
///
/// assert_eq!(canonical_title("01 - Getting Started"), "Getting Started");
/// assert_eq!(canonical_title("010.2_Advanced"), "Advanced");
/// assert_eq!(canonical_title("2024"), "2024");
/// ```
#[must_use]
pub fn canonical_title(stem: &str) -> String {
    let stripped = ORDINAL_PREFIX.replace(stem, "");
    let stripped = stripped.trim();
    if stripped.is_empty() {
        let trimmed = stem.trim();
        if trimmed.is_empty() {
            stem.to_owned()
        } else {
            trimmed.to_owned()
        }
    } else {
        stripped.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_common_prefixes() {
        assert_eq!(canonical_title("01 - Intro"), "Intro");
        assert_eq!(canonical_title("3_setup"), "setup");
        assert_eq!(canonical_title("1-guide"), "guide");
        assert_eq!(canonical_title("010.2 - Deep Dive"), "Deep Dive");
        assert_eq!(canonical_title("  7. Seven  "), "Seven");
    }

    #[test]
    fn test_without_prefix_unchanged() {
        assert_eq!(canonical_title("intro"), "intro");
        assert_eq!(canonical_title("Setup Guide"), "Setup Guide");
    }

    #[test]
    fn test_digit_not_followed_by_separator_kept() {
        assert_eq!(canonical_title("3D Printing"), "3D Printing");
        assert_eq!(canonical_title("42"), "42");
    }

    #[test]
    fn test_only_ascii_digits_are_ordinals() {
        assert_eq!(canonical_title("½ - Half"), "½ - Half");
        assert_eq!(canonical_title("٣ - Arabic"), "٣ - Arabic");
        assert!(starts_with_ordinal("1-guide"));
        assert!(!starts_with_ordinal("½-guide"));
        assert!(!starts_with_ordinal("Ⅻ-guide"));
        assert!(!starts_with_ordinal("guide"));
    }

    #[test]
    fn test_prefix_only_falls_back_to_stem() {
        assert_eq!(canonical_title("01 - "), "01 -");
        assert_eq!(canonical_title("3_"), "3_");
    }

    #[test]
    fn test_idempotent() {
        for stem in [
            "01 - 02 Nested",
            "1 2 3",
            "01 - 2x",
            "3_setup",
            "2024 Report",
            "intro",
            "01 - ",
            "1. 2. 3. Done",
        ] {
            let once = canonical_title(stem);
            assert_eq!(canonical_title(&once), once, "not idempotent for {stem:?}");
        }
    }

    #[test]
    fn test_nested_ordinals_fully_stripped() {
        assert_eq!(canonical_title("01 - 02 Nested"), "Nested");
        assert_eq!(canonical_title("1. 2. 3. Done"), "Done");
    }
}
