// src/catalog/mod.rs

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Short course code → display name, as offered by the registrar.
static COURSES: &[(&str, &str)] = &[
    ("BSIT", "Bachelor of Science in Information Technology"),
    ("BSCS", "Bachelor of Science in Computer Science"),
    ("BSIS", "Bachelor of Science in Information Systems"),
    ("BSEMC", "Bachelor of Science in Entertainment and Multimedia Computing"),
    ("BSA", "Bachelor of Science in Accountancy"),
    ("BSBA", "Bachelor of Science in Business Administration"),
    ("BSHM", "Bachelor of Science in Hospitality Management"),
    ("BSTM", "Bachelor of Science in Tourism Management"),
    ("BSN", "Bachelor of Science in Nursing"),
    ("BSPSY", "Bachelor of Science in Psychology"),
    ("BSCE", "Bachelor of Science in Civil Engineering"),
    ("BSEE", "Bachelor of Science in Electrical Engineering"),
    ("BSME", "Bachelor of Science in Mechanical Engineering"),
    ("BSCRIM", "Bachelor of Science in Criminology"),
    ("BEED", "Bachelor of Elementary Education"),
    ("BSED", "Bachelor of Secondary Education"),
    ("ABCOMM", "Bachelor of Arts in Communication"),
    ("ABPOLSCI", "Bachelor of Arts in Political Science"),
];

static CATALOG: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| COURSES.iter().copied().collect());

/// Display name for `code`, if the catalog knows it.
pub fn lookup(code: &str) -> Option<&'static str> {
    CATALOG.get(code.trim()).copied()
}

/// Display name for `code`, falling back to the raw code.
pub fn display_name(code: &str) -> String {
    lookup(code)
        .map(str::to_string)
        .unwrap_or_else(|| code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_code_resolves() {
        assert_eq!(
            display_name("BSIT"),
            "Bachelor of Science in Information Technology"
        );
        assert_eq!(lookup(" BSCS "), Some("Bachelor of Science in Computer Science"));
    }

    #[test]
    fn test_unknown_code_falls_back_to_raw() {
        assert_eq!(lookup("XYZ101"), None);
        assert_eq!(display_name("XYZ101"), "XYZ101");
    }

    #[test]
    fn test_codes_are_unique() {
        assert_eq!(CATALOG.len(), COURSES.len());
    }
}
