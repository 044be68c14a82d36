use once_cell::sync::Lazy;
use regex::Regex;

static UNSAFE_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("static filename regex"));

/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Lenient numeric coercion for a CSV cell.
///
/// Accepts anything that parses as a finite `f64` (`"2021"`, `" 2021.0 "`,
/// `"1e3"`) and truncates it toward zero. Empty or non-numeric cells yield `None`.
pub fn coerce_int(raw: &str) -> Option<i64> {
    let cleaned = clean_str(raw);
    if cleaned.is_empty() {
        return None;
    }
    let v: f64 = cleaned.parse().ok()?;
    if !v.is_finite() || v.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(v.trunc() as i64)
}

/// Reduce an uploaded file name to a single safe path component.
/// Directory parts are dropped, unsafe runs become `_`, leading dots are stripped.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or("");
    let replaced = UNSAFE_FILENAME_CHARS.replace_all(base, "_");
    replaced.trim_start_matches('.').to_string()
}
