//! HTML text helpers.

/// Truncates to at most `length` characters, appending `...` when
/// something was cut.
pub fn truncate(s: &str, length: usize) -> String {
    const OMISSION: &str = "...";

    if s.chars().count() <= length {
        s.to_string()
    } else {
        let kept: String = s
            .chars()
            .take(length.saturating_sub(OMISSION.len()))
            .collect();
        format!("{}{}", kept.trim_end(), OMISSION)
    }
}
