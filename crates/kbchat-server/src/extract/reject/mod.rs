//! Drop-in replacements for the axum extractors whose rejections are
//! converted into [`Error`](crate::handler::Error).

pub mod enhanced_json;
pub mod enhanced_path;

pub use self::enhanced_json::Json;
pub use self::enhanced_path::Path;

/// Trims an error message to its first lines and a bounded length.
fn sanitize_error_message(message: &str, max_lines: usize, max_chars: usize) -> String {
    message
        .lines()
        .take(max_lines)
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(max_chars)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_limits_lines_and_length() {
        let message = "first line\nsecond line\nthird line";
        assert_eq!(sanitize_error_message(message, 2, 100), "first line second line");
        assert_eq!(sanitize_error_message(message, 3, 5), "first");
    }
}
