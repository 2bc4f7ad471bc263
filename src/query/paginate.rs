//! Pagination Stage
//!
//! Offset/limit windowing over the filtered, sorted list. Invalid values
//! fall back to defaults; nothing here ever fails.

use std::ops::Range;
use tracing::warn;

/// Page size when `limit` is absent or invalid
pub const DEFAULT_LIMIT: usize = 50;

/// Start position when `offset` is absent or invalid
pub const DEFAULT_OFFSET: usize = 0;

/// Parse `limit`; negative or non-numeric values use [`DEFAULT_LIMIT`]
pub fn parse_limit(raw: Option<&str>) -> usize {
    let Some(raw) = raw else {
        return DEFAULT_LIMIT;
    };
    match raw.parse::<i64>() {
        Ok(n) if n >= 0 => usize::try_from(n).unwrap_or(usize::MAX),
        _ => {
            warn!("Invalid limit {:?}, using default {}", raw, DEFAULT_LIMIT);
            DEFAULT_LIMIT
        }
    }
}

/// Parse `offset`; negative or non-numeric values use [`DEFAULT_OFFSET`]
///
/// The result is not yet clamped to the list size, see [`window`].
pub fn parse_offset(raw: Option<&str>) -> usize {
    let Some(raw) = raw else {
        return DEFAULT_OFFSET;
    };
    match raw.parse::<i64>() {
        Ok(n) if n >= 0 => usize::try_from(n).unwrap_or(usize::MAX),
        _ => {
            warn!("Invalid offset {:?}, using default {}", raw, DEFAULT_OFFSET);
            DEFAULT_OFFSET
        }
    }
}

/// Index range of the page within a list of `size` records
///
/// An offset past the end yields an empty page. A limit equal to
/// [`DEFAULT_LIMIT`] returns everything from the offset to the end.
pub fn window(size: usize, offset: usize, limit: usize) -> Range<usize> {
    let begin = offset.min(size);
    let end = if limit == DEFAULT_LIMIT {
        size
    } else {
        begin.saturating_add(limit).min(size)
    };
    begin..end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_limit_fallbacks() {
        assert_eq!(parse_limit(None), DEFAULT_LIMIT);
        assert_eq!(parse_limit(Some("7")), 7);
        assert_eq!(parse_limit(Some("0")), 0);
        assert_eq!(parse_limit(Some("-3")), DEFAULT_LIMIT);
        assert_eq!(parse_limit(Some("many")), DEFAULT_LIMIT);
    }

    #[test]
    fn test_parse_offset_fallbacks() {
        assert_eq!(parse_offset(None), 0);
        assert_eq!(parse_offset(Some("4")), 4);
        assert_eq!(parse_offset(Some("-1")), 0);
        assert_eq!(parse_offset(Some("x")), 0);
    }

    #[test]
    fn test_window_bounds() {
        assert_eq!(window(5, 3, 2), 3..5);
        assert_eq!(window(5, 1, 2), 1..3);
        assert_eq!(window(5, 4, 2), 4..5);
        assert_eq!(window(5, 9, 2), 5..5);
        assert_eq!(window(5, 0, 0), 0..0);
        assert_eq!(window(0, 0, 10), 0..0);
    }

    #[test]
    fn test_default_limit_runs_to_end() {
        assert_eq!(window(120, 10, DEFAULT_LIMIT), 10..120);
        assert_eq!(window(120, 10, 51), 10..61);
    }
}
