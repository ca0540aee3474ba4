use std::ops::Range;

/// Slice of a list to show: at most `capacity` entries centred on `cursor`,
/// clamped so it never runs past either end.
pub fn visible_window(len: usize, cursor: usize, capacity: usize) -> Range<usize> {
    if len == 0 || capacity == 0 {
        return 0..0;
    }
    let capacity = capacity.min(len);
    let cursor = cursor.min(len - 1);
    let mut start = cursor.saturating_sub(capacity / 2);
    let end = (start + capacity).min(len);
    if end - start < capacity {
        start = end.saturating_sub(capacity);
    }
    start..end
}

/// `"41-50 of 50"` when the list is truncated, `None` when everything fits.
pub fn range_indicator(window: &Range<usize>, len: usize) -> Option<String> {
    if window.len() >= len {
        return None;
    }
    Some(format!("{}-{} of {}", window.start + 1, window.end, len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_examples() {
        assert_eq!(visible_window(50, 49, 10), 40..50);
        assert_eq!(visible_window(50, 0, 10), 0..10);
        assert_eq!(visible_window(50, 25, 10), 20..30);
    }

    #[test]
    fn short_lists_are_shown_whole() {
        assert_eq!(visible_window(3, 2, 10), 0..3);
        assert_eq!(range_indicator(&(0..3), 3), None);
    }

    #[test]
    fn empty_inputs_give_empty_window() {
        assert_eq!(visible_window(0, 0, 10), 0..0);
        assert_eq!(visible_window(10, 3, 0), 0..0);
    }

    #[test]
    fn window_always_contains_cursor() {
        for len in 1..30 {
            for capacity in 1..12 {
                for cursor in 0..len {
                    let window = visible_window(len, cursor, capacity);
                    assert!(window.contains(&cursor), "{len} {capacity} {cursor}");
                    assert_eq!(window.len(), capacity.min(len));
                }
            }
        }
    }

    #[test]
    fn indicator_only_when_truncated() {
        let window = visible_window(50, 25, 10);
        assert_eq!(range_indicator(&window, 50).as_deref(), Some("21-30 of 50"));
        assert_eq!(range_indicator(&visible_window(5, 2, 10), 5), None);
    }
}
