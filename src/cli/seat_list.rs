//! Parsing and rendering of the seat-list literal accepted by `book`/`trybook`/`unbook`.
//!
//! Grammar: comma-separated items, each either a bare non-negative integer or a
//! range `A-B` where either side may be empty (`0` or [`MAX_SEATS`] respectively).
//! Whitespace around commas and around `-` is trimmed. The result is sorted and
//! deduplicated; values are clamped to `MAX_SEATS`.

use std::collections::BTreeSet;

use crate::catalog::MAX_SEATS;

/// Parses a seat-list literal such as `"5, 6, 8, 9 - 14, 2"` into a sorted set.
///
/// Malformed items (non-numeric, or a range with both sides empty) are skipped
/// rather than failing the whole parse — this matches a forgiving CLI parser
/// that reports "invalid" seats downstream rather than rejecting the whole line.
pub fn parse_seat_list(input: &str) -> BTreeSet<u32> {
    let mut seats = BTreeSet::new();

    for item in input.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }

        if let Some((lhs, rhs)) = item.split_once('-') {
            let lhs = lhs.trim();
            let rhs = rhs.trim();
            if lhs.is_empty() && rhs.is_empty() {
                continue;
            }
            let start = if lhs.is_empty() { 0 } else { lhs.parse::<u32>().unwrap_or(0) };
            let end = if rhs.is_empty() { MAX_SEATS } else { rhs.parse::<u32>().unwrap_or(MAX_SEATS) };
            let (start, end) = (start.min(MAX_SEATS), end.min(MAX_SEATS));
            for seat in start..=end {
                if seat < MAX_SEATS {
                    seats.insert(seat);
                }
            }
        } else if let Ok(seat) = item.parse::<u32>() {
            if seat < MAX_SEATS {
                seats.insert(seat);
            }
        }
    }

    seats
}

/// Renders a seat set sorted ascending, comma-space separated.
pub fn render_seat_list(seats: &BTreeSet<u32>) -> String {
    seats.iter().map(u32::to_string).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_items_and_ranges() {
        let parsed = parse_seat_list("5, 6, 8, 9 - 14, 2");
        let expected: BTreeSet<u32> = [2, 5, 6, 8, 9, 10, 11, 12, 13, 14].into_iter().collect();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn renders_sorted_comma_space_separated() {
        let seats: BTreeSet<u32> = [2, 5, 6, 8, 9, 10, 11, 12, 13, 14].into_iter().collect();
        assert_eq!(render_seat_list(&seats), "2, 5, 6, 8, 9, 10, 11, 12, 13, 14");
    }

    #[test]
    fn open_left_range_means_from_zero() {
        assert_eq!(parse_seat_list("-5"), (0..=5).collect());
    }

    #[test]
    fn open_right_range_means_to_max() {
        assert_eq!(parse_seat_list("15-"), (15..MAX_SEATS).collect());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let parsed = parse_seat_list("0-100");
        assert_eq!(parsed, (0..MAX_SEATS).collect());
    }

    #[test]
    fn duplicate_seats_are_deduplicated() {
        assert_eq!(parse_seat_list("1,1,2-3,2"), [1, 2, 3].into_iter().collect());
    }

    #[test]
    fn empty_input_is_empty_set() {
        assert!(parse_seat_list("").is_empty());
        assert!(parse_seat_list("   ").is_empty());
    }
}
