use serde::Serialize;
use utoipa::ToSchema;

use super::aggregator::SortedValues;

/// First and third quartile of a value set.
///
/// Positional, not interpolated: `quartile_1 = values[floor(n * 0.25)]` and
/// `quartile_3 = values[floor(n * 0.75)]` over the ascending values, so both are
/// always actual readings. Statistics libraries that interpolate between
/// neighbours will disagree on small sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Quartiles {
    pub quartile_1: Option<i64>,
    pub quartile_3: Option<i64>,
}

pub fn quartiles(values: &SortedValues) -> Quartiles {
    let v = values.as_slice();
    if v.is_empty() {
        return Quartiles::default();
    }

    Quartiles {
        quartile_1: Some(v[position(v.len(), 1)]),
        quartile_3: Some(v[position(v.len(), 3)]),
    }
}

/// `floor(n * quarters / 4)`, clamped to the last index.
fn position(n: usize, quarters: usize) -> usize {
    (n * quarters / 4).min(n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(v: &[i64]) -> (Option<i64>, Option<i64>) {
        let q = quartiles(&SortedValues::new(v.to_vec()));
        (q.quartile_1, q.quartile_3)
    }

    #[test]
    fn empty_set_has_no_quartiles() {
        assert_eq!(q(&[]), (None, None));
    }

    #[test]
    fn single_value_is_both_quartiles() {
        assert_eq!(q(&[42]), (Some(42), Some(42)));
    }

    #[test]
    fn two_values_split_low_and_high() {
        // n = 2: indices 0 and 1
        assert_eq!(q(&[50, 22]), (Some(22), Some(50)));
    }

    #[test]
    fn six_values_use_floor_positions() {
        // n = 6: floor(1.5) = 1, floor(4.5) = 4
        assert_eq!(q(&[100, 22, 50, 100, 50, 22]), (Some(22), Some(100)));
    }

    #[test]
    fn eight_values_use_floor_positions() {
        // n = 8: indices 2 and 6
        assert_eq!(q(&[1, 2, 3, 4, 5, 6, 7, 8]), (Some(3), Some(7)));
    }

    #[test]
    fn positions_never_exceed_last_index() {
        for n in 1..50 {
            assert!(position(n, 3) < n);
            assert!(position(n, 1) <= position(n, 3));
        }
    }
}
