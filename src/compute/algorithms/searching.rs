//! Searching candidates. All return the position of an element equal to
//! `target`, or `None`.

use std::collections::HashMap;

/// Lower-bound binary search that switches to a linear scan once the window
/// shrinks to `linear_threshold` elements. Requires sorted input.
pub fn binary_search(values: &[i64], target: i64, linear_threshold: usize) -> Option<usize> {
    let threshold = linear_threshold.max(1);
    let (mut lo, mut hi) = (0, values.len());
    while hi - lo > threshold {
        let mid = lo + (hi - lo) / 2;
        if values[mid] < target {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    let end = (hi + 1).min(values.len());
    (lo..end).find(|&i| values[i] == target)
}

pub fn linear_search(values: &[i64], target: i64) -> Option<usize> {
    values.iter().position(|&v| v == target)
}

/// Builds a value index, then looks the target up.
pub fn hash_search(values: &[i64], target: i64) -> Option<usize> {
    let mut index = HashMap::with_capacity(values.len());
    for (i, &v) in values.iter().enumerate() {
        index.entry(v).or_insert(i);
    }
    index.get(&target).copied()
}

/// Interpolation search over sorted input.
pub fn interpolation_search(values: &[i64], target: i64) -> Option<usize> {
    if values.is_empty() {
        return None;
    }
    let (mut lo, mut hi) = (0usize, values.len() - 1);

    while lo <= hi && target >= values[lo] && target <= values[hi] {
        if values[hi] == values[lo] {
            return (values[lo] == target).then_some(lo);
        }
        let span = values[hi] as i128 - values[lo] as i128;
        let offset = (target as i128 - values[lo] as i128) * (hi - lo) as i128 / span;
        let pos = lo + offset as usize;

        match values[pos].cmp(&target) {
            std::cmp::Ordering::Equal => return Some(pos),
            std::cmp::Ordering::Less => lo = pos + 1,
            std::cmp::Ordering::Greater => {
                if pos == 0 {
                    break;
                }
                hi = pos - 1;
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn check(values: &[i64], target: i64, found: Option<usize>) -> bool {
        match found {
            Some(i) => values.get(i) == Some(&target),
            None => !values.contains(&target),
        }
    }

    #[test]
    fn test_basic_lookups() {
        let values = [1, 3, 5, 7, 9, 11];
        assert_eq!(binary_search(&values, 7, 1), Some(3));
        assert_eq!(binary_search(&values, 8, 1), None);
        assert_eq!(linear_search(&values, 11), Some(5));
        assert_eq!(hash_search(&values, 1), Some(0));
        assert_eq!(interpolation_search(&values, 9), Some(4));
        assert_eq!(interpolation_search(&values, 0), None);
        assert_eq!(interpolation_search(&[], 0), None);
        assert_eq!(binary_search(&[], 0, 4), None);
    }

    proptest! {
        #[test]
        fn prop_searches_are_sound(
            mut values in proptest::collection::vec(-500i64..500, 0..200),
            target in -500i64..500,
            threshold in 1usize..64,
        ) {
            values.sort_unstable();
            prop_assert!(check(&values, target, binary_search(&values, target, threshold)));
            prop_assert!(check(&values, target, linear_search(&values, target)));
            prop_assert!(check(&values, target, hash_search(&values, target)));
            prop_assert!(check(&values, target, interpolation_search(&values, target)));
        }
    }
}
