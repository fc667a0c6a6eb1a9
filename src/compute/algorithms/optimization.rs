//! Maximum subarray sum candidates. The empty input has no subarray and
//! yields `None`.

pub fn kadane(values: &[i64]) -> Option<i64> {
    let (&first, rest) = values.split_first()?;
    let mut best = first;
    let mut current = first;
    for &v in rest {
        current = v.max(current.saturating_add(v));
        best = best.max(current);
    }
    Some(best)
}

/// Split in half, combine with the best crossing sum; slices of at most
/// `base_case` elements are solved by brute force.
pub fn divide_and_conquer(values: &[i64], base_case: usize) -> Option<i64> {
    if values.is_empty() {
        return None;
    }
    Some(divide(values, base_case.max(1)))
}

fn divide(values: &[i64], base_case: usize) -> i64 {
    if values.len() <= base_case {
        return brute(values);
    }
    let mid = values.len() / 2;
    let left = divide(&values[..mid], base_case);
    let right = divide(&values[mid..], base_case);

    let mut sum = 0i64;
    let mut best_left = i64::MIN;
    for &v in values[..mid].iter().rev() {
        sum = sum.saturating_add(v);
        best_left = best_left.max(sum);
    }
    sum = 0;
    let mut best_right = i64::MIN;
    for &v in &values[mid..] {
        sum = sum.saturating_add(v);
        best_right = best_right.max(sum);
    }

    left.max(right).max(best_left.saturating_add(best_right))
}

/// Quadratic scan over all start positions.
pub fn brute_force(values: &[i64]) -> Option<i64> {
    if values.is_empty() {
        return None;
    }
    Some(brute(values))
}

fn brute(values: &[i64]) -> i64 {
    let mut best = i64::MIN;
    for start in 0..values.len() {
        let mut sum = 0i64;
        for &v in &values[start..] {
            sum = sum.saturating_add(v);
            best = best.max(sum);
        }
    }
    best
}
