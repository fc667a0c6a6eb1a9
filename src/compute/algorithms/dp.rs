//! Longest common subsequence length candidates.

/// Full `(m+1) x (n+1)` table.
pub fn lcs_table(left: &[i64], right: &[i64]) -> usize {
    let width = right.len() + 1;
    let mut table = vec![0u32; (left.len() + 1) * width];

    for i in 1..=left.len() {
        for j in 1..=right.len() {
            table[i * width + j] = if left[i - 1] == right[j - 1] {
                table[(i - 1) * width + j - 1] + 1
            } else {
                table[(i - 1) * width + j].max(table[i * width + j - 1])
            };
        }
    }
    table[left.len() * width + right.len()] as usize
}

/// Two rows over the shorter sequence.
pub fn lcs_rolling(left: &[i64], right: &[i64]) -> usize {
    let (outer, inner) = if left.len() >= right.len() {
        (left, right)
    } else {
        (right, left)
    };
    let mut prev = vec![0u32; inner.len() + 1];
    let mut curr = vec![0u32; inner.len() + 1];

    for &a in outer {
        for (j, &b) in inner.iter().enumerate() {
            curr[j + 1] = if a == b {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[inner.len()] as usize
}

/// Full table filled in `tile x tile` blocks, row-major over blocks so every
/// block's upper and left neighbours are complete before it starts.
pub fn lcs_tiled(left: &[i64], right: &[i64], tile: usize) -> usize {
    let tile = tile.max(1);
    let (rows, cols) = (left.len(), right.len());
    let width = cols + 1;
    let mut table = vec![0u32; (rows + 1) * width];

    for block_row in (1..=rows).step_by(tile) {
        for block_col in (1..=cols).step_by(tile) {
            for i in block_row..(block_row + tile).min(rows + 1) {
                for j in block_col..(block_col + tile).min(cols + 1) {
                    table[i * width + j] = if left[i - 1] == right[j - 1] {
                        table[(i - 1) * width + j - 1] + 1
                    } else {
                        table[(i - 1) * width + j].max(table[i * width + j - 1])
                    };
                }
            }
        }
    }
    table[rows * width + cols] as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_answer() {
        let left = [1, 2, 3, 2, 4, 1, 2];
        let right = [2, 4, 3, 1, 2, 1];
        assert_eq!(lcs_table(&left, &right), 4);
        assert_eq!(lcs_rolling(&left, &right), 4);
        assert_eq!(lcs_tiled(&left, &right, 3), 4);
        assert_eq!(lcs_table(&[], &right), 0);
        assert_eq!(lcs_rolling(&left, &[]), 0);
        assert_eq!(lcs_tiled(&[], &[], 8), 0);
    }

    proptest! {
        #[test]
        fn prop_candidates_agree(
            left in proptest::collection::vec(0i64..6, 0..60),
            right in proptest::collection::vec(0i64..6, 0..60),
            tile in 1usize..32,
        ) {
            let expected = lcs_table(&left, &right);
            prop_assert_eq!(lcs_rolling(&left, &right), expected);
            prop_assert_eq!(lcs_tiled(&left, &right, tile), expected);
        }
    }
}
