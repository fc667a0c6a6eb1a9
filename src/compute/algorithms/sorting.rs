//! Sorting candidates.

/// Quicksort with median-of-three pivots; slices at or below `cutoff` are
/// finished with insertion sort.
pub fn quicksort(mut values: Vec<i64>, cutoff: usize) -> Vec<i64> {
    quicksort_slice(&mut values, cutoff.max(1));
    values
}

fn quicksort_slice(mut slice: &mut [i64], cutoff: usize) {
    loop {
        if slice.len() <= cutoff {
            insertion_sort_slice(slice);
            return;
        }
        let pivot = partition(slice);
        let (left, right) = std::mem::take(&mut slice).split_at_mut(pivot);
        let right = &mut right[1..];

        // Recurse into the smaller half so stack depth stays logarithmic.
        if left.len() < right.len() {
            quicksort_slice(left, cutoff);
            slice = right;
        } else {
            quicksort_slice(right, cutoff);
            slice = left;
        }
    }
}

/// Lomuto partition around the median of first, middle and last.
fn partition(slice: &mut [i64]) -> usize {
    let last = slice.len() - 1;
    let mid = slice.len() / 2;
    if slice[mid] < slice[0] {
        slice.swap(mid, 0);
    }
    if slice[last] < slice[0] {
        slice.swap(last, 0);
    }
    if slice[mid] < slice[last] {
        slice.swap(mid, last);
    }

    let pivot = slice[last];
    let mut store = 0;
    for i in 0..last {
        if slice[i] < pivot {
            slice.swap(i, store);
            store += 1;
        }
    }
    slice.swap(store, last);
    store
}

/// Top-down merge sort with an auxiliary buffer; runs at or below `cutoff`
/// use insertion sort.
pub fn mergesort(mut values: Vec<i64>, cutoff: usize) -> Vec<i64> {
    let mut buffer = values.clone();
    merge_sort_slice(&mut values, &mut buffer, cutoff.max(1));
    values
}

fn merge_sort_slice(slice: &mut [i64], buffer: &mut [i64], cutoff: usize) {
    let len = slice.len();
    if len <= cutoff {
        insertion_sort_slice(slice);
        return;
    }

    let mid = len / 2;
    {
        let (left, right) = slice.split_at_mut(mid);
        let (left_buf, right_buf) = buffer.split_at_mut(mid);
        merge_sort_slice(left, left_buf, cutoff);
        merge_sort_slice(right, right_buf, cutoff);
    }

    buffer[..len].copy_from_slice(slice);
    let (left, right) = buffer[..len].split_at(mid);
    let (mut i, mut j) = (0, 0);
    for slot in slice.iter_mut() {
        if j >= right.len() || (i < left.len() && left[i] <= right[j]) {
            *slot = left[i];
            i += 1;
        } else {
            *slot = right[j];
            j += 1;
        }
    }
}

pub fn heapsort(mut values: Vec<i64>) -> Vec<i64> {
    let len = values.len();
    for start in (0..len / 2).rev() {
        sift_down(&mut values, start, len);
    }
    for end in (1..len).rev() {
        values.swap(0, end);
        sift_down(&mut values, 0, end);
    }
    values
}

fn sift_down(heap: &mut [i64], mut root: usize, end: usize) {
    loop {
        let mut child = 2 * root + 1;
        if child >= end {
            return;
        }
        if child + 1 < end && heap[child] < heap[child + 1] {
            child += 1;
        }
        if heap[root] >= heap[child] {
            return;
        }
        heap.swap(root, child);
        root = child;
    }
}

pub fn insertion_sort(mut values: Vec<i64>) -> Vec<i64> {
    insertion_sort_slice(&mut values);
    values
}

fn insertion_sort_slice(slice: &mut [i64]) {
    for i in 1..slice.len() {
        let value = slice[i];
        let mut j = i;
        while j > 0 && slice[j - 1] > value {
            slice[j] = slice[j - 1];
            j -= 1;
        }
        slice[j] = value;
    }
}

/// Bubble sort with early exit on a pass without swaps.
pub fn bubble_sort(mut values: Vec<i64>) -> Vec<i64> {
    let len = values.len();
    for pass in 0..len {
        let mut swapped = false;
        for j in 0..len - pass - 1 {
            if values[j] > values[j + 1] {
                values.swap(j, j + 1);
                swapped = true;
            }
        }
        if !swapped {
            break;
        }
    }
    values
}

/// Shell sort with a geometric gap sequence `n / ratio^k`, ending at 1.
pub fn shell_sort(mut values: Vec<i64>, gap_ratio: f64) -> Vec<i64> {
    let len = values.len();
    let ratio = gap_ratio.max(1.1);
    let mut gap = (len as f64 / ratio) as usize;

    loop {
        let g = gap.max(1);
        for i in g..len {
            let value = values[i];
            let mut j = i;
            while j >= g && values[j - g] > value {
                values[j] = values[j - g];
                j -= g;
            }
            values[j] = value;
        }
        if g == 1 {
            break;
        }
        gap = (g as f64 / ratio) as usize;
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sorted(values: &[i64]) -> Vec<i64> {
        let mut v = values.to_vec();
        v.sort_unstable();
        v
    }

    #[test]
    fn test_small_inputs() {
        let input = vec![5, 2, 3];
        assert_eq!(quicksort(input.clone(), 1), vec![2, 3, 5]);
        assert_eq!(mergesort(input.clone(), 1), vec![2, 3, 5]);
        assert_eq!(heapsort(input.clone()), vec![2, 3, 5]);
        assert_eq!(insertion_sort(input.clone()), vec![2, 3, 5]);
        assert_eq!(bubble_sort(input.clone()), vec![2, 3, 5]);
        assert_eq!(shell_sort(input, 2.2), vec![2, 3, 5]);

        assert!(quicksort(Vec::new(), 8).is_empty());
        assert!(bubble_sort(Vec::new()).is_empty());
        assert_eq!(heapsort(vec![1]), vec![1]);
    }

    #[test]
    fn test_duplicates() {
        let input = vec![3; 200];
        assert_eq!(quicksort(input.clone(), 4), input);
        assert_eq!(mergesort(input.clone(), 4), input);
    }

    proptest! {
        #[test]
        fn prop_all_sorts_agree(
            values in proptest::collection::vec(-1000i64..1000, 0..300),
            cutoff in 1usize..64,
            ratio in 1.5f64..3.5,
        ) {
            let expected = sorted(&values);
            prop_assert_eq!(&quicksort(values.clone(), cutoff), &expected);
            prop_assert_eq!(&mergesort(values.clone(), cutoff), &expected);
            prop_assert_eq!(&heapsort(values.clone()), &expected);
            prop_assert_eq!(&insertion_sort(values.clone()), &expected);
            prop_assert_eq!(&bubble_sort(values.clone()), &expected);
            prop_assert_eq!(&shell_sort(values, ratio), &expected);
        }
    }
}
