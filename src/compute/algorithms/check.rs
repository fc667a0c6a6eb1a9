//! Output verification.
//!
//! Labeled cases compare against `expected`; unlabeled ones are checked
//! structurally against a reference computation or a certificate.

use std::collections::VecDeque;

use crate::schema::{ProblemInput, ProblemOutput, ProblemType};

use super::{dp, optimization};

/// Structural check of `output` for `input`, without ground truth.
pub fn verify(problem_type: ProblemType, input: &ProblemInput, output: &ProblemOutput) -> bool {
    match (problem_type, input, output) {
        (ProblemType::Sorting, ProblemInput::Sequence(values), ProblemOutput::Sequence(out)) => {
            is_sorted_permutation(values, out)
        }
        (
            ProblemType::Searching,
            ProblemInput::Search { values, target },
            ProblemOutput::Scalar(found),
        ) => match found {
            Some(i) => usize::try_from(*i)
                .ok()
                .and_then(|i| values.get(i))
                .is_some_and(|v| v == target),
            None => !values.contains(target),
        },
        (ProblemType::Optimization, ProblemInput::Sequence(values), ProblemOutput::Scalar(sum)) => {
            optimization::kadane(values) == *sum
        }
        (
            ProblemType::Graph,
            ProblemInput::Graph {
                nodes,
                edges,
                source,
            },
            out,
        ) => match distances(out) {
            Some(dist) => is_shortest_path_tree(*nodes, edges, *source, &dist),
            None => false,
        },
        (ProblemType::Dp, ProblemInput::Pair { left, right }, ProblemOutput::Scalar(len)) => {
            *len == Some(dp::lcs_rolling(left, right) as i64)
        }
        _ => false,
    }
}

/// Compare `output` against a labeled `expected` value.
///
/// Searches accept any position holding the target, since duplicates make the
/// index ambiguous. A `null` expected search result means "absent".
pub fn matches_expected(
    problem_type: ProblemType,
    input: &ProblemInput,
    output: &ProblemOutput,
    expected: &ProblemOutput,
) -> bool {
    if let (
        ProblemType::Searching,
        ProblemInput::Search { values, .. },
        ProblemOutput::Scalar(got),
        ProblemOutput::Scalar(want),
    ) = (problem_type, input, output, expected)
    {
        let at = |i: &Option<i64>| {
            i.and_then(|i| usize::try_from(i).ok())
                .and_then(|i| values.get(i).copied())
        };
        return match (got, want) {
            (None, None) => true,
            (Some(_), Some(_)) => at(got).is_some() && at(got) == at(want),
            _ => false,
        };
    }
    output.same_as(expected)
}

fn is_sorted_permutation(input: &[i64], output: &[i64]) -> bool {
    if input.len() != output.len() || !output.is_sorted() {
        return false;
    }
    let mut reference = input.to_vec();
    reference.sort_unstable();
    reference == output
}

/// Distances as unsigned values; an all-reachable vector may arrive as a
/// plain sequence.
fn distances(output: &ProblemOutput) -> Option<Vec<Option<u64>>> {
    match output {
        ProblemOutput::Distances(dist) => Some(dist.clone()),
        ProblemOutput::Sequence(values) => values
            .iter()
            .map(|&v| u64::try_from(v).ok().map(Some))
            .collect(),
        ProblemOutput::Scalar(_) => None,
    }
}

/// Certificate check: the source is at zero, no edge can be relaxed, and
/// every finite distance is reached from the source along tight edges.
fn is_shortest_path_tree(
    nodes: usize,
    edges: &[crate::schema::Edge],
    source: usize,
    dist: &[Option<u64>],
) -> bool {
    if dist.len() != nodes || dist.get(source) != Some(&Some(0)) {
        return false;
    }
    let mut tight_out: Vec<Vec<usize>> = vec![Vec::new(); nodes];

    for e in edges {
        let (Some(&from), Some(&to)) = (dist.get(e.from), dist.get(e.to)) else {
            return false;
        };
        if let Some(d) = from {
            let via = d.saturating_add(e.weight);
            match to {
                None => return false,
                Some(t) if t > via => return false,
                Some(t) if t == via => tight_out[e.from].push(e.to),
                _ => {}
            }
        }
    }

    let mut reached = vec![false; nodes];
    reached[source] = true;
    let mut queue = VecDeque::from([source]);
    while let Some(node) = queue.pop_front() {
        for &next in &tight_out[node] {
            if !reached[next] {
                reached[next] = true;
                queue.push_back(next);
            }
        }
    }
    dist.iter()
        .zip(&reached)
        .all(|(d, &reached)| d.is_none() || reached)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Edge;

    #[test]
    fn test_verify_sorting() {
        let input = ProblemInput::Sequence(vec![5, 2, 3]);
        assert!(verify(
            ProblemType::Sorting,
            &input,
            &ProblemOutput::Sequence(vec![2, 3, 5])
        ));
        assert!(!verify(
            ProblemType::Sorting,
            &input,
            &ProblemOutput::Sequence(vec![2, 3, 3])
        ));
        assert!(!verify(
            ProblemType::Sorting,
            &input,
            &ProblemOutput::Sequence(vec![5, 2, 3])
        ));
    }

    #[test]
    fn test_verify_search() {
        let input = ProblemInput::Search {
            values: vec![1, 4, 4, 9],
            target: 4,
        };
        assert!(verify(ProblemType::Searching, &input, &ProblemOutput::Scalar(Some(2))));
        assert!(!verify(ProblemType::Searching, &input, &ProblemOutput::Scalar(Some(0))));
        assert!(!verify(ProblemType::Searching, &input, &ProblemOutput::Scalar(None)));
        assert!(!verify(ProblemType::Searching, &input, &ProblemOutput::Scalar(Some(-1))));
    }

    #[test]
    fn test_verify_shortest_paths() {
        let input = ProblemInput::Graph {
            nodes: 3,
            edges: vec![
                Edge { from: 0, to: 1, weight: 2 },
                Edge { from: 1, to: 2, weight: 2 },
                Edge { from: 0, to: 2, weight: 5 },
            ],
            source: 0,
        };
        let good = ProblemOutput::Distances(vec![Some(0), Some(2), Some(4)]);
        let loose = ProblemOutput::Distances(vec![Some(0), Some(2), Some(5)]);
        let short = ProblemOutput::Distances(vec![Some(0), Some(2), Some(3)]);
        assert!(verify(ProblemType::Graph, &input, &good));
        assert!(!verify(ProblemType::Graph, &input, &loose));
        assert!(!verify(ProblemType::Graph, &input, &short));
        assert!(verify(ProblemType::Graph, &input, &ProblemOutput::Sequence(vec![0, 2, 4])));
    }

    #[test]
    fn test_verify_rejects_unreachable_zero_cycle() {
        let input = ProblemInput::Graph {
            nodes: 3,
            edges: vec![
                Edge { from: 1, to: 2, weight: 0 },
                Edge { from: 2, to: 1, weight: 0 },
            ],
            source: 0,
        };
        let phantom = ProblemOutput::Distances(vec![Some(0), Some(5), Some(5)]);
        let honest = ProblemOutput::Distances(vec![Some(0), None, None]);
        assert!(!verify(ProblemType::Graph, &input, &phantom));
        assert!(verify(ProblemType::Graph, &input, &honest));
    }

    #[test]
    fn test_expected_search_accepts_duplicate_position() {
        let input = ProblemInput::Search {
            values: vec![1, 4, 4, 9],
            target: 4,
        };
        let expected = ProblemOutput::Scalar(Some(1));
        assert!(matches_expected(
            ProblemType::Searching,
            &input,
            &ProblemOutput::Scalar(Some(2)),
            &expected
        ));
        assert!(!matches_expected(
            ProblemType::Searching,
            &input,
            &ProblemOutput::Scalar(None),
            &expected
        ));
    }

    #[test]
    fn test_expected_comparison() {
        let input = ProblemInput::Sequence(vec![5, 2, 3]);
        assert!(matches_expected(
            ProblemType::Sorting,
            &input,
            &ProblemOutput::Sequence(vec![2, 3, 5]),
            &ProblemOutput::Sequence(vec![2, 3, 5]),
        ));
        assert!(!matches_expected(
            ProblemType::Sorting,
            &input,
            &ProblemOutput::Sequence(vec![2, 3, 5]),
            &ProblemOutput::Sequence(vec![5, 3, 2]),
        ));
    }
}
