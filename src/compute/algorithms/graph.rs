//! Single-source shortest path candidates over non-negative weights.

use std::collections::VecDeque;

use crate::schema::Edge;

/// Distances from `source`; `None` for unreachable nodes.
pub type Distances = Vec<Option<u64>>;

fn adjacency(nodes: usize, edges: &[Edge]) -> Vec<Vec<(usize, u64)>> {
    let mut adj = vec![Vec::new(); nodes];
    for e in edges {
        adj[e.from].push((e.to, e.weight));
    }
    adj
}

/// Dijkstra over a d-ary heap with lazy deletion.
pub fn dijkstra(nodes: usize, edges: &[Edge], source: usize, arity: usize) -> Distances {
    let adj = adjacency(nodes, edges);
    let mut dist: Distances = vec![None; nodes];
    let mut heap = DaryHeap::new(arity.max(2));

    dist[source] = Some(0);
    heap.push(0, source);

    while let Some((d, node)) = heap.pop() {
        if dist[node].is_some_and(|best| d > best) {
            continue;
        }
        for &(next, weight) in &adj[node] {
            let candidate = d.saturating_add(weight);
            if dist[next].is_none_or(|best| candidate < best) {
                dist[next] = Some(candidate);
                heap.push(candidate, next);
            }
        }
    }
    dist
}

/// Edge relaxation for up to `nodes - 1` rounds, stopping early once a round
/// changes nothing.
pub fn bellman_ford(nodes: usize, edges: &[Edge], source: usize) -> Distances {
    let mut dist: Distances = vec![None; nodes];
    dist[source] = Some(0);

    for _ in 1..nodes.max(2) {
        let mut changed = false;
        for e in edges {
            if let Some(d) = dist[e.from] {
                let candidate = d.saturating_add(e.weight);
                if dist[e.to].is_none_or(|best| candidate < best) {
                    dist[e.to] = Some(candidate);
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }
    dist
}

/// Queue-based label correcting (shortest path faster algorithm).
pub fn spfa(nodes: usize, edges: &[Edge], source: usize) -> Distances {
    let adj = adjacency(nodes, edges);
    let mut dist: Distances = vec![None; nodes];
    let mut queued = vec![false; nodes];
    let mut queue = VecDeque::new();

    dist[source] = Some(0);
    queue.push_back(source);
    queued[source] = true;

    while let Some(node) = queue.pop_front() {
        queued[node] = false;
        let Some(d) = dist[node] else { continue };
        for &(next, weight) in &adj[node] {
            let candidate = d.saturating_add(weight);
            if dist[next].is_none_or(|best| candidate < best) {
                dist[next] = Some(candidate);
                if !queued[next] {
                    queued[next] = true;
                    queue.push_back(next);
                }
            }
        }
    }
    dist
}

/// Minimal d-ary min-heap keyed by distance.
struct DaryHeap {
    arity: usize,
    items: Vec<(u64, usize)>,
}

impl DaryHeap {
    fn new(arity: usize) -> Self {
        Self {
            arity,
            items: Vec::new(),
        }
    }

    fn push(&mut self, key: u64, node: usize) {
        self.items.push((key, node));
        let mut i = self.items.len() - 1;
        while i > 0 {
            let parent = (i - 1) / self.arity;
            if self.items[parent].0 <= self.items[i].0 {
                break;
            }
            self.items.swap(parent, i);
            i = parent;
        }
    }

    fn pop(&mut self) -> Option<(u64, usize)> {
        if self.items.is_empty() {
            return None;
        }
        let top = self.items.swap_remove(0);
        let len = self.items.len();
        let mut i = 0;
        loop {
            let first = i * self.arity + 1;
            if first >= len {
                break;
            }
            let last = (first + self.arity).min(len);
            let mut smallest = first;
            for c in first + 1..last {
                if self.items[c].0 < self.items[smallest].0 {
                    smallest = c;
                }
            }
            if self.items[i].0 <= self.items[smallest].0 {
                break;
            }
            self.items.swap(i, smallest);
            i = smallest;
        }
        Some(top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: usize, to: usize, weight: u64) -> Edge {
        Edge { from, to, weight }
    }

    fn sample() -> Vec<Edge> {
        vec![
            edge(0, 1, 4),
            edge(0, 2, 1),
            edge(2, 1, 2),
            edge(1, 3, 1),
            edge(2, 3, 5),
        ]
    }

    #[test]
    fn test_known_distances() {
        let expected = vec![Some(0), Some(3), Some(1), Some(4), None];
        for arity in [2, 3, 8] {
            assert_eq!(dijkstra(5, &sample(), 0, arity), expected);
        }
        assert_eq!(bellman_ford(5, &sample(), 0), expected);
        assert_eq!(spfa(5, &sample(), 0), expected);
    }

    #[test]
    fn test_single_node() {
        assert_eq!(dijkstra(1, &[], 0, 2), vec![Some(0)]);
        assert_eq!(bellman_ford(1, &[], 0), vec![Some(0)]);
        assert_eq!(spfa(1, &[], 0), vec![Some(0)]);
    }

    #[test]
    fn test_heap_orders_keys() {
        let mut heap = DaryHeap::new(4);
        for (k, n) in [(5, 0), (1, 1), (9, 2), (3, 3), (7, 4), (2, 5)] {
            heap.push(k, n);
        }
        let keys: Vec<u64> = std::iter::from_fn(|| heap.pop().map(|(k, _)| k)).collect();
        assert_eq!(keys, vec![1, 2, 3, 5, 7, 9]);
    }
}
