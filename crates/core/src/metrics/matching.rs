//! Maximum bipartite matching (Hopcroft-Karp).

use std::collections::VecDeque;

const UNREACHED: u32 = u32::MAX;

/// Bipartite graph with `left` and `right` vertex sets and edges from left
/// to right.
#[derive(Clone, Debug, Default)]
pub struct BipartiteGraph {
    right: usize,
    adjacency: Vec<Vec<usize>>,
}

impl BipartiteGraph {
    pub fn new(left: usize, right: usize) -> Self {
        Self {
            right,
            adjacency: vec![Vec::new(); left],
        }
    }

    pub fn left_len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn right_len(&self) -> usize {
        self.right
    }

    pub fn add_edge(&mut self, left: usize, right: usize) {
        debug_assert!(right < self.right);
        self.adjacency[left].push(right);
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Maximum matching as `(left, right)` pairs, sorted by left vertex.
    pub fn maximum_matching(&self) -> Vec<(usize, usize)> {
        let mut state = HopcroftKarp::new(self);
        while state.bfs() {
            for u in 0..self.left_len() {
                if state.match_left[u].is_none() {
                    state.augment(u);
                }
            }
        }
        state
            .match_left
            .iter()
            .enumerate()
            .filter_map(|(u, v)| v.map(|v| (u, v)))
            .collect()
    }

    pub fn maximum_matching_size(&self) -> usize {
        self.maximum_matching().len()
    }
}

struct HopcroftKarp<'g> {
    graph: &'g BipartiteGraph,
    match_left: Vec<Option<usize>>,
    match_right: Vec<Option<usize>>,
    dist: Vec<u32>,
}

impl<'g> HopcroftKarp<'g> {
    fn new(graph: &'g BipartiteGraph) -> Self {
        Self {
            graph,
            match_left: vec![None; graph.left_len()],
            match_right: vec![None; graph.right_len()],
            dist: vec![UNREACHED; graph.left_len()],
        }
    }

    /// Layer the free left vertices; true if some free right vertex is
    /// reachable along alternating paths.
    fn bfs(&mut self) -> bool {
        let mut queue = VecDeque::new();
        for (u, matched) in self.match_left.iter().enumerate() {
            if matched.is_none() {
                self.dist[u] = 0;
                queue.push_back(u);
            } else {
                self.dist[u] = UNREACHED;
            }
        }

        let graph = self.graph;
        let mut found = false;
        // Layering continues past the first free right vertex. Augmenting
        // paths may then be longer than the shortest one, which costs phases
        // but not correctness: `augment` only follows `dist + 1` edges.
        while let Some(u) = queue.pop_front() {
            for &v in &graph.adjacency[u] {
                match self.match_right[v] {
                    None => found = true,
                    Some(w) if self.dist[w] == UNREACHED => {
                        self.dist[w] = self.dist[u] + 1;
                        queue.push_back(w);
                    }
                    Some(_) => {}
                }
            }
        }
        found
    }

    fn augment(&mut self, u: usize) -> bool {
        let graph = self.graph;
        for &v in &graph.adjacency[u] {
            let reachable = match self.match_right[v] {
                None => true,
                Some(w) => self.dist[w] == self.dist[u] + 1 && self.augment(w),
            };
            if reachable {
                self.match_left[u] = Some(v);
                self.match_right[v] = Some(u);
                return true;
            }
        }
        self.dist[u] = UNREACHED;
        false
    }
}
