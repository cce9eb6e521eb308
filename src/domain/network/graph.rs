use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use crate::domain::utils::id::NodeId;

/// Represents a specific route through the network as the ordered sequence of
/// visited nodes, together with its additive weight.
#[derive(Debug, Clone)]
pub struct Path {
    pub nodes: Vec<NodeId>,
    pub weight: f64,
}

impl Path {
    /// Consecutive `(from, to)` node pairs of the path.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.nodes.windows(2).map(|pair| (pair[0], pair[1]))
    }

    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// True if both paths use at least one common directed edge.
    pub fn shares_edge_with(&self, other: &Path) -> bool {
        let own: BTreeSet<(NodeId, NodeId)> = self.edges().collect();
        other.edges().any(|edge| own.contains(&edge))
    }
}

#[derive(Debug, Clone, Copy)]
struct State {
    cost: f64,
    node: NodeId,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap behavior, node id keeps pops deterministic
        other.cost.total_cmp(&self.cost).then_with(|| other.node.cmp(&self.node))
    }
}

/// Directed graph with additive, non-negative edge weights.
///
/// Adjacency is kept in ordered maps so that every traversal (and therefore every
/// routing decision) is reproducible for a given topology.
#[derive(Debug, Clone, Default)]
pub struct WeightedGraph {
    adjacency: BTreeMap<NodeId, BTreeMap<NodeId, f64>>,
}

impl WeightedGraph {
    pub fn new() -> Self {
        Self { adjacency: BTreeMap::new() }
    }

    pub fn add_node(&mut self, node: NodeId) {
        self.adjacency.entry(node).or_default();
    }

    pub fn add_edge(&mut self, source: NodeId, target: NodeId, weight: f64) {
        self.add_node(target);
        self.adjacency.entry(source).or_default().insert(target, weight);
    }

    pub fn remove_edge(&mut self, source: NodeId, target: NodeId) -> bool {
        self.adjacency.get_mut(&source).map(|targets| targets.remove(&target).is_some()).unwrap_or(false)
    }

    /// Removes every edge that starts or ends at `node`. The node itself stays.
    pub fn remove_incident_edges(&mut self, node: NodeId) {
        if let Some(targets) = self.adjacency.get_mut(&node) {
            targets.clear();
        }
        for targets in self.adjacency.values_mut() {
            targets.remove(&node);
        }
    }

    pub fn edges_len(&self) -> usize {
        self.adjacency.values().map(|targets| targets.len()).sum()
    }

    pub fn edge_weight(&self, source: NodeId, target: NodeId) -> Option<f64> {
        self.adjacency.get(&source)?.get(&target).copied()
    }

    /// Sum of the edge weights along `nodes`, `None` if an edge is missing.
    pub fn path_weight(&self, nodes: &[NodeId]) -> Option<f64> {
        nodes.windows(2).map(|pair| self.edge_weight(pair[0], pair[1])).sum()
    }

    /// Dijkstra shortest path from `source` to `target`.
    ///
    /// # Returns
    /// `None` if `target` is unreachable or one of the nodes is unknown.
    pub fn shortest_path(&self, source: NodeId, target: NodeId) -> Option<Path> {
        if !self.adjacency.contains_key(&source) || !self.adjacency.contains_key(&target) {
            return None;
        }

        let mut dist: BTreeMap<NodeId, f64> = BTreeMap::new();
        let mut prev: BTreeMap<NodeId, NodeId> = BTreeMap::new();
        let mut heap = BinaryHeap::new();

        dist.insert(source, 0.0);
        heap.push(State { cost: 0.0, node: source });

        while let Some(State { cost, node }) = heap.pop() {
            if node == target {
                break;
            }
            if cost > dist.get(&node).copied().unwrap_or(f64::INFINITY) {
                continue;
            }

            for (next, weight) in self.adjacency.get(&node).into_iter().flatten() {
                let next_cost = cost + weight;
                if next_cost < dist.get(next).copied().unwrap_or(f64::INFINITY) {
                    dist.insert(*next, next_cost);
                    prev.insert(*next, node);
                    heap.push(State { cost: next_cost, node: *next });
                }
            }
        }

        let weight = *dist.get(&target)?;

        let mut nodes = vec![target];
        let mut current = target;
        while current != source {
            current = *prev.get(&current)?;
            nodes.push(current);
        }
        nodes.reverse();

        Some(Path { nodes, weight })
    }

    pub fn has_path(&self, source: NodeId, target: NodeId) -> bool {
        self.shortest_path(source, target).is_some()
    }

    /// Calculates up to `k` loopless paths from `source` to `target` in order of
    /// increasing weight (Yen's algorithm).
    ///
    /// Equal-weight candidates are ordered by their node sequence.
    pub fn k_shortest_paths(&self, source: NodeId, target: NodeId, k: usize) -> Vec<Path> {
        if k == 0 || source == target {
            return Vec::new();
        }

        let Some(first) = self.shortest_path(source, target) else {
            log::debug!("NoPathFound: {} => {}", source, target);
            return Vec::new();
        };

        let mut found: Vec<Path> = vec![first];
        let mut candidates: Vec<Path> = Vec::new();

        while found.len() < k {
            let last = found[found.len() - 1].clone();

            for i in 0..last.nodes.len() - 1 {
                let spur_node = last.nodes[i];
                let root = &last.nodes[..=i];

                let mut spur_graph = self.clone();
                for path in &found {
                    if path.nodes.len() > i + 1 && path.nodes[..=i] == *root {
                        spur_graph.remove_edge(path.nodes[i], path.nodes[i + 1]);
                    }
                }
                for node in &root[..i] {
                    spur_graph.remove_incident_edges(*node);
                }

                let Some(spur_path) = spur_graph.shortest_path(spur_node, target) else { continue };

                let mut nodes = root[..i].to_vec();
                nodes.extend(spur_path.nodes);

                let is_known = found.iter().chain(candidates.iter()).any(|p| p.nodes == nodes);
                if is_known {
                    continue;
                }
                if let Some(weight) = self.path_weight(&nodes) {
                    candidates.push(Path { nodes, weight });
                }
            }

            let best = candidates
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| a.weight.total_cmp(&b.weight).then_with(|| a.nodes.cmp(&b.nodes)))
                .map(|(index, _)| index);

            match best {
                Some(index) => found.push(candidates.remove(index)),
                None => break,
            }
        }

        log::debug!("Paths found {} => {}: {} solutions", source, target, found.len());

        found
    }
}
