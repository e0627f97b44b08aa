//! Lazy Dijkstra expansion.
//!
//! [`Dijkstra`] is an iterator: each `next()` settles one more node and
//! yields it as a [`Reached`] record, in non-decreasing cost order.  Callers
//! stop whenever they like and can still reconstruct the path to any node
//! already yielded with [`Dijkstra::root`].
//!
//! Two adaptors cover the routing engine's needs:
//!
//! - [`Dijkstra::only`] restricts yields to a node set (expansion still runs
//!   over the whole graph).
//! - [`Dijkstra::choose`] drains the search into a weighted random pick.
//!
//! Search state lives in `FxHashMap`s rather than `node_count`-sized
//! vectors, since bounded searches touch a small neighbourhood of a large
//! graph.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use rustc_hash::{FxHashMap, FxHashSet};

use lr_core::{NodeId, RouteRng, WeightedChoice};

use crate::{CostModel, GraphView};

// ── Reached ───────────────────────────────────────────────────────────────────

/// A settled node together with its search cost and physical path length.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Reached {
    pub node: NodeId,
    pub cost: f64,
    pub length: f64,
}

// ── Heap entry ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq)]
struct Frontier {
    cost: f64,
    length: f64,
    node: NodeId,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    /// Cost first, node id as a deterministic tie-break.
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ── Dijkstra ──────────────────────────────────────────────────────────────────

pub struct Dijkstra<'a, V: ?Sized> {
    view: &'a V,
    model: CostModel,
    max_length: f64,
    // Min-heap through `Reverse`.
    heap: BinaryHeap<Reverse<Frontier>>,
    best: FxHashMap<NodeId, f64>,
    prev: FxHashMap<NodeId, NodeId>,
    settled: FxHashSet<NodeId>,
}

impl<'a, V: GraphView + ?Sized> Dijkstra<'a, V> {
    /// Start a search from every node in `sources` at cost 0.
    ///
    /// Sources outside the graph are ignored.  Edges that would make a path
    /// longer than `max_length_km` are never relaxed.
    pub fn new<I>(view: &'a V, sources: I, model: CostModel, max_length_km: f64) -> Self
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut heap = BinaryHeap::new();
        let mut best = FxHashMap::default();
        for s in sources {
            if view.graph().contains(s) && best.insert(s, 0.0).is_none() {
                heap.push(Reverse(Frontier { cost: 0.0, length: 0.0, node: s }));
            }
        }
        Self {
            view,
            model,
            max_length: max_length_km,
            heap,
            best,
            prev: FxHashMap::default(),
            settled: FxHashSet::default(),
        }
    }

    /// Path from the search source to `node`.  `None` unless `node` has
    /// already been yielded.
    pub fn root(&self, node: NodeId) -> Option<Vec<NodeId>> {
        let mut path = self.root_reversed(node)?;
        path.reverse();
        Some(path)
    }

    /// Like [`root`](Self::root) but ordered `node → … → source`.
    pub fn root_reversed(&self, node: NodeId) -> Option<Vec<NodeId>> {
        if !self.settled.contains(&node) {
            return None;
        }
        let mut path = vec![node];
        let mut cur = node;
        while let Some(&p) = self.prev.get(&cur) {
            path.push(p);
            cur = p;
        }
        Some(path)
    }

    pub fn settled_count(&self) -> usize {
        self.settled.len()
    }

    /// Restrict yields to `nodes`.
    pub fn only<'b>(self, nodes: &'b FxHashSet<NodeId>) -> OnlyNodes<'a, 'b, V> {
        OnlyNodes { search: self, keep: nodes }
    }

    /// Drain the remaining yields into a weighted random choice.
    ///
    /// The search stays usable afterwards for [`root`](Self::root).
    pub fn choose<F>(&mut self, rng: &mut RouteRng, mut weight: F) -> Option<Reached>
    where
        F: FnMut(&Reached) -> f64,
    {
        let mut choice = WeightedChoice::new();
        while let Some(reached) = self.next() {
            let w = weight(&reached);
            choice.offer(reached, w, rng);
        }
        choice.finish()
    }
}

impl<V: GraphView + ?Sized> Iterator for Dijkstra<'_, V> {
    type Item = Reached;

    fn next(&mut self) -> Option<Reached> {
        let graph = self.view.graph();
        while let Some(Reverse(f)) = self.heap.pop() {
            // Stale entry for a node settled earlier at a lower cost.
            if !self.settled.insert(f.node) {
                continue;
            }
            for edge in graph.out_edges(f.node) {
                let to = graph.edge_to[edge.index()];
                if self.settled.contains(&to) {
                    continue;
                }
                let length = f.length + graph.edge_length_km[edge.index()];
                if length > self.max_length {
                    continue;
                }
                let cost = f.cost + self.view.edge_cost(edge, &self.model);
                if self.best.get(&to).is_none_or(|&c| cost < c) {
                    self.best.insert(to, cost);
                    self.prev.insert(to, f.node);
                    self.heap.push(Reverse(Frontier { cost, length, node: to }));
                }
            }
            return Some(Reached { node: f.node, cost: f.cost, length: f.length });
        }
        None
    }
}

// ── OnlyNodes ─────────────────────────────────────────────────────────────────

/// A [`Dijkstra`] that only yields nodes from a fixed set.
pub struct OnlyNodes<'a, 'b, V: ?Sized> {
    search: Dijkstra<'a, V>,
    keep: &'b FxHashSet<NodeId>,
}

impl<V: GraphView + ?Sized> OnlyNodes<'_, '_, V> {
    pub fn root(&self, node: NodeId) -> Option<Vec<NodeId>> {
        self.search.root(node)
    }

    pub fn root_reversed(&self, node: NodeId) -> Option<Vec<NodeId>> {
        self.search.root_reversed(node)
    }
}

impl<V: GraphView + ?Sized> Iterator for OnlyNodes<'_, '_, V> {
    type Item = Reached;

    fn next(&mut self) -> Option<Reached> {
        let keep = self.keep;
        self.search.by_ref().find(|r| keep.contains(&r.node))
    }
}
