//! Lightning-rod loop synthesis.
//!
//! A loop is built in two strokes:
//!
//! 1. **Rod.**  From the start node, a cost-ordered Dijkstra expansion picks
//!    one reached node at random, favouring nodes about a quarter of the
//!    target loop length away, and the rod is the shortest path to it.
//! 2. **Close.**  The graph is poisoned around the rod so the way back
//!    avoids it.  A second expansion from the loop's end node runs until it
//!    touches rod nodes; each touch `X` yields a candidate loop
//!    `rod[..=X] ++ (X → end)` whose length is the rod prefix plus the
//!    closing leg.  Candidates outside the length window are dropped.

use log::trace;
use rustc_hash::{FxHashMap, FxHashSet};

use lr_core::{NodeId, RouteRng, RoutingConfig};
use lr_graph::{CostModel, GraphResult, GraphView, PoisonedGraph, RoadGraph};

/// A closed route and its length in kilometres.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub nodes: Vec<NodeId>,
    pub length_km: f64,
}

/// Position of a node along a rod.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RodPoint {
    /// Index of the node's first occurrence in the rod.
    pub index: usize,
    /// Distance from the rod's first node, km.
    pub length: f64,
}

// ── Rod generation ────────────────────────────────────────────────────────────

/// Relative preference for ending the rod `length` km from the start.
fn rod_weight(length: f64, config: &RoutingConfig) -> f64 {
    let target = (config.min_length + config.max_length) / 4.0;
    let spread = ((config.max_length - config.min_length) / 2.0)
        .max(target / 4.0)
        .max(1e-3);
    let z = (length - target) / spread;
    (-0.5 * z * z).exp()
}

/// Shortest path from `start` to a randomly chosen reachable node.
///
/// The start node itself is only returned (as a one-node rod) when nothing
/// else can be chosen.  `None` if `start` is not in the graph.
pub fn generate_rod<V: GraphView>(
    view: &V,
    start: NodeId,
    config: &RoutingConfig,
    rng: &mut RouteRng,
) -> Option<Vec<NodeId>> {
    if !view.graph().contains(start) {
        return None;
    }
    let mut search = view.generate(start, CostModel::from_config(config), config.max_length);
    let pick = search.choose(rng, |r| {
        if r.node == start { 0.0 } else { rod_weight(r.length, config) }
    });
    trace!("rod search from {start} settled {} nodes", search.settled_count());
    match pick {
        Some(reached) => search.root(reached.node),
        None => Some(vec![start]),
    }
}

/// Make the rod leave the start edge `(start, other)` away from `other`.
///
/// If the rod's first step runs along the start edge, that step is dropped
/// and the edge's endpoints swap roles.  Returns the rod and the node the
/// loop must end at.
pub fn orient_rod(mut rod: Vec<NodeId>, start: NodeId, other: NodeId) -> (Vec<NodeId>, NodeId) {
    if rod.len() > 1 && rod[1] == other {
        rod.remove(0);
        (rod, start)
    } else {
        (rod, other)
    }
}

/// Cumulative distance along `rod` for each of its nodes.  Repeated nodes
/// keep their first position.
pub fn annotate_rod(graph: &RoadGraph, rod: &[NodeId]) -> GraphResult<FxHashMap<NodeId, RodPoint>> {
    let mut marks = FxHashMap::default();
    let mut length = 0.0;
    for (index, &node) in rod.iter().enumerate() {
        if index > 0 {
            let edge = graph.edge(rod[index - 1], node)?;
            length += graph.edge_length_km[edge.index()];
        }
        marks.entry(node).or_insert(RodPoint { index, length });
    }
    Ok(marks)
}

// ── Rod closing ───────────────────────────────────────────────────────────────

/// Close `alt_rod` back to `end`, avoiding `rod`.
///
/// The graph is poisoned around `rod`, then searched from `end` until the
/// closing leg alone exceeds `config.max_length`.  Every node of `alt_rod`
/// reached on the way produces the candidate
/// `alt_rod[..=X] ++ (X → … → end)`, kept when its length lies strictly
/// inside `(min_length, max_length)`.
///
/// For an ordinary loop `alt_rod` is `rod` itself; heading home passes the
/// travelled path plus a fresh rod as `rod` and only the fresh rod as
/// `alt_rod`.
pub fn close_rod(
    graph: &RoadGraph,
    end: NodeId,
    rod: &[NodeId],
    config: &RoutingConfig,
    alt_rod: &[NodeId],
) -> GraphResult<Vec<Candidate>> {
    let marks = annotate_rod(graph, alt_rod)?;
    let targets: FxHashSet<NodeId> = marks.keys().copied().collect();
    let poisoned = PoisonedGraph::new(graph, rod, config.poison_max_distance, config.poison_max_value);

    let mut closing = poisoned
        .generate(end, CostModel::from_config(config), config.max_length)
        .only(&targets);
    let hits: Vec<_> = closing.by_ref().collect();

    let mut out = Vec::new();
    for hit in &hits {
        let mark = marks[&hit.node];
        let total = mark.length + hit.length;
        if !(config.min_length < total && total < config.max_length) {
            continue;
        }
        let Some(back) = closing.root_reversed(hit.node) else { continue };
        // The search ran end → X; one-way streets may not allow X → end.
        if !back.windows(2).all(|w| graph.find_edge(w[0], w[1]).is_some()) {
            continue;
        }
        let mut nodes = alt_rod[..=mark.index].to_vec();
        nodes.extend_from_slice(&back[1..]);
        if nodes.len() < 2 {
            continue;
        }
        out.push(Candidate { nodes, length_km: total });
    }
    trace!("closing from {end}: {} rod touches, {} in window", hits.len(), out.len());
    Ok(out)
}
