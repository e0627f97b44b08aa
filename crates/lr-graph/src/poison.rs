//! Poisoned overlays: a request-scoped view that makes edges near a path
//! more expensive.
//!
//! The penalty on an edge depends on `d`, the smaller of its endpoints'
//! distances to the path (km, measured along the road network):
//!
//! ```text
//! factor(d) = max_penalty ^ (1 - d / max_distance)     for d ≤ max_distance
//! ```
//!
//! so edges on the path cost `max_penalty` times their base cost and the
//! factor decays smoothly to 1 at the radius.  Edges with an endpoint
//! outside the radius keep their base cost.  Only the overridden edges are
//! stored; the base graph is borrowed and never written.

use log::debug;
use rustc_hash::FxHashMap;

use lr_core::{EdgeId, NodeId};

use crate::{CostModel, Dijkstra, GraphView, RoadGraph};

pub struct PoisonedGraph<'a> {
    base: &'a RoadGraph,
    penalties: FxHashMap<EdgeId, f64>,
}

impl<'a> PoisonedGraph<'a> {
    /// Overlay penalising the neighbourhood of `path`.
    ///
    /// Work is bounded by the number of nodes within `max_distance` of the
    /// path.  A `max_penalty` of 1 or less, a non-positive radius, or an
    /// empty path produce an overlay identical to the base graph.
    pub fn new(base: &'a RoadGraph, path: &[NodeId], max_distance: f64, max_penalty: f64) -> Self {
        let mut penalties = FxHashMap::default();
        if max_penalty <= 1.0 || max_distance <= 0.0 || path.is_empty() {
            return Self { base, penalties };
        }

        let dist: FxHashMap<NodeId, f64> =
            Dijkstra::new(base, path.iter().copied(), CostModel::length_only(), max_distance)
                .map(|r| (r.node, r.length))
                .collect();

        for (&node, &d_from) in &dist {
            for edge in base.out_edges(node) {
                let Some(&d_to) = dist.get(&base.edge_to[edge.index()]) else {
                    continue;
                };
                let d = d_from.min(d_to);
                let factor = max_penalty.powf(1.0 - d / max_distance);
                if factor > 1.0 {
                    penalties.insert(edge, factor);
                }
            }
        }

        debug!(
            "poisoned {} edges around a {}-node path (radius {max_distance} km)",
            penalties.len(),
            path.len()
        );
        Self { base, penalties }
    }

    /// Overlay with no penalties at all.
    pub fn clean(base: &'a RoadGraph) -> Self {
        Self { base, penalties: FxHashMap::default() }
    }

    pub fn poisoned_edge_count(&self) -> usize {
        self.penalties.len()
    }
}

impl GraphView for PoisonedGraph<'_> {
    #[inline]
    fn graph(&self) -> &RoadGraph {
        self.base
    }

    #[inline]
    fn penalty(&self, edge: EdgeId) -> f64 {
        self.penalties.get(&edge).copied().unwrap_or(1.0)
    }
}
