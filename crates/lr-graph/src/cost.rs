//! Edge cost model.
//!
//! Search cost of an edge is its length scaled by a multiplier built from
//! the request's `measure_*` weights:
//!
//! ```text
//! multiplier = measure_length
//!            + measure_highway * road_class
//!            + measure_rating  * (1 - avg_rating / 5)     (unrated: 0.5)
//!            - Σ measure_<category>  for each tag on the edge
//! cost       = length_km * clamp(multiplier, MIN_MULTIPLIER, MAX_MULTIPLIER)
//! ```
//!
//! The clamp keeps every cost strictly positive so Dijkstra stays valid no
//! matter how large the category rewards are.

use lr_core::{Category, EdgeId, RoutingConfig};

use crate::RoadGraph;

pub const MIN_MULTIPLIER: f64 = 0.25;
pub const MAX_MULTIPLIER: f64 = 4.0;

/// Rating term used for edges nobody has rated yet.
const UNRATED_PENALTY: f64 = 0.5;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CostModel {
    measure_length: f64,
    measure_highway: f64,
    measure_rating: f64,
    category: [f64; Category::COUNT],
}

impl CostModel {
    pub fn from_config(config: &RoutingConfig) -> Self {
        Self {
            measure_length: config.measure_length,
            measure_highway: config.measure_highway,
            measure_rating: config.measure_rating,
            category: Category::ALL.map(|c| config.category_weight(c)),
        }
    }

    /// Cost equals length.
    pub fn length_only() -> Self {
        Self {
            measure_length: 1.0,
            measure_highway: 0.0,
            measure_rating: 0.0,
            category: [0.0; Category::COUNT],
        }
    }

    pub fn multiplier(&self, graph: &RoadGraph, edge: EdgeId) -> f64 {
        let i = edge.index();
        let mut m = self.measure_length;

        if self.measure_highway != 0.0 {
            m += self.measure_highway * graph.edge_road_class[i] as f64;
        }
        if self.measure_rating != 0.0 {
            let dislike = graph
                .average_rating(edge)
                .map_or(UNRATED_PENALTY, |avg| 1.0 - avg as f64 / 5.0);
            m += self.measure_rating * dislike;
        }
        for c in graph.edge_tags[i].iter() {
            m -= self.category[c as usize];
        }
        m.clamp(MIN_MULTIPLIER, MAX_MULTIPLIER)
    }

    #[inline]
    pub fn edge_cost(&self, graph: &RoadGraph, edge: EdgeId) -> f64 {
        graph.edge_length_km[edge.index()] * self.multiplier(graph, edge)
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::length_only()
    }
}
