//! `lr-graph`: the road graph and everything that searches it.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                |
//! |----------------|---------------------------------------------------------|
//! | [`network`]    | `RoadGraph` (CSR arena), `RoadGraphBuilder`, `NodeFlags`|
//! | [`rating`]     | `EdgeRating` lock-free `(sum, count)` cell              |
//! | [`cost`]       | `CostModel` from `RoutingConfig` weights                |
//! | [`view`]       | `GraphView` capability trait                            |
//! | [`dijkstra`]   | `Dijkstra` generator, `OnlyNodes`, `Reached`            |
//! | [`poison`]     | `PoisonedGraph` overlay                                 |
//! | [`road_class`] | highway type → cost weight                              |
//! | [`loader`]     | CSV loaders for nodes, edges and POIs                   |
//! | [`error`]      | `GraphError`, `GraphResult<T>`                          |

pub mod cost;
pub mod dijkstra;
pub mod error;
pub mod loader;
pub mod network;
pub mod poison;
pub mod rating;
pub mod road_class;
pub mod view;


pub use cost::CostModel;
pub use dijkstra::{Dijkstra, OnlyNodes, Reached};
pub use error::{GraphError, GraphResult};
pub use loader::{Poi, load_graph_csv, load_graph_reader, load_pois_csv, load_pois_reader};
pub use network::{NodeFlags, RoadGraph, RoadGraphBuilder};
pub use poison::PoisonedGraph;
pub use rating::EdgeRating;
pub use road_class::road_class_weight;
pub use view::GraphView;
