//! `lr-routing`: loop synthesis on top of `lr-graph`.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`context`] | `RoutingContext`: graph + nearest-edge grid, POI and area  |
//! |             | tagging                                                     |
//! | [`rod`]     | rod generation, orientation and closing                     |
//! | [`tag`]     | `encode_tag` / `decode_tag` path codec                      |
//! | [`engine`]  | `RouteEngine` request API and the attempt race, `Route`     |
//! | [`error`]   | `RoutingError`, `TagError` and their result aliases         |
//!
//! # Typical use
//!
//! ```ignore
//! let mut builder = lr_graph::load_graph_csv("nodes.csv", "edges.csv")?;
//! let pois = lr_graph::load_pois_csv("pois.csv")?;
//! let settings = EngineSettings::default();
//! annotate_areas(&mut builder, &parks_and_rivers, settings.area_distance_km)?;
//! let ctx = Arc::new(RoutingContext::from_builder(builder, &pois, &settings)?);
//! let engine = RouteEngine::new(ctx, settings)?;
//! let route = engine.synthesize_loop(GeoPoint::new(52.2, 0.12), &RoutingConfig::default())?;
//! engine.rate(&route.tag, 4.5)?;
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod rod;
pub mod tag;

#[cfg(test)]
mod tests;

pub use context::{AreaOutline, RoutingContext, annotate_areas, tag_pois};
pub use engine::{Route, RouteEngine};
pub use error::{RoutingError, RoutingResult, TagError, TagResult};
pub use rod::{Candidate, RodPoint, annotate_rod, close_rod, generate_rod, orient_rod};
pub use tag::{decode_tag, encode_tag};
