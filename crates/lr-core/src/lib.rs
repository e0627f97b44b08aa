//! `lr-core`: foundational types for the lightning-rod loop router.
//!
//! Every other `lr-*` crate depends on this one.  It has no `lr-*`
//! dependencies and only a handful of external ones (`rand`, `serde`,
//! `thiserror`).
//!
//! # What lives here
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`ids`]      | `NodeId`, `EdgeId`, `PoiId`                              |
//! | [`geo`]      | `GeoPoint`, `Point2`, `Projector` (sphere → plane)       |
//! | [`tags`]     | `Category`, `TagSet`                                     |
//! | [`config`]   | `RoutingConfig` (per request), `EngineSettings`          |
//! | [`rng`]      | `RouteRng` (per attempt), `WeightedChoice`               |
//! | [`error`]    | `ConfigError`, `ConfigResult`                            |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod tags;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{EngineSettings, RoutingConfig};
pub use error::{ConfigError, ConfigResult};
pub use geo::{GeoPoint, Point2, Projector};
pub use ids::{EdgeId, NodeId, PoiId};
pub use rng::{RouteRng, WeightedChoice};
pub use tags::{Category, TagSet};
