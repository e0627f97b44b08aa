//! `lr-spatial`: planar box indexing for nearest-edge lookup and POI tagging.
//!
//! All coordinates are projected kilometres ([`lr_core::Point2`]).
//!
//! # Crate layout
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`bounds`]  | `Bounds` axis-aligned box                                  |
//! | [`grid`]    | `BucketGrid<T>` uniform cells, box insertion, point query  |
//! | [`segment`] | clamped point-to-segment distance, `nearest_segment`       |
//! | [`join`]    | `spatial_join` of POIs against padded segment boxes (rstar)|
//! | [`area`]    | `Area` polygons, `areas_near_points` proximity pass        |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                         |

pub mod area;
pub mod bounds;
pub mod error;
pub mod grid;
pub mod join;
pub mod segment;


pub use area::{Area, areas_near_points};
pub use bounds::Bounds;
pub use error::{SpatialError, SpatialResult};
pub use grid::BucketGrid;
pub use join::{JoinPoi, JoinResult, JoinSegment, spatial_join};
pub use segment::{distance2_to_segment, nearest_segment};
