//! Proximity of points to polygonal areas (parks, water bodies).
//!
//! Points are bucketed into a [`BucketGrid`]; each area then visits only the
//! cells covered by its bounding box grown by the distance threshold, and
//! the exact point-to-polygon distance decides membership.

use log::debug;

use lr_core::{Category, Point2, TagSet};

use crate::{Bounds, BucketGrid, SpatialResult, distance2_to_segment};

/// Cells along the longer side of the point cloud.
const CELLS_PER_AXIS: usize = 100;

/// A polygon outline in projected kilometres.  The ring may be open or
/// closed; the last vertex always connects back to the first.
#[derive(Clone, Debug)]
pub struct Area {
    pub category: Category,
    pub outline: Vec<Point2>,
}

impl Area {
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.outline.iter().copied())
    }

    /// Even-odd rule.
    pub fn contains(&self, p: Point2) -> bool {
        let ring = &self.outline;
        let mut inside = false;
        for (i, &a) in ring.iter().enumerate() {
            let b = ring[(i + 1) % ring.len()];
            if (a.y > p.y) != (b.y > p.y) && p.x < a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x) {
                inside = !inside;
            }
        }
        inside
    }

    /// Distance from `p` to the area, 0 inside it.
    pub fn distance(&self, p: Point2) -> f64 {
        if self.outline.len() >= 3 && self.contains(p) {
            return 0.0;
        }
        let ring = &self.outline;
        (0..ring.len())
            .map(|i| distance2_to_segment(p, ring[i], ring[(i + 1) % ring.len()]))
            .fold(f64::INFINITY, f64::min)
            .sqrt()
    }
}

/// For every point, the categories of the areas lying closer than
/// `max_distance` to it.
pub fn areas_near_points(points: &[Point2], areas: &[Area], max_distance: f64) -> SpatialResult<Vec<TagSet>> {
    let mut near = vec![TagSet::EMPTY; points.len()];
    let Some(extent) = Bounds::from_points(points.iter().copied()) else {
        return Ok(near);
    };

    let mut grid = BucketGrid::build(extent, BucketGrid::<usize>::cell_size_for(extent, CELLS_PER_AXIS))?;
    for (i, &p) in points.iter().enumerate() {
        grid.insert(Bounds::around(p, p, 0.0), i);
    }

    let mut marked = 0usize;
    for area in areas {
        let Some(reach) = area.bounds().map(|b| b.padded(max_distance)) else {
            continue;
        };
        for cell in grid.query_cells_covering(reach) {
            for &i in cell {
                if !near[i].contains(area.category) && area.distance(points[i]) < max_distance {
                    near[i].insert(area.category);
                    marked += 1;
                }
            }
        }
    }
    debug!("{marked} point/area proximities over {} areas", areas.len());
    Ok(near)
}
