//! Spatial join of points of interest against road segments.
//!
//! Segment boxes, padded, are bulk-loaded into an `rstar` R-tree; every POI
//! then grows its own box by the same padding and is matched with every
//! segment box it overlaps.  Each hit adds the POI's category to the segment's [`TagSet`], which makes the join idempotent:
//! running it twice, or joining two POIs of the same category, leaves a
//! single tag.

use std::collections::BTreeMap;

use log::debug;
use rstar::{RTree, RTreeObject, AABB};

use lr_core::{Category, NodeId, PoiId, Point2, TagSet};

use crate::Bounds;

// ── Inputs ────────────────────────────────────────────────────────────────────

/// A road segment identified by `key`.
#[derive(Copy, Clone, Debug)]
pub struct JoinSegment<K> {
    pub key: K,
    pub a: Point2,
    pub b: Point2,
}

/// A categorised point of interest.
#[derive(Copy, Clone, Debug)]
pub struct JoinPoi {
    pub id: PoiId,
    pub at: Point2,
    pub category: Category,
}

// ── R-tree entry ──────────────────────────────────────────────────────────────

struct SegmentBox<K> {
    envelope: AABB<[f64; 2]>,
    key: K,
}

impl<K> RTreeObject for SegmentBox<K> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn envelope(b: Bounds) -> AABB<[f64; 2]> {
    AABB::from_corners([b.min_x, b.min_y], [b.max_x, b.max_y])
}

// ── Result ────────────────────────────────────────────────────────────────────

/// Output of [`spatial_join`]; ordered maps so results are deterministic.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinResult<K: Ord> {
    /// Tags gained by each segment that matched at least one POI.
    pub segment_tags: BTreeMap<K, TagSet>,
    /// Segments each matched POI was attached to, sorted.
    pub poi_segments: BTreeMap<PoiId, Vec<K>>,
}

impl<K: Ord> JoinResult<K> {
    pub fn tags_of(&self, key: &K) -> TagSet {
        self.segment_tags.get(key).copied().unwrap_or_default()
    }
}

impl JoinResult<(NodeId, NodeId)> {
    /// POIs reachable from each segment endpoint.
    pub fn node_pois(&self) -> BTreeMap<NodeId, Vec<PoiId>> {
        let mut out: BTreeMap<NodeId, Vec<PoiId>> = BTreeMap::new();
        for (&poi, segments) in &self.poi_segments {
            for &(a, b) in segments {
                for node in [a, b] {
                    let list = out.entry(node).or_default();
                    if list.last() != Some(&poi) {
                        list.push(poi);
                    }
                }
            }
        }
        out
    }
}

// ── Join ──────────────────────────────────────────────────────────────────────

/// Tag every segment whose padded box overlaps a POI's padded box.
pub fn spatial_join<K>(segments: &[JoinSegment<K>], pois: &[JoinPoi], padding: f64) -> JoinResult<K>
where
    K: Copy + Ord,
{
    let entries: Vec<SegmentBox<K>> = segments
        .iter()
        .map(|s| {
            SegmentBox {
                envelope: envelope(Bounds::around(s.a, s.b, padding)),
                key: s.key,
            }
        })
        .collect();
    let tree = RTree::bulk_load(entries);

    let mut segment_tags: BTreeMap<K, TagSet> = BTreeMap::new();
    let mut poi_segments: BTreeMap<PoiId, Vec<K>> = BTreeMap::new();

    for poi in pois {
        let reach = envelope(Bounds::around(poi.at, poi.at, padding));
        let mut hits: Vec<K> = tree
            .locate_in_envelope_intersecting(&reach)
            .map(|entry| entry.key)
            .collect();
        if hits.is_empty() {
            continue;
        }
        hits.sort_unstable();
        hits.dedup();
        for &key in &hits {
            segment_tags.entry(key).or_default().insert(poi.category);
        }
        poi_segments.entry(poi.id).or_default().extend(hits);
    }

    for list in poi_segments.values_mut() {
        list.sort_unstable();
        list.dedup();
    }

    debug!(
        "spatial join: {} POIs matched, {} of {} segments tagged",
        poi_segments.len(),
        segment_tags.len(),
        segments.len()
    );

    JoinResult { segment_tags, poi_segments }
}
