//! Point-to-segment distance and nearest-segment selection.

use lr_core::Point2;

/// Squared distance from `p` to the segment `a`–`b`.
///
/// When the projection of `p` falls outside the segment the nearer endpoint
/// is used, otherwise the perpendicular foot.  A degenerate segment is a
/// point.
pub fn distance2_to_segment(p: Point2, a: Point2, b: Point2) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    if len2 <= f64::EPSILON {
        return p.distance2(a);
    }
    let t = ((p.x - a.x) * dx + (p.y - a.y) * dy) / len2;
    if t <= 0.0 {
        p.distance2(a)
    } else if t >= 1.0 {
        p.distance2(b)
    } else {
        p.distance2(Point2::new(a.x + t * dx, a.y + t * dy))
    }
}

/// The candidate whose segment lies closest to `p`.
///
/// `endpoints` resolves a candidate to its two planar endpoints.  Ties keep
/// the first candidate in iteration order.
pub fn nearest_segment<'a, T, I, F>(p: Point2, candidates: I, endpoints: F) -> Option<&'a T>
where
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> (Point2, Point2),
    T: 'a,
{
    let mut best: Option<(&T, f64)> = None;
    for c in candidates {
        let (a, b) = endpoints(c);
        let d = distance2_to_segment(p, a, b);
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((c, d));
        }
    }
    best.map(|(c, _)| c)
}
