//! Placement resolver: where the overlay goes relative to the selection.
//!
//! Four candidates are tried in a fixed order (below, above, right, left),
//! each clamped into the viewport. Each candidate is scored by how much of
//! it is covered by the page's own layered elements, and the least covered
//! one wins. A candidate with no coverage at all ends the search early.

use std::collections::HashSet;

use super::geometry::{Point, Rect, Size, Viewport};
use super::host::{ElementKey, OcclusionProbe};

// --- CANDIDATES ---

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Below,
    Above,
    Right,
    Left,
}

impl Side {
    /// Generation order, which is also the tie-break order.
    pub const ORDER: [Side; 4] = [Side::Below, Side::Above, Side::Right, Side::Left];
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementRequest {
    /// Selection reference rect in viewport coordinates.
    pub anchor: Rect,
    /// Measured overlay size.
    pub overlay: Size,
    pub viewport: Viewport,
    pub offset: f64,
    pub margin: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementCandidate {
    pub side: Side,
    pub rect: Rect,
    /// Total area of the candidate covered by other elements.
    pub overlap: f64,
}

impl PlacementCandidate {
    pub fn position(&self) -> Point {
        self.rect.origin()
    }
}

/// Clamp one axis so `[start, start + len]` stays inside `[margin, extent - margin]`.
/// When the overlay is larger than the available span it is pinned to the margin.
pub fn clamp_axis(start: f64, len: f64, extent: f64, margin: f64) -> f64 {
    let max = extent - margin - len;
    if max < margin {
        return margin;
    }
    start.clamp(margin, max)
}

pub fn candidate_rect(side: Side, req: &PlacementRequest) -> Rect {
    let a = req.anchor;
    let o = req.overlay;
    let (left, top) = match side {
        Side::Below => (a.left + a.width / 2.0 - o.width / 2.0, a.bottom() + req.offset),
        Side::Above => (
            a.left + a.width / 2.0 - o.width / 2.0,
            a.top - req.offset - o.height,
        ),
        Side::Right => (a.right() + req.offset, a.top + a.height / 2.0 - o.height / 2.0),
        Side::Left => (
            a.left - req.offset - o.width,
            a.top + a.height / 2.0 - o.height / 2.0,
        ),
    };
    Rect::new(
        clamp_axis(left, o.width, req.viewport.width, req.margin),
        clamp_axis(top, o.height, req.viewport.height, req.margin),
        o.width,
        o.height,
    )
}

// --- SCORING ---

/// How badly a candidate rect is covered by the page.
///
/// The resolver only depends on this trait, so the point-sampling heuristic
/// below can be swapped for an exact hit test without touching the
/// lifecycle code.
pub trait OverlapScorer {
    fn score(&mut self, candidate: &Rect) -> f64;
}

impl<F> OverlapScorer for F
where
    F: FnMut(&Rect) -> f64,
{
    fn score(&mut self, candidate: &Rect) -> f64 {
        self(candidate)
    }
}

/// The four corners inset by one pixel, then the center.
pub fn sample_points(rect: &Rect) -> [Point; 5] {
    let (l, t, r, b) = (rect.left + 1.0, rect.top + 1.0, rect.right() - 1.0, rect.bottom() - 1.0);
    [
        Point::new(l, t),
        Point::new(r, t),
        Point::new(l, b),
        Point::new(r, b),
        rect.center(),
    ]
}

/// Scores a candidate by sampling a handful of points and summing the
/// intersection area with every distinct occluder found there.
pub struct SampledOverlapScorer<'a, P: ?Sized> {
    probe: &'a mut P,
}

impl<'a, P: OcclusionProbe + ?Sized> SampledOverlapScorer<'a, P> {
    pub fn new(probe: &'a mut P) -> Self {
        Self { probe }
    }
}

impl<P: OcclusionProbe + ?Sized> OverlapScorer for SampledOverlapScorer<'_, P> {
    fn score(&mut self, candidate: &Rect) -> f64 {
        let mut seen: HashSet<ElementKey> = HashSet::new();
        let mut total = 0.0;
        for point in sample_points(candidate) {
            for hit in self.probe.hits_at(point) {
                if !hit.occludes() || !seen.insert(hit.key) {
                    continue;
                }
                total += candidate.intersection_area(&hit.rect);
            }
        }
        total
    }
}

// --- RESOLUTION ---

pub fn resolve_placement(req: &PlacementRequest, scorer: &mut dyn OverlapScorer) -> PlacementCandidate {
    let mut best: Option<PlacementCandidate> = None;
    for side in Side::ORDER {
        let rect = candidate_rect(side, req);
        let overlap = scorer.score(&rect);
        let candidate = PlacementCandidate { side, rect, overlap };
        if overlap <= 0.0 {
            return candidate;
        }
        // strict comparison keeps the earlier side on ties
        if best.map_or(true, |b| overlap < b.overlap) {
            best = Some(candidate);
        }
    }
    // ORDER is non-empty, so `best` is always set by now
    best.unwrap_or(PlacementCandidate {
        side: Side::Below,
        rect: candidate_rect(Side::Below, req),
        overlap: f64::INFINITY,
    })
}
