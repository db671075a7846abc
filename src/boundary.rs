//! Boundary curves of bundle bases
//!
//! Near its hub a bundle is enclosed by two rails. The *tight* rails hug the outermost members;
//! the *loose* rails sit `clearance` further out and are kept clear of foreign node boundaries.
//!
//! ```svgbob
//!          loose.left  .---------------------------
//!          tight.left  .---------------------------
//!                     /   member 0
//!        hub  *------+    member 1         ---> direction
//!                     \   member 2
//!          tight.right `---------------------------
//!          loose.right `---------------------------
//! ```
//!
//! Where the bundle curves tightly the member spacing shrinks so that the rails on the inner side
//! do not fold over themselves; it never drops below `min_spacing`.
use crate::curve::{ParametricCurve, Polyline};
use crate::geometry::{angle_between, Point, Rect};
use crate::network::{BundleBaseId, BundleNetwork, HubId};
use crate::settings::BundlingSettings;
use rayon::prelude::*;
use smallvec::{smallvec, SmallVec};

/// Two rails running from the hub outward.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundaryCurve {
    left: Polyline,
    right: Polyline,
}

impl BoundaryCurve {
    pub fn new(left: Polyline, right: Polyline) -> Self {
        Self { left, right }
    }

    pub fn left(&self) -> &Polyline {
        &self.left
    }

    pub fn right(&self) -> &Polyline {
        &self.right
    }

    /// Closed outline: out along the left rail, back along the right one.
    pub fn outline(&self) -> Vec<Point> {
        let mut outline = self.left.points().to_vec();
        outline.extend(self.right.points().iter().rev());
        if let Some(first) = outline.first().copied() {
            outline.push(first);
        }
        outline
    }

    /// Neither rail crosses itself, and the rails do not cross each other.
    pub fn is_simple(&self) -> bool {
        let left = self.left.points();
        let right = self.right.points();

        !self_crossing(left)
            && !self_crossing(right)
            && !left.windows(2).any(|a| {
                right
                    .windows(2)
                    .any(|b| segments_cross(a[0], a[1], b[0], b[1]))
            })
    }
}

fn self_crossing(points: &[Point]) -> bool {
    let n = points.len();
    for i in 0..n.saturating_sub(1) {
        for j in (i + 2)..n.saturating_sub(1) {
            if segments_cross(points[i], points[i + 1], points[j], points[j + 1]) {
                return true;
            }
        }
    }
    false
}

/// Proper crossing: the segments intersect at a single point interior to both.
fn segments_cross(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let side = |a: Point, b: Point, c: Point| (b - a).cross(c - a);
    let (d1, d2) = (side(q1, q2, p1), side(q1, q2, p2));
    let (d3, d4) = (side(p1, p2, q1), side(p1, p2, q2));
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

/// Boundary of one base, before it is stored on the network.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryShape {
    /// Member spacing at the hub.
    pub spacing: f64,
    pub tight: BoundaryCurve,
    pub loose: BoundaryCurve,
}

impl BoundaryShape {
    /// Both the tight and the loose curve are simple.
    pub fn is_simple(&self) -> bool {
        self.tight.is_simple() && self.loose.is_simple()
    }
}

/// Computes the boundary curves of `base` from the current member order. `None` for an empty
/// or unknown base.
pub fn compute_base(
    network: &BundleNetwork,
    base: BundleBaseId,
    settings: &BundlingSettings,
) -> Option<BoundaryShape> {
    let bundle_base = network.base(base)?;
    let members: Vec<_> = bundle_base
        .segments()
        .iter()
        .filter_map(|id| network.segment(*id))
        .collect();
    if members.is_empty() {
        return None;
    }

    let samples = settings.boundary_samples.max(1);
    let count = members.len();
    let half = (count as f64 - 1.0) / 2.0;

    // central path and its heading
    let mut centers = Vec::with_capacity(samples + 1);
    let mut headings = Vec::with_capacity(samples + 1);
    for i in 0..=samples {
        let s = settings.boundary_extent * i as f64 / samples as f64;
        let mut center = Point::zero();
        let mut heading = Point::zero();
        for member in &members {
            let t = s * member.par_end();
            center = center + member.evaluate(t);
            if let Some(tangent) = member.tangent(t) {
                heading = heading + tangent;
            }
        }
        centers.push(center * (1.0 / count as f64));
        headings.push(heading.normalize());
    }

    let directions: Vec<Point> = (0..=samples)
        .map(|i| {
            headings[i]
                .or_else(|| {
                    let (a, b) = (i.saturating_sub(1), (i + 1).min(samples));
                    (centers[b] - centers[a]).normalize()
                })
                .unwrap_or_else(|| bundle_base.direction())
        })
        .collect();

    let curvature: Vec<f64> = (0..=samples)
        .map(|i| {
            let (a, b) = (i.saturating_sub(1), (i + 1).min(samples));
            let arc = centers[a].distance(&centers[b]);
            if arc <= f64::EPSILON {
                0.0
            } else {
                angle_between(directions[a], directions[b]) / arc
            }
        })
        .collect();

    let local: Vec<f64> = curvature
        .iter()
        .map(|k| {
            if count < 2 || *k <= 0.0 {
                return settings.spacing;
            }
            let allowed = (0.9 / k - settings.clearance) / half;
            allowed.min(settings.spacing).max(settings.min_spacing)
        })
        .collect();

    // A sharp bend narrows the bundle a little before and after it as well.
    let spacing: Vec<f64> = (0..=samples)
        .map(|i| {
            local[i.saturating_sub(2)..=(i + 2).min(samples)]
                .iter()
                .copied()
                .fold(f64::INFINITY, f64::min)
        })
        .collect();

    let mut tight = (Vec::with_capacity(samples + 1), Vec::with_capacity(samples + 1));
    let mut loose = (Vec::with_capacity(samples + 1), Vec::with_capacity(samples + 1));
    for i in 0..=samples {
        let normal = directions[i].left_normal();
        let width = half * spacing[i];
        let left = centers[i] + normal * width;
        let right = centers[i] - normal * width;

        tight.0.push(left);
        tight.1.push(right);
        loose.0.push(left + normal * settings.clearance);
        loose.1.push(right - normal * settings.clearance);
    }

    Some(BoundaryShape {
        spacing: spacing[0],
        tight: BoundaryCurve::new(Polyline::new(tight.0), Polyline::new(tight.1)),
        loose: BoundaryCurve::new(Polyline::new(loose.0), Polyline::new(loose.1)),
    })
}

/// Computes and stores the boundary curves of every non-empty base. Returns the number of bases
/// updated.
#[tracing::instrument(skip_all)]
pub fn compute_boundaries(network: &mut BundleNetwork, settings: &BundlingSettings) -> usize {
    let shapes: Vec<(BundleBaseId, Option<BoundaryShape>)> = {
        let shared = &*network;
        let ids: Vec<BundleBaseId> = shared.bases().map(|b| b.id).collect();
        let compute = |id: &BundleBaseId| (*id, compute_base(shared, *id, settings));
        if settings.parallel {
            ids.par_iter().map(compute).collect()
        } else {
            ids.iter().map(compute).collect()
        }
    };

    let mut updated = 0;
    for (id, shape) in shapes {
        let Some(shape) = shape else { continue };
        if shape.spacing < settings.spacing {
            tracing::debug!(base = %id, spacing = shape.spacing, "reduced spacing at a sharp bend");
        }
        if !shape.is_simple() {
            tracing::warn!(
                base = %id,
                tight = shape.tight.is_simple(),
                loose = shape.loose.is_simple(),
                "boundary is not simple"
            );
        }
        network.set_boundaries(id, shape.spacing, shape.tight, shape.loose);
        updated += 1;
    }
    updated
}

/// A loose boundary that runs into a node it does not belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearanceConflict {
    pub base: BundleBaseId,
    pub hub: HubId,
}

/// Checks every loose boundary against the boundaries of node hubs other than the ones its
/// members attach to.
pub fn clearance_conflicts(network: &BundleNetwork) -> Vec<ClearanceConflict> {
    let obstacles: Vec<(HubId, Rect)> = network
        .hubs()
        .filter_map(|h| h.boundary().map(|r| (h.id, *r)))
        .collect();
    if obstacles.is_empty() {
        return vec![];
    }

    let mut conflicts = vec![];
    for base in network.bases() {
        let Some(loose) = base.loose_curve() else { continue };

        let mut own: SmallVec<[HubId; 4]> = smallvec![base.hub];
        for id in base.segments() {
            let far = network
                .segment(*id)
                .and_then(|s| s.other())
                .and_then(|o| network.hub_of(o));
            if let Some(far) = far {
                if !own.contains(&far) {
                    own.push(far);
                }
            }
        }

        let outline = loose.outline();
        for (hub, rect) in &obstacles {
            if own.contains(hub) {
                continue;
            }
            if outline.windows(2).any(|w| rect.intersects_line(&w[0], &w[1])) {
                tracing::debug!(base = %base.id, hub = %hub, "loose boundary enters a node");
                conflicts.push(ClearanceConflict {
                    base: base.id,
                    hub: *hub,
                });
            }
        }
    }
    conflicts
}
