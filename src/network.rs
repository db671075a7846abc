//! Bundle network: hubs, bundle bases and oriented hub segments.
//!
//! All cyclic relations (hub ↔ base ↔ segment, `other` pairs between the two ends of a leg,
//! `through` pairs between consecutive legs of an edge) are ids into arenas owned by
//! [`BundleNetwork`].
//!
//! ```svgbob
//!          base (H1 → H2)                 base (H2 → H1)
//!               |                               |
//!   T1 o----.   v                               v   .----o T3
//!            `--*=====  a  (reversed = false) ====*--'
//!          H1 *         other <-------> other       * H2
//!            .--*=====  b  (reversed = false) ====*--.
//!   T2 o----'                                         `----o T4
//! ```
use crate::boundary::BoundaryCurve;
use crate::curve::{Curve, ParametricCurve};
use crate::error::BundleError;
use crate::geometry::{clockwise_angle, Point, Rect};
use derive_more::Display;
use smallvec::SmallVec;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "{}", _0)]
pub struct HubId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "{}", _0)]
pub struct BundleBaseId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "{}", _0)]
pub struct SegmentId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "{}", _0)]
pub struct EdgeId(usize);

macro_rules! arena_id {
    ($($id:ident),*) => {
        $(
            impl $id {
                pub fn from_index(index: usize) -> Self {
                    Self(index)
                }

                pub fn index(&self) -> usize {
                    self.0
                }
            }
        )*
    };
}

arena_id!(HubId, BundleBaseId, SegmentId, EdgeId);

#[derive(Debug, Clone, PartialEq)]
pub enum HubKind {
    /// A real graph node. Its boundary is kept clear of foreign bundles.
    Node { boundary: Rect },
    /// A synthetic merge point inserted so edges can travel together.
    Steiner,
}

#[derive(Debug, Clone)]
pub struct Hub {
    pub id: HubId,
    pub position: Point,
    kind: HubKind,
    bases: SmallVec<[BundleBaseId; 4]>,
}

impl Hub {
    pub fn kind(&self) -> &HubKind {
        &self.kind
    }

    pub fn boundary(&self) -> Option<&Rect> {
        match &self.kind {
            HubKind::Node { boundary } => Some(boundary),
            HubKind::Steiner => None,
        }
    }

    pub fn bases(&self) -> impl ExactSizeIterator<Item = BundleBaseId> + '_ {
        self.bases.iter().copied()
    }
}

/// The face of a hub a bundle base serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseSide {
    /// Segments running to a neighbouring hub.
    Toward(HubId),
    /// A single leg ending at a terminal point that is not a hub.
    Terminal { edge: EdgeId, leg: usize },
    /// Both ends of legs that leave and re-enter the same hub.
    SelfLoop,
}

#[derive(Debug, Clone)]
pub struct BundleBase {
    pub id: BundleBaseId,
    pub hub: HubId,
    pub side: BaseSide,
    direction: Point,
    degenerate: bool,
    // ordered left to right; position == segment index
    segments: Vec<SegmentId>,
    spacing: Option<f64>,
    tight: Option<BoundaryCurve>,
    loose: Option<BoundaryCurve>,
}

impl BundleBase {
    /// Unit vector pointing away from the hub along this base.
    pub fn direction(&self) -> Point {
        self.direction
    }

    /// `true` if no meaningful direction could be derived from the geometry.
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    pub fn segments(&self) -> &[SegmentId] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Spacing between neighbouring members at the hub, once boundaries are computed.
    pub fn spacing(&self) -> Option<f64> {
        self.spacing
    }

    pub fn tight_curve(&self) -> Option<&BoundaryCurve> {
        self.tight.as_ref()
    }

    pub fn loose_curve(&self) -> Option<&BoundaryCurve> {
        self.loose.as_ref()
    }

    /// Signed lateral offset of the member at `index`; positive is left of `direction`.
    pub fn lateral_offset(&self, index: usize, spacing: f64) -> f64 {
        let center = (self.segments.len() as f64 - 1.0) / 2.0;
        (center - index as f64) * spacing
    }
}

/// A curve segment as seen from one of the hubs it attaches to.
#[derive(Debug, Clone)]
pub struct OrientedHubSegment {
    pub id: SegmentId,
    segment: Arc<Curve>,
    reversed: bool,
    index: usize,
    bundle_base: BundleBaseId,
    other: Option<SegmentId>,
    through: Option<SegmentId>,
}

impl OrientedHubSegment {
    pub fn segment(&self) -> &Arc<Curve> {
        &self.segment
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn bundle_base(&self) -> BundleBaseId {
        self.bundle_base
    }

    /// The view of the same leg from the opposite hub.
    pub fn other(&self) -> Option<SegmentId> {
        self.other
    }

    /// The segment continuing the same edge through this hub.
    pub fn through(&self) -> Option<SegmentId> {
        self.through
    }

    /// Unit tangent leaving the hub.
    pub fn hub_tangent(&self) -> Option<Point> {
        self.tangent(0.0)
    }
}

impl ParametricCurve for OrientedHubSegment {
    fn par_end(&self) -> f64 {
        self.segment.par_end()
    }

    fn evaluate(&self, t: f64) -> Point {
        if self.reversed {
            self.segment.evaluate(self.segment.par_end() - t)
        } else {
            self.segment.evaluate(t)
        }
    }

    fn derivative(&self, t: f64) -> Point {
        if self.reversed {
            -self.segment.derivative(self.segment.par_end() - t)
        } else {
            self.segment.derivative(t)
        }
    }

    fn start(&self) -> Point {
        if self.reversed {
            self.segment.end()
        } else {
            self.segment.start()
        }
    }

    fn end(&self) -> Point {
        if self.reversed {
            self.segment.start()
        } else {
            self.segment.end()
        }
    }
}

/// Where one end of a leg attaches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attachment {
    Hub(HubId),
    /// A node boundary attachment point outside the hub set.
    Terminal(Point),
}

impl Attachment {
    pub fn hub(&self) -> Option<HubId> {
        match self {
            Attachment::Hub(id) => Some(*id),
            Attachment::Terminal(_) => None,
        }
    }
}

/// One leg of an edge with the oriented segments it produced.
#[derive(Debug, Clone)]
pub struct LegRoute {
    pub from: Attachment,
    pub to: Attachment,
    pub curve: Arc<Curve>,
    /// Segment at the `from` hub.
    pub near: Option<SegmentId>,
    /// Segment at the `to` hub.
    pub far: Option<SegmentId>,
}

#[derive(Debug, Clone)]
pub struct EdgeRoute {
    pub id: EdgeId,
    legs: Vec<LegRoute>,
}

impl EdgeRoute {
    pub fn legs(&self) -> &[LegRoute] {
        &self.legs
    }
}

#[derive(Debug, Clone, Default)]
pub struct BundleNetwork {
    hubs: Vec<Hub>,
    bases: Vec<BundleBase>,
    segments: Vec<OrientedHubSegment>,
    edges: Vec<EdgeRoute>,
}

impl BundleNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Get an entity

    pub fn hub(&self, id: HubId) -> Option<&Hub> {
        self.hubs.get(id.0)
    }

    pub fn base(&self, id: BundleBaseId) -> Option<&BundleBase> {
        self.bases.get(id.0)
    }

    pub fn segment(&self, id: SegmentId) -> Option<&OrientedHubSegment> {
        self.segments.get(id.0)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&EdgeRoute> {
        self.edges.get(id.0)
    }

    pub fn hubs(&self) -> impl ExactSizeIterator<Item = &Hub> {
        self.hubs.iter()
    }

    pub fn bases(&self) -> impl ExactSizeIterator<Item = &BundleBase> {
        self.bases.iter()
    }

    pub fn segments(&self) -> impl ExactSizeIterator<Item = &OrientedHubSegment> {
        self.segments.iter()
    }

    pub fn edges(&self) -> impl ExactSizeIterator<Item = &EdgeRoute> {
        self.edges.iter()
    }

    /// Hub a segment is attached to.
    pub fn hub_of(&self, id: SegmentId) -> Option<HubId> {
        let segment = self.segment(id)?;
        self.base(segment.bundle_base).map(|b| b.hub)
    }

    pub fn find_base(&self, hub: HubId, side: BaseSide) -> Option<BundleBaseId> {
        self.hub(hub)?
            .bases()
            .find(|b| self.bases[b.0].side == side)
    }

    /// Bases of `hub` in clockwise order of their directions, starting from `+y`.
    ///
    /// Sweeping clockwise around the hub visits the members of each base in index order, so this
    /// is the cyclic order of all segment ends around the hub.
    pub fn periphery(&self, hub: HubId) -> Vec<BundleBaseId> {
        let Some(hub) = self.hub(hub) else { return vec![] };
        let reference = Point::new(0.0, 1.0);
        let mut bases: Vec<BundleBaseId> = hub.bases().collect();

        bases.sort_by(|a, b| {
            let ta = clockwise_angle(reference, self.bases[a.0].direction);
            let tb = clockwise_angle(reference, self.bases[b.0].direction);
            ta.total_cmp(&tb).then(a.cmp(b))
        });
        bases
    }

    /// Displacement of a segment's start from the hub centre line, given the spacing to use when
    /// its base has no computed spacing yet.
    pub fn offset_vector(&self, id: SegmentId, default_spacing: f64) -> Point {
        let Some(segment) = self.segment(id) else { return Point::zero() };
        let Some(base) = self.base(segment.bundle_base) else { return Point::zero() };
        let spacing = base.spacing.unwrap_or(default_spacing);

        base.direction.left_normal() * base.lateral_offset(segment.index, spacing)
    }

    // -- Create an entity

    pub fn create_hub(&mut self, position: Point, kind: HubKind) -> HubId {
        let id = HubId(self.hubs.len());

        self.hubs.push(Hub {
            id,
            position,
            kind,
            bases: SmallVec::new(),
        });
        id
    }

    pub fn create_bundle_base(
        &mut self,
        hub: HubId,
        side: BaseSide,
    ) -> Result<BundleBaseId, BundleError> {
        if self.hub(hub).is_none() {
            return Err(BundleError::UnknownHub(hub));
        }
        if let BaseSide::Toward(far) = side {
            if self.hub(far).is_none() {
                return Err(BundleError::UnknownHub(far));
            }
        }

        let id = BundleBaseId(self.bases.len());
        self.bases.push(BundleBase {
            id,
            hub,
            side,
            direction: Point::new(1.0, 0.0),
            degenerate: true,
            segments: vec![],
            spacing: None,
            tight: None,
            loose: None,
        });
        self.hubs[hub.0].bases.push(id);
        Ok(id)
    }

    /// Appends a segment to the right end of `base`.
    pub fn create_segment(
        &mut self,
        base: BundleBaseId,
        segment: Arc<Curve>,
        reversed: bool,
    ) -> Result<SegmentId, BundleError> {
        let Some(bundle_base) = self.bases.get_mut(base.0) else {
            return Err(BundleError::UnknownBase(base));
        };
        let id = SegmentId(self.segments.len());

        self.segments.push(OrientedHubSegment {
            id,
            segment,
            reversed,
            index: bundle_base.segments.len(),
            bundle_base: base,
            other: None,
            through: None,
        });
        bundle_base.segments.push(id);
        Ok(id)
    }

    /// Makes `a` and `b` the two views of one leg.
    pub fn pair(&mut self, a: SegmentId, b: SegmentId) -> Result<(), BundleError> {
        for id in [a, b] {
            if self.segment(id).is_none() {
                return Err(BundleError::UnknownSegment(id));
            }
        }
        self.segments[a.0].other = Some(b);
        self.segments[b.0].other = Some(a);
        Ok(())
    }

    /// Sets one side of the `other` relation only. [`BundleNetwork::validate`] rejects the result
    /// unless the counterpart is set as well.
    pub fn set_other(&mut self, id: SegmentId, other: Option<SegmentId>) -> Result<(), BundleError> {
        let Some(segment) = self.segments.get_mut(id.0) else {
            return Err(BundleError::UnknownSegment(id));
        };
        segment.other = other;
        Ok(())
    }

    /// Marks `a` (arriving) and `b` (leaving) as consecutive legs of one edge through a hub.
    pub fn link_through(&mut self, a: SegmentId, b: SegmentId) -> Result<(), BundleError> {
        for id in [a, b] {
            if self.segment(id).is_none() {
                return Err(BundleError::UnknownSegment(id));
            }
        }
        if self.hub_of(a) != self.hub_of(b) {
            return Err(BundleError::BrokenThrough(a, b));
        }
        self.segments[a.0].through = Some(b);
        self.segments[b.0].through = Some(a);
        Ok(())
    }

    pub(crate) fn push_edge(&mut self, legs: Vec<LegRoute>) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(EdgeRoute { id, legs });
        id
    }

    pub(crate) fn next_edge_id(&self) -> EdgeId {
        EdgeId(self.edges.len())
    }

    // -- Mutate

    /// Replaces the order of `base` and re-indexes its members `0..n`.
    ///
    /// `order` must be a permutation of the current members; anything else is ignored.
    pub(crate) fn set_order(&mut self, base: BundleBaseId, order: &[SegmentId]) {
        let Some(bundle_base) = self.bases.get_mut(base.0) else { return };
        if order.len() != bundle_base.segments.len() {
            return;
        }
        let mut sorted_new = order.to_vec();
        let mut sorted_old = bundle_base.segments.clone();
        sorted_new.sort();
        sorted_old.sort();
        if sorted_new != sorted_old {
            return;
        }

        bundle_base.segments = order.to_vec();
        for (index, id) in order.iter().enumerate() {
            self.segments[id.0].index = index;
        }
    }

    pub(crate) fn set_boundaries(
        &mut self,
        base: BundleBaseId,
        spacing: f64,
        tight: BoundaryCurve,
        loose: BoundaryCurve,
    ) {
        let Some(bundle_base) = self.bases.get_mut(base.0) else { return };
        bundle_base.spacing = Some(spacing);
        bundle_base.tight = Some(tight);
        bundle_base.loose = Some(loose);
    }

    /// Derives each base's outward direction from the hub geometry.
    ///
    /// A base toward another hub points at it. Otherwise, or when both hubs coincide, the mean of
    /// the member tangents is used. If that vanishes as well the base keeps `+x` and is flagged
    /// degenerate.
    pub fn update_directions(&mut self) {
        for i in 0..self.bases.len() {
            let base = &self.bases[i];
            let hub_position = self.hubs[base.hub.0].position;

            let toward = match base.side {
                BaseSide::Toward(far) => (self.hubs[far.0].position - hub_position).normalize(),
                _ => None,
            };
            let direction = toward.or_else(|| {
                base.segments
                    .iter()
                    .filter_map(|s| self.segments[s.0].hub_tangent())
                    .fold(Point::zero(), |acc, t| acc + t)
                    .normalize()
            });

            let base = &mut self.bases[i];
            match direction {
                Some(d) => {
                    base.direction = d;
                    base.degenerate = false;
                }
                None => {
                    tracing::warn!(base = %base.id, hub = %base.hub, "bundle base has no direction");
                    base.direction = Point::new(1.0, 0.0);
                    base.degenerate = true;
                }
            }
        }
    }

    /// Checks the structural invariants of the arenas.
    pub fn validate(&self) -> Result<(), BundleError> {
        for hub in &self.hubs {
            for base in hub.bases() {
                match self.base(base) {
                    Some(b) if b.hub == hub.id => {}
                    _ => return Err(BundleError::UnknownBase(base)),
                }
            }
        }

        for base in &self.bases {
            if self.hub(base.hub).is_none() {
                return Err(BundleError::UnknownHub(base.hub));
            }
            for (position, id) in base.segments.iter().enumerate() {
                let Some(segment) = self.segment(*id) else {
                    return Err(BundleError::UnknownSegment(*id));
                };
                if segment.bundle_base != base.id || segment.index != position {
                    return Err(BundleError::BrokenIndexOrder(base.id));
                }
            }
        }

        for segment in &self.segments {
            let listed = self
                .base(segment.bundle_base)
                .and_then(|b| b.segments.get(segment.index));
            if listed != Some(&segment.id) {
                return Err(BundleError::MisplacedSegment {
                    segment: segment.id,
                    base: segment.bundle_base,
                    index: segment.index,
                });
            }

            if let Some(other) = segment.other {
                let Some(o) = self.segment(other) else {
                    return Err(BundleError::DanglingOther(segment.id, other));
                };
                if o.other != Some(segment.id) {
                    return Err(BundleError::AsymmetricOther(segment.id, other));
                }
                // only the two ends of a self-loop share a hub
                let self_loop = self
                    .base(segment.bundle_base)
                    .map_or(false, |b| b.side == BaseSide::SelfLoop);
                if !Arc::ptr_eq(&segment.segment, &o.segment)
                    || segment.reversed == o.reversed
                    || (self.hub_of(segment.id) == self.hub_of(other) && !self_loop)
                {
                    return Err(BundleError::MismatchedOther(segment.id, other));
                }
            }

            if let Some(through) = segment.through {
                let Some(t) = self.segment(through) else {
                    return Err(BundleError::DanglingOther(segment.id, through));
                };
                if t.through != Some(segment.id) {
                    return Err(BundleError::AsymmetricOther(segment.id, through));
                }
                if self.hub_of(segment.id) != self.hub_of(through) {
                    return Err(BundleError::BrokenThrough(segment.id, through));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(a: (f64, f64), b: (f64, f64)) -> Arc<Curve> {
        Arc::new(Curve::line(Point::new(a.0, a.1), Point::new(b.0, b.1)))
    }

    #[test]
    fn build_network() {
        let mut net = BundleNetwork::new();
        let h1 = net.create_hub(Point::new(0.0, 0.0), HubKind::Steiner);
        let h2 = net.create_hub(Point::new(10.0, 0.0), HubKind::Steiner);

        let b1 = net.create_bundle_base(h1, BaseSide::Toward(h2)).unwrap();
        let b2 = net.create_bundle_base(h2, BaseSide::Toward(h1)).unwrap();

        let curve = line((0.0, 0.0), (10.0, 0.0));
        let a = net.create_segment(b1, curve.clone(), false).unwrap();
        let b = net.create_segment(b2, curve.clone(), true).unwrap();
        net.pair(a, b).unwrap();
        net.update_directions();

        assert!(net.validate().is_ok());
        assert_eq!(net.find_base(h1, BaseSide::Toward(h2)), Some(b1));
        assert_eq!(net.hub_of(b), Some(h2));
        assert_eq!(net.base(b2).unwrap().direction(), Point::new(-1.0, 0.0));

        // both views share the curve
        let sa = net.segment(a).unwrap();
        let sb = net.segment(b).unwrap();
        assert!(Arc::ptr_eq(sa.segment(), sb.segment()));
        assert_eq!(sa.start(), sb.end());
        assert_eq!(sa.end(), sb.start());
        assert_eq!(sb.evaluate(2.5 / 10.0), Point::new(7.5, 0.0));
        assert_eq!(sb.hub_tangent(), Some(Point::new(-1.0, 0.0)));
    }

    #[test]
    fn unknown_hub() {
        let mut net = BundleNetwork::new();
        let h1 = net.create_hub(Point::zero(), HubKind::Steiner);
        let err = net
            .create_bundle_base(h1, BaseSide::Toward(HubId(7)))
            .unwrap_err();

        assert_eq!(err, BundleError::UnknownHub(HubId(7)));
        assert_eq!(err.to_string(), "hub `7` is not part of the network");
    }

    #[test]
    fn asymmetric_other_is_rejected() {
        let mut net = BundleNetwork::new();
        let h1 = net.create_hub(Point::zero(), HubKind::Steiner);
        let h2 = net.create_hub(Point::new(5.0, 0.0), HubKind::Steiner);
        let b1 = net.create_bundle_base(h1, BaseSide::Toward(h2)).unwrap();
        let b2 = net.create_bundle_base(h2, BaseSide::Toward(h1)).unwrap();
        let curve = line((0.0, 0.0), (5.0, 0.0));
        let a = net.create_segment(b1, curve.clone(), false).unwrap();
        let b = net.create_segment(b2, curve, true).unwrap();

        net.set_other(a, Some(b)).unwrap();
        assert_eq!(net.validate(), Err(BundleError::AsymmetricOther(a, b)));

        net.set_other(a, Some(SegmentId(42))).unwrap();
        assert_eq!(
            net.validate(),
            Err(BundleError::DanglingOther(a, SegmentId(42)))
        );

        net.pair(a, b).unwrap();
        assert!(net.validate().is_ok());
    }

    #[test]
    fn pairs_must_share_one_curve() {
        let mut net = BundleNetwork::new();
        let h1 = net.create_hub(Point::zero(), HubKind::Steiner);
        let h2 = net.create_hub(Point::new(10.0, 0.0), HubKind::Steiner);
        let b1 = net.create_bundle_base(h1, BaseSide::Toward(h2)).unwrap();
        let b2 = net.create_bundle_base(h2, BaseSide::Toward(h1)).unwrap();

        // two unrelated curves, neither reversed
        let a = net
            .create_segment(b1, line((0.0, 0.0), (10.0, 0.0)), false)
            .unwrap();
        let b = net
            .create_segment(b2, line((0.0, 50.0), (10.0, 50.0)), false)
            .unwrap();
        net.pair(a, b).unwrap();
        assert_eq!(net.validate(), Err(BundleError::MismatchedOther(a, b)));

        // one curve, but both views run the same way
        let curve = line((0.0, 0.0), (10.0, 0.0));
        let c = net.create_segment(b1, curve.clone(), false).unwrap();
        let d = net.create_segment(b2, curve.clone(), false).unwrap();
        net.pair(c, d).unwrap();
        net.set_other(a, None).unwrap();
        net.set_other(b, None).unwrap();
        assert_eq!(net.validate(), Err(BundleError::MismatchedOther(c, d)));

        // one curve, opposite views, but both at the same hub outside a self-loop
        let e = net.create_segment(b1, curve.clone(), true).unwrap();
        net.pair(c, e).unwrap();
        net.set_other(d, None).unwrap();
        assert_eq!(net.validate(), Err(BundleError::MismatchedOther(c, e)));

        // a self-loop may pair both ends at one hub
        let loops = net.create_bundle_base(h1, BaseSide::SelfLoop).unwrap();
        let ring = line((0.0, 0.0), (0.0, 0.0));
        let f = net.create_segment(loops, ring.clone(), false).unwrap();
        let g = net.create_segment(loops, ring, true).unwrap();
        net.pair(f, g).unwrap();
        net.set_other(c, None).unwrap();
        net.set_other(e, None).unwrap();
        assert!(net.validate().is_ok());
    }

    #[test]
    fn reorder_reindexes() {
        let mut net = BundleNetwork::new();
        let h1 = net.create_hub(Point::zero(), HubKind::Steiner);
        let h2 = net.create_hub(Point::new(5.0, 0.0), HubKind::Steiner);
        let b1 = net.create_bundle_base(h1, BaseSide::Toward(h2)).unwrap();
        let ids: Vec<_> = (0..3)
            .map(|i| {
                let y = i as f64;
                net.create_segment(b1, line((0.0, y), (5.0, y)), false)
                    .unwrap()
            })
            .collect();

        net.set_order(b1, &[ids[2], ids[0], ids[1]]);
        assert_eq!(net.segment(ids[2]).unwrap().index(), 0);
        assert_eq!(net.segment(ids[0]).unwrap().index(), 1);
        assert_eq!(net.segment(ids[1]).unwrap().index(), 2);
        assert!(net.validate().is_ok());

        // not a permutation: ignored
        net.set_order(b1, &[ids[0], ids[0], ids[1]]);
        assert_eq!(net.base(b1).unwrap().segments(), &[ids[2], ids[0], ids[1]]);
    }

    #[test]
    fn lateral_offsets_are_centered() {
        let mut net = BundleNetwork::new();
        let h1 = net.create_hub(Point::zero(), HubKind::Steiner);
        let h2 = net.create_hub(Point::new(5.0, 0.0), HubKind::Steiner);
        let b1 = net.create_bundle_base(h1, BaseSide::Toward(h2)).unwrap();
        let ids: Vec<_> = (0..3)
            .map(|_| {
                net.create_segment(b1, line((0.0, 0.0), (5.0, 0.0)), false)
                    .unwrap()
            })
            .collect();
        net.update_directions();

        // direction +x, left is +y: index 0 is the leftmost
        assert_eq!(net.offset_vector(ids[0], 2.0), Point::new(0.0, 2.0));
        assert_eq!(net.offset_vector(ids[1], 2.0), Point::zero());
        assert_eq!(net.offset_vector(ids[2], 2.0), Point::new(0.0, -2.0));
    }
}
