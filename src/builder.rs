//! Construction of a [`BundleNetwork`] from routed edges.
//!
//! The path search hands over, for every edge, the chain of legs it was routed along. Each leg is
//! a curve between two attachments: a hub, or a terminal point on a node boundary that is not
//! part of the hub set. Terminals may only appear at either end of an edge.
//!
//! ```svgbob
//!  terminal        hub            hub          terminal
//!     o--- leg 0 ---*--- leg 1 ---*--- leg 2 ---o
//! ```
use crate::curve::{Curve, ParametricCurve};
use crate::error::BundleError;
use crate::geometry::{Point, Rect};
use crate::network::{
    Attachment, BaseSide, BundleNetwork, EdgeId, HubId, HubKind, LegRoute, SegmentId,
};
use crate::settings::BundlingSettings;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Leg {
    pub from: Attachment,
    pub to: Attachment,
    pub curve: Curve,
}

impl Leg {
    pub fn new(from: Attachment, to: Attachment, curve: Curve) -> Self {
        Self { from, to, curve }
    }
}

/// An edge as routed by the path search, before bundling.
#[derive(Debug, Clone, Default)]
pub struct RoutedEdge {
    legs: Vec<Leg>,
}

impl RoutedEdge {
    pub fn new(legs: Vec<Leg>) -> Self {
        Self { legs }
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Straight legs through `waypoints`.
    pub fn straight(waypoints: &[(Attachment, Point)]) -> Self {
        let legs = waypoints
            .windows(2)
            .map(|w| Leg::new(w[0].0, w[1].0, Curve::line(w[0].1, w[1].1)))
            .collect();
        Self { legs }
    }
}

#[derive(Debug)]
pub struct NetworkBuilder {
    network: BundleNetwork,
    edges: Vec<RoutedEdge>,
    attach_tolerance: f64,
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::with_tolerance(1e-3)
    }

    /// `attach_tolerance` bounds the distance between a leg's curve end and its attachment.
    pub fn with_tolerance(attach_tolerance: f64) -> Self {
        Self {
            network: BundleNetwork::new(),
            edges: vec![],
            attach_tolerance,
        }
    }

    pub fn from_settings(settings: &BundlingSettings) -> Self {
        Self::with_tolerance(settings.attach_tolerance)
    }

    pub fn add_steiner(&mut self, position: Point) -> HubId {
        self.network.create_hub(position, HubKind::Steiner)
    }

    pub fn add_node(&mut self, position: Point, boundary: Rect) -> HubId {
        self.network
            .create_hub(position, HubKind::Node { boundary })
    }

    /// Queues an edge. Validation happens in [`NetworkBuilder::build`].
    pub fn add_edge(&mut self, edge: RoutedEdge) -> EdgeId {
        let id = self.edges.len();
        self.edges.push(edge);
        EdgeId::from_index(id)
    }

    pub fn build(self) -> Result<BundleNetwork, BundleError> {
        let Self {
            mut network,
            edges,
            attach_tolerance,
        } = self;

        for edge in edges {
            let edge_id = network.next_edge_id();
            check_edge(&network, edge_id, &edge, attach_tolerance)?;

            let mut routes: Vec<LegRoute> = Vec::with_capacity(edge.legs.len());
            for (leg_index, leg) in edge.legs.into_iter().enumerate() {
                let curve = Arc::new(leg.curve);

                let near = match leg.from {
                    Attachment::Hub(hub) => {
                        let side = side_toward(hub, leg.to, edge_id, leg_index);
                        Some(attach(&mut network, hub, side, curve.clone(), false)?)
                    }
                    Attachment::Terminal(_) => None,
                };
                let far = match leg.to {
                    Attachment::Hub(hub) => {
                        let side = side_toward(hub, leg.from, edge_id, leg_index);
                        Some(attach(&mut network, hub, side, curve.clone(), true)?)
                    }
                    Attachment::Terminal(_) => None,
                };
                if let (Some(near), Some(far)) = (near, far) {
                    network.pair(near, far)?;
                }
                if let (Some(arriving), Some(leaving)) = (routes.last().and_then(|r| r.far), near)
                {
                    network.link_through(arriving, leaving)?;
                }

                routes.push(LegRoute {
                    from: leg.from,
                    to: leg.to,
                    curve,
                    near,
                    far,
                });
            }
            network.push_edge(routes);
        }

        network.update_directions();
        network.validate()?;

        tracing::debug!(
            hubs = network.hubs().len(),
            bases = network.bases().len(),
            segments = network.segments().len(),
            edges = network.edges().len(),
            "bundle network built"
        );
        Ok(network)
    }
}

fn side_toward(hub: HubId, far: Attachment, edge: EdgeId, leg: usize) -> BaseSide {
    match far {
        Attachment::Hub(far) if far == hub => BaseSide::SelfLoop,
        Attachment::Hub(far) => BaseSide::Toward(far),
        Attachment::Terminal(_) => BaseSide::Terminal { edge, leg },
    }
}

fn attach(
    network: &mut BundleNetwork,
    hub: HubId,
    side: BaseSide,
    curve: Arc<Curve>,
    reversed: bool,
) -> Result<SegmentId, BundleError> {
    let base = match network.find_base(hub, side) {
        Some(base) => base,
        None => network.create_bundle_base(hub, side)?,
    };
    network.create_segment(base, curve, reversed)
}

fn attachment_position(network: &BundleNetwork, attachment: Attachment) -> Result<Point, BundleError> {
    match attachment {
        Attachment::Hub(hub) => network
            .hub(hub)
            .map(|h| h.position)
            .ok_or(BundleError::UnknownHub(hub)),
        Attachment::Terminal(p) => Ok(p),
    }
}

fn check_edge(
    network: &BundleNetwork,
    edge: EdgeId,
    routed: &RoutedEdge,
    tolerance: f64,
) -> Result<(), BundleError> {
    if routed.legs.is_empty() {
        return Err(BundleError::EmptyEdge(edge));
    }

    for (leg_index, leg) in routed.legs.iter().enumerate() {
        if leg_index > 0 {
            if let Attachment::Terminal(_) = leg.from {
                return Err(BundleError::TerminalInsideEdge {
                    edge,
                    leg: leg_index,
                });
            }
            if routed.legs[leg_index - 1].to != leg.from {
                return Err(BundleError::BrokenChain {
                    edge,
                    leg: leg_index - 1,
                });
            }
        }

        let from = attachment_position(network, leg.from)?;
        let to = attachment_position(network, leg.to)?;
        let distance = from
            .distance(&leg.curve.start())
            .max(to.distance(&leg.curve.end()));
        if !(distance <= tolerance) {
            return Err(BundleError::DetachedCurve {
                edge,
                leg: leg_index,
                distance,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn two_edges_share_a_bundle() {
        let mut builder = NetworkBuilder::new();
        let h1 = builder.add_steiner(p(0.0, 0.0));
        let h2 = builder.add_steiner(p(10.0, 0.0));

        for y in [5.0, -5.0] {
            builder.add_edge(RoutedEdge::straight(&[
                (Attachment::Terminal(p(-10.0, y)), p(-10.0, y)),
                (Attachment::Hub(h1), p(0.0, 0.0)),
                (Attachment::Hub(h2), p(10.0, 0.0)),
                (Attachment::Terminal(p(20.0, y)), p(20.0, y)),
            ]));
        }

        let net = builder.build().unwrap();
        let shared = net.find_base(h1, BaseSide::Toward(h2)).unwrap();
        let back = net.find_base(h2, BaseSide::Toward(h1)).unwrap();

        assert_eq!(net.base(shared).unwrap().len(), 2);
        assert_eq!(net.base(back).unwrap().len(), 2);
        // one terminal base per edge at each hub
        assert_eq!(net.hub(h1).unwrap().bases().len(), 3);
        assert_eq!(net.segments().len(), 8);

        for id in net.base(shared).unwrap().segments() {
            let segment = net.segment(*id).unwrap();
            let other = net.segment(segment.other().unwrap()).unwrap();
            assert_eq!(other.other(), Some(*id));
            assert_eq!(net.hub_of(other.id), Some(h2));
            assert!(other.is_reversed());
            assert!(segment.through().is_some());
        }
    }

    #[test]
    fn self_loop_shares_one_base() {
        let mut builder = NetworkBuilder::new();
        let h = builder.add_node(p(0.0, 0.0), Rect::centered(p(0.0, 0.0), Size::new(2.0, 2.0)));
        let edge = builder.add_edge(RoutedEdge::new(vec![Leg::new(
            Attachment::Hub(h),
            Attachment::Hub(h),
            Curve::cubic(p(0.0, 0.0), p(10.0, 10.0), p(-10.0, 10.0), p(0.0, 0.0)),
        )]));

        let net = builder.build().unwrap();
        let base = net.find_base(h, BaseSide::SelfLoop).unwrap();
        assert_eq!(net.base(base).unwrap().len(), 2);
        let leg = &net.edge(edge).unwrap().legs()[0];
        assert_eq!(net.segment(leg.near.unwrap()).unwrap().other(), leg.far);
    }

    #[test]
    fn rejects_unknown_hub() {
        let mut builder = NetworkBuilder::new();
        let h = builder.add_steiner(p(0.0, 0.0));
        builder.add_edge(RoutedEdge::new(vec![Leg::new(
            Attachment::Hub(h),
            Attachment::Hub(HubId::from_index(9)),
            Curve::line(p(0.0, 0.0), p(1.0, 0.0)),
        )]));

        assert_eq!(
            builder.build().unwrap_err(),
            BundleError::UnknownHub(HubId::from_index(9))
        );
    }

    #[test]
    fn rejects_broken_chain() {
        let mut builder = NetworkBuilder::new();
        let h1 = builder.add_steiner(p(0.0, 0.0));
        let h2 = builder.add_steiner(p(5.0, 0.0));
        let h3 = builder.add_steiner(p(10.0, 0.0));
        builder.add_edge(RoutedEdge::new(vec![
            Leg::new(
                Attachment::Hub(h1),
                Attachment::Hub(h2),
                Curve::line(p(0.0, 0.0), p(5.0, 0.0)),
            ),
            Leg::new(
                Attachment::Hub(h3),
                Attachment::Hub(h1),
                Curve::line(p(10.0, 0.0), p(0.0, 0.0)),
            ),
        ]));

        assert!(matches!(
            builder.build(),
            Err(BundleError::BrokenChain { leg: 0, .. })
        ));
    }

    #[test]
    fn rejects_detached_curve_and_inner_terminal() {
        let mut builder = NetworkBuilder::new();
        let h1 = builder.add_steiner(p(0.0, 0.0));
        builder.add_edge(RoutedEdge::new(vec![Leg::new(
            Attachment::Hub(h1),
            Attachment::Terminal(p(5.0, 0.0)),
            Curve::line(p(0.0, 1.0), p(5.0, 0.0)),
        )]));
        assert!(matches!(
            builder.build(),
            Err(BundleError::DetachedCurve { leg: 0, .. })
        ));

        let mut builder = NetworkBuilder::new();
        let h1 = builder.add_steiner(p(0.0, 0.0));
        builder.add_edge(RoutedEdge::straight(&[
            (Attachment::Hub(h1), p(0.0, 0.0)),
            (Attachment::Terminal(p(5.0, 0.0)), p(5.0, 0.0)),
            (Attachment::Hub(h1), p(0.0, 0.0)),
        ]));
        assert!(matches!(
            builder.build(),
            Err(BundleError::TerminalInsideEdge { leg: 1, .. })
        ));
    }

    #[test]
    fn rejects_empty_edge() {
        let mut builder = NetworkBuilder::new();
        let edge = builder.add_edge(RoutedEdge::default());
        assert_eq!(builder.build().unwrap_err(), BundleError::EmptyEdge(edge));
    }
}
