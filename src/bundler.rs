//! Bundling engine
//!
//! A bundling pass runs in three stages over a validated [`BundleNetwork`]:
//!
//! ```svgbob
//!  +----------------+    +--------------------+    +------------------+
//!  | order segments |--->| compute boundaries |--->| assemble splines |
//!  +----------------+    +--------------------+    +------------------+
//!     orders bases          tight/loose rails         one curve per edge
//! ```
//!
//! Each stage only reads what the previous ones wrote: boundaries depend on the final orders,
//! and splines on the orders and on the spacing chosen for each base.
use crate::boundary::{self, BoundaryCurve, ClearanceConflict};
use crate::error::BundleError;
use crate::network::{BundleBaseId, BundleNetwork, HubId};
use crate::ordering::{self, OrderingReport};
use crate::settings::BundlingSettings;
use crate::spline::{self, EdgeCurve};

pub trait BundlingEngine {
    /// Assign the left-to-right order of every bundle base.
    ///
    /// The engine must leave every base indexed `0..n` without gaps.
    fn order_segments(&mut self, network: &mut BundleNetwork) -> OrderingReport;

    /// Compute the tight and loose boundary curves of every non-empty base.
    fn compute_boundaries(&mut self, network: &mut BundleNetwork);

    /// Build one continuous curve per edge.
    fn assemble_splines(&mut self, network: &BundleNetwork) -> Vec<EdgeCurve>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct BaseBoundary {
    pub hub: HubId,
    pub base: BundleBaseId,
    pub tight: BoundaryCurve,
    pub loose: BoundaryCurve,
}

/// Result of a bundling pass.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleLayout {
    pub edges: Vec<EdgeCurve>,
    pub boundaries: Vec<BaseBoundary>,
    pub report: OrderingReport,
    /// Loose boundaries running into foreign nodes. Reported, not resolved.
    pub conflicts: Vec<ClearanceConflict>,
}

#[derive(Debug, Clone, Default)]
pub struct HubBundler {
    settings: BundlingSettings,
}

impl HubBundler {
    pub fn new(settings: BundlingSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &BundlingSettings {
        &self.settings
    }

    /// Runs all stages on `network`.
    #[tracing::instrument(skip_all)]
    pub fn run(&mut self, network: &mut BundleNetwork) -> Result<BundleLayout, BundleError> {
        network.validate()?;
        network.update_directions();

        let report = self.order_segments(network);
        self.compute_boundaries(network);
        let edges = self.assemble_splines(network);

        let boundaries = network
            .bases()
            .filter_map(|b| {
                Some(BaseBoundary {
                    hub: b.hub,
                    base: b.id,
                    tight: b.tight_curve()?.clone(),
                    loose: b.loose_curve()?.clone(),
                })
            })
            .collect();

        let conflicts = boundary::clearance_conflicts(network);
        if !conflicts.is_empty() {
            tracing::warn!(
                conflicts = conflicts.len(),
                "loose boundaries run into foreign nodes"
            );
        }

        Ok(BundleLayout {
            edges,
            boundaries,
            report,
            conflicts,
        })
    }
}

impl BundlingEngine for HubBundler {
    fn order_segments(&mut self, network: &mut BundleNetwork) -> OrderingReport {
        ordering::order_network(network, &self.settings)
    }

    fn compute_boundaries(&mut self, network: &mut BundleNetwork) {
        boundary::compute_boundaries(network, &self.settings);
    }

    fn assemble_splines(&mut self, network: &BundleNetwork) -> Vec<EdgeCurve> {
        spline::assemble_splines(network, &self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{NetworkBuilder, RoutedEdge};
    use crate::curve::Curve;
    use crate::geometry::Point;
    use crate::network::{Attachment, BaseSide, HubKind, SegmentId};
    use crate::settings::BundlingSettingsBuilder;
    use std::sync::Arc;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn run_all_stages() {
        let mut builder = NetworkBuilder::new();
        let h1 = builder.add_steiner(p(0.0, 0.0));
        let h2 = builder.add_steiner(p(30.0, 0.0));
        for y in [8.0, 0.0, -8.0] {
            builder.add_edge(RoutedEdge::straight(&[
                (Attachment::Terminal(p(-15.0, y)), p(-15.0, y)),
                (Attachment::Hub(h1), p(0.0, 0.0)),
                (Attachment::Hub(h2), p(30.0, 0.0)),
                (Attachment::Terminal(p(45.0, y)), p(45.0, y)),
            ]));
        }
        let mut net = builder.build().unwrap();
        let mut bundler = HubBundler::new(
            BundlingSettingsBuilder::default()
                .parallel(false)
                .build()
                .unwrap(),
        );

        let layout = bundler.run(&mut net).unwrap();

        assert_eq!(layout.edges.len(), 3);
        assert_eq!(layout.report.crossings, 0);
        assert_eq!(layout.boundaries.len(), net.bases().len());
        assert!(layout.conflicts.is_empty());

        let shared = net.find_base(h1, BaseSide::Toward(h2)).unwrap();
        let boundary = layout
            .boundaries
            .iter()
            .find(|b| b.base == shared)
            .unwrap();
        assert_eq!(boundary.hub, h1);
        assert!(boundary.tight.is_simple());
        assert!(boundary.loose.is_simple());

        for curve in &layout.edges {
            assert!(curve.path.max_gap() < 1e-9);
            for angle in curve.path.join_angles() {
                assert!(angle <= bundler.settings().smoothing_tolerance + 1e-12);
            }
        }
    }

    #[test]
    fn rejects_invalid_network() {
        let mut net = BundleNetwork::new();
        let h1 = net.create_hub(p(0.0, 0.0), HubKind::Steiner);
        let h2 = net.create_hub(p(5.0, 0.0), HubKind::Steiner);
        let base = net.create_bundle_base(h1, BaseSide::Toward(h2)).unwrap();
        let a = net
            .create_segment(base, Arc::new(Curve::line(p(0.0, 0.0), p(5.0, 0.0))), false)
            .unwrap();
        net.set_other(a, Some(SegmentId::from_index(9))).unwrap();

        let err = HubBundler::default().run(&mut net).unwrap_err();
        assert_eq!(err, BundleError::DanglingOther(a, SegmentId::from_index(9)));
    }

    #[test]
    fn engine_stages_can_run_separately() {
        let mut builder = NetworkBuilder::new();
        let h1 = builder.add_steiner(p(0.0, 0.0));
        let h2 = builder.add_steiner(p(20.0, 0.0));
        builder.add_edge(RoutedEdge::straight(&[
            (Attachment::Hub(h1), p(0.0, 0.0)),
            (Attachment::Hub(h2), p(20.0, 0.0)),
        ]));
        let mut net = builder.build().unwrap();

        let mut engine: Box<dyn BundlingEngine> = Box::new(HubBundler::default());
        let report = engine.order_segments(&mut net);
        assert_eq!(report.components, 1);
        engine.compute_boundaries(&mut net);
        assert!(net.bases().all(|b| b.tight_curve().is_some()));
        assert_eq!(engine.assemble_splines(&net).len(), 1);
    }
}
