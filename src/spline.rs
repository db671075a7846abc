//! Spline assembly
//!
//! Turns every edge into one continuous chain of cubic Bezier pieces.
//!
//! ```svgbob
//!              hub                        hub
//!     o=========*==========================*=========o
//!                ^                        ^
//!     leg 0      |        leg 1           |   leg 2
//!          trimmed, bridged by a connector
//! ```
//!
//! 1. Each leg is displaced by the lateral offsets of its segments, interpolated linearly from
//!    the near hub to the far hub, so the members of a bundle run side by side.
//! 2. At every intermediate hub both legs are trimmed back by `junction_radius` and the gap is
//!    bridged by a cubic connector tangent to both.
//! 3. Each (trimmed) leg is approximated by `samples_per_leg` Hermite cubics.
//! 4. Joins whose tangent turns by more than `smoothing_tolerance` get their handles aligned.
//!
//! The endpoints of an edge are its terminal attachment points (or the offset start on a hub)
//! and are never moved by smoothing.
use crate::curve::{BezierPath, CubicBezier, Curve, ParametricCurve};
use crate::geometry::{angle_between, Point};
use crate::network::{Attachment, BundleNetwork, EdgeId, EdgeRoute, LegRoute, SegmentId};
use crate::settings::BundlingSettings;
use rayon::prelude::*;

/// Longest fraction of a leg trimmed away at one junction.
const MAX_TRIM: f64 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeCurve {
    pub edge: EdgeId,
    pub path: BezierPath,
}

/// Assembles the curves of all edges, in edge id order.
#[tracing::instrument(skip_all)]
pub fn assemble_splines(network: &BundleNetwork, settings: &BundlingSettings) -> Vec<EdgeCurve> {
    let edges: Vec<&EdgeRoute> = network.edges().collect();
    let curves: Vec<EdgeCurve> = if settings.parallel {
        edges
            .par_iter()
            .map(|e| assemble_edge(network, e, settings))
            .collect()
    } else {
        edges
            .iter()
            .map(|e| assemble_edge(network, e, settings))
            .collect()
    };

    tracing::debug!(edges = curves.len(), "assembled edge curves");
    curves
}

pub fn assemble_edge(
    network: &BundleNetwork,
    edge: &EdgeRoute,
    settings: &BundlingSettings,
) -> EdgeCurve {
    let legs = edge.legs();
    let mut path = BezierPath::default();
    let Some(last) = legs.len().checked_sub(1) else {
        return EdgeCurve {
            edge: edge.id,
            path,
        };
    };

    let pieces = settings.samples_per_leg.max(1);
    let mut previous: Option<(Point, Point)> = None;

    for (i, leg) in legs.iter().enumerate() {
        let displaced = DisplacedLeg::new(network, leg, settings);
        let trim = displaced.trim(settings.junction_radius);
        let t0 = if i > 0 { trim } else { 0.0 };
        let t1 = if i < last {
            displaced.par_end() - trim
        } else {
            displaced.par_end()
        };

        if let Some((end, velocity)) = previous {
            let start = displaced.evaluate(t0);
            if let Some(connector) = connector(end, velocity, start, displaced.derivative(t0)) {
                path.push(connector);
            }
        }

        let step = (t1 - t0) / pieces as f64;
        let params: Vec<f64> = (0..=pieces)
            .map(|j| if j == pieces { t1 } else { t0 + step * j as f64 })
            .collect();
        for w in params.windows(2) {
            path.push(CubicBezier::from_hermite(
                displaced.evaluate(w[0]),
                displaced.derivative(w[0]),
                displaced.evaluate(w[1]),
                displaced.derivative(w[1]),
                w[1] - w[0],
            ));
        }

        previous = Some((displaced.evaluate(t1), displaced.derivative(t1)));
    }

    if let Attachment::Terminal(start) = legs[0].from {
        if let Some(first) = path.pieces_mut().first_mut() {
            first.p0 = start;
        }
    }
    if let Attachment::Terminal(end) = legs[last].to {
        if let Some(last) = path.pieces_mut().last_mut() {
            last.p3 = end;
        }
    }

    let adjusted = smooth_joins(&mut path, settings.smoothing_tolerance);
    tracing::trace!(edge = %edge.id, pieces = path.pieces().len(), adjusted, "assembled edge");

    EdgeCurve {
        edge: edge.id,
        path,
    }
}

/// A leg shifted sideways by the offsets of its two segments.
struct DisplacedLeg<'a> {
    curve: &'a Curve,
    start_offset: Point,
    end_offset: Point,
}

impl<'a> DisplacedLeg<'a> {
    fn new(network: &BundleNetwork, leg: &'a LegRoute, settings: &BundlingSettings) -> Self {
        let offset = |segment: Option<SegmentId>| {
            segment.map_or(Point::zero(), |s| network.offset_vector(s, settings.spacing))
        };
        Self {
            curve: &leg.curve,
            start_offset: offset(leg.near),
            end_offset: offset(leg.far),
        }
    }

    /// Parameter length removed at a junction.
    fn trim(&self, radius: f64) -> f64 {
        let length = self.curve.approximate_length();
        if length <= 0.0 {
            return 0.0;
        }
        self.par_end() * (radius / length).min(MAX_TRIM)
    }
}

impl ParametricCurve for DisplacedLeg<'_> {
    fn par_end(&self) -> f64 {
        self.curve.par_end()
    }

    fn evaluate(&self, t: f64) -> Point {
        let par_end = self.par_end();
        let u = if par_end > 0.0 { t / par_end } else { 0.0 };
        self.curve.evaluate(t) + self.start_offset.lerp(self.end_offset, u)
    }

    fn derivative(&self, t: f64) -> Point {
        let par_end = self.par_end();
        let drift = if par_end > 0.0 {
            (self.end_offset - self.start_offset) * (1.0 / par_end)
        } else {
            Point::zero()
        };
        self.curve.derivative(t) + drift
    }
}

/// Cubic from `from` to `to`, leaving along `leave` and arriving along `arrive`.
fn connector(from: Point, leave: Point, to: Point, arrive: Point) -> Option<CubicBezier> {
    let chord = to - from;
    let length = chord.length();
    if length <= f64::EPSILON {
        return None;
    }
    let leave = leave.normalize().or_else(|| chord.normalize())?;
    let arrive = arrive.normalize().or_else(|| chord.normalize())?;
    let handle = length / 3.0;

    Some(CubicBezier::new(
        from,
        from + leave * handle,
        to - arrive * handle,
        to,
    ))
}

/// Aligns the handles at every join turning by more than `tolerance` radians. Join points stay
/// where they are; handle lengths are kept. Returns the number of joins adjusted.
pub fn smooth_joins(path: &mut BezierPath, tolerance: f64) -> usize {
    let pieces = path.pieces_mut();
    let mut adjusted = 0;

    for i in 1..pieces.len() {
        let (before, after) = pieces.split_at_mut(i);
        let incoming = &mut before[i - 1];
        let outgoing = &mut after[0];

        let (Some(a), Some(b)) = (incoming.end_direction(), outgoing.start_direction()) else {
            continue;
        };
        if angle_between(a, b) <= tolerance {
            continue;
        }

        let direction = (a + b).normalize().unwrap_or(a);
        let handle = |h: f64, chord: f64| if h > f64::EPSILON { h } else { chord / 3.0 };
        let back = handle(incoming.p3.distance(&incoming.p2), incoming.chord_length());
        let ahead = handle(outgoing.p1.distance(&outgoing.p0), outgoing.chord_length());

        incoming.p2 = incoming.p3 - direction * back;
        outgoing.p1 = outgoing.p0 + direction * ahead;
        adjusted += 1;
    }
    adjusted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{NetworkBuilder, RoutedEdge};
    use crate::ordering::order_network;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn zigzag() -> (BundleNetwork, Point, Point) {
        // terminal -> h1 -> h2 -> terminal with a bend at both hubs
        let start = p(-20.0, 10.0);
        let end = p(60.0, 30.0);
        let mut builder = NetworkBuilder::new();
        let h1 = builder.add_steiner(p(0.0, 0.0));
        let h2 = builder.add_steiner(p(40.0, 0.0));
        builder.add_edge(RoutedEdge::straight(&[
            (Attachment::Terminal(start), start),
            (Attachment::Hub(h1), p(0.0, 0.0)),
            (Attachment::Hub(h2), p(40.0, 0.0)),
            (Attachment::Terminal(end), end),
        ]));
        (builder.build().unwrap(), start, end)
    }

    #[test]
    fn edge_through_two_hubs_is_smooth() {
        let (net, start, end) = zigzag();
        let settings = BundlingSettings::default();

        let curves = assemble_splines(&net, &settings);
        assert_eq!(curves.len(), 1);
        let path = &curves[0].path;

        // three legs of eight pieces and two connectors
        assert_eq!(path.pieces().len(), 3 * 8 + 2);
        assert_eq!(path.pieces()[0].p0, start);
        assert_eq!(path.pieces()[path.pieces().len() - 1].p3, end);
        assert!(path.max_gap() < 1e-9);
        for angle in path.join_angles() {
            assert!(angle <= settings.smoothing_tolerance + 1e-12);
        }

        // the junction is rounded: the path passes near but not through the hub corner
        let closest = path
            .sample(400)
            .into_iter()
            .map(|q| q.distance(&p(0.0, 0.0)))
            .fold(f64::INFINITY, f64::min);
        assert!(closest > 1e-3);
        assert!(closest < settings.junction_radius);
    }

    #[test]
    fn bundled_edges_run_apart() {
        let mut builder = NetworkBuilder::new();
        let h1 = builder.add_steiner(p(0.0, 0.0));
        let h2 = builder.add_steiner(p(40.0, 0.0));
        for y in [10.0, -10.0] {
            builder.add_edge(RoutedEdge::straight(&[
                (Attachment::Terminal(p(-20.0, y)), p(-20.0, y)),
                (Attachment::Hub(h1), p(0.0, 0.0)),
                (Attachment::Hub(h2), p(40.0, 0.0)),
                (Attachment::Terminal(p(60.0, y)), p(60.0, y)),
            ]));
        }
        let mut net = builder.build().unwrap();
        let settings = sequential();
        order_network(&mut net, &settings);

        let curves = assemble_splines(&net, &settings);
        let (upper, lower) = (&curves[0].path, &curves[1].path);

        // halfway between the hubs the two edges are one spacing apart, upper edge on top
        let upper_mid = upper.evaluate(upper.par_end() / 2.0);
        let lower_mid = lower.evaluate(lower.par_end() / 2.0);
        assert!((upper_mid.x - 20.0).abs() < 1e-9);
        assert!(upper_mid.y > 0.0);
        assert!((upper_mid.y - lower_mid.y - settings.spacing).abs() < 1e-6);
        assert!(upper.max_gap() < 1e-9);
    }

    fn sequential() -> BundlingSettings {
        BundlingSettings {
            parallel: false,
            ..BundlingSettings::default()
        }
    }

    #[test]
    fn smoothing_keeps_join_points() {
        let mut path = BezierPath::new(vec![
            CubicBezier::new(p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 0.0)),
            CubicBezier::new(p(3.0, 0.0), p(3.0, 1.0), p(3.0, 2.0), p(3.0, 3.0)),
        ]);

        assert_eq!(smooth_joins(&mut path, 1e-3), 1);
        assert!(path.join_angles()[0] < 1e-9);
        assert_eq!(path.pieces()[0].p3, p(3.0, 0.0));
        assert_eq!(path.pieces()[1].p0, p(3.0, 0.0));
        assert!((path.pieces()[0].p2.distance(&p(3.0, 0.0)) - 1.0).abs() < 1e-12);

        // nothing left to do
        assert_eq!(smooth_joins(&mut path, 1e-3), 0);
    }

    #[test]
    fn single_leg_between_hubs() {
        let mut builder = NetworkBuilder::new();
        let h1 = builder.add_steiner(p(0.0, 0.0));
        let h2 = builder.add_steiner(p(10.0, 0.0));
        builder.add_edge(RoutedEdge::straight(&[
            (Attachment::Hub(h1), p(0.0, 0.0)),
            (Attachment::Hub(h2), p(10.0, 0.0)),
        ]));
        let net = builder.build().unwrap();
        let settings = BundlingSettings::default();

        let curve = &assemble_splines(&net, &settings)[0];
        assert_eq!(curve.edge, EdgeId::from_index(0));
        assert_eq!(curve.path.pieces().len(), settings.samples_per_leg);
        assert_eq!(curve.path.pieces()[0].p0, p(0.0, 0.0));
        assert!(curve.path.end().distance(&p(10.0, 0.0)) < 1e-12);
    }
}
