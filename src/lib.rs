//! Hub-based edge bundling.
//!
//! Edges routed through a network of hubs are bundled where they share a path: the members of
//! each bundle are ordered to avoid needless crossings, laid out side by side, enclosed by
//! boundary curves and finally turned into smooth curves.
//!
//! ```
//! use tabane::builder::{NetworkBuilder, RoutedEdge};
//! use tabane::bundler::HubBundler;
//! use tabane::geometry::Point;
//! use tabane::network::Attachment;
//! use tabane::settings::BundlingSettings;
//!
//! let mut builder = NetworkBuilder::new();
//! let a = builder.add_steiner(Point::new(0.0, 0.0));
//! let b = builder.add_steiner(Point::new(20.0, 0.0));
//! for y in [5.0, -5.0] {
//!     builder.add_edge(RoutedEdge::straight(&[
//!         (Attachment::Terminal(Point::new(-10.0, y)), Point::new(-10.0, y)),
//!         (Attachment::Hub(a), Point::new(0.0, 0.0)),
//!         (Attachment::Hub(b), Point::new(20.0, 0.0)),
//!         (Attachment::Terminal(Point::new(30.0, y)), Point::new(30.0, y)),
//!     ]));
//! }
//! let mut network = builder.build().unwrap();
//!
//! let layout = HubBundler::new(BundlingSettings::default())
//!     .run(&mut network)
//!     .unwrap();
//! assert_eq!(layout.edges.len(), 2);
//! assert_eq!(layout.report.crossings, 0);
//! ```
pub mod algorithm;
pub mod boundary;
pub mod builder;
pub mod bundler;
pub mod curve;
pub mod error;
pub mod geometry;
pub mod network;
pub mod ordering;
pub mod settings;
pub mod spline;

#[cfg(test)]
mod tests {
    use crate::{
        builder::{Leg, NetworkBuilder, RoutedEdge},
        bundler::HubBundler,
        curve::{Curve, ParametricCurve},
        geometry::{Point, Rect, Size},
        network::{Attachment, BaseSide},
        ordering::count_crossings,
        settings::BundlingSettingsBuilder,
    };

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn demo_metro() {
        //   t0 o.                                  .o t3
        //        `.                              .'
        //   t1 o----* west =========== east *----o t4
        //        .'          \                `.
        //   t2 o'             * south           `o t5
        let settings = BundlingSettingsBuilder::default()
            .spacing(3.0)
            .build()
            .unwrap();
        let mut builder = NetworkBuilder::from_settings(&settings);
        let west = builder.add_node(p(0.0, 0.0), Rect::centered(p(0.0, 0.0), Size::new(4.0, 4.0)));
        let east = builder.add_node(p(60.0, 0.0), Rect::centered(p(60.0, 0.0), Size::new(4.0, 4.0)));
        let south = builder.add_steiner(p(30.0, -30.0));

        let left = [p(-20.0, 15.0), p(-25.0, 0.0), p(-20.0, -15.0)];
        let right = [p(80.0, 15.0), p(85.0, 0.0), p(80.0, -15.0)];
        for (l, r) in left.into_iter().zip(right) {
            builder.add_edge(RoutedEdge::new(vec![
                Leg::new(Attachment::Terminal(l), Attachment::Hub(west), Curve::line(l, p(0.0, 0.0))),
                Leg::new(
                    Attachment::Hub(west),
                    Attachment::Hub(east),
                    Curve::cubic(p(0.0, 0.0), p(20.0, 5.0), p(40.0, 5.0), p(60.0, 0.0)),
                ),
                Leg::new(Attachment::Hub(east), Attachment::Terminal(r), Curve::line(p(60.0, 0.0), r)),
            ]));
        }
        // a detour through the southern hub
        builder.add_edge(RoutedEdge::straight(&[
            (Attachment::Hub(west), p(0.0, 0.0)),
            (Attachment::Hub(south), p(30.0, -30.0)),
            (Attachment::Hub(east), p(60.0, 0.0)),
        ]));

        let mut network = builder.build().unwrap();
        let mut bundler = HubBundler::new(settings.clone());
        let layout = bundler.run(&mut network).unwrap();

        assert_eq!(layout.edges.len(), 4);
        assert_eq!(layout.report.components, 1);
        assert_eq!(layout.report.crossings, 0);
        assert_eq!(count_crossings(&network, &settings).crossings, 0);
        assert!(network.validate().is_ok());

        let trunk = network.find_base(west, BaseSide::Toward(east)).unwrap();
        assert_eq!(network.base(trunk).unwrap().len(), 3);

        for (curve, (l, r)) in layout.edges.iter().zip(left.into_iter().zip(right)) {
            let pieces = curve.path.pieces();
            assert_eq!(pieces[0].p0, l);
            assert_eq!(pieces[pieces.len() - 1].p3, r);
        }
        for curve in &layout.edges {
            assert!(curve.path.max_gap() < 1e-9);
            assert!(curve.path.approximate_length() > 0.0);
            for angle in curve.path.join_angles() {
                assert!(angle <= settings.smoothing_tolerance + 1e-12);
            }
        }
    }
}
