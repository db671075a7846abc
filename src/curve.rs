//! Parametric curve primitives.
//!
//! Every curve is immutable. Transformations such as reversal or lateral offsets produce new
//! values; the same curve is shared (via `Arc`) between the two hubs it connects.
use crate::geometry::Point;

pub trait ParametricCurve {
    /// End of the parameter domain `[0, par_end]`.
    fn par_end(&self) -> f64;

    fn evaluate(&self, t: f64) -> Point;

    /// First derivative with respect to the parameter.
    fn derivative(&self, t: f64) -> Point;

    fn start(&self) -> Point {
        self.evaluate(0.0)
    }

    fn end(&self) -> Point {
        self.evaluate(self.par_end())
    }

    /// Unit tangent at `t`. Falls back to a short chord where the derivative vanishes (e.g. a
    /// cubic whose first control point coincides with its start). `None` for degenerate curves.
    fn tangent(&self, t: f64) -> Option<Point> {
        if let Some(d) = self.derivative(t).normalize() {
            return Some(d);
        }

        let par_end = self.par_end();
        let delta = par_end * 1e-3;
        if delta <= 0.0 {
            return None;
        }
        if t + delta <= par_end {
            (self.evaluate(t + delta) - self.evaluate(t)).normalize()
        } else {
            (self.evaluate(t) - self.evaluate(t - delta)).normalize()
        }
    }

    /// `n + 1` points evenly spaced in parameter space, both ends included.
    fn sample(&self, n: usize) -> Vec<Point> {
        let n = n.max(1);
        let par_end = self.par_end();

        (0..=n)
            .map(|i| self.evaluate(par_end * i as f64 / n as f64))
            .collect()
    }

    fn approximate_length(&self) -> f64 {
        self.sample(32)
            .windows(2)
            .map(|w| w[0].distance(&w[1]))
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub a: Point,
    pub b: Point,
}

impl LineSegment {
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }
}

impl ParametricCurve for LineSegment {
    fn par_end(&self) -> f64 {
        1.0
    }

    fn evaluate(&self, t: f64) -> Point {
        self.a.lerp(self.b, t)
    }

    fn derivative(&self, _: f64) -> Point {
        self.b - self.a
    }
}

/// Four control points of a cubic Bezier segment, parameter in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
    pub p3: Point,
}

impl CubicBezier {
    pub const fn new(p0: Point, p1: Point, p2: Point, p3: Point) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Hermite segment between `p0` and `p3` with end derivatives `d0`, `d3`, where the
    /// derivatives are taken over a parameter span of length `span`.
    pub fn from_hermite(p0: Point, d0: Point, p3: Point, d3: Point, span: f64) -> Self {
        Self::new(p0, p0 + d0 * (span / 3.0), p3 - d3 * (span / 3.0), p3)
    }

    /// Tangent direction leaving `p0`, skipping coincident control points.
    pub fn start_direction(&self) -> Option<Point> {
        [self.p1, self.p2, self.p3]
            .into_iter()
            .find_map(|p| (p - self.p0).normalize())
    }

    /// Tangent direction arriving at `p3`, skipping coincident control points.
    pub fn end_direction(&self) -> Option<Point> {
        [self.p2, self.p1, self.p0]
            .into_iter()
            .find_map(|p| (self.p3 - p).normalize())
    }

    pub fn chord_length(&self) -> f64 {
        self.p0.distance(&self.p3)
    }
}

impl ParametricCurve for CubicBezier {
    fn par_end(&self) -> f64 {
        1.0
    }

    fn evaluate(&self, t: f64) -> Point {
        // de Casteljau
        let ab = self.p0.lerp(self.p1, t);
        let bc = self.p1.lerp(self.p2, t);
        let cd = self.p2.lerp(self.p3, t);
        let abc = ab.lerp(bc, t);
        let bcd = bc.lerp(cd, t);
        abc.lerp(bcd, t)
    }

    fn derivative(&self, t: f64) -> Point {
        let s = 1.0 - t;
        (self.p1 - self.p0) * (3.0 * s * s)
            + (self.p2 - self.p1) * (6.0 * s * t)
            + (self.p3 - self.p2) * (3.0 * t * t)
    }
}

/// Piecewise linear curve. Each span between consecutive vertices takes one parameter unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyline {
    points: Vec<Point>,
}

impl Polyline {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn span(&self, t: f64) -> (usize, f64) {
        let last = self.points.len().saturating_sub(2);
        let t = t.clamp(0.0, self.par_end());
        let i = (t.floor() as usize).min(last);
        (i, t - i as f64)
    }
}

impl ParametricCurve for Polyline {
    fn par_end(&self) -> f64 {
        self.points.len().saturating_sub(1) as f64
    }

    fn evaluate(&self, t: f64) -> Point {
        match self.points.len() {
            0 => Point::zero(),
            1 => self.points[0],
            _ => {
                let (i, u) = self.span(t);
                self.points[i].lerp(self.points[i + 1], u)
            }
        }
    }

    fn derivative(&self, t: f64) -> Point {
        if self.points.len() < 2 {
            return Point::zero();
        }
        let (i, _) = self.span(t);
        self.points[i + 1] - self.points[i]
    }

    fn sample(&self, n: usize) -> Vec<Point> {
        // The vertices are the natural samples of a polyline.
        if n + 1 == self.points.len() {
            return self.points.clone();
        }
        let n = n.max(1);
        let par_end = self.par_end();
        (0..=n)
            .map(|i| self.evaluate(par_end * i as f64 / n as f64))
            .collect()
    }
}

/// A routed curve as supplied by the path search.
#[derive(Debug, Clone, PartialEq)]
pub enum Curve {
    Line(LineSegment),
    Cubic(CubicBezier),
    Polyline(Polyline),
}

impl Curve {
    pub fn line(a: Point, b: Point) -> Self {
        Curve::Line(LineSegment::new(a, b))
    }

    pub fn cubic(p0: Point, p1: Point, p2: Point, p3: Point) -> Self {
        Curve::Cubic(CubicBezier::new(p0, p1, p2, p3))
    }

    pub fn polyline(points: Vec<Point>) -> Self {
        Curve::Polyline(Polyline::new(points))
    }
}

impl ParametricCurve for Curve {
    fn par_end(&self) -> f64 {
        match self {
            Curve::Line(c) => c.par_end(),
            Curve::Cubic(c) => c.par_end(),
            Curve::Polyline(c) => c.par_end(),
        }
    }

    fn evaluate(&self, t: f64) -> Point {
        match self {
            Curve::Line(c) => c.evaluate(t),
            Curve::Cubic(c) => c.evaluate(t),
            Curve::Polyline(c) => c.evaluate(t),
        }
    }

    fn derivative(&self, t: f64) -> Point {
        match self {
            Curve::Line(c) => c.derivative(t),
            Curve::Cubic(c) => c.derivative(t),
            Curve::Polyline(c) => c.derivative(t),
        }
    }
}

/// Sequence of cubic pieces joined end to end; piece `i` spans parameters `[i, i + 1]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BezierPath {
    pieces: Vec<CubicBezier>,
}

impl BezierPath {
    pub fn new(pieces: Vec<CubicBezier>) -> Self {
        Self { pieces }
    }

    pub fn pieces(&self) -> &[CubicBezier] {
        &self.pieces
    }

    pub fn pieces_mut(&mut self) -> &mut [CubicBezier] {
        &mut self.pieces
    }

    pub fn push(&mut self, piece: CubicBezier) {
        self.pieces.push(piece);
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Largest gap between the end of one piece and the start of the next.
    pub fn max_gap(&self) -> f64 {
        self.pieces
            .windows(2)
            .map(|w| w[0].p3.distance(&w[1].p0))
            .fold(0.0, f64::max)
    }

    /// Turning angle of the tangent at every join between consecutive pieces.
    pub fn join_angles(&self) -> Vec<f64> {
        self.pieces
            .windows(2)
            .map(|w| match (w[0].end_direction(), w[1].start_direction()) {
                (Some(a), Some(b)) => crate::geometry::angle_between(a, b),
                _ => 0.0,
            })
            .collect()
    }

    fn piece_at(&self, t: f64) -> (usize, f64) {
        let last = self.pieces.len().saturating_sub(1);
        let t = t.clamp(0.0, self.par_end());
        let i = (t.floor() as usize).min(last);
        (i, t - i as f64)
    }
}

impl ParametricCurve for BezierPath {
    fn par_end(&self) -> f64 {
        self.pieces.len() as f64
    }

    fn evaluate(&self, t: f64) -> Point {
        if self.pieces.is_empty() {
            return Point::zero();
        }
        let (i, u) = self.piece_at(t);
        self.pieces[i].evaluate(u)
    }

    fn derivative(&self, t: f64) -> Point {
        if self.pieces.is_empty() {
            return Point::zero();
        }
        let (i, u) = self.piece_at(t);
        self.pieces[i].derivative(u)
    }
}
