//! SVG-compatible path data.
//!
//! A [`PathData`] is a list of absolute drawing commands. It is parsed from
//! an SVG `d` attribute with the `svg` crate (relative commands, shorthand
//! curves, and implicit command repetition are resolved to absolute form)
//! and written back with [`std::fmt::Display`].
//!
//! Measurement code works on the *node* vertices of each subpath only:
//! curve control points are ignored, so lengths and areas follow the
//! polyline through the on-curve points.

use std::fmt;

use landscape_math::{Point2, Tolerance, Vec2};
use serde::{Deserialize, Serialize};
use svg::node::element::path::{Command, Data, Position};

use crate::error::{GeomError, Result};

/// A single absolute drawing command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    /// Start a new subpath.
    MoveTo(Point2),
    /// Straight segment.
    LineTo(Point2),
    /// Quadratic Bézier segment.
    QuadTo {
        /// Control point.
        ctrl: Point2,
        /// End point.
        to: Point2,
    },
    /// Cubic Bézier segment.
    CubicTo {
        /// First control point.
        ctrl1: Point2,
        /// Second control point.
        ctrl2: Point2,
        /// End point.
        to: Point2,
    },
    /// Elliptical arc segment.
    ArcTo {
        /// Radii along X and Y.
        radii: Vec2,
        /// X-axis rotation in degrees.
        rotation: f64,
        /// Large-arc flag.
        large_arc: bool,
        /// Sweep flag.
        sweep: bool,
        /// End point.
        to: Point2,
    },
    /// Close the current subpath back to its start.
    Close,
}

impl PathCommand {
    /// On-curve end point of the command, if it has one.
    pub fn end_point(&self) -> Option<Point2> {
        match *self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => Some(p),
            PathCommand::QuadTo { to, .. }
            | PathCommand::CubicTo { to, .. }
            | PathCommand::ArcTo { to, .. } => Some(to),
            PathCommand::Close => None,
        }
    }
}

/// An ordered list of absolute drawing commands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathData {
    /// Commands in drawing order.
    pub commands: Vec<PathCommand>,
}

impl PathData {
    /// Empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Closed straight-edged outline `M p0 L p1 ... Z`.
    pub fn polygon(points: &[Point2]) -> Self {
        let mut path = Self::new();
        let mut iter = points.iter();
        if let Some(first) = iter.next() {
            path.move_to(*first);
            for p in iter {
                path.line_to(*p);
            }
            path.close();
        }
        path
    }

    /// Append a move.
    pub fn move_to(&mut self, p: Point2) -> &mut Self {
        self.commands.push(PathCommand::MoveTo(p));
        self
    }

    /// Append a straight segment.
    pub fn line_to(&mut self, p: Point2) -> &mut Self {
        self.commands.push(PathCommand::LineTo(p));
        self
    }

    /// Append a quadratic segment.
    pub fn quad_to(&mut self, ctrl: Point2, to: Point2) -> &mut Self {
        self.commands.push(PathCommand::QuadTo { ctrl, to });
        self
    }

    /// Close the current subpath.
    pub fn close(&mut self) -> &mut Self {
        self.commands.push(PathCommand::Close);
        self
    }

    /// Append every command of `other`.
    pub fn extend(&mut self, other: &PathData) {
        self.commands.extend_from_slice(&other.commands);
    }

    /// True when the path has no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// True iff the final command closes the subpath.
    pub fn is_closed(&self) -> bool {
        matches!(self.commands.last(), Some(PathCommand::Close))
    }

    /// Node vertices of each subpath.
    ///
    /// A close command contributes a return to the subpath start unless
    /// the last vertex already sits there. Drawing after a close without
    /// a move starts a new subpath at the previous start point.
    pub fn subpaths(&self) -> Vec<Vec<Point2>> {
        let tol = Tolerance::DEFAULT;
        let mut out: Vec<Vec<Point2>> = Vec::new();
        let mut current: Vec<Point2> = Vec::new();
        let mut start = Point2::origin();

        for cmd in &self.commands {
            match cmd {
                PathCommand::MoveTo(p) => {
                    if !current.is_empty() {
                        out.push(std::mem::take(&mut current));
                    }
                    start = *p;
                    current.push(*p);
                }
                PathCommand::Close => {
                    if current.last().is_some_and(|last| !tol.points_equal(last, &start)) {
                        current.push(start);
                    }
                    if !current.is_empty() {
                        out.push(std::mem::take(&mut current));
                    }
                }
                other => {
                    if current.is_empty() {
                        current.push(start);
                    }
                    if let Some(p) = other.end_point() {
                        current.push(p);
                    }
                }
            }
        }
        if !current.is_empty() {
            out.push(current);
        }
        out
    }

    /// All node vertices in drawing order.
    pub fn vertices(&self) -> Vec<Point2> {
        self.subpaths().into_iter().flatten().collect()
    }

    /// Sum of consecutive node-vertex distances over every subpath.
    pub fn vertex_length(&self) -> f64 {
        self.subpaths()
            .iter()
            .flat_map(|sub| sub.windows(2))
            .map(|w| (w[1] - w[0]).norm())
            .sum()
    }

    /// Parse an SVG `d` attribute.
    ///
    /// Coordinates pass through the `svg` crate's `f32` numbers.
    pub fn parse(d: &str) -> Result<Self> {
        let data = Data::parse(d).map_err(|e| GeomError::Parse(e.to_string()))?;
        let mut resolver = Resolver::new();
        for command in data.iter() {
            resolver.push(command)?;
        }
        Ok(resolver.path)
    }
}

impl std::str::FromStr for PathData {
    type Err = GeomError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PathData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cmd) in self.commands.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match cmd {
                PathCommand::MoveTo(p) => write!(f, "M {},{}", p.x, p.y)?,
                PathCommand::LineTo(p) => write!(f, "L {},{}", p.x, p.y)?,
                PathCommand::QuadTo { ctrl, to } => {
                    write!(f, "Q {},{} {},{}", ctrl.x, ctrl.y, to.x, to.y)?
                }
                PathCommand::CubicTo { ctrl1, ctrl2, to } => write!(
                    f,
                    "C {},{} {},{} {},{}",
                    ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y
                )?,
                PathCommand::ArcTo {
                    radii,
                    rotation,
                    large_arc,
                    sweep,
                    to,
                } => write!(
                    f,
                    "A {},{} {} {} {} {},{}",
                    radii.x,
                    radii.y,
                    rotation,
                    u8::from(*large_arc),
                    u8::from(*sweep),
                    to.x,
                    to.y
                )?,
                PathCommand::Close => f.write_str("Z")?,
            }
        }
        Ok(())
    }
}

/// Builds absolute [`PathCommand`]s from parsed `svg` commands.
///
/// Relative coordinates resolve against the current point, and the smooth
/// curve commands reflect the previous control point of the same kind.
struct Resolver {
    path: PathData,
    current: Point2,
    start: Point2,
    last_quad_ctrl: Option<Point2>,
    last_cubic_ctrl: Option<Point2>,
}

impl Resolver {
    fn new() -> Self {
        Self {
            path: PathData::new(),
            current: Point2::origin(),
            start: Point2::origin(),
            last_quad_ctrl: None,
            last_cubic_ctrl: None,
        }
    }

    fn point(&self, position: &Position, x: f32, y: f32) -> Point2 {
        let (x, y) = (f64::from(x), f64::from(y));
        match position {
            Position::Absolute => Point2::new(x, y),
            Position::Relative => Point2::new(self.current.x + x, self.current.y + y),
        }
    }

    fn emit(&mut self, cmd: PathCommand, quad_ctrl: Option<Point2>, cubic_ctrl: Option<Point2>) {
        self.current = cmd.end_point().unwrap_or(self.start);
        self.last_quad_ctrl = quad_ctrl;
        self.last_cubic_ctrl = cubic_ctrl;
        self.path.commands.push(cmd);
    }

    fn push(&mut self, command: &Command) -> Result<()> {
        if self.path.is_empty() && !matches!(command, Command::Move(..)) {
            return Err(GeomError::Parse("path data must begin with a moveto".into()));
        }

        match command {
            Command::Move(position, params) => {
                // Pairs after the first are implicit line-tos.
                for (i, c) in groups(params, 2, 'M')?.enumerate() {
                    let p = self.point(position, c[0], c[1]);
                    if i == 0 {
                        self.start = p;
                        self.emit(PathCommand::MoveTo(p), None, None);
                    } else {
                        self.emit(PathCommand::LineTo(p), None, None);
                    }
                }
            }
            Command::Line(position, params) => {
                for c in groups(params, 2, 'L')? {
                    let p = self.point(position, c[0], c[1]);
                    self.emit(PathCommand::LineTo(p), None, None);
                }
            }
            Command::HorizontalLine(position, params) => {
                for &x in params.iter() {
                    let x = match position {
                        Position::Absolute => f64::from(x),
                        Position::Relative => self.current.x + f64::from(x),
                    };
                    let p = Point2::new(x, self.current.y);
                    self.emit(PathCommand::LineTo(p), None, None);
                }
            }
            Command::VerticalLine(position, params) => {
                for &y in params.iter() {
                    let y = match position {
                        Position::Absolute => f64::from(y),
                        Position::Relative => self.current.y + f64::from(y),
                    };
                    let p = Point2::new(self.current.x, y);
                    self.emit(PathCommand::LineTo(p), None, None);
                }
            }
            Command::QuadraticCurve(position, params) => {
                for c in groups(params, 4, 'Q')? {
                    let ctrl = self.point(position, c[0], c[1]);
                    let to = self.point(position, c[2], c[3]);
                    self.emit(PathCommand::QuadTo { ctrl, to }, Some(ctrl), None);
                }
            }
            Command::SmoothQuadraticCurve(position, params) => {
                for c in groups(params, 2, 'T')? {
                    let ctrl = reflect(self.last_quad_ctrl, self.current);
                    let to = self.point(position, c[0], c[1]);
                    self.emit(PathCommand::QuadTo { ctrl, to }, Some(ctrl), None);
                }
            }
            Command::CubicCurve(position, params) => {
                for c in groups(params, 6, 'C')? {
                    let ctrl1 = self.point(position, c[0], c[1]);
                    let ctrl2 = self.point(position, c[2], c[3]);
                    let to = self.point(position, c[4], c[5]);
                    self.emit(PathCommand::CubicTo { ctrl1, ctrl2, to }, None, Some(ctrl2));
                }
            }
            Command::SmoothCubicCurve(position, params) => {
                for c in groups(params, 4, 'S')? {
                    let ctrl1 = reflect(self.last_cubic_ctrl, self.current);
                    let ctrl2 = self.point(position, c[0], c[1]);
                    let to = self.point(position, c[2], c[3]);
                    self.emit(PathCommand::CubicTo { ctrl1, ctrl2, to }, None, Some(ctrl2));
                }
            }
            Command::EllipticalArc(position, params) => {
                for c in groups(params, 7, 'A')? {
                    let to = self.point(position, c[5], c[6]);
                    let arc = PathCommand::ArcTo {
                        radii: Vec2::new(f64::from(c[0]).abs(), f64::from(c[1]).abs()),
                        rotation: f64::from(c[2]),
                        large_arc: c[3] != 0.0,
                        sweep: c[4] != 0.0,
                        to,
                    };
                    self.emit(arc, None, None);
                }
            }
            Command::Close => self.emit(PathCommand::Close, None, None),
        }
        Ok(())
    }
}

/// Split a parameter list into groups of `size`.
fn groups(params: &[f32], size: usize, letter: char) -> Result<std::slice::Chunks<'_, f32>> {
    if params.len() % size != 0 {
        return Err(GeomError::Parse(format!(
            "'{letter}' takes parameters in groups of {size}, got {}",
            params.len()
        )));
    }
    Ok(params.chunks(size))
}

/// Reflection of the previous control point about `current`, or `current`
/// itself when the previous segment was not the same curve kind.
fn reflect(ctrl: Option<Point2>, current: Point2) -> Point2 {
    match ctrl {
        Some(c) => Point2::new(2.0 * current.x - c.x, 2.0 * current.y - c.y),
        None => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_absolute_polygon() {
        let path = PathData::parse("M 0,0 L 3,0 L 3,4 Z").unwrap();
        assert_eq!(path.commands.len(), 4);
        assert!(path.is_closed());
        let subs = path.subpaths();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].len(), 4);
        assert_eq!(subs[0][3], Point2::new(0.0, 0.0));
    }

    #[test]
    fn test_parse_relative_and_implicit_lineto() {
        let path = PathData::parse("m 10 10 5 0 0 5 h -5 z").unwrap();
        assert_eq!(
            path.vertices(),
            vec![
                Point2::new(10.0, 10.0),
                Point2::new(15.0, 10.0),
                Point2::new(15.0, 15.0),
                Point2::new(10.0, 15.0),
                Point2::new(10.0, 10.0),
            ]
        );
    }

    #[test]
    fn test_parse_compact_numbers() {
        let path = PathData::parse("M1.5.5L-2e1,3E0").unwrap();
        assert_eq!(path.commands[0], PathCommand::MoveTo(Point2::new(1.5, 0.5)));
        assert_eq!(path.commands[1], PathCommand::LineTo(Point2::new(-20.0, 3.0)));
    }

    #[test]
    fn test_parse_curves_keep_node_vertices_only() {
        let path = PathData::parse("M 0,0 Q 5,5 10,0 T 20,0 C 20,5 30,5 30,0 S 40,-5 40,0").unwrap();
        assert_eq!(
            path.vertices(),
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 0.0),
                Point2::new(20.0, 0.0),
                Point2::new(30.0, 0.0),
                Point2::new(40.0, 0.0),
            ]
        );
        // T reflects the previous quadratic control point.
        assert_eq!(
            path.commands[2],
            PathCommand::QuadTo {
                ctrl: Point2::new(15.0, -5.0),
                to: Point2::new(20.0, 0.0)
            }
        );
        assert_relative_eq!(path.vertex_length(), 40.0);
        assert!(!path.is_closed());
    }

    #[test]
    fn test_parse_arc() {
        let path = PathData::parse("M0 0 A 5 5 0 1 0 10 0").unwrap();
        assert!(matches!(
            path.commands[1],
            PathCommand::ArcTo {
                large_arc: true,
                sweep: false,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            PathData::parse("L 1,1"),
            Err(GeomError::Parse(_))
        ));
        assert!(matches!(
            PathData::parse("M 1,1 L x"),
            Err(GeomError::Parse(_))
        ));
        assert!(matches!(
            PathData::parse("M 1,1 R 2,2"),
            Err(GeomError::Parse(_))
        ));
        assert!(matches!(
            PathData::parse("M 1,1 L 2"),
            Err(GeomError::Parse(_))
        ));
        assert!(PathData::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_multiple_subpaths() {
        let path = PathData::parse("M0,0 L1,0 L1,1 Z M5,5 L6,5 L6,6 Z").unwrap();
        let subs = path.subpaths();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[1][0], Point2::new(5.0, 5.0));
    }

    #[test]
    fn test_close_does_not_duplicate_start() {
        let path = PathData::parse("M0,0 L1,0 L0,0 Z").unwrap();
        assert_eq!(path.subpaths()[0].len(), 3);
    }

    #[test]
    fn test_display_round_trip() {
        let mut path = PathData::new();
        path.move_to(Point2::new(0.0, 0.0))
            .quad_to(Point2::new(1.0, 1.0), Point2::new(1.5, 0.5))
            .line_to(Point2::new(2.0, -1.25))
            .close();
        let text = path.to_string();
        assert_eq!(text, "M 0,0 Q 1,1 1.5,0.5 L 2,-1.25 Z");
        assert_eq!(PathData::parse(&text).unwrap(), path);
    }

    #[test]
    fn test_polygon_builder() {
        let path = PathData::polygon(&[
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ]);
        assert_eq!(path.to_string(), "M 0,0 L 1,0 L 0,1 Z");
        assert!(PathData::polygon(&[]).is_empty());
    }
}
