//! Glyph outlines as lists of closed kurbo contours (y axis up)

use kurbo::{Affine, BezPath, Line, ParamCurve, PathEl, Point, Rect, Shape};

/// An ordered list of closed contours.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    contours: Vec<BezPath>,
}

/// Result of partitioning an outline's contours against a horizontal line.
#[derive(Debug, Clone, Default)]
pub struct ContourSplit {
    /// Contours that lie wholly on the requested side of the line.
    pub selected: Outline,
    /// Everything else, including contours crossing the line.
    pub rest: Outline,
}

impl Outline {
    pub fn new(contours: Vec<BezPath>) -> Self {
        Self {
            contours: contours
                .into_iter()
                .filter(|c| c.elements().len() > 1)
                .collect(),
        }
    }

    pub fn contours(&self) -> &[BezPath] {
        &self.contours
    }

    pub fn into_contours(self) -> Vec<BezPath> {
        self.contours
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// Number of on- and off-curve points across all contours.
    pub fn point_count(&self) -> usize {
        self.contours
            .iter()
            .flat_map(|c| c.elements())
            .map(|el| match el {
                PathEl::MoveTo(_) | PathEl::LineTo(_) => 1,
                PathEl::QuadTo(..) => 2,
                PathEl::CurveTo(..) => 3,
                PathEl::ClosePath => 0,
            })
            .sum()
    }

    pub fn append(&mut self, other: Outline) {
        self.contours.extend(other.contours);
    }

    pub fn bounding_box(&self) -> Option<Rect> {
        self.contours
            .iter()
            .map(|c| c.bounding_box())
            .reduce(|a, b| a.union(b))
    }

    pub fn apply_affine(&mut self, affine: Affine) {
        for contour in &mut self.contours {
            contour.apply_affine(affine);
        }
    }

    pub fn transformed(&self, affine: Affine) -> Self {
        let mut out = self.clone();
        out.apply_affine(affine);
        out
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.apply_affine(Affine::translate((dx, dy)));
    }

    /// Scale about the origin.
    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.apply_affine(Affine::scale_non_uniform(sx, sy));
    }

    /// Rotate about the centre of the bounding box. A half turn is an exact
    /// point reflection; any other angle simplifies first so the rotated
    /// curves stay light.
    pub fn rotate_about_center(&mut self, degrees: f64) {
        let Some(bbox) = self.bounding_box() else {
            return;
        };
        let center = bbox.center().to_vec2();
        let to_origin = Affine::translate(-center);
        let back = Affine::translate(center);
        if (degrees.abs() - 180.0).abs() < f64::EPSILON {
            self.apply_affine(back * Affine::scale(-1.0) * to_origin);
        } else {
            self.simplify(1.0);
            self.apply_affine(back * Affine::rotate(degrees.to_radians()) * to_origin);
        }
    }

    /// Rotate about the origin, then lift the result so its lowest point
    /// sits on the baseline.
    pub fn rotate_onto_baseline(&mut self, degrees: f64) {
        self.simplify(1.0);
        self.apply_affine(Affine::rotate(degrees.to_radians()));
        if let Some(bbox) = self.bounding_box() {
            self.translate(0.0, -bbox.y0);
        }
    }

    /// Remove points whose removal moves the outline by at most `tolerance`.
    ///
    /// Only ever deletes points: zero-length segments go, curves whose
    /// handles hug their chord become lines, and line vertices lying on the
    /// line between their neighbours are dropped. Repeats until nothing
    /// changes, so the result is itself a fixed point.
    pub fn simplify(&mut self, tolerance: f64) {
        let contours = std::mem::take(&mut self.contours);
        self.contours = contours
            .iter()
            .map(|c| simplify_contour(c, tolerance))
            .filter(|c| drawing_segments(c) >= 2)
            .collect();
    }

    pub fn snap_to_grid(&mut self) {
        for contour in &mut self.contours {
            let snapped: Vec<PathEl> = contour
                .elements()
                .iter()
                .map(|el| match *el {
                    PathEl::MoveTo(p) => PathEl::MoveTo(p.round()),
                    PathEl::LineTo(p) => PathEl::LineTo(p.round()),
                    PathEl::QuadTo(c, p) => PathEl::QuadTo(c.round(), p.round()),
                    PathEl::CurveTo(c1, c2, p) => PathEl::CurveTo(c1.round(), c2.round(), p.round()),
                    PathEl::ClosePath => PathEl::ClosePath,
                })
                .collect();
            *contour = BezPath::from_vec(snapped);
        }
    }

    /// Simplify then snap, `passes` times. The second pass catches points
    /// that only become redundant once the first rounding has happened.
    pub fn finalize(&mut self, tolerance: f64, passes: usize) {
        for _ in 0..passes {
            self.simplify(tolerance);
            self.snap_to_grid();
        }
    }

    /// Contours lying wholly at or above `y` versus the rest.
    pub fn split_above(&self, y: f64) -> ContourSplit {
        self.partition(|bbox| bbox.y0 >= y)
    }

    /// Contours lying wholly at or below `y` versus the rest.
    pub fn split_below(&self, y: f64) -> ContourSplit {
        self.partition(|bbox| bbox.y1 <= y)
    }

    fn partition(&self, select: impl Fn(&Rect) -> bool) -> ContourSplit {
        let (selected, rest): (Vec<BezPath>, Vec<BezPath>) = self
            .contours
            .iter()
            .cloned()
            .partition(|c| select(&c.bounding_box()));
        ContourSplit {
            selected: Outline::new(selected),
            rest: Outline::new(rest),
        }
    }

    /// X coordinates where the horizontal line at `y` crosses the outline,
    /// sorted ascending.
    pub fn horizontal_intersections(&self, y: f64) -> Vec<f64> {
        let Some(bbox) = self.bounding_box() else {
            return Vec::new();
        };
        if y < bbox.y0 || y > bbox.y1 {
            return Vec::new();
        }
        let probe = Line::new((bbox.x0 - 1.0, y), (bbox.x1 + 1.0, y));
        let mut xs: Vec<f64> = self
            .contours
            .iter()
            .flat_map(|c| c.segments())
            .flat_map(|seg| seg.intersect_line(probe))
            .map(|hit| probe.eval(hit.line_t).x)
            .collect();
        xs.sort_by(f64::total_cmp);
        xs
    }

    /// Leftmost and rightmost ink on the horizontal line at `y`.
    pub fn ink_extent_at(&self, y: f64) -> Option<(f64, f64)> {
        let xs = self.horizontal_intersections(y);
        Some((*xs.first()?, *xs.last()?))
    }
}

impl From<BezPath> for Outline {
    /// Split a multi-subpath path into one contour per subpath.
    fn from(path: BezPath) -> Self {
        let mut contours = Vec::new();
        let mut current: Vec<PathEl> = Vec::new();
        for el in path.elements() {
            if matches!(el, PathEl::MoveTo(_)) && !current.is_empty() {
                contours.push(BezPath::from_vec(std::mem::take(&mut current)));
            }
            current.push(*el);
        }
        if !current.is_empty() {
            contours.push(BezPath::from_vec(current));
        }
        Outline::new(contours)
    }
}

fn drawing_segments(path: &BezPath) -> usize {
    path.elements()
        .iter()
        .filter(|el| !matches!(el, PathEl::MoveTo(_) | PathEl::ClosePath))
        .count()
}

fn simplify_contour(path: &BezPath, tolerance: f64) -> BezPath {
    let mut els = path.elements().to_vec();
    loop {
        let next = collapse_collinear(&demote_segments(&els, tolerance), tolerance);
        if next == els {
            return BezPath::from_vec(els);
        }
        els = next;
    }
}

/// Drop zero-length segments and turn flat curves into lines.
fn demote_segments(els: &[PathEl], tolerance: f64) -> Vec<PathEl> {
    let mut out: Vec<PathEl> = Vec::with_capacity(els.len());
    let mut start = Point::ZERO;
    let mut current = Point::ZERO;
    for el in els {
        match *el {
            PathEl::MoveTo(p) => {
                start = p;
                current = p;
                out.push(*el);
            }
            PathEl::LineTo(p) => {
                if p != current {
                    out.push(*el);
                    current = p;
                }
            }
            PathEl::QuadTo(c, p) => {
                if c == current && p == current {
                    continue;
                }
                if p != current && near_chord(c, current, p, tolerance) {
                    out.push(PathEl::LineTo(p));
                } else {
                    out.push(*el);
                }
                current = p;
            }
            PathEl::CurveTo(c1, c2, p) => {
                if c1 == current && c2 == current && p == current {
                    continue;
                }
                if p != current
                    && near_chord(c1, current, p, tolerance)
                    && near_chord(c2, current, p, tolerance)
                {
                    out.push(PathEl::LineTo(p));
                } else {
                    out.push(*el);
                }
                current = p;
            }
            PathEl::ClosePath => {
                if matches!(out.last(), Some(PathEl::LineTo(p)) if *p == start) {
                    out.pop();
                }
                out.push(PathEl::ClosePath);
                current = start;
            }
        }
    }
    out
}

/// Remove line vertices that sit on the segment joining their neighbours.
/// The start point of each contour is always kept.
fn collapse_collinear(els: &[PathEl], tolerance: f64) -> Vec<PathEl> {
    let mut out: Vec<PathEl> = Vec::with_capacity(els.len());
    let mut start = Point::ZERO;
    for (i, el) in els.iter().enumerate() {
        if let PathEl::MoveTo(p) = el {
            start = *p;
        }
        if let PathEl::LineTo(vertex) = el {
            let next_line_end = match els.get(i + 1) {
                Some(PathEl::LineTo(p)) => Some(*p),
                Some(PathEl::ClosePath) => Some(start),
                _ => None,
            };
            let prev = out.last().and_then(end_point);
            if let (Some(prev), Some(next)) = (prev, next_line_end) {
                if prev != next && near_chord(*vertex, prev, next, tolerance) {
                    continue;
                }
            }
        }
        out.push(*el);
    }
    out
}

fn end_point(el: &PathEl) -> Option<Point> {
    match *el {
        PathEl::MoveTo(p) | PathEl::LineTo(p) | PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => {
            Some(p)
        }
        PathEl::ClosePath => None,
    }
}

/// Whether `p` lies within `tolerance` of the segment `a`-`b`, projecting
/// inside it.
fn near_chord(p: Point, a: Point, b: Point, tolerance: f64) -> bool {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 == 0.0 {
        return (p - a).hypot() <= tolerance;
    }
    let t = (p - a).dot(ab) / len2;
    if !(0.0..=1.0).contains(&t) {
        return false;
    }
    (p - (a + ab * t)).hypot() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
        let mut p = BezPath::new();
        p.move_to((x0, y0));
        p.line_to((x1, y0));
        p.line_to((x1, y1));
        p.line_to((x0, y1));
        p.close_path();
        p
    }

    #[test]
    fn bounding_box_spans_all_contours() {
        let outline = Outline::new(vec![rect(0.0, 0.0, 10.0, 10.0), rect(20.0, -5.0, 30.0, 5.0)]);
        assert_eq!(outline.bounding_box(), Some(Rect::new(0.0, -5.0, 30.0, 10.0)));
    }

    #[test]
    fn simplify_drops_collinear_and_flat_points() {
        let mut p = BezPath::new();
        p.move_to((0.0, 0.0));
        p.line_to((50.0, 0.2));
        p.line_to((100.0, 0.0));
        p.curve_to((100.0, 30.0), (100.1, 60.0), (100.0, 100.0));
        p.line_to((100.0, 100.0));
        p.line_to((0.0, 100.0));
        p.close_path();
        let mut outline = Outline::new(vec![p]);
        outline.simplify(0.5);
        let els = outline.contours()[0].elements();
        assert_eq!(
            els,
            &[
                PathEl::MoveTo((0.0, 0.0).into()),
                PathEl::LineTo((100.0, 0.0).into()),
                PathEl::LineTo((100.0, 100.0).into()),
                PathEl::LineTo((0.0, 100.0).into()),
                PathEl::ClosePath,
            ]
        );
    }

    #[test]
    fn finalize_is_a_fixed_point() {
        let mut p = BezPath::new();
        p.move_to((0.3, 0.2));
        p.curve_to((40.4, -10.7), (80.2, 10.1), (120.6, 0.4));
        p.line_to((120.4, 60.2));
        p.line_to((120.45, 60.3));
        p.quad_to((60.2, 140.9), (0.1, 60.3));
        p.close_path();
        let mut outline = Outline::new(vec![p]);
        outline.finalize(0.5, 2);
        let settled = outline.clone();
        outline.simplify(0.5);
        outline.snap_to_grid();
        assert_eq!(outline, settled, "simplify+snap should not move a finalized outline");
    }

    #[test]
    fn half_turn_is_a_point_reflection() {
        let mut tri = BezPath::new();
        tri.move_to((0.0, 0.0));
        tri.line_to((10.0, 0.0));
        tri.line_to((0.0, 20.0));
        tri.close_path();
        let mut outline = Outline::new(vec![tri]);
        outline.rotate_about_center(180.0);
        assert_eq!(outline.bounding_box(), Some(Rect::new(0.0, 0.0, 10.0, 20.0)));
        let first = outline.contours()[0].elements()[0];
        assert_eq!(first, PathEl::MoveTo((10.0, 20.0).into()));
    }

    #[test]
    fn rotate_onto_baseline_rests_on_zero() {
        let mut outline = Outline::new(vec![rect(10.0, 10.0, 60.0, 200.0)]);
        outline.rotate_onto_baseline(175.0);
        let bbox = outline.bounding_box().expect("non-empty");
        assert!(bbox.y0.abs() < 1e-9);
    }

    #[test]
    fn splits_by_horizontal_line() {
        let outline = Outline::new(vec![
            rect(0.0, 0.0, 10.0, 400.0),
            rect(0.0, 600.0, 10.0, 650.0),
            rect(0.0, 500.0, 10.0, 700.0),
        ]);
        let above = outline.split_above(540.0);
        assert_eq!(above.selected.contours().len(), 1);
        assert_eq!(above.rest.contours().len(), 2);
        let below = outline.split_below(540.0);
        assert_eq!(below.selected.contours().len(), 1);
        assert_eq!(below.rest.contours().len(), 2);
    }

    #[test]
    fn horizontal_probe_finds_ink_edges() {
        let outline = Outline::new(vec![rect(5.0, 0.0, 15.0, 10.0), rect(40.0, 0.0, 50.0, 10.0)]);
        assert_eq!(outline.ink_extent_at(5.0), Some((5.0, 50.0)));
        assert_eq!(outline.horizontal_intersections(5.0).len(), 4);
        assert!(outline.ink_extent_at(20.0).is_none());
    }

    #[test]
    fn subpaths_become_contours() {
        let mut path = rect(0.0, 0.0, 1.0, 1.0);
        path.extend(rect(2.0, 2.0, 3.0, 3.0));
        assert_eq!(Outline::from(path).contours().len(), 2);
    }
}
