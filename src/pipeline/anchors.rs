//! Anchor placement on base glyphs
//!
//! Top and bottom anchors come from the ink box, clamped inside the advance
//! so narrow letters keep their marks over the ink. The corner anchors are
//! found by turning the outline 45 degrees and probing for the true tip of
//! the ink instead of using the box corner.

use kurbo::{Affine, Point};

use super::repository::{AnchorClass, AnchorRole, Glyph};
use crate::config::AnchorTables;
use crate::geometry::Outline;

/// Set the base anchors of `glyph`. Glyphs without ink are left alone.
pub fn place_anchors(glyph: &mut Glyph, tables: &AnchorTables) {
    let Some(bbox) = glyph.bounding_box() else {
        return;
    };

    let xmin = bbox.x0.max(tables.left_margin);
    let xmax = bbox.x1.min(glyph.advance_width - tables.right_margin);
    let mid = (xmin + xmax) / 2.0;

    let mut top = bbox.y1;
    if let Some(o) = tables.top_overrides.iter().find(|o| o.glyph == glyph.name) {
        top = o.y.unwrap_or(top) + o.dy;
    }

    glyph.set_anchor(AnchorClass::Top, AnchorRole::Base, Point::new(mid, top));
    glyph.set_anchor(
        AnchorClass::Bottom,
        AnchorRole::Base,
        Point::new(mid, bbox.y0),
    );

    let dx = tables
        .upper_right_offsets
        .iter()
        .find(|o| o.glyph == glyph.name)
        .map_or(0.0, |o| o.dx);
    if let Some(corner) = diagonal_corner(&glyph.outline, 45.0, tables.probe_depth) {
        glyph.set_anchor(
            AnchorClass::UpperRight,
            AnchorRole::Base,
            Point::new(corner.x + dx, corner.y),
        );
    }
    if let Some(corner) = diagonal_corner(&glyph.outline, -45.0, tables.probe_depth) {
        glyph.set_anchor(AnchorClass::LowerRightEnd, AnchorRole::Base, corner);
    }
}

/// Outer corner of the ink in the direction `degrees` below the upward
/// vertical: 45 finds the upper right, -45 the lower right.
///
/// The outline is turned about its centre so the corner becomes the top
/// (or bottom) extreme, a horizontal probe just inside that extreme picks
/// the leftmost ink crossing, and the point is turned back.
pub fn diagonal_corner(outline: &Outline, degrees: f64, depth: f64) -> Option<Point> {
    let bbox = outline.bounding_box()?;
    let turn = Affine::rotate_about(degrees.to_radians(), bbox.center());
    let turned = outline.transformed(turn);
    let tbox = turned.bounding_box()?;

    let (extreme, probe) = if degrees >= 0.0 {
        (tbox.y1, tbox.y1 - depth)
    } else {
        (tbox.y0, tbox.y0 + depth)
    };
    let x = turned
        .horizontal_intersections(probe)
        .into_iter()
        .reduce(f64::min)
        .unwrap_or_else(|| tbox.center().x);

    Some(turn.inverse() * Point::new(x, extreme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnchorTables;
    use crate::pipeline::repository::GlyphOrigin;
    use kurbo::BezPath;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Outline {
        let mut p = BezPath::new();
        p.move_to((x0, y0));
        p.line_to((x1, y0));
        p.line_to((x1, y1));
        p.line_to((x0, y1));
        p.close_path();
        Outline::new(vec![p])
    }

    #[test]
    fn top_and_bottom_use_the_clamped_box() {
        let mut glyph = Glyph::new("l", rect(0.0, 0.0, 100.0, 600.0), 100.0, GlyphOrigin::Space);
        place_anchors(&mut glyph, &AnchorTables::default());
        // clamped to [20, 60]
        assert_eq!(
            glyph.anchor(AnchorClass::Top, AnchorRole::Base),
            Some(Point::new(40.0, 600.0))
        );
        assert_eq!(
            glyph.anchor(AnchorClass::Bottom, AnchorRole::Base),
            Some(Point::new(40.0, 0.0))
        );
    }

    #[test]
    fn top_overrides_apply() {
        let tables = AnchorTables::default();
        let mut capital_i = Glyph::new("I", rect(20.0, 0.0, 80.0, 560.0), 140.0, GlyphOrigin::Space);
        place_anchors(&mut capital_i, &tables);
        assert_eq!(
            capital_i.anchor(AnchorClass::Top, AnchorRole::Base).map(|p| p.y),
            Some(620.0)
        );

        let mut aring = Glyph::new("Aring", rect(20.0, 0.0, 420.0, 700.0), 480.0, GlyphOrigin::Space);
        place_anchors(&mut aring, &tables);
        assert_eq!(
            aring.anchor(AnchorClass::Top, AnchorRole::Base).map(|p| p.y),
            Some(665.0)
        );
    }

    #[test]
    fn diagonal_probe_finds_the_box_corner_of_a_square() {
        let square = rect(0.0, 0.0, 100.0, 100.0);
        let corner = diagonal_corner(&square, 45.0, 5.0).expect("corner");
        assert!((corner.x - 100.0).abs() < 8.0, "x = {}", corner.x);
        assert!((corner.y - 100.0).abs() < 8.0, "y = {}", corner.y);

        let lower = diagonal_corner(&square, -45.0, 5.0).expect("corner");
        assert!((lower.x - 100.0).abs() < 8.0, "x = {}", lower.x);
        assert!(lower.y.abs() < 8.0, "y = {}", lower.y);
    }

    #[test]
    fn upper_right_offsets_apply() {
        let tables = AnchorTables::default();
        let mut plain = Glyph::new("E", rect(20.0, 0.0, 300.0, 560.0), 340.0, GlyphOrigin::Space);
        let mut offset = Glyph::new("L", rect(20.0, 0.0, 300.0, 560.0), 340.0, GlyphOrigin::Space);
        place_anchors(&mut plain, &tables);
        place_anchors(&mut offset, &tables);
        let a = plain.anchor(AnchorClass::UpperRight, AnchorRole::Base).expect("E corner");
        let b = offset.anchor(AnchorClass::UpperRight, AnchorRole::Base).expect("L corner");
        assert_eq!(b.x, a.x - 100.0);
        assert_eq!(b.y, a.y);
    }

    #[test]
    fn empty_glyphs_get_no_anchors() {
        let mut space = Glyph::new("space", Outline::default(), 256.0, GlyphOrigin::Space);
        place_anchors(&mut space, &AnchorTables::default());
        assert!(space.anchors.is_empty());
    }
}
