//! Repository to UFO conversion
//!
//! Turns the finished glyph repository into a norad font: glyphs with their
//! contours and anchors, kerning groups and pairs, and a features file for
//! the substitution rules and side-accent positioning.

use anyhow::{Context, Result};
use kurbo::{BezPath, PathEl, Point};
use norad::{Anchor, Contour, ContourPoint, Font, Name, PointType};
use std::fmt::Write as _;

use crate::font_source::FontInfo;
use crate::pipeline::repository::{
    AnchorClass, AnchorRole, Glyph, GlyphRepository, KerningTable, PairAdjustment, ShapeClass,
    SubstitutionKind, SubstitutionRule, ValueRecord,
};

/// Feature that carries the side-accent pair positioning.
const POSITIONING_FEATURE: &str = "dist";

/// Build a complete norad font from the repository.
pub fn repository_to_font(repo: &GlyphRepository, info: &FontInfo) -> Result<Font> {
    let mut font = Font::new();
    font.font_info = info.to_norad_font_info();

    let layer = font.default_layer_mut();
    for glyph in repo.glyphs() {
        layer.insert_glyph(glyph_to_norad(glyph)?);
    }

    write_kerning(&repo.kerning, &mut font)?;
    font.features = features(&repo.substitutions, &repo.pair_adjustments);
    Ok(font)
}

pub fn glyph_to_norad(glyph: &Glyph) -> Result<norad::Glyph> {
    let mut out = norad::Glyph::new(&glyph.name);
    out.width = glyph.advance_width;
    for &c in &glyph.codepoints {
        out.codepoints.insert(c);
    }
    out.contours = glyph.outline.contours().iter().map(contour_to_norad).collect();
    for (&(class, role), point) in &glyph.anchors {
        let name = anchor_name(class, role);
        let name = Name::new(&name).with_context(|| format!("Invalid anchor name {name}"))?;
        out.anchors.push(Anchor::new(point.x, point.y, Some(name), None, None));
    }
    Ok(out)
}

/// `top`, `bottom`, ... for bases and basemarks; `_top`, ... for marks.
pub fn anchor_name(class: AnchorClass, role: AnchorRole) -> String {
    match role {
        AnchorRole::Mark => format!("_{}", class.as_str()),
        AnchorRole::Base | AnchorRole::BaseMark => class.as_str().to_string(),
    }
}

/// A closed UFO contour. The start point is kept only when no segment
/// already ends on it.
pub fn contour_to_norad(path: &BezPath) -> Contour {
    let point = |p: Point, typ: PointType| ContourPoint::new(p.x, p.y, typ, false, None, None);
    let mut points = Vec::new();
    let mut start = None;
    let mut last_end = None;

    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => start = Some(p),
            PathEl::LineTo(p) => {
                points.push(point(p, PointType::Line));
                last_end = Some(p);
            }
            PathEl::QuadTo(c, p) => {
                points.push(point(c, PointType::OffCurve));
                points.push(point(p, PointType::QCurve));
                last_end = Some(p);
            }
            PathEl::CurveTo(c1, c2, p) => {
                points.push(point(c1, PointType::OffCurve));
                points.push(point(c2, PointType::OffCurve));
                points.push(point(p, PointType::Curve));
                last_end = Some(p);
            }
            PathEl::ClosePath => {}
        }
    }

    if let Some(start) = start {
        if last_end != Some(start) {
            points.insert(0, point(start, PointType::Line));
        }
    }
    Contour::new(points, None)
}

fn group_name(prefix: &str, class: ShapeClass) -> Result<Name> {
    let name = format!("public.{prefix}.{}", class.group_suffix());
    Name::new(&name).with_context(|| format!("Invalid group name {name}"))
}

fn glyph_name(name: &str) -> Result<Name> {
    Name::new(name).with_context(|| format!("Invalid glyph name {name}"))
}

/// Groups from the side classes, kerning from the non-zero matrix cells and
/// the pair overrides. UFO lookup lets glyph pairs win over group pairs.
fn write_kerning(table: &KerningTable, font: &mut Font) -> Result<()> {
    for class in ShapeClass::ALL {
        for (prefix, groups) in [("kern1", &table.left_groups), ("kern2", &table.right_groups)] {
            let members = &groups[class.index()];
            if members.is_empty() {
                continue;
            }
            let members = members
                .iter()
                .map(|g| glyph_name(g))
                .collect::<Result<Vec<_>>>()?;
            font.groups.insert(group_name(prefix, class)?, members);
        }
    }

    for left in ShapeClass::ALL {
        if table.left_groups[left.index()].is_empty() {
            continue;
        }
        for right in ShapeClass::ALL {
            let value = table.matrix[left.index()][right.index() + 1];
            if value == 0 || table.right_groups[right.index()].is_empty() {
                continue;
            }
            font.kerning
                .entry(group_name("kern1", left)?)
                .or_default()
                .insert(group_name("kern2", right)?, f64::from(value));
        }
    }

    for ((left, right), value) in &table.pairs {
        font.kerning
            .entry(glyph_name(left)?)
            .or_default()
            .insert(glyph_name(right)?, f64::from(*value));
    }
    Ok(())
}

/// The features file: one block per substitution feature in first-use
/// order, then the pair positioning.
pub fn features(rules: &[SubstitutionRule], adjustments: &[PairAdjustment]) -> String {
    let mut blocks: Vec<(&str, Vec<String>)> = Vec::new();
    for rule in rules {
        let line = substitution_line(rule);
        match blocks.iter_mut().find(|(tag, _)| *tag == rule.feature) {
            Some((_, lines)) => lines.push(line),
            None => blocks.push((rule.feature.as_str(), vec![line])),
        }
    }
    if !adjustments.is_empty() {
        blocks.push((
            POSITIONING_FEATURE,
            adjustments.iter().map(positioning_line).collect(),
        ));
    }

    let mut fea = String::from("languagesystem DFLT dflt;\nlanguagesystem latn dflt;\n");
    for (tag, lines) in blocks {
        let _ = write!(fea, "\nfeature {tag} {{\n");
        for line in lines {
            let _ = writeln!(fea, "    {line}");
        }
        let _ = writeln!(fea, "}} {tag};");
    }
    fea
}

fn substitution_line(rule: &SubstitutionRule) -> String {
    match rule.kind {
        SubstitutionKind::Ligature => format!("sub {} by {};", rule.trigger.join(" "), rule.result),
        SubstitutionKind::ContextualVariant if rule.backtrack.is_empty() => {
            format!("sub {} by {};", rule.trigger.join(" "), rule.result)
        }
        SubstitutionKind::ContextualVariant => {
            let backtrack = match rule.backtrack.as_slice() {
                [single] => single.clone(),
                many => format!("[{}]", many.join(" ")),
            };
            format!("sub {backtrack} {}' by {};", rule.trigger.join("' "), rule.result)
        }
    }
}

fn value_record(value: &ValueRecord) -> String {
    format!("<{} 0 {} 0>", value.x_placement, value.x_advance)
}

fn positioning_line(adjustment: &PairAdjustment) -> String {
    format!(
        "pos {} {} {} {};",
        adjustment.first,
        value_record(&adjustment.first_value),
        adjustment.second,
        value_record(&adjustment.second_value)
    )
}
