//! SVG outline import
//!
//! Scanned samples arrive as traced SVG files: one or more `<path>` elements,
//! usually inside groups carrying `transform` attributes. Paths are read with
//! their accumulated transforms and flipped into a y-up coordinate space.

use kurbo::{Affine, BezPath, Point};
use std::fs;
use std::path::Path;

use super::{GeometryError, Outline};

pub fn load_svg(path: &Path) -> Result<Outline, GeometryError> {
    let text = fs::read_to_string(path).map_err(|source| GeometryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let outline = parse_svg(&text).map_err(|message| GeometryError::Svg {
        path: path.to_path_buf(),
        message,
    })?;
    if outline.is_empty() {
        return Err(GeometryError::NoContours {
            path: path.to_path_buf(),
        });
    }
    Ok(outline)
}

/// Parse SVG source into an outline.
pub fn parse_svg(text: &str) -> Result<Outline, String> {
    let doc = roxmltree::Document::parse(text).map_err(|e| e.to_string())?;
    let mut outline = Outline::default();

    for node in doc.descendants().filter(|n| n.has_tag_name("path")) {
        let Some(data) = node.attribute("d") else {
            continue;
        };
        let mut path = BezPath::from_svg(data).map_err(|e| format!("bad path data: {e}"))?;

        let mut affine = Affine::IDENTITY;
        let chain: Vec<_> = node.ancestors().collect();
        for ancestor in chain.iter().rev() {
            if let Some(transform) = ancestor.attribute("transform") {
                affine = affine * parse_transform(transform)?;
            }
        }
        path.apply_affine(Affine::FLIP_Y * affine);
        outline.append(Outline::from(path));
    }
    Ok(outline)
}

/// Parse an SVG transform list such as `translate(0,1734) scale(0.1,-0.1)`.
pub fn parse_transform(text: &str) -> Result<Affine, String> {
    let mut affine = Affine::IDENTITY;
    let mut rest = text.trim();
    while !rest.is_empty() {
        let open = rest
            .find('(')
            .ok_or_else(|| format!("expected '(' in transform '{text}'"))?;
        let close = rest
            .find(')')
            .ok_or_else(|| format!("expected ')' in transform '{text}'"))?;
        if close < open {
            return Err(format!("unbalanced transform '{text}'"));
        }
        let name = rest[..open].trim();
        let args = parse_numbers(&rest[open + 1..close])?;
        affine = affine * transform_function(name, &args)?;
        rest = rest[close + 1..].trim_start_matches([' ', ',', '\t', '\n', '\r']);
    }
    Ok(affine)
}

fn parse_numbers(text: &str) -> Result<Vec<f64>, String> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().map_err(|_| format!("bad number '{s}'")))
        .collect()
}

fn transform_function(name: &str, args: &[f64]) -> Result<Affine, String> {
    let affine = match (name, args) {
        ("matrix", [a, b, c, d, e, f]) => Affine::new([*a, *b, *c, *d, *e, *f]),
        ("translate", [x]) => Affine::translate((*x, 0.0)),
        ("translate", [x, y]) => Affine::translate((*x, *y)),
        ("scale", [s]) => Affine::scale(*s),
        ("scale", [x, y]) => Affine::scale_non_uniform(*x, *y),
        ("rotate", [a]) => Affine::rotate(a.to_radians()),
        ("rotate", [a, cx, cy]) => Affine::rotate_about(a.to_radians(), Point::new(*cx, *cy)),
        ("skewX", [a]) => Affine::skew(a.to_radians().tan(), 0.0),
        ("skewY", [a]) => Affine::skew(0.0, a.to_radians().tan()),
        _ => return Err(format!("unsupported transform {name}{args:?}")),
    };
    Ok(affine)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_grouped_paths_and_flips_y() {
        let svg = r#"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
  <g transform="translate(0,100) scale(0.1,-0.1)">
    <path d="M0 0 L200 0 L200 300 L0 300 Z"/>
  </g>
</svg>"#;
        let outline = parse_svg(svg).expect("valid svg");
        assert_eq!(outline.contours().len(), 1);
        let bbox = outline.bounding_box().expect("non-empty");
        // group maps y=0..300 to 100..70, the flip then gives -100..-70
        assert!((bbox.x1 - 20.0).abs() < 1e-9);
        assert!((bbox.y0 + 100.0).abs() < 1e-9);
        assert!((bbox.y1 + 70.0).abs() < 1e-9);
    }

    #[test]
    fn transform_lists_compose_left_to_right() {
        let affine = parse_transform("translate(10, 0) scale(2)").expect("valid");
        assert_eq!(affine * Point::new(1.0, 1.0), Point::new(12.0, 2.0));
        assert!(parse_transform("wobble(3)").is_err());
    }

    #[test]
    fn bad_documents_are_errors() {
        assert!(parse_svg("<svg").is_err());
        assert!(parse_svg(r#"<svg><path d="M0 0 Q"/></svg>"#).is_err());
    }
}
