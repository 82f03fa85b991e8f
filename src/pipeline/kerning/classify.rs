//! Side-shape classification for class kerning

use std::collections::BTreeSet;

use crate::config::{KerningTables, ShapeLetters};
use crate::pipeline::repository::{Glyph, GlyphOrigin, GlyphRepository, ShapeClass};

/// Composite glyphs nest only a few levels deep.
const MAX_DEPTH: usize = 4;

/// The letters whose shapes decide a glyph's left and right sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideLetters {
    pub leading: Option<char>,
    pub trailing: Option<char>,
}

impl SideLetters {
    fn both(letter: Option<char>) -> Self {
        Self {
            leading: letter,
            trailing: letter,
        }
    }
}

pub fn side_letters(glyph: &Glyph, repo: &GlyphRepository, tables: &KerningTables) -> SideLetters {
    classify(glyph, repo, tables, 0)
}

fn classify(glyph: &Glyph, repo: &GlyphRepository, tables: &KerningTables, depth: usize) -> SideLetters {
    let nested = |name: &str| {
        repo.get(name)
            .filter(|_| depth < MAX_DEPTH)
            .map(|g| classify(g, repo, tables, depth + 1))
    };

    match &glyph.origin {
        GlyphOrigin::Digraph { first, second } => {
            return SideLetters {
                leading: nested(first).and_then(|s| s.leading),
                trailing: nested(second).and_then(|s| s.trailing),
            };
        }
        GlyphOrigin::Accent { base, .. } | GlyphOrigin::Variant { base, .. } => {
            return nested(base).unwrap_or(SideLetters::both(None));
        }
        _ => {}
    }

    let name = glyph.name.as_str();
    let mut chars = name.chars();
    let first = chars.next();
    if chars.next().is_none() {
        return SideLetters::both(first.filter(char::is_ascii_alphabetic));
    }

    if matches!(glyph.origin, GlyphOrigin::Ligature { .. }) || name.contains('_') {
        return SideLetters {
            leading: first,
            trailing: name.chars().last(),
        };
    }

    if let Some((base, suffix)) = name.split_once('.') {
        if tables.variant_suffixes.iter().any(|s| s == suffix) {
            return nested(base).unwrap_or_else(|| {
                let mut base_chars = base.chars();
                let letter = base_chars.next().filter(|_| base_chars.next().is_none());
                SideLetters::both(letter)
            });
        }
    }

    let rest = first.map_or("", |c| &name[c.len_utf8()..]);
    if name.len() > 3 && tables.accent_suffixes.iter().any(|s| s == rest) {
        return SideLetters::both(first);
    }

    SideLetters::both(None)
}

pub fn shape_class(letter: char, letters: &ShapeLetters) -> Option<ShapeClass> {
    if letters.vertical_bar.contains(letter) {
        Some(ShapeClass::VerticalBar)
    } else if letters.open_bowl.contains(letter) {
        Some(ShapeClass::OpenBowl)
    } else if letters.complex.contains(letter) {
        Some(ShapeClass::Complex)
    } else {
        None
    }
}

/// Left groups (by trailing letter) and right groups (by leading letter).
pub fn groups(
    repo: &GlyphRepository,
    tables: &KerningTables,
) -> ([BTreeSet<String>; 3], [BTreeSet<String>; 3]) {
    let mut left: [BTreeSet<String>; 3] = Default::default();
    let mut right: [BTreeSet<String>; 3] = Default::default();

    for glyph in repo.glyphs() {
        let sides = side_letters(glyph, repo, tables);
        if let Some(class) = sides.trailing.and_then(|c| shape_class(c, &tables.trailing)) {
            left[class.index()].insert(glyph.name.clone());
        }
        if let Some(class) = sides.leading.and_then(|c| shape_class(c, &tables.leading)) {
            right[class.index()].insert(glyph.name.clone());
        }
    }
    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Outline;

    fn glyph(name: &str, origin: GlyphOrigin) -> Glyph {
        Glyph::new(name, Outline::default(), 100.0, origin)
    }

    fn sides(name: &str, repo: &GlyphRepository) -> (Option<char>, Option<char>) {
        let s = side_letters(repo.get(name).expect(name), repo, &KerningTables::default());
        (s.leading, s.trailing)
    }

    fn repo() -> GlyphRepository {
        let mut repo = GlyphRepository::new();
        for name in ["A", "E", "O", "o", "period"] {
            repo.insert(glyph(name, GlyphOrigin::Space));
        }
        repo.insert(glyph(
            "T_O",
            GlyphOrigin::Ligature {
                components: vec!["T".into(), "O".into()],
            },
        ));
        repo.insert(glyph("Ograve", GlyphOrigin::Sample { line: 2 }));
        repo.insert(glyph("O.sc", GlyphOrigin::Space));
        repo.insert(glyph(
            "AE",
            GlyphOrigin::Digraph {
                first: "A".into(),
                second: "E".into(),
            },
        ));
        repo.insert(glyph(
            "ocircumflex",
            GlyphOrigin::Accent {
                base: "o".into(),
                mark: "uni0302".into(),
            },
        ));
        repo
    }

    #[test]
    fn side_letters_follow_the_constituents() {
        let repo = repo();
        assert_eq!(sides("A", &repo), (Some('A'), Some('A')));
        assert_eq!(sides("T_O", &repo), (Some('T'), Some('O')));
        assert_eq!(sides("Ograve", &repo), (Some('O'), Some('O')));
        assert_eq!(sides("O.sc", &repo), (Some('O'), Some('O')));
        assert_eq!(sides("AE", &repo), (Some('A'), Some('E')));
        assert_eq!(sides("ocircumflex", &repo), (Some('o'), Some('o')));
        assert_eq!(sides("period", &repo), (None, None));
    }

    #[test]
    fn groups_use_the_side_tables() {
        let repo = repo();
        let tables = KerningTables::default();
        let (left, right) = groups(&repo, &tables);
        // E ends in a complex shape, A starts with an open bowl
        assert!(left[ShapeClass::Complex.index()].contains("AE"));
        assert!(right[ShapeClass::OpenBowl.index()].contains("AE"));
        assert!(right[ShapeClass::Complex.index()].contains("T_O"));
        assert!(left[ShapeClass::OpenBowl.index()].contains("T_O"));
        assert!(left.iter().chain(right.iter()).all(|g| !g.contains("period")));
    }
}
