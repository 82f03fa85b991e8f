//! UFO file I/O operations

use anyhow::{Context, Result};
use norad::Font;
use std::path::Path;
use tracing::info;

use super::conversions::repository_to_font;
use crate::font_source::FontInfo;
use crate::pipeline::GlyphRepository;

/// Write the repository as a UFO font project, replacing anything at `path`.
pub fn save_ufo(repo: &GlyphRepository, info: &FontInfo, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let font = repository_to_font(repo, info)?;
    font.save(path)
        .with_context(|| format!("Failed to save UFO {}", path.display()))?;
    info!("Saved {} glyphs to {}", repo.len(), path.display());
    Ok(())
}

/// Load a UFO font file from disk
pub fn load_ufo_from_path(path: impl AsRef<Path>) -> Result<Font> {
    let path = path.as_ref();
    Font::load(path).with_context(|| format!("Failed to load UFO {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Outline;
    use crate::pipeline::repository::{Glyph, GlyphOrigin};
    use kurbo::BezPath;

    #[test]
    fn saved_font_loads_back() {
        let mut p = BezPath::new();
        p.move_to((20.0, 0.0));
        p.line_to((120.0, 0.0));
        p.line_to((120.0, 500.0));
        p.close_path();
        let mut repo = GlyphRepository::new();
        repo.insert(
            Glyph::new("A", Outline::new(vec![p]), 160.0, GlyphOrigin::Space)
                .with_codepoints(vec!['A']),
        );
        repo.insert(
            Glyph::new("space", Outline::default(), 256.0, GlyphOrigin::Space)
                .with_codepoints(vec![' ']),
        );
        repo.kerning.set_pair("A", "A", -20);

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("Handwriting.ufo");
        let info = FontInfo::default();
        save_ufo(&repo, &info, &path).expect("save");

        let font = load_ufo_from_path(&path).expect("load");
        assert_eq!(font.default_layer().len(), 2);
        let a = font.default_layer().get_glyph("A").expect("A");
        assert_eq!(a.width, 160.0);
        assert_eq!(a.contours[0].points.len(), 3);
        assert_eq!(font.font_info.family_name.as_deref(), Some("Handwriting"));
        assert_eq!(
            font.kerning.get("A").and_then(|row| row.get("A")).copied(),
            Some(-20.0)
        );
    }
}
