//! Font metrics and naming metadata
//!
//! The design space is an EM square of `ascent + descent` units with the
//! baseline at y = 0. These values feed both normalization and the
//! `fontinfo.plist` written alongside the glyphs.

use serde::{Deserialize, Serialize};

/// Vertical metrics of the design space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontMetrics {
    pub ascent: f64,
    pub descent: f64,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            ascent: 600.0,
            descent: 256.0,
        }
    }
}

impl FontMetrics {
    pub fn em(&self) -> f64 {
        self.ascent + self.descent
    }

    /// Share of the EM above the baseline.
    pub fn top_ratio(&self) -> f64 {
        self.ascent / self.em()
    }
}

/// Font information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontInfo {
    pub family_name: String,
    pub style_name: String,
    pub version_major: i32,
    pub version_minor: u32,
    pub copyright: Option<String>,
    pub metrics: FontMetrics,
}

impl Default for FontInfo {
    fn default() -> Self {
        Self {
            family_name: "Handwriting".to_string(),
            style_name: "Regular".to_string(),
            version_major: 1,
            version_minor: 80,
            copyright: None,
            metrics: FontMetrics::default(),
        }
    }
}

impl FontInfo {
    /// Get a display name combining family and style names
    pub fn get_display_name(&self) -> String {
        let parts: Vec<&str> = [&self.family_name, &self.style_name]
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.as_str())
            .collect();

        if parts.is_empty() {
            "Untitled Font".to_string()
        } else {
            parts.join(" ")
        }
    }

    /// Convert to norad FontInfo
    pub fn to_norad_font_info(&self) -> norad::FontInfo {
        let mut info = norad::FontInfo::default();

        if !self.family_name.is_empty() {
            info.family_name = Some(self.family_name.clone());
        }
        if !self.style_name.is_empty() {
            info.style_name = Some(self.style_name.clone());
        }
        info.version_major = Some(self.version_major);
        info.version_minor = Some(self.version_minor);
        info.copyright = self.copyright.clone();

        if let Some(units_per_em) =
            norad::fontinfo::NonNegativeIntegerOrFloat::new(self.metrics.em())
        {
            info.units_per_em = Some(units_per_em);
        }
        info.ascender = Some(self.metrics.ascent);
        info.descender = Some(-self.metrics.descent);
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_em_is_ascent_plus_descent() {
        let metrics = FontMetrics::default();
        assert_eq!(metrics.em(), 856.0);
        assert!((metrics.top_ratio() - 600.0 / 856.0).abs() < 1e-12);
    }

    #[test]
    fn norad_info_carries_metrics() {
        let info = FontInfo::default().to_norad_font_info();
        assert_eq!(info.family_name.as_deref(), Some("Handwriting"));
        assert_eq!(info.ascender, Some(600.0));
        assert_eq!(info.descender, Some(-256.0));
        assert!(info.units_per_em.is_some());
    }

    #[test]
    fn display_name_skips_empty_parts() {
        let info = FontInfo {
            style_name: String::new(),
            ..FontInfo::default()
        };
        assert_eq!(info.get_display_name(), "Handwriting");
    }
}
