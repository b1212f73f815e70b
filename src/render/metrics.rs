use std::fs;
use std::path::Path;

use ab_glyph::{Font, FontArc, FontVec, PxScale, ScaleFont, point};
use fontdb::{Database, Family, Query, Source};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::processing::color::Color;
use crate::render::surface::RasterSurface;

/// Font size and family the text is laid out with.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size_px: f32,
    pub font_family: String,
}

impl TextStyle {
    pub const DEFAULT_FONT_SIZE_PX: f32 = 48.0;
    pub const DEFAULT_FONT_FAMILY: &'static str = "Microsoft YaHei";

    pub fn new(font_size_px: f32, font_family: impl Into<String>) -> Self {
        Self {
            font_size_px,
            font_family: font_family.into(),
        }
    }

    /// CSS shorthand, e.g. `48px "Arial"`.
    pub fn css_font(&self) -> String {
        format!("{}px \"{}\"", self.font_size_px, self.font_family)
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FONT_SIZE_PX, Self::DEFAULT_FONT_FAMILY)
    }
}

/// Measures and paints text runs. Layout only ever talks to this trait.
pub trait GlyphMetrics {
    /// Advance width of `text` rendered as one contiguous run.
    fn measure_text(&self, style: &TextStyle, text: &str) -> f32;

    /// Paints one character with its left edge at `x` and the vertical middle
    /// of the em box at `middle_y`.
    fn draw_glyph(
        &self,
        surface: &mut RasterSurface,
        style: &TextStyle,
        ch: char,
        x: f32,
        middle_y: f32,
        color: Color,
    );
}

/// Fallback families tried in order when the requested one is not installed.
const FALLBACK_FAMILIES: [&str; 4] = [
    "Microsoft YaHei",
    "Noto Sans CJK SC",
    "Noto Sans",
    "DejaVu Sans",
];

/// `GlyphMetrics` backed by a single outline font face.
///
/// The face is chosen once; `TextStyle::font_family` only matters at load time.
#[derive(Clone)]
pub struct FontMetrics {
    font: FontArc,
    family: String,
}

impl std::fmt::Debug for FontMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontMetrics")
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

impl FontMetrics {
    /// Finds `family` among the system fonts, falling back to common sans faces
    /// and finally to any face the system has.
    pub fn load(family: &str) -> Result<Self> {
        let mut db = Database::new();
        db.load_system_fonts();

        let requested = [Family::Name(family)];
        let fallbacks: Vec<Family<'_>> = FALLBACK_FAMILIES
            .iter()
            .copied()
            .map(Family::Name)
            .chain([Family::SansSerif])
            .collect();

        for families in std::iter::once(&requested[..]).chain(fallbacks.chunks(1)) {
            if let Some(id) = db.query(&Query {
                families,
                ..Default::default()
            }) && let Some(metrics) = load_face(&db, id)?
            {
                if metrics.family != family {
                    info!(requested = family, using = %metrics.family, "font family fallback");
                }
                return Ok(metrics);
            }
        }

        for face in db.faces() {
            if let Some(metrics) = load_face(&db, face.id)? {
                info!(requested = family, using = %metrics.family, "font family fallback");
                return Ok(metrics);
            }
        }

        Err(Error::MetricsUnavailable(format!(
            "no usable font face for family {family:?}"
        )))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read(path).map_err(|err| {
            Error::MetricsUnavailable(format!("failed to read font at {}: {err}", path.display()))
        })?;
        let family = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_bytes(data, 0, family)
    }

    pub fn from_bytes(data: Vec<u8>, index: u32, family: impl Into<String>) -> Result<Self> {
        let font = FontVec::try_from_vec_and_index(data, index)
            .map_err(|err| Error::MetricsUnavailable(format!("failed to decode font face: {err}")))?;
        Ok(Self {
            font: FontArc::new(font),
            family: family.into(),
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    /// Offset from the em-box middle down to the alphabetic baseline.
    fn middle_to_baseline(&self, scale: PxScale) -> f32 {
        let scaled = self.font.as_scaled(scale);
        (scaled.ascent() + scaled.descent()) / 2.0
    }
}

fn load_face(db: &Database, id: fontdb::ID) -> Result<Option<FontMetrics>> {
    let Some(face) = db.face(id) else {
        return Ok(None);
    };
    let family = face
        .families
        .first()
        .map(|(name, _)| name.clone())
        .unwrap_or_default();
    let data = match &face.source {
        Source::Binary(data) => data.as_ref().as_ref().to_vec(),
        Source::File(path) => match fs::read(path) {
            Ok(data) => data,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "skipping unreadable font file");
                return Ok(None);
            }
        },
        Source::SharedFile(_, data) => data.as_ref().as_ref().to_vec(),
    };
    match FontMetrics::from_bytes(data, face.index, family) {
        Ok(metrics) => Ok(Some(metrics)),
        Err(err) => {
            debug!(error = %err, "skipping undecodable font face");
            Ok(None)
        }
    }
}

impl GlyphMetrics for FontMetrics {
    fn measure_text(&self, style: &TextStyle, text: &str) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(style.font_size_px));
        let mut width = 0.0f32;
        let mut previous = None;
        for ch in text.chars() {
            if ch.is_control() {
                continue;
            }
            let glyph_id = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                width += scaled.kern(prev, glyph_id);
            }
            width += scaled.h_advance(glyph_id);
            previous = Some(glyph_id);
        }
        width.max(0.0)
    }

    fn draw_glyph(
        &self,
        surface: &mut RasterSurface,
        style: &TextStyle,
        ch: char,
        x: f32,
        middle_y: f32,
        color: Color,
    ) {
        if ch.is_control() {
            return;
        }
        let scale = PxScale::from(style.font_size_px);
        let baseline = middle_y + self.middle_to_baseline(scale);
        let mut positioned = self.font.as_scaled(scale).scaled_glyph(ch);
        positioned.position = point(x, baseline);
        if let Some(outline) = self.font.outline_glyph(positioned) {
            let bounds = outline.px_bounds();
            let width = bounds.width() as u32;
            let height = bounds.height() as u32;
            let mut coverage = vec![0.0f32; width as usize * height as usize];
            outline.draw(|gx, gy, amount| {
                if let Some(slot) = coverage.get_mut(gy as usize * width as usize + gx as usize) {
                    *slot = amount;
                }
            });
            surface.draw_coverage(
                bounds.min.x as i32,
                bounds.min.y as i32,
                width,
                &coverage,
                color,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_font_matches_canvas_shorthand() {
        assert_eq!(TextStyle::new(48.0, "Arial").css_font(), "48px \"Arial\"");
        assert_eq!(TextStyle::default().font_size_px, 48.0);
    }

    /// Any installed face, or `None` on machines without fonts.
    fn system_font() -> Option<FontMetrics> {
        FontMetrics::load("DejaVu Sans").ok()
    }

    #[test]
    fn measured_run_includes_advances_and_kerning() {
        let Some(metrics) = system_font() else {
            return;
        };
        let style = TextStyle::new(32.0, metrics.family().to_string());
        let scaled = metrics.font.as_scaled(PxScale::from(32.0));
        let (a, b) = (scaled.glyph_id('a'), scaled.glyph_id('b'));
        let expected = scaled.h_advance(a) + scaled.kern(a, b) + scaled.h_advance(b);

        let width = metrics.measure_text(&style, "ab");
        assert!((width - expected).abs() < 1e-3, "{width} vs {expected}");
        assert!((metrics.measure_text(&style, "a\nb") - width).abs() < 1e-3);
        assert_eq!(metrics.measure_text(&style, ""), 0.0);
    }

    #[test]
    fn glyph_ink_straddles_the_middle_line() {
        let Some(metrics) = system_font() else {
            return;
        };
        let size = 40.0;
        let scale = PxScale::from(size);
        if metrics.font.glyph_id('H').0 == 0 {
            return;
        }
        let style = TextStyle::new(size, metrics.family().to_string());
        let mut surface = RasterSurface::new(100, 100).expect("surface");
        let middle_y = 50.0;
        metrics.draw_glyph(&mut surface, &style, 'H', 20.0, middle_y, Color::BLACK);

        let inked_rows: Vec<u32> = (0..100)
            .filter(|&y| (0..100).any(|x| surface.pixel(x, y).is_some_and(|p| p[3] > 0)))
            .collect();
        let (Some(&top), Some(&bottom)) = (inked_rows.first(), inked_rows.last()) else {
            panic!("glyph left no ink");
        };

        let scaled = metrics.font.as_scaled(scale);
        let half_em = (scaled.ascent() - scaled.descent()) / 2.0;
        let baseline = middle_y + metrics.middle_to_baseline(scale);
        assert!((top as f32) < middle_y && (bottom as f32) > middle_y);
        assert!(top as f32 >= middle_y - half_em - 1.0);
        assert!(bottom as f32 + 1.0 <= middle_y + half_em + 1.0);
        assert!((bottom as f32 + 1.0 - baseline).abs() <= 1.5);
    }

    #[test]
    fn garbage_bytes_are_metrics_unavailable() {
        let err = FontMetrics::from_bytes(vec![0, 1, 2, 3], 0, "junk").unwrap_err();
        assert!(matches!(err, Error::MetricsUnavailable(_)));
    }

    #[test]
    fn missing_font_file_is_metrics_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = FontMetrics::from_file(&dir.path().join("absent.ttf")).unwrap_err();
        assert!(matches!(err, Error::MetricsUnavailable(_)));
    }
}
