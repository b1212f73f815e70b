//! The composition pass: background, pattern overlay, marker bands, glyphs.

use card_catalog::{Background, MarkerStyle, RenderProfile, SizePreset, Template};
use tracing::{debug, warn};

use crate::characters::{Character, MarkerId, plain_text};
use crate::error::{Error, Result};
use crate::processing::color::{self, Color, Foreground};
use crate::processing::layout;
use crate::processing::patterns;
use crate::processing::wrap::wrap;
use crate::render::metrics::{GlyphMetrics, TextStyle};
use crate::render::surface::RasterSurface;

/// Text color on pattern backgrounds.
const PATTERN_FOREGROUND: Color = Color::BLACK;
/// Text color on gradient backgrounds.
const GRADIENT_FOREGROUND: Color = Color::WHITE;
/// Used when a solid background color cannot be judged.
const FALLBACK_FOREGROUND: Color = Color::WHITE;

/// Everything one composition pass depends on.
#[derive(Debug, Clone, Copy)]
pub struct CompositionInput<'a> {
    pub template: &'a Template,
    pub size: &'a SizePreset,
    pub text_style: &'a TextStyle,
    pub characters: &'a [Character],
    /// Replaces the template color on solid backgrounds.
    pub background_color: Option<&'a str>,
    pub markers: &'a [MarkerStyle],
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutLine {
    pub text: String,
    pub start_x: f32,
    pub middle_y: f32,
    pub width: f32,
}

/// Where the text ended up, for callers that want more than pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub anchor: (f32, f32),
    pub max_width: f32,
    pub line_height: f32,
    pub foreground: Color,
    pub lines: Vec<LaidOutLine>,
}

/// Renders `input` into `surface`, resizing (and therefore clearing) it first.
///
/// The output depends only on `input` and the metrics, so repeating a call
/// with the same arguments reproduces the same pixels. Callers must not run
/// two passes against the same surface at once.
pub fn compose<M: GlyphMetrics + ?Sized>(
    surface: &mut RasterSurface,
    metrics: &M,
    input: &CompositionInput<'_>,
) -> Result<TextLayout> {
    let style = input.text_style;
    if !style.font_size_px.is_finite() || style.font_size_px <= 0.0 {
        return Err(Error::InvalidTextStyle(format!(
            "font size must be positive, got {}",
            style.font_size_px
        )));
    }
    let reference = metrics.measure_text(style, "M");
    if !reference.is_finite() || reference < 0.0 {
        return Err(Error::MetricsUnavailable(format!(
            "font {} measured {reference} for a reference glyph",
            style.css_font()
        )));
    }

    let (width, height) = (input.size.width, input.size.height);
    surface.resize(width, height)?;
    let foreground = paint_background(surface, input);

    let profile = input.template.profile();
    let anchor = layout::text_anchor(width, height, input.template.text_position);
    let max_width = layout::max_text_width(width);
    let line_height = style.font_size_px * profile.line_height_multiplier;
    let lines = wrap(input.characters, max_width, metrics, style);
    debug!(
        template = %input.template.id,
        width,
        height,
        font = %style.css_font(),
        characters = input.characters.len(),
        lines = lines.len(),
        "composing text card"
    );

    let first_middle = layout::first_line_middle(anchor.1, lines.len(), line_height);
    let mut laid_out = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        let text = plain_text(line);
        let line_width = metrics.measure_text(style, &text);
        let middle_y = first_middle + index as f32 * line_height;
        let start_x = layout::line_start_x(anchor.0, line_width);
        draw_line(
            surface, metrics, input, &profile, line, start_x, middle_y, foreground,
        );
        laid_out.push(LaidOutLine {
            text,
            start_x,
            middle_y,
            width: line_width,
        });
    }

    Ok(TextLayout {
        anchor,
        max_width,
        line_height,
        foreground,
        lines: laid_out,
    })
}

/// Convenience wrapper that allocates a fresh surface.
pub fn render<M: GlyphMetrics + ?Sized>(
    metrics: &M,
    input: &CompositionInput<'_>,
) -> Result<(RasterSurface, TextLayout)> {
    let mut surface = RasterSurface::new(input.size.width, input.size.height)?;
    let layout = compose(&mut surface, metrics, input)?;
    Ok((surface, layout))
}

/// Paints the template background and returns the text color that goes with it.
fn paint_background(surface: &mut RasterSurface, input: &CompositionInput<'_>) -> Color {
    let (width, height) = (surface.width() as f32, surface.height() as f32);
    match &input.template.background {
        Background::Solid { color: template_color } => {
            let painted = match input.background_color {
                Some(chosen) if color::parse_hex_rgb(chosen).is_none() => {
                    warn!(color = chosen, "falling back to template color");
                    template_color.as_str()
                }
                Some(chosen) => chosen,
                None => template_color.as_str(),
            };
            let fill = Color::parse_hex(painted).unwrap_or_else(|err| {
                warn!(template = %input.template.id, error = %err, "solid color invalid");
                Color::BLACK
            });
            surface.fill(fill);
            color::resolve_foreground(painted)
                .map(Foreground::color)
                .unwrap_or(FALLBACK_FOREGROUND)
        }
        Background::Gradient { spec } => {
            let (from, to) = color::gradient_stops(spec);
            surface.fill_linear_gradient((0.0, 0.0), (width, height), from, to);
            GRADIENT_FOREGROUND
        }
        Background::Pattern { color, pattern } => {
            let base = Color::parse_hex(color).unwrap_or_else(|err| {
                warn!(template = %input.template.id, error = %err, "pattern base color invalid");
                Color::BLACK
            });
            surface.fill(base);
            for op in patterns::generate(*pattern, surface.width(), surface.height()) {
                surface.apply(&op);
            }
            PATTERN_FOREGROUND
        }
    }
}

fn marker_fill(markers: &[MarkerStyle], marker: MarkerId, alpha: f32) -> Option<Color> {
    if marker.is_none() {
        return None;
    }
    let hex = card_catalog::marker_color(markers, marker)?;
    match Color::parse_hex(hex) {
        Ok(color) => Some(color.with_alpha(alpha)),
        Err(err) => {
            warn!(marker = marker.as_str(), error = %err, "skipping marker with invalid color");
            None
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_line<M: GlyphMetrics + ?Sized>(
    surface: &mut RasterSurface,
    metrics: &M,
    input: &CompositionInput<'_>,
    profile: &RenderProfile,
    line: &[Character],
    start_x: f32,
    middle_y: f32,
    foreground: Color,
) {
    let style = input.text_style;
    let band_height = style.font_size_px * profile.marker_height_ratio;
    let mut cursor_x = start_x;
    for character in line {
        let mut buf = [0u8; 4];
        let glyph_width = metrics.measure_text(style, character.ch.encode_utf8(&mut buf));
        if let Some(fill) = marker_fill(input.markers, character.marker(), profile.marker_alpha) {
            surface.fill_rect(
                cursor_x,
                middle_y - band_height / 2.0,
                cursor_x + glyph_width,
                middle_y + band_height / 2.0,
                fill,
            );
        }
        metrics.draw_glyph(surface, style, character.ch, cursor_x, middle_y, foreground);
        cursor_x += glyph_width;
    }
}
