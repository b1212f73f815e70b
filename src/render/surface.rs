use std::io::Cursor;
use std::path::Path;

use card_catalog::MAX_CANVAS_SIDE;
use image::{ImageFormat, Rgba, RgbaImage};
use tiny_skia::{
    FillRule, GradientStop, LinearGradient, Paint, PathBuilder, Pixmap, PixmapPaint, Rect,
    SpreadMode, Stroke, Transform,
};

use crate::error::{Error, Result};
use crate::processing::color::Color;
use crate::processing::patterns::{DrawOp, Point};

/// Canvas default for `miterLimit`.
const CANVAS_MITER_LIMIT: f32 = 10.0;

/// RGBA pixel buffer that every composition pass draws into.
///
/// Pixels are stored premultiplied; [`RasterSurface::pixel`] and the PNG
/// output are straight alpha. Not safe to share between concurrent
/// composition passes; all drawing goes through `&mut self`.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixmap: Pixmap,
}

impl RasterSurface {
    /// A fully transparent surface. Zero or oversized dimensions are rejected.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            pixmap: allocate(width, height)?,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Replaces the pixel buffer. Resizing always clears, even to the same size.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.pixmap = allocate(width, height)?;
        Ok(())
    }

    /// Straight-alpha RGBA at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixmap.pixel(x, y).map(|pixel| {
            let color = pixel.demultiply();
            [color.red(), color.green(), color.blue(), color.alpha()]
        })
    }

    /// Raw premultiplied RGBA bytes, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width(), self.height(), |x, y| {
            Rgba(self.pixel(x, y).unwrap_or_default())
        })
    }

    /// Overwrites every pixel, ignoring what was there.
    pub fn fill(&mut self, color: Color) {
        self.pixmap.fill(to_skia(color));
    }

    /// Source-over fill of an anti-aliased rectangle, using `color.a`.
    pub fn fill_rect(&mut self, left: f32, top: f32, right: f32, bottom: f32, color: Color) {
        let Some(rect) = Rect::from_ltrb(left, top, right, bottom) else {
            return;
        };
        self.pixmap
            .fill_rect(rect, &solid_paint(color), Transform::identity(), None);
    }

    /// Covers the whole surface with a two-stop linear gradient along
    /// `start → end`, padded with the end colors past either point.
    pub fn fill_linear_gradient(&mut self, start: Point, end: Point, from: Color, to: Color) {
        let stops = vec![
            GradientStop::new(0.0, to_skia(from)),
            GradientStop::new(1.0, to_skia(to)),
        ];
        let Some(shader) = LinearGradient::new(
            tiny_skia::Point::from_xy(start.0, start.1),
            tiny_skia::Point::from_xy(end.0, end.1),
            stops,
            SpreadMode::Pad,
            Transform::identity(),
        ) else {
            self.fill(from);
            return;
        };
        let Some(rect) = Rect::from_xywh(0.0, 0.0, self.width() as f32, self.height() as f32)
        else {
            return;
        };
        let mut paint = Paint::default();
        paint.shader = shader;
        self.pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }

    pub fn apply(&mut self, op: &DrawOp) {
        match op {
            DrawOp::Stroke {
                points,
                closed,
                width,
                color,
            } => {
                if let Some(path) = polyline(points, *closed) {
                    self.pixmap.stroke_path(
                        &path,
                        &solid_paint(*color),
                        &canvas_stroke(*width),
                        Transform::identity(),
                        None,
                    );
                }
            }
            DrawOp::FillCircle {
                center,
                radius,
                color,
            } => {
                if let Some(path) = PathBuilder::from_circle(center.0, center.1, *radius) {
                    self.pixmap.fill_path(
                        &path,
                        &solid_paint(*color),
                        FillRule::Winding,
                        Transform::identity(),
                        None,
                    );
                }
            }
            DrawOp::StrokeCircle {
                center,
                radius,
                width,
                color,
            } => {
                if let Some(path) = PathBuilder::from_circle(center.0, center.1, *radius) {
                    self.pixmap.stroke_path(
                        &path,
                        &solid_paint(*color),
                        &canvas_stroke(*width),
                        Transform::identity(),
                        None,
                    );
                }
            }
        }
    }

    /// Blends `color` through a row-major coverage block (`0.0..=1.0` per
    /// pixel) whose top-left corner lands on `(left, top)`. Rows are `width`
    /// entries long; a trailing partial row is ignored.
    pub fn draw_coverage(&mut self, left: i32, top: i32, width: u32, coverage: &[f32], color: Color) {
        if width == 0 {
            return;
        }
        let height = u32::try_from(coverage.len() / width as usize).unwrap_or(0);
        let Some(mut stamp) = Pixmap::new(width, height) else {
            return;
        };
        for (pixel, amount) in stamp.pixels_mut().iter_mut().zip(coverage) {
            *pixel = to_skia(color.with_alpha(color.a * amount))
                .premultiply()
                .to_color_u8();
        }
        self.pixmap.draw_pixmap(
            left,
            top,
            stamp.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    /// PNG bytes of the current surface, ready to hand to a download or file.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Cursor::new(Vec::new());
        self.to_image().write_to(&mut bytes, ImageFormat::Png)?;
        Ok(bytes.into_inner())
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.to_image().save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}

fn allocate(width: u32, height: u32) -> Result<Pixmap> {
    if width > MAX_CANVAS_SIDE || height > MAX_CANVAS_SIDE {
        return Err(Error::InvalidSize(format!(
            "{width}x{height} exceeds {MAX_CANVAS_SIDE} pixels per side"
        )));
    }
    Pixmap::new(width, height)
        .ok_or_else(|| Error::InvalidSize(format!("{width}x{height} cannot be allocated")))
}

fn to_skia(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba(
        color.r.clamp(0.0, 1.0),
        color.g.clamp(0.0, 1.0),
        color.b.clamp(0.0, 1.0),
        color.a.clamp(0.0, 1.0),
    )
    .unwrap_or(tiny_skia::Color::BLACK)
}

fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(to_skia(color));
    paint.anti_alias = true;
    paint
}

/// Canvas defaults: butt caps, miter joins.
fn canvas_stroke(width: f32) -> Stroke {
    Stroke {
        width,
        miter_limit: CANVAS_MITER_LIMIT,
        ..Stroke::default()
    }
}

fn polyline(points: &[Point], closed: bool) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    let mut builder = PathBuilder::new();
    builder.move_to(first.0, first.1);
    for point in rest {
        builder.line_to(point.0, point.1);
    }
    if closed {
        builder.close();
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_near(actual: Option<[u8; 4]>, expected: [u8; 4]) {
        let actual = actual.expect("pixel inside surface");
        for (a, e) in actual.iter().zip(expected) {
            assert!(
                (i16::from(*a) - i16::from(e)).abs() <= 2,
                "{actual:?} vs {expected:?}"
            );
        }
    }

    #[test]
    fn resize_clears_existing_pixels() {
        let mut surface = RasterSurface::new(4, 4).unwrap();
        surface.fill(Color::WHITE);
        surface.resize(4, 4).unwrap();
        assert!(surface.data().iter().all(|b| *b == 0));
        surface.resize(6, 2).unwrap();
        assert_eq!((surface.width(), surface.height()), (6, 2));
        assert_eq!(surface.pixel(6, 0), None);
    }

    #[test]
    fn rejects_empty_and_oversized_dimensions() {
        for (width, height) in [
            (0, 10),
            (10, 0),
            (MAX_CANVAS_SIDE + 1, 1),
            (u32::MAX, u32::MAX),
        ] {
            assert!(matches!(
                RasterSurface::new(width, height),
                Err(Error::InvalidSize(_))
            ));
        }
        let mut surface = RasterSurface::new(2, 2).unwrap();
        assert!(surface.resize(u32::MAX, 1).is_err());
    }

    #[test]
    fn translucent_rect_blends_over_opaque_base() {
        let mut surface = RasterSurface::new(10, 10).unwrap();
        surface.fill(Color::BLACK);
        surface.fill_rect(2.0, 2.0, 4.0, 4.0, Color::WHITE.with_alpha(0.5));
        assert_near(surface.pixel(3, 3), [128, 128, 128, 255]);
        assert_eq!(surface.pixel(4, 4), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(1, 3), Some([0, 0, 0, 255]));
    }

    #[test]
    fn coverage_onto_transparent_keeps_source_color() {
        let mut surface = RasterSurface::new(3, 1).unwrap();
        surface.draw_coverage(1, 0, 2, &[0.5, 1.0], Color::from_rgb(0xff0000));
        assert_eq!(surface.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_near(surface.pixel(1, 0), [255, 0, 0, 128]);
        assert_eq!(surface.pixel(2, 0), Some([255, 0, 0, 255]));
    }

    #[test]
    fn coverage_block_is_clipped_at_the_edges() {
        let mut surface = RasterSurface::new(2, 2).unwrap();
        surface.draw_coverage(-1, -1, 2, &[1.0, 1.0, 1.0, 1.0], Color::WHITE);
        assert_eq!(surface.pixel(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(surface.pixel(1, 1), Some([0, 0, 0, 0]));
    }

    #[test]
    fn diagonal_gradient_runs_corner_to_corner() {
        let mut surface = RasterSurface::new(100, 50).unwrap();
        surface.fill_linear_gradient((0.0, 0.0), (100.0, 50.0), Color::BLACK, Color::WHITE);
        let top_left = surface.pixel(0, 0).unwrap();
        let bottom_right = surface.pixel(99, 49).unwrap();
        assert!(top_left[0] < 5);
        assert!(bottom_right[0] > 250);
        let center = surface.pixel(50, 25).unwrap();
        assert!((i32::from(center[0]) - 128).abs() <= 3);
        assert_eq!(center[3], 255);
    }

    #[test]
    fn joined_translucent_segments_blend_once() {
        let mut surface = RasterSurface::new(40, 10).unwrap();
        surface.fill(Color::BLACK);
        surface.apply(&DrawOp::Stroke {
            points: vec![(0.0, 5.0), (20.0, 5.0), (40.0, 5.0)],
            closed: false,
            width: 2.0,
            color: Color::WHITE.with_alpha(0.5),
        });
        assert_eq!(surface.pixel(20, 4), surface.pixel(10, 4));
        assert_near(surface.pixel(10, 4), [128, 128, 128, 255]);
        assert_eq!(surface.pixel(10, 8), Some([0, 0, 0, 255]));
    }

    #[test]
    fn strokes_end_with_butt_caps() {
        let mut surface = RasterSurface::new(40, 10).unwrap();
        surface.fill(Color::BLACK);
        surface.apply(&DrawOp::Stroke {
            points: vec![(10.0, 5.0), (30.0, 5.0)],
            closed: false,
            width: 4.0,
            color: Color::WHITE,
        });
        assert_near(surface.pixel(20, 5), [255, 255, 255, 255]);
        assert_eq!(surface.pixel(8, 5), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(31, 5), Some([0, 0, 0, 255]));
    }

    #[test]
    fn circles_cover_their_ring_or_disc() {
        let mut surface = RasterSurface::new(40, 40).unwrap();
        surface.fill(Color::BLACK);
        surface.apply(&DrawOp::FillCircle {
            center: (10.0, 10.0),
            radius: 4.0,
            color: Color::WHITE,
        });
        assert_near(surface.pixel(10, 10), [255, 255, 255, 255]);
        assert_eq!(surface.pixel(17, 10), Some([0, 0, 0, 255]));

        surface.apply(&DrawOp::StrokeCircle {
            center: (30.0, 30.0),
            radius: 6.0,
            width: 2.0,
            color: Color::WHITE,
        });
        assert_eq!(surface.pixel(30, 30), Some([0, 0, 0, 255]));
        assert!(surface.pixel(35, 29).unwrap()[0] > 240);
    }

    #[test]
    fn encodes_png_bytes() {
        let mut surface = RasterSurface::new(3, 2).unwrap();
        surface.fill(Color::from_rgb(0x2c3e50));
        let bytes = surface.encode_png().expect("encode");
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&bytes).expect("decode").to_rgba8();
        assert_eq!(decoded.get_pixel(2, 1).0, [0x2c, 0x3e, 0x50, 0xff]);
    }
}
