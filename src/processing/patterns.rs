//! Tileable background overlays.
//!
//! Each generator is a pure function of the surface size and returns the
//! draw operations in painting order. The raster surface executes them.

use std::f32::consts::PI;

use card_catalog::PatternKind;

use crate::processing::color::Color;

pub type Point = (f32, f32);

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Stroke {
        points: Vec<Point>,
        closed: bool,
        width: f32,
        color: Color,
    },
    FillCircle {
        center: Point,
        radius: f32,
        color: Color,
    },
    StrokeCircle {
        center: Point,
        radius: f32,
        width: f32,
        color: Color,
    },
}

const WAVE_SPACING: f32 = 20.0;
const WAVE_STEP: f32 = 10.0;
const WAVE_AMPLITUDE: f32 = 10.0;
const WAVE_FREQUENCY: f32 = 0.03;
const DOT_RADIUS: f32 = 4.0;
const DOT_SPACING: f32 = 20.0;
const HEXAGON_SIZE: f32 = 30.0;
const GRID_SIZE: f32 = 20.0;
const STRIPE_GAP: f32 = 20.0;
const CIRCLE_RADIUS: f32 = 30.0;
const CIRCLE_GAP: f32 = 60.0;
const TRIANGLE_SIDE: f32 = 30.0;

fn light_ink() -> Color {
    Color::from_rgba(0xffffff, 0.2)
}

fn dark_ink() -> Color {
    Color::from_rgba(0x000000, 0.1)
}

pub fn generate(kind: PatternKind, width: u32, height: u32) -> Vec<DrawOp> {
    let (w, h) = (width as f32, height as f32);
    match kind {
        PatternKind::Wave => wave(w, h),
        PatternKind::Dots => dots(w, h),
        PatternKind::Hexagon => hexagons(w, h),
        PatternKind::Grid => grid(w, h),
        PatternKind::Stripes => stripes(w, h),
        PatternKind::Circles => circles(w, h),
        PatternKind::Triangles => triangles(w, h),
    }
}

/// `start, start + step, …` while the value stays below `limit`. Multiplying
/// the index keeps fractional steps from accumulating rounding error.
fn steps(start: f32, step: f32, limit: f32) -> impl Iterator<Item = f32> {
    (0u32..)
        .map(move |i| start + step * i as f32)
        .take_while(move |value| *value < limit)
}

/// Same as [`steps`] but includes `limit` itself.
fn steps_through(step: f32, limit: f32) -> impl Iterator<Item = f32> {
    (0u32..)
        .map(move |i| step * i as f32)
        .take_while(move |value| *value <= limit)
}

fn stroke(points: Vec<Point>, closed: bool, width: f32, color: Color) -> DrawOp {
    DrawOp::Stroke {
        points,
        closed,
        width,
        color,
    }
}

fn wave(w: f32, h: f32) -> Vec<DrawOp> {
    steps(0.0, WAVE_SPACING, h)
        .map(|y| {
            let mut points = vec![(0.0, y)];
            points.extend(
                steps(0.0, WAVE_STEP, w)
                    .map(|x| (x, y + (x * WAVE_FREQUENCY).sin() * WAVE_AMPLITUDE)),
            );
            stroke(points, false, 2.0, light_ink())
        })
        .collect()
}

fn dots(w: f32, h: f32) -> Vec<DrawOp> {
    let mut ops = Vec::new();
    for x in steps(0.0, DOT_SPACING, w) {
        for y in steps(0.0, DOT_SPACING, h) {
            ops.push(DrawOp::FillCircle {
                center: (x, y),
                radius: DOT_RADIUS,
                color: light_ink(),
            });
        }
    }
    ops
}

fn hexagons(w: f32, h: f32) -> Vec<DrawOp> {
    let size = HEXAGON_SIZE;
    let mut ops = Vec::new();
    for y in steps(0.0, size * 1.5, h + size * 2.0) {
        for x in steps(0.0, size * 2.0, w + size * 2.0) {
            let points = (0..6)
                .map(|i| {
                    let angle = i as f32 * PI / 3.0;
                    (x + size * angle.cos(), y + size * angle.sin())
                })
                .collect();
            ops.push(stroke(points, true, 2.0, light_ink()));
        }
    }
    ops
}

fn grid(w: f32, h: f32) -> Vec<DrawOp> {
    let mut ops = Vec::new();
    for x in steps_through(GRID_SIZE, w) {
        ops.push(stroke(vec![(x, 0.0), (x, h)], false, 1.0, dark_ink()));
    }
    for y in steps_through(GRID_SIZE, h) {
        ops.push(stroke(vec![(0.0, y), (w, y)], false, 1.0, dark_ink()));
    }
    ops
}

fn stripes(w: f32, h: f32) -> Vec<DrawOp> {
    steps(0.0, STRIPE_GAP, w + h)
        .map(|x| stroke(vec![(x, 0.0), (x - h, h)], false, 2.0, light_ink()))
        .collect()
}

fn circles(w: f32, h: f32) -> Vec<DrawOp> {
    let mut ops = Vec::new();
    for x in steps(0.0, CIRCLE_GAP, w + CIRCLE_RADIUS) {
        for y in steps(0.0, CIRCLE_GAP, h + CIRCLE_RADIUS) {
            ops.push(DrawOp::StrokeCircle {
                center: (x, y),
                radius: CIRCLE_RADIUS,
                width: 1.0,
                color: light_ink(),
            });
        }
    }
    ops
}

fn triangles(w: f32, h: f32) -> Vec<DrawOp> {
    let size = TRIANGLE_SIDE;
    let row = size * 3f32.sqrt();
    let mut ops = Vec::new();
    for y in steps(0.0, row, h + row) {
        for x in steps(0.0, size * 2.0, w + size * 2.0) {
            ops.push(stroke(
                vec![(x, y), (x + size, y), (x + size / 2.0, y - row)],
                true,
                1.0,
                light_ink(),
            ));
        }
    }
    ops
}
