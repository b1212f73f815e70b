use card_catalog::TextPosition;

/// Fraction of the canvas width available to a line of text.
pub const TEXT_WIDTH_RATIO: f32 = 0.8;

pub fn text_anchor(canvas_w: u32, canvas_h: u32, position: TextPosition) -> (f32, f32) {
    (canvas_w as f32 * position.x, canvas_h as f32 * position.y)
}

pub fn max_text_width(canvas_w: u32) -> f32 {
    canvas_w as f32 * TEXT_WIDTH_RATIO
}

/// Vertical middle of the first line when `line_count` lines are centered on `anchor_y`.
pub fn first_line_middle(anchor_y: f32, line_count: usize, line_height: f32) -> f32 {
    let total_height = line_count as f32 * line_height;
    anchor_y - total_height / 2.0 + line_height / 2.0
}

pub fn line_start_x(anchor_x: f32, line_width: f32) -> f32 {
    anchor_x - line_width / 2.0
}
