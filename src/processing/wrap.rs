use crate::characters::Character;
use crate::render::metrics::{GlyphMetrics, TextStyle};

pub type Line = Vec<Character>;

/// Greedy character-level line breaking.
///
/// A character starts a new line only when appending it would make the
/// current line strictly wider than `max_width` and the current line already
/// holds something. A lone character wider than `max_width` keeps its own
/// line instead of being split. Whitespace gets no special treatment.
pub fn wrap<M: GlyphMetrics + ?Sized>(
    chars: &[Character],
    max_width: f32,
    metrics: &M,
    style: &TextStyle,
) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current: Line = Vec::new();
    let mut current_text = String::new();

    for &character in chars {
        current_text.push(character.ch);
        let candidate_width = metrics.measure_text(style, &current_text);
        if candidate_width > max_width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_text.clear();
            current_text.push(character.ch);
        }
        current.push(character);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::characters::{MarkerId, SelectionRange, apply_marker, plain_text, set_text};
    use crate::processing::color::Color;
    use crate::render::surface::RasterSurface;

    /// Every character is 10px wide except `W`, which is 35px.
    struct Fixed;

    impl GlyphMetrics for Fixed {
        fn measure_text(&self, _style: &TextStyle, text: &str) -> f32 {
            text.chars().map(|c| if c == 'W' { 35.0 } else { 10.0 }).sum()
        }

        fn draw_glyph(&self, _: &mut RasterSurface, _: &TextStyle, _: char, _: f32, _: f32, _: Color) {}
    }

    fn wrap_str(text: &str, max_width: f32) -> Vec<String> {
        wrap(&set_text(text), max_width, &Fixed, &TextStyle::default())
            .iter()
            .map(|line| plain_text(line))
            .collect()
    }

    #[test]
    fn breaks_when_strictly_wider() {
        assert_eq!(wrap_str("abcdefg", 30.0), vec!["abc", "def", "g"]);
    }

    #[test]
    fn exact_fit_does_not_break() {
        assert_eq!(wrap_str("abcd", 40.0), vec!["abcd"]);
    }

    #[test]
    fn oversized_character_gets_its_own_line() {
        assert_eq!(wrap_str("aWb", 30.0), vec!["a", "W", "b"]);
        assert_eq!(wrap_str("W", 30.0), vec!["W"]);
        assert_eq!(wrap_str("WW", 30.0), vec!["W", "W"]);
    }

    #[test]
    fn spaces_are_ordinary_break_points() {
        assert_eq!(wrap_str("ab cd", 30.0), vec!["ab ", "cd"]);
    }

    #[test]
    fn empty_input_has_no_lines() {
        assert!(wrap_str("", 100.0).is_empty());
    }

    #[test]
    fn concatenated_lines_reproduce_input() {
        let chars = apply_marker(
            &set_text("the quick brown fox jumps over the lazy dog"),
            SelectionRange::new(4, 9),
            MarkerId::Green,
        );
        for max_width in [0.0, 5.0, 10.0, 25.0, 60.0, 1000.0] {
            let lines = wrap(&chars, max_width, &Fixed, &TextStyle::default());
            let rejoined: Vec<Character> = lines.concat();
            assert_eq!(rejoined, chars, "max_width {max_width}");
            assert!(lines.iter().all(|line| !line.is_empty()));
        }
    }
}
