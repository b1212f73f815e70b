//! Input text as a sequence of individually styled characters.
//!
//! Segmentation is per Unicode scalar value. Grapheme clusters made of
//! several scalars (flag emoji, combining accents) become several entries,
//! which keeps wrap widths identical to measuring the raw string piecewise.

pub use card_catalog::MarkerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CharacterStyle {
    pub marker: MarkerId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Character {
    pub ch: char,
    pub style: CharacterStyle,
}

impl Character {
    pub fn plain(ch: char) -> Self {
        Self {
            ch,
            style: CharacterStyle::default(),
        }
    }

    pub fn marker(&self) -> MarkerId {
        self.style.marker
    }
}

/// Half-open index range `[start, end)` over a character sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    start: usize,
    end: usize,
}

impl SelectionRange {
    /// Accepts the two ends in either order.
    pub fn new(anchor: usize, focus: usize) -> Self {
        Self {
            start: anchor.min(focus),
            end: anchor.max(focus),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Replaces the whole buffer; previous styling is discarded.
pub fn set_text(raw: &str) -> Vec<Character> {
    raw.chars().map(Character::plain).collect()
}

/// Returns a copy of `chars` with `marker` applied to every index in `range`.
/// Indices past the end of the sequence are skipped.
pub fn apply_marker(chars: &[Character], range: SelectionRange, marker: MarkerId) -> Vec<Character> {
    let mut styled = chars.to_vec();
    let end = range.end.min(styled.len());
    if range.start < end {
        for character in &mut styled[range.start..end] {
            character.style.marker = marker;
        }
    }
    styled
}

pub fn plain_text(chars: &[Character]) -> String {
    chars.iter().map(|c| c.ch).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_text_splits_into_unstyled_characters() {
        let chars = set_text("héllo 世界");
        assert_eq!(chars.len(), 8);
        assert_eq!(chars[1].ch, 'é');
        assert_eq!(chars[6].ch, '世');
        assert!(chars.iter().all(|c| c.marker() == MarkerId::None));
        assert_eq!(plain_text(&chars), "héllo 世界");
    }

    #[test]
    fn set_text_of_empty_string_is_empty() {
        assert!(set_text("").is_empty());
    }

    #[test]
    fn marker_applies_to_half_open_range() {
        let chars = set_text("hello");
        let styled = apply_marker(&chars, SelectionRange::new(1, 3), MarkerId::Yellow);
        let markers: Vec<_> = styled.iter().map(Character::marker).collect();
        assert_eq!(
            markers,
            vec![
                MarkerId::None,
                MarkerId::Yellow,
                MarkerId::Yellow,
                MarkerId::None,
                MarkerId::None
            ]
        );
        assert_eq!(plain_text(&styled), "hello");
    }

    #[test]
    fn selection_range_normalizes_backwards_selection() {
        let range = SelectionRange::new(4, 2);
        assert_eq!((range.start(), range.end()), (2, 4));
        assert!(!range.is_empty());
        assert!(SelectionRange::new(3, 3).is_empty());
    }

    #[test]
    fn out_of_bounds_indices_are_skipped() {
        let chars = set_text("abc");
        let styled = apply_marker(&chars, SelectionRange::new(2, 10), MarkerId::Pink);
        assert_eq!(styled[2].marker(), MarkerId::Pink);
        assert_eq!(styled[0].marker(), MarkerId::None);

        let untouched = apply_marker(&chars, SelectionRange::new(5, 9), MarkerId::Blue);
        assert_eq!(untouched, chars);
    }

    #[test]
    fn later_marker_overrides_earlier_one() {
        let chars = set_text("abcd");
        let first = apply_marker(&chars, SelectionRange::new(0, 3), MarkerId::Green);
        let second = apply_marker(&first, SelectionRange::new(2, 4), MarkerId::None);
        let markers: Vec<_> = second.iter().map(Character::marker).collect();
        assert_eq!(
            markers,
            vec![MarkerId::Green, MarkerId::Green, MarkerId::None, MarkerId::None]
        );
    }
}
