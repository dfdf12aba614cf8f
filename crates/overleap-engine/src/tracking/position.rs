use serde::{Deserialize, Serialize};

/// A document position in (line, character) form.
///
/// `character` counts UTF-16 code units, matching the host editor's own unit
/// of measure so multi-cursor and astral-plane content line up exactly. The
/// derived ordering (line first, then character) is document order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }

    /// The position `n` code units to the right on the same line.
    pub fn right(self, n: usize) -> Self {
        Self {
            line: self.line,
            character: self.character + n,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.line, self.character)
    }
}

/// Length of `text` in UTF-16 code units.
pub(crate) fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering_is_document_order() {
        assert!(Position::new(0, 5) < Position::new(1, 0));
        assert!(Position::new(2, 3) < Position::new(2, 4));
        assert!(Position::new(3, 9) > Position::new(3, 1));
        assert_eq!(Position::new(1, 1), Position::new(1, 1));
    }

    #[test]
    fn test_right_stays_on_line() {
        let p = Position::new(4, 7).right(2);
        assert_eq!(p, Position::new(4, 9));
    }

    #[test]
    fn test_utf16_len_counts_code_units() {
        assert_eq!(utf16_len(""), 0);
        assert_eq!(utf16_len("abc"), 3);
        // é is one code unit, 😀 is a surrogate pair
        assert_eq!(utf16_len("é"), 1);
        assert_eq!(utf16_len("😀"), 2);
        assert_eq!(utf16_len("a😀b"), 4);
    }
}
