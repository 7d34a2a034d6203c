use std::fmt;

/// A board coordinate. Row 0 is rank 8 (black's back rank), row 7 is rank 1;
/// column 0 is the a-file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

impl Square {
    pub fn new(row: u8, col: u8) -> Option<Self> {
        if row < 8 && col < 8 {
            Some(Self { row, col })
        } else {
            None
        }
    }

    /// Steps by the given row/column deltas, returning None off the board.
    pub fn offset(self, d_row: i8, d_col: i8) -> Option<Square> {
        let row = self.row as i8 + d_row;
        let col = self.col as i8 + d_col;
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Square {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    pub fn from_algebraic(notation: &str) -> Option<Self> {
        let mut chars = notation.chars();
        let file = chars.next()?;
        let rank = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }
        Some(Self {
            row: b'8' - rank as u8,
            col: file as u8 - b'a',
        })
    }

    pub fn to_algebraic(self) -> String {
        format!("{}{}", (b'a' + self.col) as char, 8 - self.row)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn algebraic_round_trip() {
        let a8 = Square::from_algebraic("a8").unwrap();
        assert_eq!(a8, Square { row: 0, col: 0 });
        let h1 = Square::from_algebraic("h1").unwrap();
        assert_eq!(h1, Square { row: 7, col: 7 });
        let e4 = Square::from_algebraic("e4").unwrap();
        assert_eq!(e4, Square { row: 4, col: 4 });
        assert_eq!(e4.to_algebraic(), "e4");
    }

    #[test]
    fn rejects_bad_notation() {
        assert_eq!(Square::from_algebraic("i1"), None);
        assert_eq!(Square::from_algebraic("a9"), None);
        assert_eq!(Square::from_algebraic("e44"), None);
        assert_eq!(Square::from_algebraic(""), None);
    }

    #[test]
    fn offset_respects_bounds() {
        let a8 = Square { row: 0, col: 0 };
        assert_eq!(a8.offset(-1, 0), None);
        assert_eq!(a8.offset(0, -1), None);
        assert_eq!(a8.offset(1, 1), Some(Square { row: 1, col: 1 }));
    }
}
