//! Cell and range references in A1 notation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a single cell. Rows and columns are 1-based; columns follow
/// A1 notation (A=1, B=2, ..., Z=26, AA=27, ...).
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub col: i32,
    pub row: i32,
}
impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_name(self.col), self.row)
    }
}
impl CellRef {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Parses an A1-style cell reference: one or more ASCII letters
    /// (case-insensitive) followed by one or more digits. Returns `None` for
    /// a row of zero or for coordinates that do not fit in an `i32`.
    pub fn parse_a1(s: &str) -> Option<CellRef> {
        let digit_start = s.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = s.split_at(digit_start);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        let col = column_from_name(letters)?;
        let row: i32 = digits.parse().ok()?;
        if row < 1 {
            return None;
        }
        Some(CellRef { col, row })
    }
}

/// Reference to a rectangular block of cells, identified by its inclusive
/// bounds. Always normalized: `top <= bottom` and `left <= right`.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RangeRef {
    pub top: i32,
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
}
impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            CellRef::new(self.left, self.top),
            CellRef::new(self.right, self.bottom),
        )
    }
}
impl From<CellRef> for RangeRef {
    fn from(cell: CellRef) -> Self {
        Self {
            top: cell.row,
            left: cell.col,
            bottom: cell.row,
            right: cell.col,
        }
    }
}
impl RangeRef {
    /// Constructs the normalized range with the two cells as corners.
    pub fn new(a: CellRef, b: CellRef) -> Self {
        Self {
            top: std::cmp::min(a.row, b.row),
            left: std::cmp::min(a.col, b.col),
            bottom: std::cmp::max(a.row, b.row),
            right: std::cmp::max(a.col, b.col),
        }
    }

    /// Returns the axis-aligned bounding box of two ranges, taking the
    /// min/max over all four bounds of both operands.
    pub fn bounding_box(self, other: Self) -> Self {
        Self {
            top: std::cmp::min(self.top, other.top),
            left: std::cmp::min(self.left, other.left),
            bottom: std::cmp::max(self.bottom, other.bottom),
            right: std::cmp::max(self.right, other.right),
        }
    }

    /// Returns the single cell of a 1x1 range, or `None` for larger ranges.
    pub fn single_cell(self) -> Option<CellRef> {
        (self.top == self.bottom && self.left == self.right)
            .then(|| CellRef::new(self.left, self.top))
    }

    pub fn width(self) -> i64 {
        self.right as i64 - self.left as i64 + 1
    }
    pub fn height(self) -> i64 {
        self.bottom as i64 - self.top as i64 + 1
    }

    /// Iterates over the cells of the range in row-major order.
    pub fn iter_cells(self) -> impl Iterator<Item = CellRef> {
        (self.top..=self.bottom)
            .flat_map(move |row| (self.left..=self.right).map(move |col| CellRef::new(col, row)))
    }
}

/// A reference expression: either a single cell or a rectangular range.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    Cell(CellRef),
    Range(RangeRef),
}
impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Cell(cell) => write!(f, "{cell}"),
            Reference::Range(range) => write!(f, "{range}"),
        }
    }
}

/// Returns a column's name in A1 notation: A=1, ..., Z=26, AA=27, ...
///
/// This is bijective base 26, so each letter comes from `(n - 1) % 26` with
/// the remainder's borrow folded into the next round. Non-positive columns
/// produce an empty string.
pub fn column_name(column: i32) -> String {
    let mut name = String::new();
    let mut rest = column;
    while rest > 0 {
        let letter = b'A' + ((rest - 1) % 26) as u8;
        name.insert(0, letter as char);
        rest = (rest - 1) / 26;
    }
    name
}

/// Returns the coordinate of a column from its name, or `None` if no such
/// column exists or it overflows an `i32`.
///
/// A=1, B=2, ... Z=26, AA=27, etc. Case-insensitive.
pub fn column_from_name(s: &str) -> Option<i32> {
    fn digit(c: char) -> Option<i64> {
        let c = c.to_ascii_uppercase();
        c.is_ascii_uppercase().then(|| (c as u8 - b'A') as i64)
    }

    if s.is_empty() {
        return None;
    }
    let mut ret = 0_i64;
    for char in s.chars() {
        ret = ret.checked_mul(26)?.checked_add(digit(char)? + 1)?;
        if ret > i32::MAX as i64 {
            return None;
        }
    }

    Some(ret as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_names() {
        let test_pairs = [
            (1, "A"),
            (2, "B"),
            (26, "Z"),
            (27, "AA"),
            (52, "AZ"),
            (53, "BA"),
            (702, "ZZ"),
            (703, "AAA"),
        ];
        for (number, name) in test_pairs {
            assert_eq!(column_name(number), name);
            assert_eq!(column_from_name(name), Some(number));
        }
        assert_eq!(column_from_name("aa"), Some(27));
        assert_eq!(column_from_name(""), None);
        assert_eq!(column_from_name("A1"), None);
        assert_eq!(column_from_name("ZZZZZZZZZZ"), None);
    }

    #[test]
    fn test_a1_cell_ref_parsing() {
        let test_pairs = [
            ("A1", Some(CellRef::new(1, 1))),
            ("a1", Some(CellRef::new(1, 1))),
            ("Z26", Some(CellRef::new(26, 26))),
            ("AA100", Some(CellRef::new(27, 100))),
            ("B0", None),
            ("B", None),
            ("12", None),
            ("A99999999999999", None),
        ];
        for (string, expected) in test_pairs {
            assert_eq!(CellRef::parse_a1(string), expected, "parsing {string:?}");
        }
        assert_eq!(CellRef::new(27, 100).to_string(), "AA100");
    }

    #[test]
    fn test_range_normalization() {
        let range = RangeRef::new(CellRef::new(3, 7), CellRef::new(1, 2));
        assert_eq!(
            range,
            RangeRef {
                top: 2,
                left: 1,
                bottom: 7,
                right: 3,
            },
        );
        assert_eq!(range.to_string(), "A2:C7");
        assert_eq!(range.single_cell(), None);
        assert_eq!(
            RangeRef::from(CellRef::new(2, 2)).single_cell(),
            Some(CellRef::new(2, 2)),
        );
    }

    #[test]
    fn test_bounding_box() {
        let a = RangeRef::new(CellRef::new(1, 1), CellRef::new(2, 3));
        let b = RangeRef::new(CellRef::new(5, 2), CellRef::new(4, 8));
        let bbox = a.bounding_box(b);
        assert_eq!(
            bbox,
            RangeRef {
                top: 1,
                left: 1,
                bottom: 8,
                right: 5,
            },
        );
        assert_eq!(bbox, b.bounding_box(a));
    }

    #[test]
    fn test_iter_cells_row_major() {
        let range = RangeRef::new(CellRef::new(1, 1), CellRef::new(2, 2));
        let cells: Vec<CellRef> = range.iter_cells().collect();
        assert_eq!(
            cells,
            vec![
                CellRef::new(1, 1),
                CellRef::new(2, 1),
                CellRef::new(1, 2),
                CellRef::new(2, 2),
            ],
        );
    }
}
