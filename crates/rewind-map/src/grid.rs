//! A dense two-dimensional byte buffer.

use crate::error::MapError;

/// Row-major `rows × cols` grid of bytes.
///
/// Cell `(r, c)` lives at byte `r * cols + c` of [`as_bytes`](Self::as_bytes).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ByteGrid {
    rows: u32,
    cols: u32,
    data: Vec<u8>,
}

fn cell_count(rows: u32, cols: u32) -> Result<usize, MapError> {
    if rows == 0 || cols == 0 {
        return Err(MapError::InvalidSize {
            width: rows as i64,
            height: cols as i64,
        });
    }
    (rows as usize)
        .checked_mul(cols as usize)
        .ok_or(MapError::InvalidSize {
            width: rows as i64,
            height: cols as i64,
        })
}

impl ByteGrid {
    /// Zero-filled grid. Both extents must be positive.
    pub fn new(rows: u32, cols: u32) -> Result<Self, MapError> {
        let n = cell_count(rows, cols)?;
        Ok(Self {
            rows,
            cols,
            data: vec![0; n],
        })
    }

    /// Adopt an existing row-major buffer of exactly `rows * cols` bytes.
    pub fn from_raw(rows: u32, cols: u32, data: Vec<u8>) -> Result<Self, MapError> {
        let n = cell_count(rows, cols)?;
        if data.len() != n {
            return Err(MapError::LayerLength {
                layer: "raw",
                expected: n,
                found: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Number of rows.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> u32 {
        self.cols
    }

    #[inline]
    fn index(&self, row: u32, col: u32) -> Option<usize> {
        (row < self.rows && col < self.cols)
            .then(|| row as usize * self.cols as usize + col as usize)
    }

    /// Byte at `(row, col)`, or `None` when out of bounds.
    pub fn get(&self, row: u32, col: u32) -> Option<u8> {
        self.index(row, col).map(|i| self.data[i])
    }

    /// Mutable byte at `(row, col)`, or `None` when out of bounds.
    pub fn get_mut(&mut self, row: u32, col: u32) -> Option<&mut u8> {
        self.index(row, col).map(move |i| &mut self.data[i])
    }

    /// One full row as a contiguous slice.
    pub fn row(&self, row: u32) -> Option<&[u8]> {
        if row >= self.rows {
            return None;
        }
        let start = row as usize * self.cols as usize;
        Some(&self.data[start..start + self.cols as usize])
    }

    /// The whole buffer in row-major order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the grid and return the row-major buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_extent_rejected() {
        assert!(ByteGrid::new(0, 4).is_err());
        assert!(ByteGrid::new(4, 0).is_err());
    }

    #[test]
    fn row_major_layout() {
        let mut g = ByteGrid::new(2, 3).unwrap();
        *g.get_mut(1, 2).unwrap() = 9;
        *g.get_mut(0, 1).unwrap() = 4;
        assert_eq!(g.as_bytes(), &[0, 4, 0, 0, 0, 9]);
        assert_eq!(g.row(1).unwrap(), &[0, 0, 9]);
        assert_eq!(g.get(1, 2), Some(9));
    }

    #[test]
    fn out_of_bounds_is_none() {
        let mut g = ByteGrid::new(2, 2).unwrap();
        assert_eq!(g.get(2, 0), None);
        assert_eq!(g.get(0, 2), None);
        assert!(g.get_mut(5, 5).is_none());
        assert!(g.row(2).is_none());
    }

    #[test]
    fn from_raw_checks_length() {
        assert!(ByteGrid::from_raw(2, 2, vec![1, 2, 3, 4]).is_ok());
        assert_eq!(
            ByteGrid::from_raw(2, 2, vec![1, 2, 3]),
            Err(MapError::LayerLength {
                layer: "raw",
                expected: 4,
                found: 3
            })
        );
    }
}
