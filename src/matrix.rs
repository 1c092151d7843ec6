use crate::bitvec::{min_blocks, BitBlock, BitVec, BLOCKSIZE};
use crate::error::MatrixError;
use rand::rngs::OsRng;
use rand::{Rng, TryRngCore};
use std::fmt;
use std::ops::{Index, Mul};

/// A dense matrix over F₂, the two-element finite field.
///
/// Each row is an independently owned [`BitVec`] of `min_blocks(cols)` blocks; entry
/// `(i, j)` is bit `j` of row `i`, little-endian, so a row reads as a binary number with
/// column 0 as its least significant bit. Bits at column indices `>= cols` are kept zero
/// at all times (the tail invariant), which makes structural equality a plain block
/// comparison and lets row operations work on whole blocks.
///
/// Rows being separate allocations means [`swap_rows`](F2Matrix::swap_rows) is a
/// pointer-level exchange and extraction operations hand out deep copies; no row storage
/// is ever shared between two matrices.
#[derive(Clone, Debug)]
pub struct F2Matrix {
    /// the number of rows
    n: usize,

    /// the number of columns
    m: usize,

    /// the rows, each `min_blocks(m)` blocks with zero bits at indices `>= m`
    rows: Vec<BitVec>,
}

impl F2Matrix {
    /// Creates an `n × m` zero matrix.
    pub fn zeros(n: usize, m: usize) -> Self {
        let blocks = min_blocks(m);
        F2Matrix {
            n,
            m,
            rows: (0..n).map(|_| BitVec::zeros(blocks)).collect(),
        }
    }

    /// Creates the `size × size` identity matrix.
    pub fn identity(size: usize) -> Self {
        let mut f = Self::zeros(size, size);
        f.set_to_identity();
        f
    }

    /// Builds an `n × m` matrix from a function `f` giving the value of each entry.
    pub fn build(n: usize, m: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut out = Self::zeros(n, m);
        for i in 0..n {
            for j in 0..m {
                if f(i, j) {
                    out.rows[i].set_bit(j, true);
                }
            }
        }
        out
    }

    /// Creates an `n × m` matrix with uniformly random entries.
    pub fn random(rng: &mut impl Rng, n: usize, m: usize) -> Self {
        let blocks = min_blocks(m);
        let rows = (0..n)
            .map(|_| {
                let mut row = BitVec::random(rng, blocks);
                row.clear_range(m, blocks * BLOCKSIZE - m);
                row
            })
            .collect();
        F2Matrix { n, m, rows }
    }

    /// Creates a random invertible `size × size` matrix by applying random row
    /// additions to the identity.
    pub fn random_invertible(rng: &mut impl Rng, size: usize) -> Self {
        let mut f = Self::identity(size);
        if size < 2 {
            return f;
        }
        for _ in 0..10 * size * size {
            let r1 = rng.random_range(0..size);
            let mut r2 = rng.random_range(0..size - 1);
            if r2 >= r1 {
                r2 += 1;
            }
            f.add_row(r1, r2);
        }
        f
    }

    /// Replaces the row contents from a sequence of bit vectors.
    ///
    /// Row contents are copied; the input rows may have any block count as long as their
    /// set bits fit into the matrix width.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if `data.len()` differs from the row count or any row has a set
    /// bit at a column index `>= cols`. The matrix is untouched on failure.
    pub fn set_rows(&mut self, data: &[BitVec]) -> Result<(), MatrixError> {
        if data.len() != self.n {
            return Err(MatrixError::ShapeMismatch);
        }
        if data.iter().any(|row| row.bit_len() > self.m) {
            return Err(MatrixError::ShapeMismatch);
        }
        let blocks = min_blocks(self.m);
        self.rows = data.iter().map(|row| row.resized(blocks)).collect();
        Ok(())
    }

    /// Creates a matrix of `m` columns from one little-endian word per row, e.g.
    /// `from_words(3, &[5, 3, 2])` is `[[1,0,1],[1,1,0],[0,1,0]]`.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if any word has a set bit at an index `>= m`.
    pub fn from_words(m: usize, words: &[BitBlock]) -> Result<Self, MatrixError> {
        let mut f = Self::zeros(words.len(), m);
        let rows: Vec<BitVec> = words.iter().map(|&w| BitVec::from(w)).collect();
        f.set_rows(&rows)?;
        Ok(f)
    }

    /// Zeroes the matrix and puts a 1 at `(i, i)` for each `i < min(rows, cols)`.
    /// Non-square matrices keep their excess rows or columns at zero.
    pub fn set_to_identity(&mut self) {
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.zero();
            if i < self.m {
                row.set_bit(i, true);
            }
        }
    }

    /// The number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.n
    }

    /// The number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.m
    }

    /// Borrows row `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    #[inline]
    pub fn row(&self, i: usize) -> &BitVec {
        &self.rows[i]
    }

    /// Unchecked-width entry read: bit `(i, j)` with column reads past the width giving 0.
    ///
    /// # Panics
    ///
    /// Panics if `i >= rows`. Use [`get`](F2Matrix::get) for a fully checked access.
    #[inline]
    pub fn bit(&self, i: usize, j: usize) -> bool {
        self.rows[i].bit(j)
    }

    /// Sets entry `(i, j)` to `b`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[inline]
    pub fn set_bit(&mut self, i: usize, j: usize, b: bool) {
        assert!(i < self.n && j < self.m, "matrix index out of bounds");
        self.rows[i].set_bit(j, b);
    }

    /// Returns the entry at `(i, j)`.
    ///
    /// # Errors
    ///
    /// `IndexOutOfBounds` when `i >= rows` or `j >= cols`.
    pub fn get(&self, i: usize, j: usize) -> Result<bool, MatrixError> {
        if i >= self.n || j >= self.m {
            return Err(MatrixError::IndexOutOfBounds);
        }
        Ok(self.rows[i].bit(j))
    }

    /// Returns true when every entry is 0.
    pub fn is_zero(&self) -> bool {
        self.rows.iter().all(|row| row.is_zero())
    }

    /// Exchanges rows `i` and `j` in place.
    ///
    /// # Errors
    ///
    /// `IndexOutOfBounds` on an invalid row index.
    pub fn swap_rows(&mut self, i: usize, j: usize) -> Result<(), MatrixError> {
        if i >= self.n || j >= self.n {
            return Err(MatrixError::IndexOutOfBounds);
        }
        self.rows.swap(i, j);
        Ok(())
    }

    /// Exchanges columns `i` and `j` in place.
    ///
    /// # Errors
    ///
    /// `IndexOutOfBounds` on an invalid column index.
    pub fn swap_cols(&mut self, i: usize, j: usize) -> Result<(), MatrixError> {
        if i >= self.m || j >= self.m {
            return Err(MatrixError::IndexOutOfBounds);
        }
        self.swap_cols_unchecked(i, j);
        Ok(())
    }

    #[inline]
    pub(crate) fn swap_rows_unchecked(&mut self, i: usize, j: usize) {
        self.rows.swap(i, j);
    }

    pub(crate) fn swap_cols_unchecked(&mut self, i: usize, j: usize) {
        for row in &mut self.rows {
            row.swap_bits(i, j);
        }
    }

    /// XORs row `from` into row `to`, the elementary row addition over F₂.
    ///
    /// # Panics
    ///
    /// Panics if the indices are equal or out of range.
    pub fn add_row(&mut self, from: usize, to: usize) {
        assert_ne!(from, to, "cannot add a row to itself");
        if from < to {
            let (head, tail) = self.rows.split_at_mut(to);
            tail[0] ^= &head[from];
        } else {
            let (head, tail) = self.rows.split_at_mut(from);
            head[to] ^= &tail[0];
        }
    }

    /// Transposes the matrix in place, swapping its dimensions.
    pub fn transpose(&mut self) {
        let blocks = min_blocks(self.n);
        let mut out: Vec<BitVec> = (0..self.m).map(|_| BitVec::zeros(blocks)).collect();
        for i in 0..self.n {
            for k in 0..self.m {
                if self.rows[i].bit(k) {
                    out[k].set_bit(i, true);
                }
            }
        }
        self.rows = out;
        std::mem::swap(&mut self.n, &mut self.m);
    }

    /// Returns a transposed copy of the matrix.
    pub fn transposed(&self) -> Self {
        let mut out = self.clone();
        out.transpose();
        out
    }

    /// Transposes the `size × size` square submatrix at `(start_row, start_col)` in
    /// place.
    ///
    /// # Errors
    ///
    /// `NonSquareSubmatrix` when the square window does not fit inside the matrix.
    pub fn partial_transpose(
        &mut self,
        start_row: usize,
        start_col: usize,
        size: usize,
    ) -> Result<(), MatrixError> {
        if start_row + size > self.n || start_col + size > self.m {
            return Err(MatrixError::NonSquareSubmatrix);
        }
        let mut sub = self.submatrix(start_row, start_col, start_row + size, start_col + size)?;
        sub.transpose();
        self.set_submatrix(&sub, start_row, start_col)
    }

    /// Returns a deep copy of rows `[start_row, stop_row)` and columns
    /// `[start_col, stop_col)`, with the extracted columns shifted down so that column
    /// `start_col` of the source becomes column 0 of the result.
    ///
    /// # Errors
    ///
    /// `IndexOutOfBounds` when the window leaves the matrix or is inverted.
    pub fn submatrix(
        &self,
        start_row: usize,
        start_col: usize,
        stop_row: usize,
        stop_col: usize,
    ) -> Result<F2Matrix, MatrixError> {
        if start_row > stop_row || start_col > stop_col || stop_row > self.n || stop_col > self.m {
            return Err(MatrixError::IndexOutOfBounds);
        }
        let rows = (start_row..stop_row)
            .map(|i| self.rows[i].extract_bits(start_col, stop_col - start_col))
            .collect();
        Ok(F2Matrix {
            n: stop_row - start_row,
            m: stop_col - start_col,
            rows,
        })
    }

    /// Overwrites the window at `(start_row, start_col)` with the contents of `sub`:
    /// the target bits are masked out and the shifted submatrix rows are XORed in.
    ///
    /// # Errors
    ///
    /// `SubmatrixTooLarge` when `sub` does not fit at the given position.
    pub fn set_submatrix(
        &mut self,
        sub: &F2Matrix,
        start_row: usize,
        start_col: usize,
    ) -> Result<(), MatrixError> {
        if sub.n + start_row > self.n || sub.m + start_col > self.m {
            return Err(MatrixError::SubmatrixTooLarge);
        }
        for (k, src) in sub.rows.iter().enumerate() {
            let row = &mut self.rows[start_row + k];
            row.clear_range(start_col, sub.m);
            row.xor_shifted(src, start_col);
        }
        Ok(())
    }

    /// Returns column `j` as a bit vector whose bit `i` is the entry `(i, j)`, or `None`
    /// when `j` is out of range.
    pub fn col(&self, j: usize) -> Option<BitVec> {
        if j >= self.m {
            return None;
        }
        let mut out = BitVec::zeros(min_blocks(self.n));
        for (i, row) in self.rows.iter().enumerate() {
            if row.bit(j) {
                out.set_bit(i, true);
            }
        }
        Some(out)
    }

    /// Randomly permutes the columns using OS entropy, returning the `cols × cols`
    /// permutation matrix that accumulates the same swaps, so that
    /// `A_before · P == A_after`.
    ///
    /// # Errors
    ///
    /// `RandomSource` when the operating system fails to provide entropy. All indices
    /// are drawn before any column moves, so a failed call leaves the matrix untouched.
    pub fn permute_cols(&mut self) -> Result<F2Matrix, MatrixError> {
        self.try_permute_cols(&mut OsRng)
    }

    fn try_permute_cols(&mut self, rng: &mut impl TryRngCore) -> Result<F2Matrix, MatrixError> {
        let mut targets = Vec::with_capacity(self.m);
        if self.m > 0 {
            let bound = self.m as u64;
            // rejection sampling keeps the draw uniform
            let zone = (u64::MAX / bound) * bound;
            for _ in 0..self.m {
                let k = loop {
                    let v = rng
                        .try_next_u64()
                        .map_err(|e| MatrixError::RandomSource(e.to_string()))?;
                    if v < zone {
                        break (v % bound) as usize;
                    }
                };
                targets.push(k);
            }
        }
        Ok(self.swap_cols_sequence(&targets))
    }

    /// Randomly permutes the columns using the given generator (pass a seeded
    /// [`SmallRng`](rand::rngs::SmallRng) for reproducible permutations), returning the
    /// `cols × cols` permutation matrix that accumulates the same swaps.
    pub fn permute_cols_with(&mut self, rng: &mut impl Rng) -> F2Matrix {
        let targets: Vec<usize> = (0..self.m).map(|_| rng.random_range(0..self.m)).collect();
        self.swap_cols_sequence(&targets)
    }

    /// Swaps column `i` with `targets[i]` for each `i` in turn, mirroring the swaps on a
    /// fresh identity permutation matrix.
    fn swap_cols_sequence(&mut self, targets: &[usize]) -> F2Matrix {
        let mut p = F2Matrix::identity(self.m);
        for (i, &k) in targets.iter().enumerate() {
            if k != i {
                self.swap_cols_unchecked(i, k);
                p.swap_cols_unchecked(i, k);
            }
        }
        p
    }

    /// XORs `rhs` into the matrix row-wise, the matrix addition over F₂.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` when the dimensions differ; the matrix is untouched then.
    pub fn add(&mut self, rhs: &F2Matrix) -> Result<(), MatrixError> {
        if self.n != rhs.n || self.m != rhs.m {
            return Err(MatrixError::ShapeMismatch);
        }
        for (row, other) in self.rows.iter_mut().zip(rhs.rows.iter()) {
            *row ^= other;
        }
        Ok(())
    }

    /// Replaces the matrix by the product `self · rhs`. Each entry is the F₂ inner
    /// product of a row and a column: bitwise AND followed by popcount parity.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` when `self.cols() != rhs.rows()`; the matrix is untouched then.
    pub fn mul(&mut self, rhs: &F2Matrix) -> Result<(), MatrixError> {
        if self.m != rhs.n {
            return Err(MatrixError::ShapeMismatch);
        }
        let rt = rhs.transposed();
        let blocks = min_blocks(rhs.m);
        let mut out = Vec::with_capacity(self.n);
        for i in 0..self.n {
            let mut row = BitVec::zeros(blocks);
            for j in 0..rhs.m {
                if self.rows[i].dot(&rt.rows[j]) {
                    row.set_bit(j, true);
                }
            }
            out.push(row);
        }
        self.rows = out;
        self.m = rhs.m;
        Ok(())
    }

    fn format_with(&self, val_sep: &str, line_sep: &str) -> String {
        let mut out = String::new();
        for i in 0..self.n {
            for j in 0..self.m {
                if j > 0 {
                    out.push_str(val_sep);
                }
                out.push(if self.bit(i, j) { '1' } else { '0' });
            }
            out.push_str(line_sep);
        }
        out
    }

    /// Renders the matrix as a LaTeX `bmatrix` environment.
    pub fn to_latex(&self) -> String {
        format!(
            "\\begin{{bmatrix}}\n{}\\end{{bmatrix}}\n",
            self.format_with(" & ", "\\\n")
        )
    }

    /// Renders the matrix as comma-separated values, one row per line.
    pub fn to_csv(&self) -> String {
        self.format_with(", ", "\n")
    }
}

/// Two matrices are equal iff their dimensions match and all rows compare bit-equal.
impl PartialEq for F2Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n && self.m == other.m && self.rows == other.rows
    }
}

impl Eq for F2Matrix {}

/// Allows indexing with a `(row, col)` pair: `matrix[(i, j)]` is `matrix.bit(i, j)`.
impl Index<(usize, usize)> for F2Matrix {
    type Output = bool;

    #[inline]
    fn index(&self, index: (usize, usize)) -> &Self::Output {
        if self.bit(index.0, index.1) {
            &true
        } else {
            &false
        }
    }
}

impl Mul for &F2Matrix {
    type Output = F2Matrix;

    /// Out-of-place matrix product.
    ///
    /// # Panics
    ///
    /// Panics when the dimensions are incompatible; use [`F2Matrix::mul`] to handle the
    /// mismatch as an error instead.
    fn mul(self, rhs: Self) -> Self::Output {
        let mut out = self.clone();
        if F2Matrix::mul(&mut out, rhs).is_err() {
            panic!(
                "attempting to multiply matrices of incompatible dimensions: {} != {}",
                self.m, rhs.n
            );
        }
        out
    }
}

/// Formats the matrix as space-separated 0/1 values, one row per line.
impl fmt::Display for F2Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_with(" ", "\n"))
    }
}
