//! Gaussian elimination over F₂: the full two-phase reduction, the window-restricted
//! partial reduction, and the rescue-driven variant used by syndrome decoders, which
//! forces a window to the identity while accounting for every row and column operation
//! in a pair of transformation matrices.

use crate::bitvec::{min_blocks, BitVec};
use crate::error::MatrixError;
use crate::matrix::F2Matrix;

/// An inclusive rectangle of rows and columns on which partial Gaussian elimination
/// operates. Columns are given in the source matrix's coordinates.
///
/// The diagonal of the target identity runs along `(start_row + k, start_col + k)` for
/// `k = 0, ..., stop_col - start_col`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    /// first row of the window
    pub start_row: usize,
    /// first column of the window
    pub start_col: usize,
    /// last row of the window (inclusive)
    pub stop_row: usize,
    /// last column of the window (inclusive)
    pub stop_col: usize,
}

impl Region {
    pub fn new(start_row: usize, start_col: usize, stop_row: usize, stop_col: usize) -> Self {
        Region {
            start_row,
            start_col,
            stop_row,
            stop_col,
        }
    }

    /// The row holding the pivot for `pivot_bit` under the diagonal mapping.
    #[inline]
    pub fn target_row(&self, pivot_bit: usize) -> usize {
        self.start_row + pivot_bit - self.start_col
    }

    /// The number of columns in the window.
    #[inline]
    pub fn width(&self) -> usize {
        self.stop_col - self.start_col + 1
    }

    fn check_within(&self, n: usize, m: usize) -> Result<(), MatrixError> {
        if self.start_row > self.stop_row
            || self.start_col > self.stop_col
            || self.stop_row >= n
            || self.stop_col >= m
        {
            return Err(MatrixError::IndexOutOfBounds);
        }
        Ok(())
    }
}

/// A pluggable strategy for resolving a linear dependency during windowed elimination.
///
/// Invoked when no row of `[target_row, stop_row]` has a 1 in the current pivot column.
/// The strategy may permute rows and columns of `a` to inject a usable pivot into the
/// target row; it must mirror every row operation on `g` and every column swap on `p`,
/// since the caller later reconstructs the reduction as `G · A₀ · P`. On success the
/// caller retries the same pivot column, so a strategy must either make a retry
/// eventually succeed or return an error.
///
/// Implemented for any closure of the same shape, so one-off strategies need no type:
///
/// ```
/// use f2gauss::{F2Matrix, MatrixError, Region};
///
/// let mut give_up = |_: &mut F2Matrix,
///                    _: &mut F2Matrix,
///                    _: &mut F2Matrix,
///                    _: Region,
///                    _: usize| Err(MatrixError::UnresolvableDependency);
/// let mut a = F2Matrix::from_words(4, &[10, 13, 0, 0])?;
/// let result = a.partial_gaussian_with_rescue(Region::new(0, 1, 2, 3), &mut give_up);
/// assert_eq!(result, Err(MatrixError::UnresolvableDependency));
/// # Ok::<(), MatrixError>(())
/// ```
pub trait Rescue {
    /// Tries to inject a pivot for `pivot_bit` into `region.target_row(pivot_bit)`.
    ///
    /// # Errors
    ///
    /// An error when no pivot can be injected; the calling routine aborts with it.
    fn rescue(
        &mut self,
        a: &mut F2Matrix,
        g: &mut F2Matrix,
        p: &mut F2Matrix,
        region: Region,
        pivot_bit: usize,
    ) -> Result<(), MatrixError>;
}

impl<F> Rescue for F
where
    F: FnMut(
        &mut F2Matrix,
        &mut F2Matrix,
        &mut F2Matrix,
        Region,
        usize,
    ) -> Result<(), MatrixError>,
{
    fn rescue(
        &mut self,
        a: &mut F2Matrix,
        g: &mut F2Matrix,
        p: &mut F2Matrix,
        region: Region,
        pivot_bit: usize,
    ) -> Result<(), MatrixError> {
        self(a, g, p, region, pivot_bit)
    }
}

/// The shipped rescue strategy: search the whole matrix for a pivot, swapping in a row
/// and a column from outside the window when necessary.
///
/// Scans coordinates `(r, c)` excluding the already-fixed rows `[start_row, target_row]`
/// and columns `[start_col, pivot_bit)`. The first 1-entry found is moved onto the
/// diagonal by a row swap (mirrored on `G`) and a column swap (mirrored on `P`). The
/// installed row may carry 1-bits in the already-reduced columns; those are cleared by
/// XORing in the corresponding pivot rows in ascending column order, each mirrored on
/// `G`.
///
/// With this strategy the elimination forces the window to the identity regardless of
/// linear dependence inside the window, failing only when the remaining matrix holds no
/// 1-entry at all.
pub struct RowColumnSearch;

impl Rescue for RowColumnSearch {
    fn rescue(
        &mut self,
        a: &mut F2Matrix,
        g: &mut F2Matrix,
        p: &mut F2Matrix,
        region: Region,
        pivot_bit: usize,
    ) -> Result<(), MatrixError> {
        let target = region.target_row(pivot_bit);

        let mut found = None;
        'scan: for r in 0..a.rows() {
            if r >= region.start_row && r <= target {
                continue;
            }
            for c in 0..a.cols() {
                if c >= region.start_col && c < pivot_bit {
                    continue;
                }
                if a.bit(r, c) {
                    found = Some((r, c));
                    break 'scan;
                }
            }
        }
        let Some((r, c)) = found else {
            return Err(MatrixError::UnresolvableDependency);
        };

        a.swap_rows_unchecked(target, r);
        g.swap_rows_unchecked(target, r);
        if c != pivot_bit {
            a.swap_cols_unchecked(c, pivot_bit);
            p.swap_cols_unchecked(c, pivot_bit);
        }

        // the installed row may have 1s in the already-fixed columns; clear them in
        // ascending order so a cascade introduced by one pivot row is caught by the next
        for col in region.start_col..pivot_bit {
            if a.bit(target, col) {
                let src = region.target_row(col);
                a.add_row(src, target);
                g.add_row(src, target);
            }
        }

        Ok(())
    }
}

impl F2Matrix {
    #[inline]
    fn find_pivot(&self, col: usize, from_row: usize, to_row: usize) -> Option<usize> {
        (from_row..=to_row).find(|&r| self.bit(r, col))
    }

    /// Reduces the matrix with the two-phase schoolbook Gaussian elimination: a forward
    /// pass placing pivots along the diagonal, then back-substitution. A square
    /// full-rank matrix becomes the identity.
    ///
    /// On non-square or rank-deficient input the result is the best-effort reduced form
    /// with zero rows below the rank. The forward pass nominally visits every column,
    /// but there is at most one pivot per row, so for a wide matrix the columns past the
    /// row count are no-op iterations and the pass stops there.
    pub fn gaussian_elimination(&mut self) {
        for pivot in 0..self.cols() {
            if pivot >= self.rows() {
                break;
            }
            let Some(r) = self.find_pivot(pivot, pivot, self.rows() - 1) else {
                continue;
            };
            if r != pivot {
                self.swap_rows_unchecked(pivot, r);
            }
            for rr in (pivot + 1)..self.rows() {
                if self.bit(rr, pivot) {
                    self.add_row(pivot, rr);
                }
            }
        }
        self.diagonalize();
    }

    /// Backward pass: clears the entries above each diagonal pivot.
    fn diagonalize(&mut self) {
        for pivot in (0..self.rows().min(self.cols())).rev() {
            for r in 0..pivot {
                if self.bit(r, pivot) {
                    self.add_row(pivot, r);
                }
            }
        }
    }

    /// The rank of the matrix over F₂, computed by echelon reduction on a copy.
    pub fn rank(&self) -> usize {
        let mut f = self.clone();
        let mut row = 0;
        for col in 0..f.cols() {
            if row >= f.rows() {
                break;
            }
            if let Some(r) = f.find_pivot(col, row, f.rows() - 1) {
                f.swap_rows_unchecked(row, r);
                for rr in (row + 1)..f.rows() {
                    if f.bit(rr, col) {
                        f.add_row(row, rr);
                    }
                }
                row += 1;
            }
        }
        row
    }

    /// Runs the two-phase Gaussian elimination restricted to the inclusive window
    /// `region`, laying the diagonal along `(start_row + k, start_col + k)`. Columns
    /// with no pivot candidate inside the window are skipped. Row operations affect
    /// entire rows, not just the window's columns.
    ///
    /// # Errors
    ///
    /// `IndexOutOfBounds` when the window leaves the matrix.
    pub fn partial_gaussian(&mut self, region: Region) -> Result<(), MatrixError> {
        region.check_within(self.rows(), self.cols())?;
        for pivot in region.start_col..=region.stop_col {
            let target = region.target_row(pivot);
            if target > region.stop_row {
                break;
            }
            if let Some(r) = self.find_pivot(pivot, target, region.stop_row) {
                if r != target {
                    self.swap_rows_unchecked(target, r);
                }
                for rr in (target + 1)..=region.stop_row {
                    if self.bit(rr, pivot) {
                        self.add_row(target, rr);
                    }
                }
            }
        }
        self.partial_diagonalize(region, None);
        Ok(())
    }

    /// Backward pass over the window; every row XOR is mirrored on `mirror` when given.
    fn partial_diagonalize(&mut self, region: Region, mut mirror: Option<&mut F2Matrix>) {
        for pivot in (region.start_col..=region.stop_col).rev() {
            let target = region.target_row(pivot);
            if target > region.stop_row {
                continue;
            }
            for r in region.start_row..=region.stop_row {
                if r != target && self.bit(r, pivot) {
                    self.add_row(target, r);
                    if let Some(g) = mirror.as_deref_mut() {
                        g.add_row(target, r);
                    }
                }
            }
        }
    }

    /// Windowed Gaussian elimination with pluggable linear-dependency resolution.
    ///
    /// Reduces the inclusive window `region` to the identity, calling `rescue` whenever
    /// a pivot column has no candidate left inside the window and retrying the same
    /// column after each successful rescue. Returns the pair `(G, P)`: `G` is the
    /// `rows × rows` transformation matrix accumulating every elementary row operation,
    /// `P` the `cols × cols` permutation matrix accumulating every column swap, both
    /// seeded with the identity, so that on success
    ///
    /// * the window equals the identity of width `region.width()`, and
    /// * `G · A₀ · P` equals the reduced matrix, where `A₀` is the matrix at entry.
    ///
    /// # Errors
    ///
    /// `IndexOutOfBounds` when the window leaves the matrix; `ShapeMismatch` when the
    /// window has fewer rows than columns and so cannot hold the diagonal. When the
    /// rescue strategy fails, its error is propagated and the matrix is left in the
    /// partially reduced state it had at that point (the in-flight accounting matrices
    /// are dropped with the error).
    pub fn partial_gaussian_with_rescue<R: Rescue>(
        &mut self,
        region: Region,
        rescue: &mut R,
    ) -> Result<(F2Matrix, F2Matrix), MatrixError> {
        region.check_within(self.rows(), self.cols())?;
        if region.stop_row - region.start_row < region.stop_col - region.start_col {
            return Err(MatrixError::ShapeMismatch);
        }

        let mut g = F2Matrix::identity(self.rows());
        let mut p = F2Matrix::identity(self.cols());

        let mut pivot = region.start_col;
        while pivot <= region.stop_col {
            let target = region.target_row(pivot);
            match self.find_pivot(pivot, target, region.stop_row) {
                Some(r) => {
                    if r != target {
                        self.swap_rows_unchecked(target, r);
                        g.swap_rows_unchecked(target, r);
                    }
                    for rr in (target + 1)..=region.stop_row {
                        if self.bit(rr, pivot) {
                            self.add_row(target, rr);
                            g.add_row(target, rr);
                        }
                    }
                    pivot += 1;
                }
                None => rescue.rescue(self, &mut g, &mut p, region, pivot)?,
            }
        }

        self.partial_diagonalize(region, Some(&mut g));
        Ok((g, p))
    }

    /// Returns true iff the `size`-wide square window at `(start_row, start_col)` equals
    /// the identity: each row, masked to the window's columns, must be exactly the unit
    /// vector of its diagonal position. Windows leaving the matrix are never the
    /// identity.
    pub fn check_gaussian(&self, start_row: usize, start_col: usize, size: usize) -> bool {
        if start_row + size > self.rows() || start_col + size > self.cols() {
            return false;
        }
        let blocks = min_blocks(self.cols());
        let mut mask = BitVec::zeros(blocks);
        mask.set_range(start_col, size);
        for k in 0..size {
            let mut masked = self.row(start_row + k).clone();
            masked &= &mask;
            let mut expected = BitVec::zeros(blocks);
            expected.set_bit(start_col + k, true);
            masked ^= &expected;
            if !masked.is_zero() {
                return false;
            }
        }
        true
    }
}
