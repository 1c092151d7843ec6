use thiserror::Error;

/// The ways an `F2Matrix` operation can fail.
///
/// Every failure is reported to the immediate caller; the library never aborts the
/// process. Operations that fail leave their receiver untouched, with one documented
/// exception: the rescue-driven elimination core leaves the input in its partially
/// reduced intermediate state when a rescue fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatrixError {
    /// Dimensions disagree (`add`, `mul`, `set_rows`) or a window cannot hold its
    /// diagonal.
    #[error("matrix dimensions do not match")]
    ShapeMismatch,

    /// A row, column or window index lies outside the matrix.
    #[error("index out of bounds")]
    IndexOutOfBounds,

    /// The submatrix passed to `set_submatrix` does not fit at the given position.
    #[error("submatrix too large")]
    SubmatrixTooLarge,

    /// The square window passed to `partial_transpose` does not fit inside the matrix.
    #[error("cannot partially transpose a non-square submatrix")]
    NonSquareSubmatrix,

    /// The rescue strategy found no pivot candidate anywhere in its search space.
    #[error("cannot resolve linear dependency")]
    UnresolvableDependency,

    /// The operating system failed to provide the entropy `permute_cols` asked for.
    #[error("random source unavailable: {0}")]
    RandomSource(String),
}
