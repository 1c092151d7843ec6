//! `f2gauss` is a Rust library for dense linear algebra over the 2-element finite field,
//! built for the partial Gaussian elimination that syndrome decoders and code-based
//! cryptographic schemes run on their parity-check matrices. Some features include:
//! - getting and setting individual matrix elements (as `bool`s)
//! - fast row operations and dot product using bitwise operations
//! - addition, multiplication, transpose and submatrix extraction/insertion
//! - random column permutations with the accumulated permutation matrix
//! - full and window-restricted Gaussian elimination
//! - [`partial_gaussian_with_rescue`](matrix::F2Matrix::partial_gaussian_with_rescue):
//!   a windowed reduction that resolves linear dependencies through a pluggable
//!   [`Rescue`] strategy while accounting every row operation in a transformation
//!   matrix `G` and every column swap in a permutation matrix `P`, so that
//!   `G · A₀ · P` reconstructs the reduced matrix
//!
//! The two main data structures provided by this crate are:
//! - [`BitVec`]: a vector of bits stored in 64-bit blocks, little-endian, along with
//!   convenience methods for indexing and manipulating bits
//! - [`F2Matrix`]: a two-dimensional matrix over F₂ whose rows are independently owned
//!   `BitVec`s

#![allow(
    clippy::needless_range_loop,
    clippy::uninlined_format_args,
    clippy::bool_assert_comparison,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::bool_to_int_with_if
)]
pub mod bitvec;
pub mod error;
pub mod gauss;
pub mod matrix;

pub use bitvec::{partial_xor, BitBlock, BitSlice, BitVec, BLOCKSIZE};
pub use error::MatrixError;
pub use gauss::{Region, Rescue, RowColumnSearch};
pub use matrix::F2Matrix;
