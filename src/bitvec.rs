use rand::Rng;
use ref_cast::RefCast;
use std::fmt;
use std::ops::{BitAndAssign, BitXorAssign, Deref, DerefMut};

/// A block of bits. This is an alias for [`u64`]
pub type BitBlock = u64;

/// Number of bits in a [`BitBlock`]
pub const BLOCKSIZE: usize = 64;

/// Returns the minimum number of [`BitBlock`]s required to store the given number of bits.
///
/// If `bits` is not a multiple of [`BLOCKSIZE`], the result is rounded up to ensure all
/// bits fit.
#[inline]
pub fn min_blocks(bits: usize) -> usize {
    bits / BLOCKSIZE + if bits % BLOCKSIZE == 0 { 0 } else { 1 }
}

/// A vector of bits, stored as a vector of [`BitBlock`]s (which alias to `u64`).
///
/// Bit indexing is little-endian: bit `i` lives at `1 << (i % 64)` of block `i / 64`, so a
/// `BitVec` holding the single block `10` has its 1-bits at indices 1 and 3. This matches
/// the column encoding of [`F2Matrix`](crate::matrix::F2Matrix) rows, where each row is
/// read as a binary number with column 0 as the least significant bit.
///
/// Reads past the allocated blocks yield 0, so a vector can stand in for an arbitrarily
/// long bit string with a finite number of 1-bits.
///
/// # Examples
///
/// ```
/// use f2gauss::bitvec::BitVec;
///
/// let mut bv = BitVec::zeros(4);
/// bv.set_bit(5, true);
/// assert!(bv.bit(5));
/// assert_eq!(bv.bit_len(), 6);
/// ```
///
/// Most methods are implemented on [`BitSlice`] and reached through dereferencing.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct BitVec(Vec<BitBlock>);

/// A borrowed sequence of bits, represented as a slice of [`BitBlock`]s.
///
/// Provides the bit access, bitwise and range operations shared by owned and borrowed
/// bit data.
#[derive(RefCast, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[repr(transparent)]
pub struct BitSlice([BitBlock]);

/// Iterator over the bits in a [`BitSlice`], least significant bit first.
pub struct BitIter<'a> {
    inner: std::slice::Iter<'a, BitBlock>,
    block: BitBlock,
    c: usize,
}

impl Iterator for BitIter<'_> {
    type Item = bool;
    fn next(&mut self) -> Option<Self::Item> {
        if self.c == BLOCKSIZE {
            self.block = self.inner.next().copied()?;
            self.c = 0;
        }
        let bit = self.block & 1 == 1;
        self.block >>= 1;
        self.c += 1;
        Some(bit)
    }
}

/// Mask selecting the bits of absolute range `[start, end)` that fall inside `block`.
///
/// The caller must ensure the range actually intersects the block.
#[inline]
fn block_mask(block: usize, start: usize, end: usize) -> BitBlock {
    let block_start = block * BLOCKSIZE;
    let lo = start.max(block_start) - block_start;
    let hi = end.min(block_start + BLOCKSIZE) - block_start;
    debug_assert!(lo < hi);
    let width = hi - lo;
    if width == BLOCKSIZE {
        BitBlock::MAX
    } else {
        (((1 as BitBlock) << width) - 1) << lo
    }
}

impl BitSlice {
    /// Returns a copy of the slice as an owned [`BitVec`].
    #[inline]
    pub fn to_vec(&self) -> BitVec {
        BitVec(self.0.to_vec())
    }

    /// Number of [`BitBlock`]s in the slice.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when the slice holds no blocks at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of bits covered by the allocated blocks.
    #[inline]
    pub fn num_bits(&self) -> usize {
        self.0.len() * BLOCKSIZE
    }

    #[inline]
    fn block_or_zero(&self, index: usize) -> BitBlock {
        self.0.get(index).copied().unwrap_or(0)
    }

    /// Returns the bit at `index`. Indices past the allocated blocks read as 0.
    #[inline]
    pub fn bit(&self, index: usize) -> bool {
        self.block_or_zero(index / BLOCKSIZE) >> (index % BLOCKSIZE) & 1 == 1
    }

    /// Sets the bit at `index` to `value`.
    ///
    /// # Panics
    ///
    /// Panics if `index` lies past the allocated blocks.
    #[inline]
    pub fn set_bit(&mut self, index: usize, value: bool) {
        let mask = (1 as BitBlock) << (index % BLOCKSIZE);
        let block = &mut self.0[index / BLOCKSIZE];
        if value {
            *block |= mask;
        } else {
            *block &= !mask;
        }
    }

    /// Exchanges the bits at indices `i` and `j`.
    pub fn swap_bits(&mut self, i: usize, j: usize) {
        let bi = self.bit(i);
        let bj = self.bit(j);
        if bi != bj {
            self.set_bit(i, bj);
            self.set_bit(j, bi);
        }
    }

    /// Returns true when every bit is 0.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// Sets every bit to 0.
    #[inline]
    pub fn zero(&mut self) {
        self.0.fill(0);
    }

    /// Index of the highest set bit plus one, or 0 when the slice is all zeros.
    pub fn bit_len(&self) -> usize {
        for i in (0..self.0.len()).rev() {
            if self.0[i] != 0 {
                return i * BLOCKSIZE + BLOCKSIZE - self.0[i].leading_zeros() as usize;
            }
        }
        0
    }

    /// Counts the number of bits set to 1.
    #[inline]
    pub fn count_ones(&self) -> u32 {
        self.0.iter().fold(0, |c, bits| c + bits.count_ones())
    }

    /// Popcount modulo 2: true when an odd number of bits are set.
    #[inline]
    pub fn parity(&self) -> bool {
        self.count_ones() & 1 == 1
    }

    /// Computes the dot product (mod 2) of two bit slices: bitwise AND followed by
    /// popcount parity. The shorter operand is treated as zero-extended.
    #[inline]
    pub fn dot(&self, rhs: &BitSlice) -> bool {
        let mut c = 0;
        for (bits0, bits1) in self.0.iter().zip(rhs.0.iter()) {
            c ^= (*bits0 & *bits1).count_ones() & 1;
        }
        c == 1
    }

    /// Returns an iterator over all bits, least significant first.
    #[inline]
    pub fn iter(&self) -> BitIter {
        BitIter {
            inner: self.0.iter(),
            block: 0,
            c: BLOCKSIZE,
        }
    }

    /// Returns an iterator over the [`BitBlock`]s in this slice.
    #[inline]
    pub fn block_iter(&self) -> impl Iterator<Item = BitBlock> + '_ {
        self.0.iter().copied()
    }

    /// Copies bits `[start, start + len)` into a fresh [`BitVec`] of `min_blocks(len)`
    /// blocks, shifted down so the extracted bit `start` becomes bit 0.
    pub fn extract_bits(&self, start: usize, len: usize) -> BitVec {
        let blocks = min_blocks(len);
        let mut out = vec![0; blocks];
        let shift = start % BLOCKSIZE;
        let off = start / BLOCKSIZE;
        for (k, block) in out.iter_mut().enumerate() {
            let lo = self.block_or_zero(off + k) >> shift;
            let hi = if shift == 0 {
                0
            } else {
                self.block_or_zero(off + k + 1) << (BLOCKSIZE - shift)
            };
            *block = lo | hi;
        }
        let tail = len % BLOCKSIZE;
        if tail != 0 {
            out[blocks - 1] &= ((1 as BitBlock) << tail) - 1;
        }
        BitVec(out)
    }

    /// Zeroes bits `[start, start + len)`. Bits past the allocated blocks are ignored.
    pub fn clear_range(&mut self, start: usize, len: usize) {
        if len == 0 {
            return;
        }
        let end = start + len;
        for b in (start / BLOCKSIZE)..=((end - 1) / BLOCKSIZE) {
            if b >= self.0.len() {
                break;
            }
            self.0[b] &= !block_mask(b, start, end);
        }
    }

    /// Sets bits `[start, start + len)` to 1. Bits past the allocated blocks are ignored.
    pub fn set_range(&mut self, start: usize, len: usize) {
        if len == 0 {
            return;
        }
        let end = start + len;
        for b in (start / BLOCKSIZE)..=((end - 1) / BLOCKSIZE) {
            if b >= self.0.len() {
                break;
            }
            self.0[b] |= block_mask(b, start, end);
        }
    }

    /// XORs `src`, shifted left by `offset` bits, into this slice. Bits shifted past the
    /// allocated blocks are dropped.
    pub fn xor_shifted(&mut self, src: &BitSlice, offset: usize) {
        let shift = offset % BLOCKSIZE;
        let off = offset / BLOCKSIZE;
        for (k, &v) in src.0.iter().enumerate() {
            if v == 0 {
                continue;
            }
            if let Some(block) = self.0.get_mut(off + k) {
                *block ^= v << shift;
            }
            if shift != 0 {
                if let Some(block) = self.0.get_mut(off + k + 1) {
                    *block ^= v >> (BLOCKSIZE - shift);
                }
            }
        }
    }
}

/// Returns `x ^ (y & mask)` where `mask` has bits `start_col..=stop_col` set.
///
/// This is the row operation behind range-restricted elimination: the XOR with `y` only
/// takes effect inside the column window, columns outside it are untouched. The result
/// has the same number of blocks as `x`.
pub fn partial_xor(x: &BitSlice, y: &BitSlice, start_col: usize, stop_col: usize) -> BitVec {
    let mut out = x.to_vec();
    let end = stop_col + 1;
    for b in (start_col / BLOCKSIZE)..=(stop_col / BLOCKSIZE) {
        let v = y.block_or_zero(b) & block_mask(b, start_col, end);
        if let Some(block) = out.0.get_mut(b) {
            *block ^= v;
        }
    }
    out
}

impl BitVec {
    /// Creates a `BitVec` of `num_blocks` blocks, all bits 0.
    #[inline]
    pub fn zeros(num_blocks: usize) -> Self {
        BitVec(vec![0; num_blocks])
    }

    /// Creates a `BitVec` of `num_blocks` blocks, all bits 1.
    #[inline]
    pub fn ones(num_blocks: usize) -> Self {
        BitVec(vec![BitBlock::MAX; num_blocks])
    }

    /// Creates a `BitVec` of `num_blocks` uniformly random blocks.
    #[inline]
    pub fn random(rng: &mut impl Rng, num_blocks: usize) -> Self {
        (0..num_blocks).map(|_| rng.random::<BitBlock>()).collect()
    }

    /// Returns a copy resized to `num_blocks` blocks, truncating or zero-extending.
    pub fn resized(&self, num_blocks: usize) -> Self {
        let mut v = self.0.clone();
        v.resize(num_blocks, 0);
        BitVec(v)
    }
}

impl fmt::Display for BitVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            write!(f, "{}", if bit { 1 } else { 0 })?;
        }
        Ok(())
    }
}

impl BitXorAssign<&Self> for BitSlice {
    #[inline]
    fn bitxor_assign(&mut self, rhs: &Self) {
        for (bits0, bits1) in self.0.iter_mut().zip(rhs.0.iter()) {
            *bits0 ^= bits1;
        }
    }
}

impl BitAndAssign<&Self> for BitSlice {
    #[inline]
    fn bitand_assign(&mut self, rhs: &Self) {
        for (bits0, bits1) in self.0.iter_mut().zip(rhs.0.iter()) {
            *bits0 &= bits1;
        }
    }
}

impl BitXorAssign<&BitVec> for BitVec {
    #[inline]
    fn bitxor_assign(&mut self, rhs: &BitVec) {
        **self ^= &**rhs;
    }
}

impl BitAndAssign<&BitVec> for BitVec {
    #[inline]
    fn bitand_assign(&mut self, rhs: &BitVec) {
        **self &= &**rhs;
    }
}

impl Deref for BitVec {
    type Target = BitSlice;
    fn deref(&self) -> &Self::Target {
        BitSlice::ref_cast(&self.0)
    }
}

impl DerefMut for BitVec {
    fn deref_mut(&mut self) -> &mut Self::Target {
        BitSlice::ref_cast_mut(&mut self.0)
    }
}

impl From<Vec<BitBlock>> for BitVec {
    fn from(value: Vec<BitBlock>) -> Self {
        BitVec(value)
    }
}

impl From<BitBlock> for BitVec {
    fn from(value: BitBlock) -> Self {
        BitVec(vec![value])
    }
}

impl From<BitVec> for Vec<BitBlock> {
    fn from(value: BitVec) -> Self {
        value.0
    }
}

impl FromIterator<BitBlock> for BitVec {
    fn from_iter<T: IntoIterator<Item = BitBlock>>(iter: T) -> Self {
        Vec::from_iter(iter).into()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn bit_get_set() {
        let sz = 4;
        let bits = vec![0, 3, 100, 201, 255];

        let mut vec0 = BitVec::zeros(sz);
        for &b in &bits {
            vec0.set_bit(b, true);
        }

        for i in 0..(sz * BLOCKSIZE) {
            assert_eq!(vec0.bit(i), bits.contains(&i));
        }

        let mut vec1 = BitVec::ones(sz);
        for &b in &bits {
            vec1.set_bit(b, false);
        }

        for i in 0..(sz * BLOCKSIZE) {
            assert_eq!(vec1.bit(i), !bits.contains(&i));
        }

        // reads past the allocation are zero
        assert!(!vec0.bit(sz * BLOCKSIZE + 17));
    }

    #[test]
    fn bit_xor_and() {
        let sz = 8;
        let mut rng = SmallRng::seed_from_u64(1);
        let vec = BitVec::random(&mut rng, sz);
        let mut vec1 = vec.clone();
        vec1 ^= &vec;
        assert_eq!(vec1, BitVec::zeros(sz));

        vec1 = vec.clone();
        vec1 &= &BitVec::zeros(sz);
        assert_eq!(vec1, BitVec::zeros(sz));

        vec1 = vec.clone();
        vec1 &= &vec;
        assert_eq!(vec1, vec);
    }

    #[test]
    fn bit_len() {
        assert_eq!(BitVec::zeros(3).bit_len(), 0);
        assert_eq!(BitVec::from(10u64).bit_len(), 4);
        let mut v = BitVec::zeros(3);
        v.set_bit(130, true);
        assert_eq!(v.bit_len(), 131);
    }

    #[test]
    fn parity_and_dot() {
        assert!(!BitVec::from(10u64).parity());
        assert!(BitVec::from(13u64).parity());

        // 0b1010 . 0b0110 = popcount(0b0010) mod 2 = 1
        assert!(BitVec::from(10u64).dot(&BitVec::from(6u64)));
        // 0b1010 . 0b0101 = 0
        assert!(!BitVec::from(10u64).dot(&BitVec::from(5u64)));
    }

    #[test]
    fn extract_and_ranges() {
        let mut v = BitVec::zeros(2);
        v.set_range(60, 8);
        for i in 0..128 {
            assert_eq!(v.bit(i), (60..68).contains(&i));
        }

        let e = v.extract_bits(62, 4);
        assert_eq!(e.len(), 1);
        assert_eq!(Vec::<BitBlock>::from(e), vec![0b1111]);

        let e = v.extract_bits(66, 70);
        assert_eq!(e.len(), 2);
        assert!(e.bit(0) && e.bit(1) && !e.bit(2));

        v.clear_range(61, 6);
        assert!(v.bit(60) && v.bit(67));
        assert!(!v.bit(61) && !v.bit(66));
    }

    #[test]
    fn xor_shifted_roundtrip() {
        let mut rng = SmallRng::seed_from_u64(7);
        let src = BitVec::random(&mut rng, 2);
        let base = BitVec::random(&mut rng, 4);

        let mut v = base.clone();
        v.xor_shifted(&src, 37);
        assert_ne!(v, base);
        v.xor_shifted(&src, 37);
        assert_eq!(v, base);
    }

    #[test]
    fn partial_xor_windows() {
        let x = BitVec::from(10u64);
        let y = BitVec::from(6u64);
        assert_eq!(Vec::<BitBlock>::from(partial_xor(&x, &y, 0, 4)), vec![12]);

        let x = BitVec::from(6u64);
        let y = BitVec::from(10u64);
        assert_eq!(Vec::<BitBlock>::from(partial_xor(&x, &y, 1, 2)), vec![4]);
    }

    #[test]
    fn partial_xor_across_blocks() {
        let mut x = BitVec::zeros(2);
        x.set_bit(70, true);
        let y = BitVec::ones(2);

        let out = partial_xor(&x, &y, 62, 70);
        for i in 0..128 {
            assert_eq!(out.bit(i), (62..70).contains(&i), "bit {}", i);
        }
    }
}
