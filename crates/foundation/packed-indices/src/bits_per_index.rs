use std::fmt::{self, Display, Formatter};


/// The number of bits used by each palette index in a section's packed data array.
///
/// Java Edition never uses fewer than four bits for a block-state index, even when the
/// palette has only two entries. Widths above sixteen are not supported, which limits
/// palettes to `2^16` entries (a section only has 4096 blocks anyway).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BitsPerIndex(u8);

impl BitsPerIndex {
    pub const MIN: Self = Self(4);
    pub const MAX: Self = Self(16);

    /// The length of the largest palette which can be indexed with [`BitsPerIndex::MAX`] bits.
    pub const MAX_PALETTE_LEN: usize = 1 << 16;

    /// Given the length of a section's palette, returns the number of bits per index
    /// used to pack indices into that palette: `max(ceil(log2(palette_len)), 4)`.
    ///
    /// Returns `None` precisely if `palette_len` is `0` or greater than `2^16`.
    pub fn for_palette_len(palette_len: usize) -> Option<Self> {
        if palette_len == 0 || palette_len > Self::MAX_PALETTE_LEN {
            return None;
        }

        // `ceil(log2(n))` is the bit length of `n - 1`. Note that `ceil(log2(1)) == 0`.
        let min_bits_per_index = usize::BITS - (palette_len - 1).leading_zeros();
        // At most 16, by the above check.
        let min_bits_per_index = u8::try_from(min_bits_per_index).ok()?;

        Some(Self(min_bits_per_index.max(Self::MIN.0)))
    }

    /// Returns the given width, if it is a valid number of bits per index
    /// (between 4 and 16, inclusive).
    #[inline]
    pub fn new(bits_per_index: u8) -> Option<Self> {
        if (Self::MIN.0..=Self::MAX.0).contains(&bits_per_index) {
            Some(Self(bits_per_index))
        } else {
            None
        }
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }

    /// The number of whole indices which fit in one 64-bit word.
    #[inline]
    pub fn indices_per_word(self) -> u8 {
        64 / self.0
    }

    /// The number of high bits of each word which are left over as padding when
    /// indices are not allowed to cross word boundaries.
    ///
    /// `self.indices_per_word() * self.get() + self.padding_bits() == 64`.
    #[inline]
    pub fn padding_bits(self) -> u8 {
        64 % self.0
    }

    /// `2^bits_per_index - 1`, which has the least-significant `bits_per_index` bits set.
    #[inline]
    pub fn index_mask(self) -> u64 {
        (1_u64 << self.0) - 1
    }

    /// The number of distinct indices which can be represented with this width.
    #[inline]
    pub fn max_palette_len(self) -> usize {
        1_usize << self.0
    }
}

impl From<BitsPerIndex> for u8 {
    #[inline]
    fn from(value: BitsPerIndex) -> Self {
        value.0
    }
}

impl Display for BitsPerIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
