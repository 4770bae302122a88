use std::fmt::{self, Display, Formatter};

use crate::{bits_per_index::BitsPerIndex, section_indices::SECTION_VOLUME};


/// How indices are laid out across the 64-bit words of a packed data array.
///
/// Neither mode can be reliably distinguished from the other by looking at the data,
/// so the mode must always be chosen by the caller (usually from the chunk's data version).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackingMode {
    /// Used since 1.16 (snapshot 20w17a). Each word holds `floor(64 / bits_per_index)`
    /// indices, starting from the least-significant bits, and an index is never split
    /// between two words. Any leftover high bits of a word are padding.
    #[default]
    Aligned,
    /// Used before 1.16. The words are treated as one continuous bit stream
    /// (least-significant bit of the first word first), so an index may start near the top
    /// of one word and continue into the low bits of the next.
    ///
    /// This has not been validated against real pre-1.16 worlds.
    Spanning,
}

impl PackingMode {
    /// The number of words needed to hold the indices of one section.
    #[inline]
    pub fn words_for_section(self, bits_per_index: BitsPerIndex) -> usize {
        match self {
            Self::Aligned => {
                SECTION_VOLUME.div_ceil(usize::from(bits_per_index.indices_per_word()))
            }
            Self::Spanning => {
                (SECTION_VOLUME * usize::from(bits_per_index.get())).div_ceil(64)
            }
        }
    }
}

impl Display for PackingMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aligned  => write!(f, "aligned"),
            Self::Spanning => write!(f, "spanning"),
        }
    }
}
