use std::{ops::Index, slice};

use crate::{
    codec,
    errors::{DecodeError, EncodeError},
    packing_mode::PackingMode,
};


/// The number of blocks in a 16x16x16 section.
pub const SECTION_VOLUME: usize = 4096;

/// The 4096 palette indices of one section, in the section-local order used by
/// the packed data array (X increments first, then Z, then Y).
///
/// This type does not know the length of the palette it indexes into; the functions
/// which produce it from packed data check every index against the palette.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionIndices(Box<[u16; SECTION_VOLUME]>);

impl SectionIndices {
    /// Every block of the section uses the same palette index.
    #[inline]
    pub fn uniform(index: u16) -> Self {
        Self(Box::new([index; SECTION_VOLUME]))
    }

    #[inline]
    pub fn from_array(indices: Box<[u16; SECTION_VOLUME]>) -> Self {
        Self(indices)
    }

    /// Returns `None` if `indices` does not have length exactly 4096.
    pub fn from_slice(indices: &[u16]) -> Option<Self> {
        let indices: Box<[u16]> = indices.into();
        indices.try_into().ok().map(Self)
    }

    /// Decode the packed data array of a section, assuming the post-1.16 layout.
    /// See [`codec::decode`].
    #[inline]
    pub fn decode(palette_len: usize, words: &[u64]) -> Result<Self, DecodeError> {
        codec::decode(palette_len, words)
    }

    /// See [`codec::decode_with_mode`].
    #[inline]
    pub fn decode_with_mode(
        palette_len: usize,
        words:       &[u64],
        mode:        PackingMode,
    ) -> Result<Self, DecodeError> {
        codec::decode_with_mode(palette_len, words, mode)
    }

    /// Pack these indices with the post-1.16 layout. See [`codec::encode`].
    #[inline]
    pub fn encode(&self, palette_len: usize) -> Result<Vec<u64>, EncodeError> {
        codec::encode(self, palette_len)
    }

    /// See [`codec::encode_with_mode`].
    #[inline]
    pub fn encode_with_mode(
        &self,
        palette_len: usize,
        mode:        PackingMode,
    ) -> Result<Vec<u64>, EncodeError> {
        codec::encode_with_mode(self, palette_len, mode)
    }

    #[inline]
    pub fn get(&self, position: usize) -> Option<u16> {
        self.0.get(position).copied()
    }

    #[inline]
    pub fn as_array(&self) -> &[u16; SECTION_VOLUME] {
        &self.0
    }

    #[inline]
    pub fn as_slice(&self) -> &[u16] {
        self.0.as_slice()
    }

    #[inline]
    pub fn into_inner(self) -> Box<[u16; SECTION_VOLUME]> {
        self.0
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, u16> {
        self.0.iter()
    }

    /// The largest index used anywhere in the section.
    #[inline]
    pub fn max_index(&self) -> u16 {
        self.0.iter().copied().max().unwrap_or(0)
    }

    /// Whether every block of the section uses the same index.
    pub fn is_uniform(&self) -> bool {
        let first = self.0[0];
        self.0.iter().all(|&index| index == first)
    }
}

impl Default for SectionIndices {
    #[inline]
    fn default() -> Self {
        Self::uniform(0)
    }
}

impl Index<usize> for SectionIndices {
    type Output = u16;

    #[inline]
    fn index(&self, position: usize) -> &Self::Output {
        &self.0[position]
    }
}

impl AsRef<[u16]> for SectionIndices {
    #[inline]
    fn as_ref(&self) -> &[u16] {
        self.as_slice()
    }
}

impl<'a> IntoIterator for &'a SectionIndices {
    type Item = &'a u16;
    type IntoIter = slice::Iter<'a, u16>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}


#[cfg(test)]
mod tests {
    use super::{SECTION_VOLUME, SectionIndices};

    #[test]
    fn from_slice_requires_a_full_section() {
        assert!(SectionIndices::from_slice(&[0; SECTION_VOLUME - 1]).is_none());
        assert!(SectionIndices::from_slice(&[0; SECTION_VOLUME + 1]).is_none());

        let indices: Vec<u16> = (0..SECTION_VOLUME).map(|i| (i % 7) as u16).collect();
        let section = SectionIndices::from_slice(&indices).unwrap();
        assert_eq!(section.as_slice(), indices.as_slice());
        assert_eq!(section[13], 6);
        assert_eq!(section.get(SECTION_VOLUME), None);
        assert_eq!(section.max_index(), 6);
        assert!(!section.is_uniform());
    }

    #[test]
    fn uniform_sections() {
        let section = SectionIndices::uniform(3);
        assert!(section.is_uniform());
        assert_eq!(section.max_index(), 3);
        assert!(SectionIndices::default().iter().all(|&index| index == 0));
    }
}
