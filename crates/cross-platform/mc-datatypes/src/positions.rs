#[cfg(feature = "derive_serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;


/// The number of blocks along each side of a section.
const SECTION_SIDE: u8 = 16;
/// The number of blocks in a section.
const SECTION_VOLUME: u16 = 4096;

/// The location of a chunk in a dimension of a world.
///
/// Note that this is not the block position;
/// multiply this position by 16 to find the positions of its blocks. For example
/// `ChunkPosition { x: 1, z: 2 }` refers to the chunk from `(16, 32)` to `(31, 47)`.
#[cfg_attr(feature = "derive_serde",    derive(Serialize, Deserialize))]
#[cfg_attr(feature = "derive_standard", derive(PartialEq, Eq, PartialOrd, Ord, Hash))]
#[derive(Debug, Clone, Copy)]
pub struct ChunkPosition {
    pub x: i32,
    pub z: i32,
}

#[cfg_attr(feature = "derive_serde",    derive(Serialize, Deserialize))]
#[cfg_attr(feature = "derive_standard", derive(PartialEq, Eq, PartialOrd, Ord, Hash))]
#[derive(Debug, Clone, Copy)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// An X-Y-Z position within a section. Each coordinate is limited to 4 bits.
///
/// Internally, this is the position's index in the order used by a section's packed
/// block-state data: X increments first, then Z, then Y. That is,
/// the index is `(y << 8) | (z << 4) | x`.
///
/// When deserialized, the raster index is checked like [`BlockPosInSection::from_raster_index`].
#[cfg_attr(feature = "derive_serde",    derive(Serialize, Deserialize))]
#[cfg_attr(feature = "derive_serde",    serde(try_from = "u16", into = "u16"))]
#[cfg_attr(feature = "derive_standard", derive(PartialEq, Eq, PartialOrd, Ord, Hash))]
#[derive(Debug, Clone, Copy)]
pub struct BlockPosInSection(u16);

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("raster index {0} is outside of a section, which has 4096 blocks")]
pub struct InvalidRasterIndex(pub u16);

impl TryFrom<u16> for BlockPosInSection {
    type Error = InvalidRasterIndex;

    #[inline]
    fn try_from(index: u16) -> Result<Self, Self::Error> {
        if index < SECTION_VOLUME {
            Ok(Self(index))
        } else {
            Err(InvalidRasterIndex(index))
        }
    }
}

impl From<BlockPosInSection> for u16 {
    #[inline]
    fn from(pos: BlockPosInSection) -> Self {
        pos.0
    }
}

impl BlockPosInSection {
    #[inline]
    pub fn new(x: u8, y: u8, z: u8) -> Option<Self> {
        if x < SECTION_SIDE && y < SECTION_SIDE && z < SECTION_SIDE {
            Some(Self(u16::from(y) << 8 | u16::from(z) << 4 | u16::from(x)))
        } else {
            None
        }
    }

    /// Returns `None` if `index` is not less than 4096.
    #[inline]
    pub fn from_raster_index(index: usize) -> Option<Self> {
        let index = u16::try_from(index).ok()?;
        Self::try_from(index).ok()
    }

    /// The index of this position in a section's block-state data.
    #[inline]
    pub fn raster_index(self) -> usize {
        usize::from(self.0)
    }

    #[inline]
    pub fn x(self) -> u8 {
        (self.0 & 0b1111) as u8
    }

    #[inline]
    pub fn y(self) -> u8 {
        // The `& 0b1111` isn't actually needed, but it should more firmly assert to the compiler
        // that this is actually four bits, for length-check optimization purposes and whatnot.
        ((self.0 >> 8) & 0b1111) as u8
    }

    #[inline]
    pub fn z(self) -> u8 {
        ((self.0 >> 4) & 0b1111) as u8
    }

    #[inline]
    pub fn xyz(self) -> (u8, u8, u8) {
        (self.x(), self.y(), self.z())
    }

    /// Every position in a section, in raster order.
    #[inline]
    pub fn all() -> impl Iterator<Item = Self> {
        (0..SECTION_VOLUME).map(Self)
    }

    /// The absolute position of this block, given the chunk and the Y coordinate
    /// of the section (in sections, not blocks) containing it.
    #[inline]
    pub fn to_block_position(self, chunk: ChunkPosition, section_y: i32) -> BlockPosition {
        BlockPosition {
            x: chunk.x * 16 + i32::from(self.x()),
            y: section_y * 16 + i32::from(self.y()),
            z: chunk.z * 16 + i32::from(self.z()),
        }
    }
}
