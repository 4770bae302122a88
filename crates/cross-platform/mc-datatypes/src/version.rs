use std::fmt::{self, Display, Formatter};

#[cfg(feature = "derive_serde")]
use serde::{Deserialize, Serialize};


/// The `DataVersion` number that Java Edition stores in chunks (and elsewhere),
/// identifying the exact version, including snapshots, which last saved the data.
/// It is an NBT `Int`, and therefore signed.
#[cfg_attr(feature = "derive_serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "derive_serde", serde(transparent))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DataVersion(pub i32);

impl DataVersion {
    /// Snapshot 20w17a, the first version in which a packed palette index
    /// never spans two 64-bit words.
    pub const ALIGNED_PACKED_INDICES: Self = Self(2529);
    /// Release 1.16.
    pub const V1_16: Self = Self(2566);
    /// Release 1.18, which moved block states into a `block_states` compound
    /// and lowered the bottom of the overworld to section `-4`.
    pub const V1_18: Self = Self(2860);

    /// Whether packed palette indices saved by this version are aligned to word boundaries.
    #[inline]
    pub fn has_aligned_packed_indices(self) -> bool {
        self >= Self::ALIGNED_PACKED_INDICES
    }
}

impl From<i32> for DataVersion {
    #[inline]
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl Display for DataVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
