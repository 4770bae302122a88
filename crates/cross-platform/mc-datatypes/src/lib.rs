//! Small datatypes shared by anything that reads Java Edition chunk data:
//! chunk and block positions, the block order within a section, namespaced identifiers,
//! and data versions.

pub mod identifier;
pub mod positions;
pub mod version;


pub use self::{
    identifier::{IdentifierParseError, IdentifierParseOptions, NamespacedIdentifier},
    positions::{BlockPosInSection, BlockPosition, ChunkPosition, InvalidRasterIndex},
    version::DataVersion,
};
