//! Java Edition chunks, as JSON documents holding the NBT fields needed to locate
//! each section's block palette and packed block-state data.
//!
//! Reading the region file and the NBT itself happens elsewhere; this crate takes
//! the resulting [`ChunkDocument`], decodes each section's packed indices with
//! [`anvil_sections_packed_indices`], and produces a [`DecodedChunk`] in which every
//! block can be looked up in its section's palette.

mod decode;
mod document;
mod errors;
mod parallel;


pub use self::{
    decode::{
        DecodedChunk, DecodedSection, FailurePolicy, PackingSelection,
        SectionDecodeOptions, SectionFailure,
    },
    document::{BlockState, ChunkDocument, SectionDocument},
    errors::ChunkError,
    parallel::decode_sections_parallel,
};
