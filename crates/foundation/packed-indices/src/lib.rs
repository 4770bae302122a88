//! Packed palette indices of Java Edition chunk sections.
//!
//! Each section of a chunk stores its blocks as a palette of block states together with
//! 4096 indices into that palette, packed into an array of 64-bit words
//! (the `block_states.data` long array). This crate turns that word array back into
//! the indices, and can pack indices into words again.
//!
//! Since 1.16 (snapshot 20w17a), an index never crosses the boundary between two words;
//! the unused high bits of each word are padding. That is [`PackingMode::Aligned`], and
//! is what [`decode`] and [`encode`] use. The older layout, where an index may continue
//! into the low bits of the next word, is available as [`PackingMode::Spanning`], but only
//! when asked for explicitly.

mod bits_per_index;
mod codec;
mod errors;
mod packing_mode;
mod section_indices;


pub use self::{
    bits_per_index::BitsPerIndex,
    codec::{decode, decode_with_mode, encode, encode_with_mode, expected_word_count},
    errors::{DecodeError, EncodeError},
    packing_mode::PackingMode,
    section_indices::{SECTION_VOLUME, SectionIndices},
};
