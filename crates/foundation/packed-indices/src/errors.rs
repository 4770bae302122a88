use thiserror::Error;

use crate::{bits_per_index::BitsPerIndex, packing_mode::PackingMode};


#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("a section palette cannot be empty")]
    InvalidPaletteSize,
    #[error("a section palette had length {palette_len}, which needs more than 16 bits per index")]
    PaletteTooLarge {
        palette_len: usize,
    },
    #[error("a section palette had length {palette_len}, but no packed data was present")]
    MissingPackedData {
        palette_len: usize,
    },
    #[error("a section palette had a single entry, but {num_words} packed words were present")]
    UnexpectedPackedData {
        num_words: usize,
    },
    #[error(
        "packed data needs {required} words for 4096 indices of {bits_per_index} bits \
         with {mode} packing, but had {received}"
    )]
    InsufficientWords {
        required:       usize,
        received:       usize,
        bits_per_index: BitsPerIndex,
        mode:           PackingMode,
    },
    #[error("packed data had index {index} at position {position}, but the palette had length {palette_len}")]
    IndexOutOfRange {
        position:    usize,
        index:       u16,
        palette_len: usize,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("a section palette cannot be empty")]
    InvalidPaletteSize,
    #[error("a section palette had length {palette_len}, which needs more than 16 bits per index")]
    PaletteTooLarge {
        palette_len: usize,
    },
    #[error("index {index} at position {position} is out of range for a palette of length {palette_len}")]
    IndexOutOfRange {
        position:    usize,
        index:       u16,
        palette_len: usize,
    },
}
