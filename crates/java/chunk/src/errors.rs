use std::io::Error as IoError;

use serde_json::Error as JsonError;
use thiserror::Error;

use anvil_sections_packed_indices::DecodeError;


#[derive(Error, Debug)]
pub enum ChunkError {
    #[error("invalid chunk JSON: {0}")]
    Json(#[from] JsonError),
    #[error("an IO error occurred while reading or writing a chunk: {0}")]
    Io(#[from] IoError),
    #[error("section {section_y} could not be decoded: {source}")]
    Section {
        section_y: i8,
        #[source]
        source:    DecodeError,
    },
}
