use std::{io::Write, num::NonZeroUsize};

use serde::{Serialize, Serializer};
use serde_json::Value;

use anvil_sections_mc_datatypes::{BlockPosInSection, BlockPosition, ChunkPosition, DataVersion};
use anvil_sections_packed_indices::{DecodeError, PackingMode, SectionIndices};

use crate::{
    document::{BlockState, ChunkDocument},
    errors::ChunkError,
    parallel::decode_sections_parallel,
};


// ================================
//  Options
// ================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionDecodeOptions {
    pub packing:        PackingSelection,
    pub failure_policy: FailurePolicy,
    /// The maximum number of threads used to decode the sections of one chunk.
    pub threads:        NonZeroUsize,
}

/// Which layout of packed indices to assume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackingSelection {
    /// Always use the given layout.
    Fixed(PackingMode),
    /// Use the layout of the version which saved the chunk, according to its `DataVersion`.
    /// If the chunk has no `DataVersion`, the post-1.16 layout is used.
    ByDataVersion,
}

/// What to do when a section's packed data is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Fail the whole chunk.
    Abort,
    /// Leave the section out of the decoded chunk, and record the failure.
    Skip,
}

impl Default for SectionDecodeOptions {
    #[inline]
    fn default() -> Self {
        Self {
            packing:        PackingSelection::ByDataVersion,
            failure_policy: FailurePolicy::Abort,
            threads:        NonZeroUsize::MIN,
        }
    }
}

impl PackingSelection {
    pub fn resolve(self, data_version: Option<DataVersion>) -> PackingMode {
        match self {
            Self::Fixed(mode) => mode,
            Self::ByDataVersion => match data_version {
                Some(version) if !version.has_aligned_packed_indices() => {
                    log::debug!("DataVersion {version} predates aligned packed indices");
                    PackingMode::Spanning
                }
                _ => PackingMode::Aligned,
            },
        }
    }
}

// ================================
//  Decoded chunks
// ================================

/// A chunk whose sections have been decoded.
///
/// Serializes to the same shape as a [`ChunkDocument`], except that each section has
/// `indices` (4096 palette indices in section order) instead of `data`, and failed sections
/// are listed under `failures`.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedChunk {
    #[serde(rename = "xPos")]
    pub x_pos:          i32,
    #[serde(rename = "zPos")]
    pub z_pos:          i32,
    #[serde(rename = "yPos")]
    pub y_pos:          i32,
    #[serde(rename = "DataVersion", skip_serializing_if = "Option::is_none")]
    pub data_version:   Option<DataVersion>,
    pub block_entities: Vec<Value>,
    pub sections:       Vec<DecodedSection>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures:       Vec<SectionFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedSection {
    #[serde(rename = "Y")]
    pub y:       i8,
    palette:     Vec<BlockState>,
    #[serde(serialize_with = "serialize_indices")]
    indices:     SectionIndices,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionFailure {
    #[serde(rename = "Y")]
    pub y:     i8,
    #[serde(serialize_with = "serialize_display")]
    pub error: DecodeError,
}

impl ChunkDocument {
    /// Decode every section of the chunk, consuming the document.
    ///
    /// With [`FailurePolicy::Abort`], the first invalid section (in document order)
    /// is returned as an error. With [`FailurePolicy::Skip`], invalid sections are logged
    /// and listed in [`DecodedChunk::failures`].
    pub fn decode(self, opts: SectionDecodeOptions) -> Result<DecodedChunk, ChunkError> {
        let mode = opts.packing.resolve(self.data_version);
        let results = decode_sections_parallel(&self.sections, mode, opts.threads);

        let mut sections = Vec::with_capacity(self.sections.len());
        let mut failures = Vec::new();

        for (section, result) in self.sections.into_iter().zip(results) {
            match result {
                Ok(indices) => sections.push(DecodedSection {
                    y:       section.y,
                    palette: section.palette,
                    indices,
                }),
                Err(error) => match opts.failure_policy {
                    FailurePolicy::Abort => {
                        return Err(ChunkError::Section {
                            section_y: section.y,
                            source:    error,
                        });
                    }
                    FailurePolicy::Skip => {
                        log::warn!(
                            "Skipping section {} of chunk ({}, {}): {error}",
                            section.y, self.x_pos, self.z_pos,
                        );
                        failures.push(SectionFailure {
                            y: section.y,
                            error,
                        });
                    }
                },
            }
        }

        Ok(DecodedChunk {
            x_pos:          self.x_pos,
            z_pos:          self.z_pos,
            y_pos:          self.y_pos,
            data_version:   self.data_version,
            block_entities: self.block_entities,
            sections,
            failures,
        })
    }
}

impl DecodedChunk {
    #[inline]
    pub fn position(&self) -> ChunkPosition {
        ChunkPosition {
            x: self.x_pos,
            z: self.z_pos,
        }
    }

    #[inline]
    pub fn section(&self, section_y: i8) -> Option<&DecodedSection> {
        self.sections.iter().find(|section| section.y == section_y)
    }

    /// The block at an absolute position, if it is in this chunk and its section was decoded.
    pub fn block_at(&self, pos: BlockPosition) -> Option<&BlockState> {
        if pos.x.div_euclid(16) != self.x_pos || pos.z.div_euclid(16) != self.z_pos {
            return None;
        }
        let section_y = i8::try_from(pos.y.div_euclid(16)).ok()?;
        let section = self.section(section_y)?;

        // `rem_euclid(16)` is in `0..16`.
        let pos_in_section = BlockPosInSection::new(
            pos.x.rem_euclid(16) as u8,
            pos.y.rem_euclid(16) as u8,
            pos.z.rem_euclid(16) as u8,
        )?;

        Some(section.block_at(pos_in_section))
    }

    pub fn write_json<W: Write>(&self, writer: W, pretty: bool) -> Result<(), ChunkError> {
        if pretty {
            serde_json::to_writer_pretty(writer, self)?;
        } else {
            serde_json::to_writer(writer, self)?;
        }
        Ok(())
    }
}

impl DecodedSection {
    /// Every index in `indices` must be less than `palette.len()`;
    /// returns `None` otherwise.
    pub fn new(y: i8, palette: Vec<BlockState>, indices: SectionIndices) -> Option<Self> {
        if usize::from(indices.max_index()) < palette.len() {
            Some(Self { y, palette, indices })
        } else {
            None
        }
    }

    #[inline]
    pub fn palette(&self) -> &[BlockState] {
        &self.palette
    }

    #[inline]
    pub fn indices(&self) -> &SectionIndices {
        &self.indices
    }

    #[inline]
    pub fn into_parts(self) -> (i8, Vec<BlockState>, SectionIndices) {
        (self.y, self.palette, self.indices)
    }

    #[inline]
    pub fn block_at(&self, pos: BlockPosInSection) -> &BlockState {
        // Every index was checked against the palette length when decoding.
        &self.palette[usize::from(self.indices[pos.raster_index()])]
    }

    /// Every block of the section together with its position, in section order.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockPosInSection, &BlockState)> {
        BlockPosInSection::all().map(|pos| (pos, self.block_at(pos)))
    }

    /// The number of blocks using each palette entry.
    pub fn block_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.palette.len()];
        for &index in &self.indices {
            counts[usize::from(index)] += 1;
        }
        counts
    }
}

// ================================
//  Serialization helpers
// ================================

fn serialize_indices<S: Serializer>(
    indices:    &SectionIndices,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(indices)
}

fn serialize_display<S: Serializer>(error: &DecodeError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}
