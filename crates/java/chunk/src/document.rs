use std::{fs::File, io::{BufReader, Read}, path::Path};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use anvil_sections_mc_datatypes::{
    ChunkPosition, DataVersion,
    IdentifierParseError, IdentifierParseOptions, NamespacedIdentifier,
};
use anvil_sections_packed_indices::{DecodeError, EncodeError, PackingMode, SectionIndices};

use crate::errors::ChunkError;


// ================================
//  Structs
// ================================

/// The parts of a chunk's NBT which are needed to find the blocks of each section.
///
/// Field names follow the chunk NBT format (1.18 and later).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkDocument {
    #[serde(rename = "xPos")]
    pub x_pos:          i32,
    #[serde(rename = "zPos")]
    pub z_pos:          i32,
    /// The lowest section Y position in the chunk, e.g. `-4` in the overworld.
    #[serde(rename = "yPos")]
    pub y_pos:          i32,
    #[serde(rename = "DataVersion", default, skip_serializing_if = "Option::is_none")]
    pub data_version:   Option<DataVersion>,
    /// Block entities are not interpreted, only carried along.
    #[serde(default)]
    pub block_entities: Vec<Value>,
    pub sections:       Vec<SectionDocument>,
}

/// One 16x16x16 section of a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDocument {
    #[serde(rename = "Y")]
    pub y:       i8,
    pub palette: Vec<BlockState>,
    /// The packed palette indices, as unsigned words.
    ///
    /// NBT long arrays are signed, but extraction tools differ in whether they write each
    /// word as an `i64` or as a `u64`; both are accepted, keeping the same 64 bits.
    /// Words are written back out as `i64`s.
    ///
    /// Absent if and only if the palette has a single entry.
    #[serde(
        default,
        deserialize_with = "long_array::deserialize",
        serialize_with = "long_array::serialize",
        skip_serializing_if = "Option::is_none",
    )]
    pub data:    Option<Vec<u64>>,
}

/// An entry of a section's palette. Only its position in the palette matters for decoding;
/// the name and properties are passed along unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockState {
    #[serde(rename = "Name")]
    pub name:       String,
    #[serde(rename = "Properties", default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, String>,
}

// ================================
//  Impls
// ================================

impl ChunkDocument {
    #[inline]
    pub fn from_json_str(json: &str) -> Result<Self, ChunkError> {
        Ok(serde_json::from_str(json)?)
    }

    #[inline]
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ChunkError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ChunkError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    #[inline]
    pub fn position(&self) -> ChunkPosition {
        ChunkPosition {
            x: self.x_pos,
            z: self.z_pos,
        }
    }

    #[inline]
    pub fn section(&self, section_y: i8) -> Option<&SectionDocument> {
        self.sections.iter().find(|section| section.y == section_y)
    }
}

impl SectionDocument {
    /// The packed words of `data`, or an empty slice if `data` is absent.
    #[inline]
    pub fn packed_words(&self) -> &[u64] {
        self.data.as_deref().unwrap_or_default()
    }

    /// Decode this section's packed data into 4096 indices into `self.palette`.
    #[inline]
    pub fn decode_indices(&self, mode: PackingMode) -> Result<SectionIndices, DecodeError> {
        SectionIndices::decode_with_mode(self.palette.len(), self.packed_words(), mode)
    }

    /// Replace this section's packed data with the given indices, packed with `mode`.
    /// If the palette has a single entry, `data` becomes absent.
    pub fn set_indices(
        &mut self,
        indices: &SectionIndices,
        mode:    PackingMode,
    ) -> Result<(), EncodeError> {
        let words = indices.encode_with_mode(self.palette.len(), mode)?;

        self.data = if words.is_empty() { None } else { Some(words) };

        Ok(())
    }
}

impl BlockState {
    #[inline]
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name:       name.into(),
            properties: IndexMap::new(),
        }
    }

    #[inline]
    pub fn with_property<K, V>(mut self, name: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Parse the block's name as Java Edition does, assuming the `minecraft` namespace
    /// if none is given.
    #[inline]
    pub fn identifier(&self) -> Result<NamespacedIdentifier, IdentifierParseError> {
        NamespacedIdentifier::parse(&self.name, IdentifierParseOptions::JAVA_BLOCK_NAME)
    }
}

// ================================
//  Long arrays
// ================================

/// Serde adapters for NBT long arrays, whose words may be written signed or unsigned.
mod long_array {
    use std::fmt::{self, Formatter};

    use serde::{Deserialize, Deserializer, Serializer};
    use serde::de::{Error, Visitor};


    /// One word, written either as an `i64` or a `u64`.
    struct Word(u64);

    struct WordVisitor;

    impl Visitor<'_> for WordVisitor {
        type Value = Word;

        fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
            write!(f, "a signed or unsigned 64-bit integer")
        }

        fn visit_i64<E: Error>(self, value: i64) -> Result<Word, E> {
            // Same bits, no sign extension.
            Ok(Word(value as u64))
        }

        fn visit_u64<E: Error>(self, value: u64) -> Result<Word, E> {
            Ok(Word(value))
        }
    }

    impl<'de> Deserialize<'de> for Word {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_i64(WordVisitor)
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u64>>, D::Error> {
        let words: Option<Vec<Word>> = Option::deserialize(deserializer)?;
        Ok(words.map(|words| words.into_iter().map(|Word(word)| word).collect()))
    }

    pub(super) fn serialize<S: Serializer>(
        words:      &Option<Vec<u64>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match words {
            // Same bits, as NBT long arrays are signed.
            Some(words) => serializer.collect_seq(words.iter().map(|&word| word as i64)),
            None        => serializer.serialize_none(),
        }
    }
}
