use crate::{
    bits_per_index::BitsPerIndex,
    errors::{DecodeError, EncodeError},
    packing_mode::PackingMode,
    section_indices::{SECTION_VOLUME, SectionIndices},
};


// ================================
//  Decoding
// ================================

/// Decode the packed data array of a section with the post-1.16 layout, in which
/// an index never crosses a word boundary. Equivalent to
/// `decode_with_mode(palette_len, words, PackingMode::Aligned)`.
#[inline]
pub fn decode(palette_len: usize, words: &[u64]) -> Result<SectionIndices, DecodeError> {
    decode_with_mode(palette_len, words, PackingMode::Aligned)
}

/// Decode the packed data array of a section into its 4096 palette indices.
///
/// A palette with a single entry has no packed data at all; every block then uses index `0`.
/// Otherwise, `words` must contain at least as many words as `mode` needs for 4096 indices of
/// `max(ceil(log2(palette_len)), 4)` bits. Surplus words, as well as unused fields and padding
/// bits at the end of the data, are ignored. Every decoded index is checked against
/// `palette_len`, and the first out-of-range index fails the whole section.
pub fn decode_with_mode(
    palette_len: usize,
    words:       &[u64],
    mode:        PackingMode,
) -> Result<SectionIndices, DecodeError> {
    if palette_len == 0 {
        return Err(DecodeError::InvalidPaletteSize);
    }
    let bits_per_index = BitsPerIndex::for_palette_len(palette_len)
        .ok_or(DecodeError::PaletteTooLarge { palette_len })?;

    if palette_len == 1 {
        return if words.is_empty() {
            Ok(SectionIndices::uniform(0))
        } else {
            Err(DecodeError::UnexpectedPackedData { num_words: words.len() })
        };
    }

    if words.is_empty() {
        return Err(DecodeError::MissingPackedData { palette_len });
    }

    let required = mode.words_for_section(bits_per_index);
    if words.len() < required {
        return Err(DecodeError::InsufficientWords {
            required,
            received: words.len(),
            bits_per_index,
            mode,
        });
    }
    if words.len() > required {
        log::debug!(
            "Ignoring {} surplus packed words after {required} words of {bits_per_index}-bit indices",
            words.len() - required,
        );
    }
    let words = &words[..required];

    let mut indices = Box::new([0_u16; SECTION_VOLUME]);
    match mode {
        PackingMode::Aligned  => unpack_aligned(words, bits_per_index, &mut indices),
        PackingMode::Spanning => unpack_spanning(words, bits_per_index, &mut indices),
    }

    if let Some((position, &index)) = indices
        .iter()
        .enumerate()
        .find(|&(_, &index)| usize::from(index) >= palette_len)
    {
        return Err(DecodeError::IndexOutOfRange {
            position,
            index,
            palette_len,
        });
    }

    Ok(SectionIndices::from_array(indices))
}

fn unpack_aligned(
    words:          &[u64],
    bits_per_index: BitsPerIndex,
    indices:        &mut [u16; SECTION_VOLUME],
) {
    let width = u32::from(bits_per_index.get());
    let index_mask = bits_per_index.index_mask();
    let indices_per_word = usize::from(bits_per_index.indices_per_word());

    // The final chunk of `indices` may be shorter than `indices_per_word`, in which case
    // the remaining fields of the final word are dropped.
    for (indices, &word) in indices.chunks_mut(indices_per_word).zip(words) {
        let mut word = word;
        for index in indices {
            // `index_mask` has at most 16 bits set, so this does not truncate.
            *index = (word & index_mask) as u16;
            word >>= width;
        }
    }
}

fn unpack_spanning(
    words:          &[u64],
    bits_per_index: BitsPerIndex,
    indices:        &mut [u16; SECTION_VOLUME],
) {
    let width = usize::from(bits_per_index.get());
    let index_mask = bits_per_index.index_mask();

    for (position, index) in indices.iter_mut().enumerate() {
        let bit_offset = position * width;
        let word_num = bit_offset / 64;
        let shift = bit_offset % 64;

        // `words` holds at least `4096 * width` bits, and this field ends at or before
        // bit `(position + 1) * width`, so neither index below is out of bounds.
        let mut value = words[word_num] >> shift;
        if shift + width > 64 {
            // The field continues into the low bits of the next word.
            value |= words[word_num + 1] << (64 - shift);
        }

        // `index_mask` has at most 16 bits set, so this does not truncate.
        *index = (value & index_mask) as u16;
    }
}

// ================================
//  Encoding
// ================================

/// Pack the indices of a section with the post-1.16 layout. Equivalent to
/// `encode_with_mode(indices, palette_len, PackingMode::Aligned)`.
#[inline]
pub fn encode(indices: &SectionIndices, palette_len: usize) -> Result<Vec<u64>, EncodeError> {
    encode_with_mode(indices, palette_len, PackingMode::Aligned)
}

/// Pack the indices of a section into 64-bit words; the exact inverse of [`decode_with_mode`].
///
/// Padding bits, and any unused fields of the final word, are zeroes. A palette with a single
/// entry produces no words at all.
pub fn encode_with_mode(
    indices:     &SectionIndices,
    palette_len: usize,
    mode:        PackingMode,
) -> Result<Vec<u64>, EncodeError> {
    if palette_len == 0 {
        return Err(EncodeError::InvalidPaletteSize);
    }
    let bits_per_index = BitsPerIndex::for_palette_len(palette_len)
        .ok_or(EncodeError::PaletteTooLarge { palette_len })?;

    if let Some((position, &index)) = indices
        .iter()
        .enumerate()
        .find(|&(_, &index)| usize::from(index) >= palette_len)
    {
        return Err(EncodeError::IndexOutOfRange {
            position,
            index,
            palette_len,
        });
    }

    if palette_len == 1 {
        return Ok(Vec::new());
    }

    let mut words = vec![0; mode.words_for_section(bits_per_index)];
    match mode {
        PackingMode::Aligned  => pack_aligned(indices, bits_per_index, &mut words),
        PackingMode::Spanning => pack_spanning(indices, bits_per_index, &mut words),
    }

    Ok(words)
}

/// The number of words in the packed data array of a section whose palette has
/// length `palette_len`; `0` for a single-entry palette. Returns `None` if
/// the palette length is not supported.
pub fn expected_word_count(palette_len: usize, mode: PackingMode) -> Option<usize> {
    let bits_per_index = BitsPerIndex::for_palette_len(palette_len)?;
    if palette_len == 1 {
        Some(0)
    } else {
        Some(mode.words_for_section(bits_per_index))
    }
}

fn pack_aligned(indices: &SectionIndices, bits_per_index: BitsPerIndex, words: &mut [u64]) {
    let width = usize::from(bits_per_index.get());
    let indices_per_word = usize::from(bits_per_index.indices_per_word());

    for (word, indices) in words.iter_mut().zip(indices.as_slice().chunks(indices_per_word)) {
        for (field, &index) in indices.iter().enumerate() {
            *word |= u64::from(index) << (field * width);
        }
    }
}

fn pack_spanning(indices: &SectionIndices, bits_per_index: BitsPerIndex, words: &mut [u64]) {
    let width = usize::from(bits_per_index.get());

    for (position, &index) in indices.iter().enumerate() {
        let bit_offset = position * width;
        let word_num = bit_offset / 64;
        let shift = bit_offset % 64;
        let value = u64::from(index);

        words[word_num] |= value << shift;
        if shift + width > 64 {
            words[word_num + 1] |= value >> (64 - shift);
        }
    }
}


#[cfg(test)]
mod tests {
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    use crate::{
        BitsPerIndex, DecodeError, EncodeError, PackingMode, SECTION_VOLUME, SectionIndices,
    };
    use super::{decode, decode_with_mode, encode, encode_with_mode, expected_word_count};


    /// A palette length between 1 and 5000, and indices which are valid for that palette.
    #[derive(Debug, Clone)]
    struct PalettizedSection {
        palette_len: usize,
        indices:     SectionIndices,
    }

    impl Arbitrary for PalettizedSection {
        fn arbitrary(g: &mut Gen) -> Self {
            let palette_len = usize::arbitrary(g) % 5000 + 1;
            // Tends to produce sections which mostly use the first few palette entries,
            // as well as sections spread over the whole palette.
            let spread = if bool::arbitrary(g) { palette_len } else { palette_len.min(3) };

            let indices: Vec<u16> = (0..SECTION_VOLUME)
                .map(|_| (usize::from(u16::arbitrary(g)) % spread) as u16)
                .collect();

            Self {
                palette_len,
                indices: SectionIndices::from_slice(&indices).unwrap(),
            }
        }
    }

    /// Indices `0, 1, 2, ...`, wrapping around at the palette length.
    fn counting_indices(palette_len: usize) -> SectionIndices {
        let indices: Vec<u16> = (0..SECTION_VOLUME)
            .map(|position| (position % palette_len) as u16)
            .collect();
        SectionIndices::from_slice(&indices).unwrap()
    }

    /// Pack `fields` into one word, `width` bits each, least-significant field first.
    fn pack_word(fields: &[u64], width: usize) -> u64 {
        fields
            .iter()
            .enumerate()
            .fold(0, |word, (field, &value)| word | (value << (field * width)))
    }

    #[quickcheck]
    fn aligned_roundtrip(section: PalettizedSection) -> bool {
        let words = encode(&section.indices, section.palette_len).unwrap();
        decode(section.palette_len, &words) == Ok(section.indices)
    }

    #[quickcheck]
    fn spanning_roundtrip(section: PalettizedSection) -> bool {
        let mode = PackingMode::Spanning;
        let words = encode_with_mode(&section.indices, section.palette_len, mode).unwrap();
        decode_with_mode(section.palette_len, &words, mode) == Ok(section.indices)
    }

    #[test]
    fn roundtrip_at_width_boundaries() {
        for palette_len in [2, 16, 17, 32, 33, 64, 65, 256, 257, 4096, 5000, 65536] {
            let indices = counting_indices(palette_len.min(SECTION_VOLUME));
            for mode in [PackingMode::Aligned, PackingMode::Spanning] {
                let words = encode_with_mode(&indices, palette_len, mode).unwrap();
                assert_eq!(Some(words.len()), expected_word_count(palette_len, mode));
                assert_eq!(
                    decode_with_mode(palette_len, &words, mode).as_ref(),
                    Ok(&indices),
                    "palette length {palette_len}, {mode} packing",
                );
            }
        }
    }

    #[test]
    fn single_entry_palette_has_no_data() {
        let indices = decode(1, &[]).unwrap();
        assert_eq!(indices, SectionIndices::uniform(0));

        assert_eq!(encode(&indices, 1), Ok(Vec::new()));
        assert_eq!(expected_word_count(1, PackingMode::Aligned), Some(0));

        assert_eq!(
            decode(1, &[0; 256]),
            Err(DecodeError::UnexpectedPackedData { num_words: 256 }),
        );
        assert_eq!(
            decode_with_mode(1, &[0], PackingMode::Spanning),
            Err(DecodeError::UnexpectedPackedData { num_words: 1 }),
        );
    }

    #[test]
    fn invalid_palette_sizes() {
        assert_eq!(decode(0, &[]), Err(DecodeError::InvalidPaletteSize));
        assert_eq!(decode(0, &[0; 256]), Err(DecodeError::InvalidPaletteSize));
        assert_eq!(
            decode(BitsPerIndex::MAX_PALETTE_LEN + 1, &[0; 2048]),
            Err(DecodeError::PaletteTooLarge { palette_len: BitsPerIndex::MAX_PALETTE_LEN + 1 }),
        );

        let indices = SectionIndices::default();
        assert_eq!(encode(&indices, 0), Err(EncodeError::InvalidPaletteSize));
        assert_eq!(
            encode(&indices, 70_000),
            Err(EncodeError::PaletteTooLarge { palette_len: 70_000 }),
        );
        assert_eq!(expected_word_count(0, PackingMode::Aligned), None);
    }

    #[test]
    fn missing_data() {
        assert_eq!(decode(2, &[]), Err(DecodeError::MissingPackedData { palette_len: 2 }));
        assert_eq!(decode(300, &[]), Err(DecodeError::MissingPackedData { palette_len: 300 }));
    }

    #[test]
    fn fields_are_read_from_the_low_bits() {
        // Four bits per index, sixteen indices per word.
        let first_word = pack_word(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 0], 4);
        assert_eq!(first_word, 0x0FED_CBA9_8765_4321);

        let mut words = vec![0; 256];
        words[0] = first_word;

        let indices = decode(16, &words).unwrap();
        let expected: Vec<u16> = (1..16).chain([0]).collect();
        assert_eq!(&indices.as_slice()[..16], expected.as_slice());
        assert!(indices.as_slice()[16..].iter().all(|&index| index == 0));
    }

    #[test]
    fn five_bit_fields_never_cross_words() {
        // 20 entries: 5 bits per index, 12 indices per word, 4 padding bits per word.
        let palette_len = 20;
        let mut words: Vec<u64> = (0..342_u64)
            .map(|word_num| {
                let fields: Vec<u64> = (0..12).map(|field| (word_num * 12 + field) % 20).collect();
                // Set the padding bits, which must be ignored.
                pack_word(&fields, 5) | (0b1111 << 60)
            })
            .collect();

        // 341 * 12 == 4092, so only 4 fields of the last word are used.
        // The other 8 are dropped, even though they are out of range.
        let last_fields = [0, 1, 2, 3, 31, 31, 31, 31, 31, 31, 31, 31];
        words[341] = pack_word(&last_fields, 5);

        let indices = decode(palette_len, &words).unwrap();
        assert_eq!(indices.as_slice().len(), SECTION_VOLUME);
        for (position, &index) in indices.iter().enumerate().take(4092) {
            assert_eq!(usize::from(index), position % 20, "position {position}");
        }
        assert_eq!(&indices.as_slice()[4092..], &[0, 1, 2, 3]);
    }

    #[test]
    fn out_of_range_index() {
        let mut words = vec![0; 342];
        // Field 3 of word 10 is the index at position 123.
        words[10] = 20 << 15;

        assert_eq!(
            decode(20, &words),
            Err(DecodeError::IndexOutOfRange { position: 123, index: 20, palette_len: 20 }),
        );

        words[10] = 19 << 15;
        assert_eq!(decode(20, &words).unwrap()[123], 19);

        let mut indices = vec![0; SECTION_VOLUME];
        indices[4095] = 5;
        let indices = SectionIndices::from_slice(&indices).unwrap();
        assert_eq!(
            encode(&indices, 5),
            Err(EncodeError::IndexOutOfRange { position: 4095, index: 5, palette_len: 5 }),
        );
    }

    #[test]
    fn insufficient_words() {
        let bits_per_index = BitsPerIndex::new(5).unwrap();

        assert_eq!(
            decode(20, &[0; 300]),
            Err(DecodeError::InsufficientWords {
                required: 342,
                received: 300,
                bits_per_index,
                mode:     PackingMode::Aligned,
            }),
        );
        // One word short.
        assert!(matches!(
            decode(20, &[0; 341]),
            Err(DecodeError::InsufficientWords { required: 342, received: 341, .. }),
        ));
        // Enough for the older layout, but not for the newer one.
        assert!(decode_with_mode(20, &[0; 320], PackingMode::Spanning).is_ok());
        assert!(decode(20, &[0; 320]).is_err());
    }

    #[test]
    fn surplus_words_are_ignored() {
        let indices = counting_indices(20);
        let mut words = encode(&indices, 20).unwrap();
        words.extend([u64::MAX; 8]);

        assert_eq!(decode(20, &words), Ok(indices));
    }

    #[test]
    fn spanning_field_straddles_words() {
        // 5 bits per index: the index at position 12 occupies bits 60..65,
        // i.e. the top four bits of word 0 and the lowest bit of word 1.
        let mut indices = vec![0; SECTION_VOLUME];
        indices[12] = 0b1_0111;
        let indices = SectionIndices::from_slice(&indices).unwrap();

        let words = encode_with_mode(&indices, 32, PackingMode::Spanning).unwrap();
        assert_eq!(words.len(), 320);
        assert_eq!(words[0] >> 60, 0b0111);
        assert_eq!(words[1] & 1, 1);

        assert_eq!(decode_with_mode(32, &words, PackingMode::Spanning), Ok(indices.clone()));
        // Too short for the newer layout, which is not tried as a fallback.
        assert_ne!(decode_with_mode(32, &words, PackingMode::Aligned).ok(), Some(indices));
    }

    #[test]
    fn aligned_is_used_unless_requested() {
        let indices = counting_indices(33);
        let words = encode(&indices, 33).unwrap();

        assert_eq!(words, encode_with_mode(&indices, 33, PackingMode::Aligned).unwrap());
        assert_eq!(decode(33, &words), decode_with_mode(33, &words, PackingMode::Aligned));
    }

    #[test]
    fn unused_high_bits_are_zero() {
        let indices = SectionIndices::uniform(19);
        let words = encode(&indices, 20).unwrap();

        assert_eq!(words.len(), 342);
        for &word in &words[..341] {
            assert_eq!(word >> 60, 0);
        }
        // Only four fields of the last word are used.
        assert_eq!(words[341] >> 20, 0);
    }

    #[test]
    fn decoding_is_pure() {
        let indices = counting_indices(100);
        let words = encode(&indices, 100).unwrap();

        let first = decode(100, &words);
        let second = decode(100, &words);
        assert_eq!(first, second);
        assert_eq!(first, Ok(indices));
    }
}
