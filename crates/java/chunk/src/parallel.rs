use std::{num::NonZeroUsize, panic};

use anvil_sections_packed_indices::{DecodeError, PackingMode, SectionIndices};

use crate::document::SectionDocument;


/// Decode the packed data of many sections, spread over at most `threads` threads.
///
/// Sections are independent of each other, so this is plain data parallelism;
/// the results are in the same order as `sections`. With one thread (or one section),
/// everything is decoded on the calling thread.
pub fn decode_sections_parallel(
    sections: &[SectionDocument],
    mode:     PackingMode,
    threads:  NonZeroUsize,
) -> Vec<Result<SectionIndices, DecodeError>> {
    if threads.get() == 1 || sections.len() <= 1 {
        return sections
            .iter()
            .map(|section| section.decode_indices(mode))
            .collect();
    }

    let sections_per_thread = sections.len().div_ceil(threads.get());

    let scope_result = crossbeam::thread::scope(|scope| {
        let handles: Vec<_> = sections
            .chunks(sections_per_thread)
            .map(|sections| {
                scope.spawn(move |_| {
                    sections
                        .iter()
                        .map(|section| section.decode_indices(mode))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut results = Vec::with_capacity(sections.len());
        for handle in handles {
            match handle.join() {
                Ok(decoded) => results.extend(decoded),
                Err(payload) => panic::resume_unwind(payload),
            }
        }
        results
    });

    match scope_result {
        Ok(results) => results,
        Err(payload) => panic::resume_unwind(payload),
    }
}


#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use anvil_sections_packed_indices::{DecodeError, PackingMode, SectionIndices};

    use crate::document::{BlockState, SectionDocument};
    use super::decode_sections_parallel;


    fn section(y: i8, palette_len: usize) -> SectionDocument {
        let mut section = SectionDocument {
            y,
            palette: (0..palette_len).map(|n| BlockState::new(format!("block_{n}"))).collect(),
            data:    None,
        };

        let indices: Vec<u16> = (0..4096_usize)
            .map(|position| ((position * 7 + usize::from(y.unsigned_abs())) % palette_len) as u16)
            .collect();
        let indices = SectionIndices::from_slice(&indices).unwrap();
        section.set_indices(&indices, PackingMode::Aligned).unwrap();
        section
    }

    #[test]
    fn parallel_matches_sequential() {
        let mut sections: Vec<SectionDocument> = (-4..20)
            .map(|y| section(y, usize::from(y.unsigned_abs()) * 13 + 1))
            .collect();
        // A broken section in the middle does not affect the others.
        sections[9].data = Some(vec![0; 3]);

        let sequential = decode_sections_parallel(
            &sections,
            PackingMode::Aligned,
            NonZeroUsize::MIN,
        );
        for threads in [2, 3, 8, 64] {
            let parallel = decode_sections_parallel(
                &sections,
                PackingMode::Aligned,
                NonZeroUsize::new(threads).unwrap(),
            );
            assert_eq!(parallel, sequential, "{threads} threads");
        }

        assert_eq!(sequential.len(), sections.len());
        assert!(matches!(sequential[9], Err(DecodeError::InsufficientWords { .. })));
        assert_eq!(sequential.iter().filter(|result| result.is_err()).count(), 1);
    }

    #[test]
    fn no_sections() {
        let decoded = decode_sections_parallel(
            &[],
            PackingMode::Aligned,
            NonZeroUsize::new(4).unwrap(),
        );
        assert!(decoded.is_empty());
    }
}
