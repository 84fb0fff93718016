/// Split a recipient list into fixed-size contiguous chunks
///
/// Deterministic: chunks preserve list order, every chunk has exactly
/// `chunk_size` entries except possibly the last. `chunk_size` is
/// validated once at service construction, not here.
pub fn split_into_chunks<T>(items: &[T], chunk_size: usize) -> Vec<&[T]> {
    items.chunks(chunk_size).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_count_is_ceiling_division() {
        for (n, chunk_size, expected) in
            [(250, 100, 3), (100, 100, 1), (99, 100, 1), (101, 100, 2), (1, 1, 1)]
        {
            let items: Vec<u32> = (0..n).collect();
            let chunks = split_into_chunks(&items, chunk_size);
            assert_eq!(chunks.len(), expected, "n={} chunk_size={}", n, chunk_size);
        }
    }

    #[test]
    fn test_all_chunks_full_except_last() {
        let items: Vec<u32> = (0..250).collect();
        let chunks = split_into_chunks(&items, 100);

        assert_eq!(chunks[0].len(), 100);
        assert_eq!(chunks[1].len(), 100);
        assert_eq!(chunks[2].len(), 50);
    }

    #[test]
    fn test_concatenation_preserves_order() {
        let items: Vec<u32> = (0..237).collect();
        let chunks = split_into_chunks(&items, 25);

        let rejoined: Vec<u32> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
        assert_eq!(rejoined, items);
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let items: Vec<u32> = Vec::new();
        assert!(split_into_chunks(&items, 100).is_empty());
    }
}
