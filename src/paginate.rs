// src/paginate.rs

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Paging information derived for one page of a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagingMetadata {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub page_size: usize,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// `ceil(total / page_size)`; zero when there is nothing to page.
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

pub fn validate_paging(page: usize, page_size: usize) -> Result<()> {
    if page == 0 {
        return Err(Error::validation("page", "Page numbers start at 1"));
    }
    if page_size == 0 {
        return Err(Error::validation("pageSize", "Page size must be at least 1"));
    }
    Ok(())
}

/// Slices one 1-indexed page out of `items`.
///
/// A page past the end yields an empty slice, not an error.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Result<(&[T], PagingMetadata)> {
    validate_paging(page, page_size)?;

    let total_count = items.len();
    let total_pages = page_count(total_count, page_size);
    let start = (page - 1).saturating_mul(page_size).min(total_count);
    let end = start.saturating_add(page_size).min(total_count);

    let metadata = PagingMetadata {
        current_page: page,
        total_pages,
        total_count,
        page_size,
        has_next_page: page < total_pages,
        has_previous_page: page > 1,
    };

    Ok((&items[start..end], metadata))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_partial_page() {
        let items = [1, 2, 3, 4, 5];
        let (page, meta) = paginate(&items, 3, 2).unwrap();
        assert_eq!(page, &[5]);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(meta.total_count, 5);
        assert!(!meta.has_next_page);
        assert!(meta.has_previous_page);
    }

    #[test]
    fn test_first_page() {
        let items = [1, 2, 3, 4, 5];
        let (page, meta) = paginate(&items, 1, 2).unwrap();
        assert_eq!(page, &[1, 2]);
        assert!(meta.has_next_page);
        assert!(!meta.has_previous_page);
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let items = [1, 2, 3];
        let (page, meta) = paginate(&items, 9, 2).unwrap();
        assert!(page.is_empty());
        assert_eq!(meta.total_pages, 2);
        assert!(!meta.has_next_page);
        assert!(meta.has_previous_page);

        let (page, _) = paginate(&items, usize::MAX, usize::MAX).unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn test_empty_input_has_zero_pages() {
        let items: [u8; 0] = [];
        let (page, meta) = paginate(&items, 1, 10).unwrap();
        assert!(page.is_empty());
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next_page);
        assert!(!meta.has_previous_page);
    }

    #[test]
    fn test_invalid_paging_is_rejected() {
        let items = [1];
        assert_eq!(paginate(&items, 0, 1).unwrap_err().field(), Some("page"));
        assert_eq!(paginate(&items, 1, 0).unwrap_err().field(), Some("pageSize"));
    }

    #[test]
    fn test_pages_partition_the_input() {
        for n in 0..40usize {
            let items: Vec<usize> = (0..n).collect();
            for page_size in 1..9usize {
                let pages = page_count(n, page_size);
                assert_eq!(pages, (n + page_size - 1) / page_size);

                let mut seen = Vec::new();
                for page in 1..=pages {
                    let (slice, _) = paginate(&items, page, page_size).unwrap();
                    assert!(!slice.is_empty());
                    seen.extend_from_slice(slice);
                }
                assert_eq!(seen, items);
            }
        }
    }
}
