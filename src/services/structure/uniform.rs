// Uniform Splitter
// Divides [1, total_pages] into a bounded number of contiguous, near-equal
// page ranges. Cannot fail for a valid document, so it is the guaranteed
// last resort of the auto fallback chain.

use crate::models::{SectionKind, SectionSpan};

/// Product-level bound on how many sections the uniform strategy may produce.
#[derive(Debug, Clone, Copy)]
pub struct SectionCountBounds {
    pub min: i32,
    pub max: i32,
}

impl Default for SectionCountBounds {
    fn default() -> Self {
        Self { min: 5, max: 50 }
    }
}

impl SectionCountBounds {
    pub fn clamp(&self, count: i32) -> i32 {
        count.clamp(self.min, self.max)
    }
}

/// Default section count: one section per `pages_per_section` pages, clamped
/// to the configured bound.
pub fn derive_section_count(
    total_pages: i32,
    pages_per_section: i32,
    bounds: SectionCountBounds,
) -> i32 {
    let per = pages_per_section.max(1);
    bounds.clamp((total_pages + per - 1) / per)
}

/// Split `[1, total_pages]` into `target_count` ranges (or a derived default).
/// Earlier ranges absorb the remainder so all lengths differ by at most one
/// page. The requested count is clamped to the bound, then capped at
/// `total_pages` so every section keeps at least one page.
pub fn classify(
    total_pages: i32,
    target_count: Option<i32>,
    pages_per_section: i32,
    bounds: SectionCountBounds,
) -> Vec<SectionSpan> {
    if total_pages < 1 {
        return Vec::new();
    }

    let count = target_count
        .map(|c| bounds.clamp(c))
        .unwrap_or_else(|| derive_section_count(total_pages, pages_per_section, bounds))
        .min(total_pages)
        .max(1);

    let base = total_pages / count;
    let remainder = total_pages % count;

    let mut spans = Vec::with_capacity(count as usize);
    let mut current_page = 1;
    for i in 0..count {
        let pages = base + if i < remainder { 1 } else { 0 };
        let end_page = current_page + pages - 1;
        spans.push(
            SectionSpan::new(format!("Part {}", i + 1), current_page, end_page)
                .with_kind(SectionKind::Generated),
        );
        current_page = end_page + 1;
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lengths(spans: &[SectionSpan]) -> Vec<i32> {
        spans.iter().map(|s| s.page_count()).collect()
    }

    #[test]
    fn test_balanced_split_97_pages_10_sections() {
        let spans = classify(97, Some(10), 15, SectionCountBounds::default());
        assert_eq!(spans.len(), 10);
        let lens = lengths(&spans);
        assert_eq!(lens.iter().sum::<i32>(), 97);
        assert_eq!(lens.iter().max().unwrap() - lens.iter().min().unwrap(), 1);
        // Earlier sections absorb the remainder
        assert_eq!(&lens[..7], &[10, 10, 10, 10, 10, 10, 10]);
        assert_eq!(&lens[7..], &[9, 9, 9]);
        assert_eq!(spans[0].start_page, 1);
        assert_eq!(spans[9].end_page, 97);
    }

    #[test]
    fn test_spans_are_contiguous() {
        let spans = classify(103, Some(7), 15, SectionCountBounds::default());
        for pair in spans.windows(2) {
            assert_eq!(pair[1].start_page, pair[0].end_page + 1);
        }
    }

    #[test]
    fn test_target_count_clamped_to_bound() {
        let spans = classify(400, Some(200), 15, SectionCountBounds::default());
        assert_eq!(spans.len(), 50);
        let spans = classify(400, Some(1), 15, SectionCountBounds::default());
        assert_eq!(spans.len(), 5);
    }

    #[test]
    fn test_count_capped_at_total_pages() {
        // 3 pages cannot carry the minimum of 5 non-empty sections
        let spans = classify(3, None, 15, SectionCountBounds::default());
        assert_eq!(spans.len(), 3);
        assert!(spans.iter().all(|s| s.page_count() == 1));
    }

    #[test]
    fn test_derived_count_follows_pages_per_section() {
        assert_eq!(derive_section_count(97, 15, SectionCountBounds::default()), 7);
        assert_eq!(derive_section_count(30, 15, SectionCountBounds::default()), 5);
        assert_eq!(derive_section_count(2000, 15, SectionCountBounds::default()), 50);
    }

    #[test]
    fn test_idempotent_for_same_inputs() {
        let a = classify(97, Some(10), 15, SectionCountBounds::default());
        let b = classify(97, Some(10), 15, SectionCountBounds::default());
        assert_eq!(a, b);
    }

    #[test]
    fn test_names_are_positional() {
        let spans = classify(50, Some(5), 15, SectionCountBounds::default());
        assert_eq!(spans[0].name, "Part 1");
        assert_eq!(spans[4].name, "Part 5");
        assert!(spans.iter().all(|s| s.kind == SectionKind::Generated));
    }
}
