// Split Packager
// Converts validated section spans plus the source document into ordered,
// renderer-ready output units. Packaging never fails the batch: a section
// whose extracted text is empty gets a warning on its own unit and the run
// continues.

use tracing::warn;

use crate::models::{
    ClassificationResult, Document, GenerationManifest, ManifestEntry, OutputUnit,
};

/// Warning attached to a unit whose page slice holds no text after trimming.
/// Signals an upstream extraction problem, not a splitting failure.
pub const WARN_EMPTY_SECTION_TEXT: &str = "empty_section_text";

/// Build one output unit per section span, in span order.
pub fn package(document: &Document, classification: &ClassificationResult) -> Vec<OutputUnit> {
    let mut units = Vec::with_capacity(classification.sections.len());

    for (index, span) in classification.sections.iter().enumerate() {
        let source_text = document.slice_text(span.start_page, span.end_page);
        let mut warnings = Vec::new();

        if source_text.trim().is_empty() {
            warn!(
                section = %span.name,
                start_page = span.start_page,
                end_page = span.end_page,
                "section text is empty after extraction"
            );
            warnings.push(WARN_EMPTY_SECTION_TEXT.to_string());
        }

        units.push(OutputUnit {
            section_name: span.name.clone(),
            kind: span.kind,
            start_page: span.start_page,
            end_page: span.end_page,
            page_count: span.page_count(),
            order_index: index as i32,
            source_text,
            warnings,
        });
    }

    units
}

/// Summarize a generate run for the external renderer/storage layer.
pub fn build_manifest(
    book_id: &str,
    document: &Document,
    classification: &ClassificationResult,
    design: &str,
    units: &[OutputUnit],
) -> GenerationManifest {
    let entries = units
        .iter()
        .map(|u| ManifestEntry {
            title: u.section_name.clone(),
            start_page: u.start_page,
            end_page: u.end_page,
            pages_count: u.page_count,
            index: u.order_index,
            warnings: u.warnings.clone(),
        })
        .collect::<Vec<_>>();

    GenerationManifest {
        book_id: book_id.to_string(),
        book_title: document.title.clone(),
        book_author: document.author.clone(),
        design: design.to_string(),
        method: classification.method,
        total_sections: entries.len() as i32,
        entries,
        generated_at: chrono::Utc::now().to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SectionSpan, Strategy};

    fn doc(total_pages: usize) -> Document {
        let pages = (0..total_pages)
            .map(|i| format!("page {} text", i + 1))
            .collect();
        Document::from_page_texts("Book", "Author", pages)
    }

    fn classification(spans: Vec<SectionSpan>, total_pages: i32) -> ClassificationResult {
        ClassificationResult {
            sections: spans,
            method: Strategy::Heading,
            total_pages,
        }
    }

    #[test]
    fn test_units_are_ordered_and_cover_all_pages() {
        let d = doc(30);
        let c = classification(
            vec![
                SectionSpan::new("A", 1, 10),
                SectionSpan::new("B", 11, 25),
                SectionSpan::new("C", 26, 30),
            ],
            30,
        );
        let units = package(&d, &c);
        assert_eq!(units.len(), 3);
        let indices: Vec<i32> = units.iter().map(|u| u.order_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        let total: i32 = units.iter().map(|u| u.page_count).sum();
        assert_eq!(total, 30);
        assert!(units[0].source_text.contains("page 1 text"));
        assert!(units[0].source_text.contains("page 10 text"));
        assert!(!units[0].source_text.contains("page 11 text"));
    }

    #[test]
    fn test_empty_section_gets_warning_but_batch_continues() {
        let mut d = doc(4);
        d.pages[2].text = "   ".to_string(); // page 3
        let c = classification(
            vec![
                SectionSpan::new("A", 1, 2),
                SectionSpan::new("B", 3, 3),
                SectionSpan::new("C", 4, 4),
            ],
            4,
        );
        let units = package(&d, &c);
        assert_eq!(units.len(), 3);
        assert!(units[0].warnings.is_empty());
        assert_eq!(units[1].warnings, vec![WARN_EMPTY_SECTION_TEXT.to_string()]);
        assert!(units[2].warnings.is_empty());
    }

    #[test]
    fn test_manifest_carries_unit_records() {
        let d = doc(10);
        let c = classification(
            vec![SectionSpan::new("A", 1, 5), SectionSpan::new("B", 6, 10)],
            10,
        );
        let units = package(&d, &c);
        let manifest = build_manifest("book-1", &d, &c, "classic", &units);
        assert_eq!(manifest.total_sections, 2);
        assert_eq!(manifest.entries[1].title, "B");
        assert_eq!(manifest.entries[1].pages_count, 5);
        assert_eq!(manifest.design, "classic");
        assert_eq!(manifest.method, Strategy::Heading);
    }
}
