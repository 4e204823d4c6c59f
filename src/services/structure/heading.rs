// Heading Matcher
// Scans page text line by line for section headings. Each match opens a new
// span at its page; at most one boundary is honored per page (first match
// wins). Returning zero spans signals that heading detection was ineffective.

use regex::Regex;

use crate::models::{Document, SectionKind, SectionSpan};

/// Name used for pages that precede the first detected heading.
pub const UNTITLED_SECTION: &str = "Untitled";

const MAX_HEADING_NAME_CHARS: usize = 80;

/// Configurable heading vocabulary and style limits. Defaults cover Kazakh
/// and Russian section labels; deployments with a different target language
/// extend `keywords` via the analysis config.
#[derive(Debug, Clone)]
pub struct HeadingRules {
    pub keywords: Vec<String>,
    pub max_heading_len: usize,
    pub uppercase_ratio: f64,
    patterns: Vec<Regex>,
    intro_keywords: Vec<String>,
    conclusion_keywords: Vec<String>,
}

impl Default for HeadingRules {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl HeadingRules {
    pub fn new(extra_keywords: Vec<String>) -> Self {
        let mut keywords: Vec<String> = [
            // Kazakh section labels
            "кіріспе",
            "қорытынды",
            "қорытынды сөз",
            "бөлім",
            "тарау",
            // Russian section labels
            "введение",
            "вступление",
            "заключение",
            "глава",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        for kw in extra_keywords {
            let kw = kw.trim().to_lowercase();
            if !kw.is_empty() && !keywords.contains(&kw) {
                keywords.push(kw);
            }
        }

        let patterns = vec![
            // Numbered headings: "3. Title" / "3 Title"
            Regex::new(r"^\d+\.?\s+\S").unwrap(),
            // Roman numerals: "IV. Title" / "IV Title". A single numeral
            // letter needs the period, or "I went home" would match.
            Regex::new(r"^(?:[IVXLC]+\.|[IVXLC]{2,})\s+\S").unwrap(),
            // Chapter labels with a number
            Regex::new(r"(?i)^(глава|бөлім|тарау)\s+\d+").unwrap(),
        ];

        let intro_keywords = vec![
            "кіріспе".to_string(),
            "введение".to_string(),
            "вступление".to_string(),
        ];
        let conclusion_keywords = vec![
            "қорытынды".to_string(),
            "заключение".to_string(),
        ];

        Self {
            keywords,
            max_heading_len: 60,
            uppercase_ratio: 0.7,
            patterns,
            intro_keywords,
            conclusion_keywords,
        }
    }

    /// Whether a trimmed line reads as a section heading.
    pub fn is_heading(&self, line: &str) -> bool {
        if line.chars().count() < 3 || line.chars().count() > self.max_heading_len {
            return false;
        }

        let lower = line.to_lowercase();
        if self
            .keywords
            .iter()
            .any(|kw| lower == *kw || lower.starts_with(&format!("{} ", kw)))
        {
            return true;
        }

        if self.patterns.iter().any(|p| p.is_match(line)) {
            return true;
        }

        self.is_heading_by_style(line)
    }

    /// Standalone short line in (mostly) capitals without trailing punctuation.
    fn is_heading_by_style(&self, line: &str) -> bool {
        if line.ends_with(['.', '!', '?', ':', ';', ',']) {
            return false;
        }

        let letters: Vec<char> = line.chars().filter(|c| c.is_alphabetic()).collect();
        if letters.len() < 3 {
            return false;
        }

        let upper = letters.iter().filter(|c| c.is_uppercase()).count();
        upper as f64 / letters.len() as f64 >= self.uppercase_ratio
    }

    pub fn classify_kind(&self, heading: &str) -> SectionKind {
        let lower = heading.to_lowercase();
        if self.intro_keywords.iter().any(|kw| lower.contains(kw)) {
            return SectionKind::Introduction;
        }
        if self.conclusion_keywords.iter().any(|kw| lower.contains(kw)) {
            return SectionKind::Conclusion;
        }
        if heading.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return SectionKind::Numbered;
        }
        if Regex::new(r"^(?:[IVXLC]+\.|[IVXLC]{2,})\s")
            .unwrap()
            .is_match(heading)
        {
            return SectionKind::Roman;
        }
        SectionKind::Regular
    }

    /// Dotted-numbering depth: "3.1.2 ..." is level 3, capped there.
    pub fn heading_level(&self, heading: &str) -> i32 {
        if Regex::new(r"^\d+\.\d+\.\d+").unwrap().is_match(heading) {
            3
        } else if Regex::new(r"^\d+\.\d+").unwrap().is_match(heading) {
            2
        } else {
            1
        }
    }
}

/// Scan the document for heading lines and emit unvalidated spans in page
/// order. Pages before the first heading become an implicit leading span.
pub fn classify(document: &Document, rules: &HeadingRules) -> Vec<SectionSpan> {
    // (page_number, heading line) - at most one per page
    let mut boundaries: Vec<(i32, String)> = Vec::new();

    for page in &document.pages {
        for line in page.text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if rules.is_heading(line) {
                boundaries.push((page.page_number, truncate_name(line)));
                break; // one section boundary per page
            }
        }
    }

    if boundaries.is_empty() {
        return Vec::new();
    }

    let mut spans: Vec<SectionSpan> = Vec::new();

    if boundaries[0].0 > 1 {
        spans.push(
            SectionSpan::new(UNTITLED_SECTION, 1, boundaries[0].0 - 1)
                .with_kind(SectionKind::Untitled),
        );
    }

    for (i, (page, name)) in boundaries.iter().enumerate() {
        let end_page = match boundaries.get(i + 1) {
            Some((next_page, _)) => next_page - 1,
            None => document.total_pages,
        };
        spans.push(
            SectionSpan::new(name.clone(), *page, end_page)
                .with_kind(rules.classify_kind(name))
                .with_level(rules.heading_level(name)),
        );
    }

    spans
}

fn truncate_name(line: &str) -> String {
    let mut name: String = line.chars().take(MAX_HEADING_NAME_CHARS).collect();
    if line.chars().count() > MAX_HEADING_NAME_CHARS {
        name.push_str("...");
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(pages: &[&str]) -> Document {
        Document::from_page_texts(
            "Test",
            "Tester",
            pages.iter().map(|p| p.to_string()).collect(),
        )
    }

    #[test]
    fn test_numbered_and_keyword_headings_match() {
        let rules = HeadingRules::default();
        assert!(rules.is_heading("1. Бірінші тарау"));
        assert!(rules.is_heading("Кіріспе"));
        assert!(rules.is_heading("Глава 3"));
        assert!(rules.is_heading("IV. Analysis"));
        assert!(!rules.is_heading("Бұл қарапайым сөйлем, ол жалғасады."));
    }

    #[test]
    fn test_style_heading_requires_uppercase_and_no_punctuation() {
        let rules = HeadingRules::default();
        assert!(rules.is_heading("МАЗМҰНЫ"));
        assert!(!rules.is_heading("МАЗМҰНЫ:"));
        assert!(!rules.is_heading("an ordinary lowercase line"));
    }

    #[test]
    fn test_single_roman_letter_needs_period() {
        let rules = HeadingRules::default();
        assert!(rules.is_heading("I. Introduction"));
        assert!(rules.is_heading("II Analysis"));
        assert!(!rules.is_heading("I went to the market yesterday"));
        assert!(!rules.is_heading("C major scale for beginners"));
    }

    #[test]
    fn test_classify_kind_and_level() {
        let rules = HeadingRules::default();
        assert_eq!(rules.classify_kind("Кіріспе"), SectionKind::Introduction);
        assert_eq!(rules.classify_kind("Қорытынды"), SectionKind::Conclusion);
        assert_eq!(rules.classify_kind("2. Тарау"), SectionKind::Numbered);
        assert_eq!(rules.classify_kind("IV. Part"), SectionKind::Roman);
        assert_eq!(rules.heading_level("2.1.3 Detail"), 3);
        assert_eq!(rules.heading_level("2.1 Detail"), 2);
        assert_eq!(rules.heading_level("2. Detail"), 1);
    }

    #[test]
    fn test_classify_builds_spans_in_page_order() {
        let d = doc(&[
            "Кіріспе\nтекст",
            "жай мәтін жалғасы.",
            "1. Бірінші тарау\nтекст",
            "жай мәтін.",
            "Қорытынды\nтекст",
        ]);
        let spans = classify(&d, &HeadingRules::default());
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].name, "Кіріспе");
        assert_eq!((spans[0].start_page, spans[0].end_page), (1, 2));
        assert_eq!((spans[1].start_page, spans[1].end_page), (3, 4));
        assert_eq!((spans[2].start_page, spans[2].end_page), (5, 5));
    }

    #[test]
    fn test_tie_break_one_boundary_per_page() {
        let d = doc(&["1. Бірінші\nкейбір мәтін\n2. Екінші", "жай мәтін."]);
        let spans = classify(&d, &HeadingRules::default());
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].name, "1. Бірінші");
        assert_eq!((spans[0].start_page, spans[0].end_page), (1, 2));
    }

    #[test]
    fn test_leading_pages_become_untitled_span() {
        let d = doc(&["жай мәтін, тақырып жоқ.", "1. Тарау\nтекст", "соңы."]);
        let spans = classify(&d, &HeadingRules::default());
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].name, UNTITLED_SECTION);
        assert_eq!(spans[0].kind, SectionKind::Untitled);
        assert_eq!((spans[0].start_page, spans[0].end_page), (1, 1));
    }

    #[test]
    fn test_no_matches_returns_zero_spans() {
        let d = doc(&["жай мәтін ғана.", "тағы жай мәтін."]);
        assert!(classify(&d, &HeadingRules::default()).is_empty());
    }

    #[test]
    fn test_extra_keywords_extend_vocabulary() {
        let rules = HeadingRules::new(vec!["chapter".to_string()]);
        assert!(rules.is_heading("chapter one"));
    }
}
