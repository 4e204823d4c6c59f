// Booksplit Data Models
// Shared types exchanged between extraction, detection, and packaging

use serde::{Deserialize, Serialize};

// ============ Extracted Document ============

/// One page of extracted text. Page numbers are 1-based.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageText {
    pub page_number: i32,
    pub text: String,
}

impl PageText {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Extracted book content with page boundaries. Immutable once built;
/// the analysis core only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_author")]
    pub author: String,
    pub total_pages: i32,
    pub pages: Vec<PageText>,
}

impl Document {
    pub fn new(title: impl Into<String>, author: impl Into<String>, pages: Vec<PageText>) -> Self {
        let total_pages = pages.len() as i32;
        Self {
            title: title.into(),
            author: author.into(),
            total_pages,
            pages,
        }
    }

    /// Build a document from raw page texts, numbering pages from 1.
    pub fn from_page_texts(
        title: impl Into<String>,
        author: impl Into<String>,
        texts: Vec<String>,
    ) -> Self {
        let pages = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| PageText {
                page_number: i as i32 + 1,
                text,
            })
            .collect();
        Self::new(title, author, pages)
    }

    /// Concatenated text of pages `[start_page, end_page]` (inclusive, 1-based).
    pub fn slice_text(&self, start_page: i32, end_page: i32) -> String {
        let mut parts: Vec<&str> = Vec::new();
        for page in &self.pages {
            if page.page_number >= start_page && page.page_number <= end_page {
                parts.push(&page.text);
            }
        }
        parts.join("\n\n")
    }

    /// True when no page carries any non-whitespace text.
    pub fn is_text_empty(&self) -> bool {
        self.pages.iter().all(|p| p.text.trim().is_empty())
    }
}

// ============ Strategy ============

/// Section-detection strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Heading,
    Ai,
    Uniform,
    Auto,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Heading => "heading",
            Strategy::Ai => "ai",
            Strategy::Uniform => "uniform",
            Strategy::Auto => "auto",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============ Section Spans ============

/// What kind of section a span represents. Carried through to the renderer
/// for template choices; the splitting logic itself only reads page ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Introduction,
    Conclusion,
    Numbered,
    Roman,
    #[default]
    Regular,
    Generated,
    Untitled,
}

/// A contiguous page range assigned one name, the unit of splitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSpan {
    pub name: String,
    #[serde(default)]
    pub kind: SectionKind,
    #[serde(default = "default_level")]
    pub level: i32,
    pub start_page: i32,
    pub end_page: i32,
}

impl SectionSpan {
    pub fn new(name: impl Into<String>, start_page: i32, end_page: i32) -> Self {
        Self {
            name: name.into(),
            kind: SectionKind::Regular,
            level: 1,
            start_page,
            end_page,
        }
    }

    pub fn with_kind(mut self, kind: SectionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    pub fn page_count(&self) -> i32 {
        self.end_page - self.start_page + 1
    }
}

/// Validated section spans plus the strategy that actually produced them
/// (relevant when `auto` falls through multiple strategies).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub sections: Vec<SectionSpan>,
    pub method: Strategy,
    pub total_pages: i32,
}

// ============ Output Units ============

/// Renderer-ready representation of one section. Owns the section's source
/// text but never the rendered artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputUnit {
    pub section_name: String,
    pub kind: SectionKind,
    pub start_page: i32,
    pub end_page: i32,
    pub page_count: i32,
    pub order_index: i32,
    pub source_text: String,
    /// Non-fatal data-quality conditions attached to this unit, e.g.
    /// `empty_section_text` when the extracted slice holds no text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl OutputUnit {
    /// First `max_chars` characters of the section text, newline-flattened.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut out: String = self.source_text.chars().take(max_chars).collect();
        if self.source_text.chars().count() > max_chars {
            out.push_str("...");
        }
        out.replace('\n', " ")
    }
}

// ============ Generation Manifest ============

/// Per-unit record written into the generation manifest for the
/// renderer/storage collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub title: String,
    pub start_page: i32,
    pub end_page: i32,
    pub pages_count: i32,
    pub index: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Summary of one generate run, handed to the external renderer/storage layer
/// alongside the output units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationManifest {
    pub book_id: String,
    pub book_title: String,
    pub book_author: String,
    pub design: String,
    pub method: Strategy,
    pub total_sections: i32,
    pub entries: Vec<ManifestEntry>,
    pub generated_at: String,
}

// ============ Default Value Functions ============

fn default_title() -> String { "Untitled Book".to_string() }
fn default_author() -> String { "Unknown Author".to_string() }
fn default_level() -> i32 { 1 }
