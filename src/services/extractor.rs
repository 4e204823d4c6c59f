// Document Extraction Service
// Thin collaborator fulfilling the extract-document contract: turns an
// uploaded PDF/DOCX/EPUB into a page-addressed Document. Parsing internals
// belong to the underlying libraries; this module only normalizes and
// paginates their output.

use std::io::Cursor;
use std::path::Path;

use docx_rs::{read_docx, DocumentChild};
use epub::doc::EpubDoc;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::Document;

/// DOCX and EPUB have no page geometry; paragraphs are re-paginated at this
/// many words per synthetic page.
const WORDS_PER_PAGE: usize = 300;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("{format} extraction failed: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Pdf,
    Docx,
    Epub,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Ok(SourceFormat::Pdf),
            "docx" => Ok(SourceFormat::Docx),
            "epub" => Ok(SourceFormat::Epub),
            other => Err(ExtractError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Read a book file from disk and extract its paged text.
pub fn extract_document(path: &Path) -> Result<Document, ExtractError> {
    let format = SourceFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    let fallback_title = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Untitled Book".to_string());
    extract_from_bytes(&bytes, format, &fallback_title)
}

pub fn extract_from_bytes(
    bytes: &[u8],
    format: SourceFormat,
    fallback_title: &str,
) -> Result<Document, ExtractError> {
    let document = match format {
        SourceFormat::Pdf => extract_pdf(bytes, fallback_title)?,
        SourceFormat::Docx => extract_docx(bytes, fallback_title)?,
        SourceFormat::Epub => extract_epub(bytes, fallback_title)?,
    };
    info!(
        title = %document.title,
        total_pages = document.total_pages,
        "document extracted"
    );
    Ok(document)
}

fn extract_pdf(bytes: &[u8], fallback_title: &str) -> Result<Document, ExtractError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| {
        ExtractError::Parse {
            format: "pdf",
            message: e.to_string(),
        }
    })?;

    let texts: Vec<String> = pages.iter().map(|p| clean_text(p)).collect();
    Ok(Document::from_page_texts(
        fallback_title,
        "Unknown Author",
        texts,
    ))
}

fn extract_docx(bytes: &[u8], fallback_title: &str) -> Result<Document, ExtractError> {
    let docx = read_docx(bytes).map_err(|e| ExtractError::Parse {
        format: "docx",
        message: e.to_string(),
    })?;

    let mut paragraphs: Vec<String> = Vec::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(p) = child {
            let text = p.raw_text();
            if !text.trim().is_empty() {
                paragraphs.push(text.trim().to_string());
            }
        }
    }

    let pages = paginate_by_words(&paragraphs, WORDS_PER_PAGE);
    Ok(Document::from_page_texts(
        fallback_title,
        "Unknown Author",
        pages,
    ))
}

fn extract_epub(bytes: &[u8], fallback_title: &str) -> Result<Document, ExtractError> {
    let mut doc = EpubDoc::from_reader(Cursor::new(bytes.to_vec())).map_err(|e| {
        ExtractError::Parse {
            format: "epub",
            message: e.to_string(),
        }
    })?;

    let title = doc.mdata("title").unwrap_or_else(|| fallback_title.to_string());
    let author = doc.mdata("creator").unwrap_or_else(|| "Unknown Author".to_string());

    let mut paragraphs: Vec<String> = Vec::new();
    let mut chapters = 0usize;
    loop {
        if let Some((chapter, _mime)) = doc.get_current_str() {
            chapters += 1;
            // Very large width so no hard line breaks get baked in.
            let plain = match html2text::from_read(chapter.as_bytes(), 10_000) {
                Ok(clean) => clean,
                Err(err) => {
                    warn!(chapter = chapters, "html2text failed: {err}");
                    chapter
                }
            };
            for para in clean_text(&plain).split("\n\n") {
                let para = para.trim();
                if !para.is_empty() {
                    paragraphs.push(para.to_string());
                }
            }
        }
        if !doc.go_next() {
            break;
        }
    }

    let pages = paginate_by_words(&paragraphs, WORDS_PER_PAGE);
    Ok(Document::from_page_texts(title, author, pages))
}

/// Group paragraphs into synthetic pages of roughly `words_per_page` words.
/// A paragraph never splits across pages.
fn paginate_by_words(paragraphs: &[String], words_per_page: usize) -> Vec<String> {
    let mut pages: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_words = 0usize;

    for para in paragraphs {
        current.push(para);
        current_words += para.split_whitespace().count();
        if current_words >= words_per_page {
            pages.push(current.join("\n\n"));
            current.clear();
            current_words = 0;
        }
    }
    if !current.is_empty() {
        pages.push(current.join("\n\n"));
    }

    pages
}

/// Normalize line endings and collapse runs of blank lines.
fn clean_text(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(unified.len());
    let mut blank_run = 0usize;
    for line in unified.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            SourceFormat::from_path(Path::new("book.PDF")).unwrap(),
            SourceFormat::Pdf
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("a/b/book.docx")).unwrap(),
            SourceFormat::Docx
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("book.epub")).unwrap(),
            SourceFormat::Epub
        );
        assert!(matches!(
            SourceFormat::from_path(Path::new("book.txt")),
            Err(ExtractError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_paginate_by_words_groups_paragraphs() {
        let para = "word ".repeat(100).trim().to_string(); // 100 words
        let paragraphs = vec![para.clone(); 7];
        let pages = paginate_by_words(&paragraphs, 300);
        assert_eq!(pages.len(), 3);
        // First two pages carry three paragraphs each, the last carries one
        assert_eq!(pages[0].matches("\n\n").count(), 2);
        assert_eq!(pages[2].matches("\n\n").count(), 0);
    }

    #[test]
    fn test_paginate_never_splits_a_paragraph() {
        let long = "word ".repeat(900).trim().to_string();
        let pages = paginate_by_words(&[long.clone()], 300);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0], long);
    }

    #[test]
    fn test_clean_text_collapses_blank_runs() {
        let input = "a\r\n\r\n\r\n\r\nb  \nc";
        assert_eq!(clean_text(input), "a\n\nb\nc");
    }
}
