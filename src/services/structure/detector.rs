// Section Detector
// Dispatches a document to the requested classification strategy, runs the
// auto fallback chain (heading -> ai -> uniform), and repairs raw classifier
// output into spans that are sorted, contiguous, non-overlapping, and cover
// the whole page range.

use tracing::{debug, info, warn};

use crate::models::{ClassificationResult, Document, SectionKind, SectionSpan, Strategy};
use crate::services::config_store::{AiConfig, AppConfig};
use crate::services::providers::{get_api_key, ProviderClient};
use crate::services::structure::heading::{self, HeadingRules, UNTITLED_SECTION};
use crate::services::structure::uniform::{self, SectionCountBounds};
use crate::services::structure::{ai, AnalysisError};

/// A classifier is judged ineffective below this many raw sections, which is
/// what moves the auto chain to the next strategy.
const MIN_EFFECTIVE_SECTIONS: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct DetectOptions {
    /// Explicit section count for the uniform strategy; clamped to the
    /// configured bound. `None` derives a count from the page total.
    pub target_section_count: Option<i32>,
}

pub struct SectionDetector {
    rules: HeadingRules,
    bounds: SectionCountBounds,
    pages_per_section: i32,
    ai_config: AiConfig,
    client: ProviderClient,
    api_key: Option<String>,
}

impl Default for SectionDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionDetector {
    pub fn new() -> Self {
        Self {
            rules: HeadingRules::default(),
            bounds: SectionCountBounds::default(),
            pages_per_section: 15,
            ai_config: AiConfig::default(),
            client: ProviderClient::new(),
            api_key: get_api_key(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            rules: HeadingRules::new(config.analysis.extra_heading_keywords.clone()),
            bounds: SectionCountBounds {
                min: config.analysis.min_sections,
                max: config.analysis.max_sections,
            },
            pages_per_section: config.analysis.pages_per_section,
            ai_config: config.ai.clone(),
            client: ProviderClient::new(),
            api_key: get_api_key(),
        }
    }

    /// Override the classification API key (useful for tests and embedding).
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_client(mut self, client: ProviderClient) -> Self {
        self.client = client;
        self
    }

    /// Run the requested strategy and return validated spans. Classifier
    /// errors propagate unchanged for explicit strategies; inside `auto` they
    /// only advance the fallback chain.
    pub async fn detect(
        &self,
        document: &Document,
        strategy: Strategy,
        options: &DetectOptions,
    ) -> Result<ClassificationResult, AnalysisError> {
        if document.total_pages < 1 {
            return Err(AnalysisError::InvalidDocument(
                "document has no pages".to_string(),
            ));
        }
        if document.is_text_empty() {
            return Err(AnalysisError::InvalidDocument(
                "document text is empty".to_string(),
            ));
        }

        let (raw, method) = match strategy {
            Strategy::Heading => (heading::classify(document, &self.rules), Strategy::Heading),
            Strategy::Uniform => (self.classify_uniform(document, options), Strategy::Uniform),
            Strategy::Ai => (self.classify_ai(document).await?, Strategy::Ai),
            Strategy::Auto => self.classify_auto(document, options).await,
        };

        let sections = repair(raw, document.total_pages);
        info!(
            method = %method,
            sections = sections.len(),
            total_pages = document.total_pages,
            "structure detection complete"
        );

        Ok(ClassificationResult {
            sections,
            method,
            total_pages: document.total_pages,
        })
    }

    fn classify_uniform(&self, document: &Document, options: &DetectOptions) -> Vec<SectionSpan> {
        uniform::classify(
            document.total_pages,
            options.target_section_count,
            self.pages_per_section,
            self.bounds,
        )
    }

    async fn classify_ai(&self, document: &Document) -> Result<Vec<SectionSpan>, AnalysisError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AnalysisError::ClassificationService("classification API key not configured".to_string())
        })?;
        ai::classify(document, &self.client, api_key, &self.ai_config).await
    }

    /// Ordered fallback: heading is cheap and precise when it works, the AI
    /// call is the costlier semantic fallback, and uniform always succeeds.
    async fn classify_auto(
        &self,
        document: &Document,
        options: &DetectOptions,
    ) -> (Vec<SectionSpan>, Strategy) {
        let raw = heading::classify(document, &self.rules);
        if raw.len() >= MIN_EFFECTIVE_SECTIONS {
            return (raw, Strategy::Heading);
        }
        info!(
            sections = raw.len(),
            "heading detection ineffective, trying AI classification"
        );

        match self.classify_ai(document).await {
            Ok(spans) if spans.len() >= MIN_EFFECTIVE_SECTIONS => (spans, Strategy::Ai),
            Ok(spans) => {
                info!(
                    sections = spans.len(),
                    "AI classification ineffective, falling back to uniform"
                );
                (self.classify_uniform(document, options), Strategy::Uniform)
            }
            Err(e) => {
                warn!(error = %e, "AI classification failed, falling back to uniform");
                (self.classify_uniform(document, options), Strategy::Uniform)
            }
        }
    }
}

/// Normalize raw classifier spans so they satisfy the span invariants:
/// sorted by start page, contiguous, non-overlapping, covering exactly
/// `[1, total_pages]`. Every mutation is logged; repair never fails.
pub fn repair(raw: Vec<SectionSpan>, total_pages: i32) -> Vec<SectionSpan> {
    let mut spans: Vec<SectionSpan> = Vec::new();
    for mut span in raw {
        span.start_page = span.start_page.max(1);
        span.end_page = span.end_page.min(total_pages);
        if span.start_page > span.end_page {
            debug!(
                name = %span.name,
                start_page = span.start_page,
                end_page = span.end_page,
                "dropping degenerate span"
            );
            continue;
        }
        spans.push(span);
    }

    spans.sort_by_key(|s| s.start_page);

    let mut repaired: Vec<SectionSpan> = Vec::new();
    for mut span in spans {
        if repaired.is_empty() {
            if span.start_page > 1 {
                info!(
                    end_page = span.start_page - 1,
                    "synthesizing leading span for uncovered pages"
                );
                repaired.push(
                    SectionSpan::new(UNTITLED_SECTION, 1, span.start_page - 1)
                        .with_kind(SectionKind::Untitled),
                );
            }
        } else if let Some(prev) = repaired.last_mut() {
            if span.start_page <= prev.end_page {
                // Overlap: the earlier span keeps its pages.
                let new_start = prev.end_page + 1;
                debug!(
                    name = %span.name,
                    start_page = span.start_page,
                    new_start,
                    "trimming overlapping span"
                );
                span.start_page = new_start;
                if span.start_page > span.end_page {
                    debug!(name = %span.name, "span fully shadowed, dropping");
                    continue;
                }
            } else if span.start_page > prev.end_page + 1 {
                info!(
                    name = %prev.name,
                    old_end = prev.end_page,
                    new_end = span.start_page - 1,
                    "closing gap by extending earlier span"
                );
                prev.end_page = span.start_page - 1;
            }
        }
        repaired.push(span);
    }

    if repaired.is_empty() {
        info!(total_pages, "no usable spans, falling back to a single section");
        repaired.push(
            SectionSpan::new(UNTITLED_SECTION, 1, total_pages).with_kind(SectionKind::Untitled),
        );
    } else if let Some(last) = repaired.last_mut() {
        if last.end_page < total_pages {
            info!(
                name = %last.name,
                old_end = last.end_page,
                new_end = total_pages,
                "extending final span to cover trailing pages"
            );
            last.end_page = total_pages;
        }
    }

    repaired
}
