// AI Structure Classifier
// Sends a bounded sample of page text to the external chat-completion service
// and parses the structured section list it returns. Never invents spans
// beyond what the service names; any transport, timeout, or parse problem
// surfaces as a classification service error.

use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::models::{Document, SectionKind, SectionSpan};
use crate::services::config_store::AiConfig;
use crate::services::providers::ProviderClient;
use crate::services::structure::AnalysisError;

const STRUCTURE_SYSTEM_PROMPT: &str = "You are an expert in analyzing the structure of books. \
Given numbered page excerpts, identify the main sections and the page each one starts and ends on. \
Respond with JSON only, in the form \
{\"sections\": [{\"name\": \"Section title\", \"type\": \"introduction|chapter|conclusion\", \"startPage\": 1, \"endPage\": 10}]}. \
Page numbers must be positive integers within the given page range. \
If exact boundaries are unclear, give your best approximation. Do not add any text outside the JSON.";

#[derive(Debug, Deserialize, Default)]
struct AiStructure {
    #[serde(default)]
    sections: Vec<AiSection>,
}

#[derive(Debug, Deserialize)]
struct AiSection {
    #[serde(default)]
    name: String,
    #[serde(default)]
    r#type: Option<String>,
    #[serde(default, alias = "startPage")]
    start_page: i32,
    #[serde(default, alias = "endPage")]
    end_page: i32,
}

/// Classify the document's structure through the external service. The call
/// is bounded by `cfg.timeout_secs`; dropping the returned future cancels the
/// underlying HTTP request.
pub async fn classify(
    document: &Document,
    client: &ProviderClient,
    api_key: &str,
    cfg: &AiConfig,
) -> Result<Vec<SectionSpan>, AnalysisError> {
    let sample = build_sample(document, cfg.sample_char_budget, cfg.max_sample_pages);
    let user_prompt = format!(
        "The book has {} pages. Analyze these page excerpts and return the section list as JSON:\n\n{}",
        document.total_pages, sample
    );

    let call = client.call_chat(
        &cfg.model,
        api_key,
        STRUCTURE_SYSTEM_PROMPT,
        &user_prompt,
        cfg.max_tokens,
        true,
    );

    let result = match tokio::time::timeout(Duration::from_secs(cfg.timeout_secs), call).await {
        Ok(Ok(chat_result)) => chat_result,
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            warn!(timeout_secs = cfg.timeout_secs, "structure classification call timed out");
            return Err(AnalysisError::ClassificationService(format!(
                "classification call timed out after {}s",
                cfg.timeout_secs
            )));
        }
    };

    info!(
        latency_ms = result.latency_ms,
        model = %cfg.model,
        "structure classification response received"
    );

    parse_structure(&result.content)
}

/// Concatenate `[page N]`-tagged excerpts until the char budget or page cap
/// is reached.
fn build_sample(document: &Document, char_budget: usize, max_pages: usize) -> String {
    let mut sample = String::new();
    for page in document.pages.iter().take(max_pages) {
        let text = page.text.trim();
        if text.is_empty() {
            continue;
        }
        sample.push_str(&format!("[page {}]\n{}\n\n", page.page_number, text));
        if sample.chars().count() >= char_budget {
            break;
        }
    }
    sample
}

/// Parse the service response into spans. Entries without usable page numbers
/// are dropped; a response yielding no usable span at all is an error.
fn parse_structure(content: &str) -> Result<Vec<SectionSpan>, AnalysisError> {
    let json_str = extract_json(content.trim())
        .ok_or_else(|| AnalysisError::ClassificationService("no JSON in response".to_string()))?;

    let structure: AiStructure = serde_json::from_str(&json_str)
        .map_err(|e| AnalysisError::ClassificationService(format!("JSON parse error: {}", e)))?;

    let mut spans = Vec::new();
    for section in structure.sections {
        if section.start_page < 1 || section.end_page < section.start_page {
            warn!(
                name = %section.name,
                start_page = section.start_page,
                end_page = section.end_page,
                "dropping AI section without valid page numbers"
            );
            continue;
        }
        let name = if section.name.trim().is_empty() {
            "Untitled".to_string()
        } else {
            section.name.trim().to_string()
        };
        spans.push(
            SectionSpan::new(name, section.start_page, section.end_page)
                .with_kind(kind_from_label(section.r#type.as_deref())),
        );
    }

    if spans.is_empty() {
        return Err(AnalysisError::ClassificationService(
            "no valid page-numbered spans in response".to_string(),
        ));
    }

    Ok(spans)
}

fn kind_from_label(label: Option<&str>) -> SectionKind {
    match label.map(|l| l.trim().to_ascii_lowercase()).as_deref() {
        Some("introduction") => SectionKind::Introduction,
        Some("conclusion") => SectionKind::Conclusion,
        _ => SectionKind::Regular,
    }
}

/// Extract the JSON object from response content that may carry fences or
/// surrounding prose.
fn extract_json(content: &str) -> Option<String> {
    if content.starts_with('{') && content.ends_with('}') {
        return Some(content.to_string());
    }
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(content[start..=end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PageText;

    #[test]
    fn test_extract_json_handles_fenced_content() {
        let content = "```json\n{\"sections\": []}\n```";
        assert_eq!(extract_json(content).unwrap(), "{\"sections\": []}");
        assert!(extract_json("no braces here").is_none());
    }

    #[test]
    fn test_parse_structure_accepts_camel_and_snake_case() {
        let content = r#"{"sections": [
            {"name": "Intro", "type": "introduction", "startPage": 1, "endPage": 5},
            {"name": "Body", "type": "chapter", "start_page": 6, "end_page": 20}
        ]}"#;
        let spans = parse_structure(content).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].kind, SectionKind::Introduction);
        assert_eq!((spans[1].start_page, spans[1].end_page), (6, 20));
    }

    #[test]
    fn test_parse_structure_drops_invalid_entries() {
        let content = r#"{"sections": [
            {"name": "Bad", "startPage": 0, "endPage": 5},
            {"name": "Inverted", "startPage": 9, "endPage": 3},
            {"name": "Good", "startPage": 1, "endPage": 4}
        ]}"#;
        let spans = parse_structure(content).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].name, "Good");
    }

    #[test]
    fn test_parse_structure_rejects_spanless_content() {
        assert!(parse_structure(r#"{"sections": []}"#).is_err());
        assert!(parse_structure("I could not determine the structure.").is_err());
    }

    #[test]
    fn test_build_sample_respects_budget_and_tags_pages() {
        let pages = (1..=10)
            .map(|n| PageText {
                page_number: n,
                text: "x".repeat(100),
            })
            .collect();
        let doc = Document::new("T", "A", pages);
        let sample = build_sample(&doc, 250, 40);
        assert!(sample.starts_with("[page 1]"));
        assert!(sample.contains("[page 3]"));
        assert!(!sample.contains("[page 4]"));
    }

    #[test]
    fn test_build_sample_skips_blank_pages() {
        let doc = Document::from_page_texts(
            "T",
            "A",
            vec!["  ".to_string(), "content".to_string()],
        );
        let sample = build_sample(&doc, 1000, 40);
        assert!(!sample.contains("[page 1]"));
        assert!(sample.contains("[page 2]"));
    }
}
