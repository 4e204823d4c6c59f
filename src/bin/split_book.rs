use anyhow::{Context, Result};
use booksplit::models::Strategy;
use booksplit::services::{
    build_manifest, extract_document, package, ConfigStore, DetectOptions, SectionDetector,
};

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn parse_sections_arg(args: &[String]) -> Result<Option<i32>> {
    match parse_arg_value(args, "--sections") {
        Some(s) => {
            let n = s
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid --sections value: {}", s))?;
            Ok(Some(n))
        }
        None => Ok(None),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    booksplit::init_logging();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage:\n  cargo run --bin split_book -- <book.pdf|docx|epub> [--strategy heading|ai|uniform|auto] [--sections <n>] [--design <name>] [--out <json_path>] [--quiet]\n\nNotes:\n  - Default strategy is `heading`; `auto` tries heading, then AI, then uniform.\n  - The `ai` strategy needs OPENAI_API_KEY (or an `openai` key in the config file)."
        );
        return Ok(());
    }

    let path = std::path::PathBuf::from(&args[1]);
    let target_sections = parse_sections_arg(&args)?;
    let design = parse_arg_value(&args, "--design").unwrap_or_else(|| "classic".to_string());
    let out_path = parse_arg_value(&args, "--out");
    let quiet = has_flag(&args, "--quiet");

    let config = match ConfigStore::default_config_dir() {
        Some(dir) => Some(
            ConfigStore::new(dir)
                .load()
                .map_err(|e| anyhow::anyhow!("{}", e))?,
        ),
        None => None,
    };

    let strategy: Strategy = parse_arg_value(&args, "--strategy")
        .or_else(|| config.as_ref().map(|c| c.analysis.default_strategy.clone()))
        .unwrap_or_else(|| "heading".to_string())
        .parse()
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let document = extract_document(&path)
        .with_context(|| format!("failed to extract {}", path.display()))?;

    println!("File: {}", path.display());
    println!("Title: {}", document.title);
    println!("Pages: {}", document.total_pages);
    println!("Strategy: {}", strategy);
    println!();

    let detector = match &config {
        Some(config) => SectionDetector::from_config(config),
        None => SectionDetector::new(),
    };

    let options = DetectOptions {
        target_section_count: target_sections,
    };
    let classification = detector
        .detect(&document, strategy, &options)
        .await
        .context("structure detection failed")?;

    println!(
        "Detected {} sections (method: {})",
        classification.sections.len(),
        classification.method
    );

    let units = package(&document, &classification);
    for unit in &units {
        let warn_suffix = if unit.warnings.is_empty() {
            String::new()
        } else {
            format!("  [{}]", unit.warnings.join(", "))
        };
        println!(
            "[{:03}] pages {:>4}-{:<4} ({:>3}p)  {}{}",
            unit.order_index,
            unit.start_page,
            unit.end_page,
            unit.page_count,
            unit.section_name,
            warn_suffix
        );
        if !quiet {
            println!("      {}", unit.preview(120));
        }
    }

    if let Some(out_path) = out_path {
        let book_id = uuid::Uuid::new_v4().to_string();
        let manifest = build_manifest(&book_id, &document, &classification, &design, &units);
        let json = serde_json::to_string_pretty(&manifest)?;
        std::fs::write(&out_path, json)
            .with_context(|| format!("failed to write {}", out_path))?;
        println!();
        println!("Wrote manifest: {}", out_path);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_sections_arg_parses_number() {
        let n = parse_sections_arg(&args(&["split_book", "b.pdf", "--sections", "7"])).unwrap();
        assert_eq!(n, Some(7));
        let n = parse_sections_arg(&args(&["split_book", "b.pdf"])).unwrap();
        assert_eq!(n, None);
    }

    #[test]
    fn test_sections_arg_rejects_non_number() {
        let err =
            parse_sections_arg(&args(&["split_book", "b.pdf", "--sections", "ten"])).unwrap_err();
        assert!(err.to_string().contains("ten"));
    }
}
