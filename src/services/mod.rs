// Booksplit Core Services

pub mod book_store;
pub mod config_store;
pub mod extractor;
pub mod packager;
pub mod providers;
pub mod structure;

pub use book_store::{BookEntry, BookStore};
pub use config_store::{AiConfig, AnalysisConfig, AppConfig, ConfigStore};
pub use extractor::{extract_document, extract_from_bytes, ExtractError, SourceFormat};
pub use packager::{build_manifest, package, WARN_EMPTY_SECTION_TEXT};
pub use providers::{get_api_key, ChatResult, ProviderClient, ProviderError};

// Re-export structure module items
pub use structure::{
    AnalysisError,
    DetectOptions,
    HeadingRules,
    SectionCountBounds,
    SectionDetector,
};
