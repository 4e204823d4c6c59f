// Book Store
// Process-scoped lookup table keyed by book id: entries are created on
// upload, read concurrently, and evicted on explicit removal or TTL expiry
// (swept lazily on store access). Analysis requests for the same id are
// serialized through a per-entry async lock; a result is published only
// after a fully successful detection.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{ClassificationResult, Document, Strategy};
use crate::services::config_store::AppConfig;
use crate::services::structure::{AnalysisError, DetectOptions, SectionDetector};

const DEFAULT_TTL: Duration = Duration::from_secs(3600);

pub struct BookEntry {
    pub document: Document,
    created_at: Instant,
    classification: RwLock<Option<ClassificationResult>>,
    analysis_lock: AsyncMutex<()>,
}

impl BookEntry {
    fn new(document: Document) -> Self {
        Self {
            document,
            created_at: Instant::now(),
            classification: RwLock::new(None),
            analysis_lock: AsyncMutex::new(()),
        }
    }

    pub fn classification(&self) -> Option<ClassificationResult> {
        self.classification
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

pub struct BookStore {
    ttl: Duration,
    inner: Mutex<HashMap<Uuid, Arc<BookEntry>>>,
}

impl Default for BookStore {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl BookStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Duration::from_secs(config.analysis.book_ttl_secs))
    }

    /// Register an extracted document and return its book id.
    pub fn insert(&self, document: Document) -> Uuid {
        let id = Uuid::new_v4();
        let mut map = self.lock_map();
        Self::sweep(&mut map, self.ttl);
        info!(book_id = %id, total_pages = document.total_pages, "book registered");
        map.insert(id, Arc::new(BookEntry::new(document)));
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<BookEntry>> {
        let mut map = self.lock_map();
        Self::sweep(&mut map, self.ttl);
        map.get(id).cloned()
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        self.lock_map().remove(id).is_some()
    }

    pub fn clear(&self) {
        self.lock_map().clear();
    }

    pub fn len(&self) -> usize {
        let mut map = self.lock_map();
        Self::sweep(&mut map, self.ttl);
        map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run detection for one book, serializing with any other in-flight
    /// analysis for the same id (later callers wait their turn). The result
    /// is cached on the entry only after detection succeeds; if the caller
    /// aborts, dropping the future releases the lock and publishes nothing.
    pub async fn analyze(
        &self,
        id: &Uuid,
        detector: &SectionDetector,
        strategy: Strategy,
        options: &DetectOptions,
    ) -> Result<ClassificationResult, AnalysisError> {
        let entry = self
            .get(id)
            .ok_or_else(|| AnalysisError::InvalidDocument(format!("unknown book id: {}", id)))?;

        let _guard = entry.analysis_lock.lock().await;
        let result = detector.detect(&entry.document, strategy, options).await?;

        *entry
            .classification
            .write()
            .unwrap_or_else(|e| e.into_inner()) = Some(result.clone());

        Ok(result)
    }

    fn lock_map(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Arc<BookEntry>>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn sweep(map: &mut HashMap<Uuid, Arc<BookEntry>>, ttl: Duration) {
        map.retain(|id, entry| {
            let keep = !entry.is_expired(ttl);
            if !keep {
                debug!(book_id = %id, "evicting expired book entry");
            }
            keep
        });
    }
}
