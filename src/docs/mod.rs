pub mod chunk;
pub mod ingest;
pub mod types;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use ingest::{IngestError, Upload};
use types::ProcessedDocument;

/// Immutable snapshot of the documents uploaded in one session.
///
/// Changes produce a new snapshot; readers keep whichever snapshot they
/// started with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentIndex {
    documents: Vec<ProcessedDocument>,
}

impl DocumentIndex {
    pub fn new(documents: Vec<ProcessedDocument>) -> Self {
        let mut index = Self::default();
        for doc in documents {
            index = index.with_document(doc);
        }
        index
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn documents(&self) -> &[ProcessedDocument] {
        &self.documents
    }

    pub fn chunk_count(&self) -> usize {
        self.documents.iter().map(|d| d.chunks.len()).sum()
    }

    /// New snapshot with `doc` added. A document with the same content id
    /// replaces the earlier upload in place.
    pub fn with_document(&self, doc: ProcessedDocument) -> Self {
        let mut documents = self.documents.clone();
        match documents.iter().position(|d| d.id() == doc.id()) {
            Some(i) => documents[i] = doc,
            None => documents.push(doc),
        }
        Self { documents }
    }

    /// New snapshot without the first document whose name equals `key` or
    /// whose id starts with it. `None` if nothing matched.
    pub fn without_document(&self, key: &str) -> Option<(Self, ProcessedDocument)> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        let pos = self
            .documents
            .iter()
            .position(|d| d.name() == key || d.id().starts_with(key))?;
        let mut documents = self.documents.clone();
        let removed = documents.remove(pos);
        Some((Self { documents }, removed))
    }
}

/// Per-session document indexes, keyed by the caller's user id.
pub struct SessionStore {
    sessions: RwLock<HashMap<u64, Arc<DocumentIndex>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Current snapshot for `session`; empty if nothing was uploaded.
    pub async fn snapshot(&self, session: u64) -> Arc<DocumentIndex> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&session)
            .cloned()
            .unwrap_or_else(|| Arc::new(DocumentIndex::empty()))
    }

    /// Add one document to the session's current snapshot.
    pub async fn add(&self, session: u64, doc: ProcessedDocument) -> Arc<DocumentIndex> {
        let mut sessions = self.sessions.write().await;
        let next = Arc::new(
            sessions
                .get(&session)
                .map(|current| current.with_document(doc.clone()))
                .unwrap_or_else(|| DocumentIndex::new(vec![doc])),
        );
        sessions.insert(session, next.clone());
        debug!(session, documents = next.len(), "document added to index");
        next
    }

    /// Extract and chunk one upload, then add it to the session. A rejected
    /// file leaves the session as it was.
    pub async fn ingest(
        &self,
        session: u64,
        upload: &Upload,
        chunk_size: usize,
    ) -> Result<ProcessedDocument, IngestError> {
        match ingest::process_file(upload, chunk_size) {
            Ok(doc) => {
                self.add(session, doc.clone()).await;
                Ok(doc)
            }
            Err(e) => {
                warn!(session, name = %upload.name, error = %e, "Document rejected");
                Err(e)
            }
        }
    }

    /// Remove one document by name or id prefix.
    pub async fn remove(&self, session: u64, key: &str) -> Option<ProcessedDocument> {
        let mut sessions = self.sessions.write().await;
        let (next, removed) = sessions.get(&session)?.without_document(key)?;
        sessions.insert(session, Arc::new(next));
        debug!(session, doc_id = %removed.id(), "document removed from index");
        Some(removed)
    }

    /// Drop the session's index. Returns how many documents it held.
    pub async fn clear(&self, session: u64) -> usize {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(&session).map(|i| i.len()).unwrap_or(0);
        debug!(session, removed, "session cleared");
        removed
    }
}
