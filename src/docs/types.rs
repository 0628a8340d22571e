use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content-addressed document ID (blake3 hex hash of the extracted text).
pub type DocId = String;

/// A document as handed over by the ingestion step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    pub id: DocId,
    pub name: String,
    pub media_type: String,
    pub text: String,
    /// Size of the uploaded payload in bytes, before text extraction.
    pub size: usize,
    pub uploaded_at: DateTime<Utc>,
}

/// A contiguous word window of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub id: String,
    pub doc_id: DocId,
    pub content: String,
    /// Word offset of the first word, inclusive.
    pub start_index: usize,
    /// Word offset one past the last word.
    pub end_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// A document together with its chunks, ready for retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedDocument {
    pub document: RawDocument,
    pub chunks: Vec<Chunk>,
    pub word_count: usize,
}

impl ProcessedDocument {
    pub fn id(&self) -> &str {
        &self.document.id
    }

    pub fn name(&self) -> &str {
        &self.document.name
    }
}
