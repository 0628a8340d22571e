use chrono::Utc;
use tracing::info;

use super::chunk::{chunk_text, word_count};
use super::types::{ProcessedDocument, RawDocument};

/// Per-file ingestion failures. These are the only pipeline errors that reach
/// the caller; they never affect other files or existing decisions.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to read text file {name}: {source}")]
    InvalidText {
        name: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// A file as received from the upload surface.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    /// Declared media type, if the transport supplied one.
    pub media_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Strip media type parameters and fall back to the file extension when the
/// transport did not declare a type.
pub fn normalize_media_type(declared: Option<&str>, file_name: &str) -> String {
    let declared = declared
        .and_then(|t| t.split(';').next())
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty() && t != "application/octet-stream");
    if let Some(t) = declared {
        return t;
    }

    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "txt" | "text" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "html" | "htm" => "text/html",
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Extract plain text from a payload of the given (normalized) media type.
///
/// Binary formats such as PDF and DOCX need an external extractor and are
/// rejected here.
pub fn extract_text(name: &str, bytes: &[u8], media_type: &str) -> Result<String, IngestError> {
    match media_type {
        "text/plain" | "text/markdown" => {
            String::from_utf8(bytes.to_vec()).map_err(|source| IngestError::InvalidText {
                name: name.to_string(),
                source,
            })
        }
        "text/html" => Ok(html2text::from_read(bytes, 120)
            .unwrap_or_else(|_| String::from_utf8_lossy(bytes).to_string())),
        other => Err(IngestError::UnsupportedFormat(other.to_string())),
    }
}

/// Extract and chunk one uploaded file.
pub fn process_file(upload: &Upload, chunk_size: usize) -> Result<ProcessedDocument, IngestError> {
    let media_type = normalize_media_type(upload.media_type.as_deref(), &upload.name);
    let text = extract_text(&upload.name, &upload.bytes, &media_type)?;
    let id = blake3::hash(text.as_bytes()).to_hex().to_string();

    let chunks = chunk_text(&id, &text, chunk_size);
    let words = word_count(&text);

    info!(
        doc_id = %id,
        name = %upload.name,
        media_type = %media_type,
        size = upload.bytes.len(),
        words,
        chunks = chunks.len(),
        "Document processed"
    );

    Ok(ProcessedDocument {
        document: RawDocument {
            id,
            name: upload.name.clone(),
            media_type,
            text,
            size: upload.bytes.len(),
            uploaded_at: Utc::now(),
        },
        chunks,
        word_count: words,
    })
}
