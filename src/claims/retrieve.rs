//! Evidence retrieval: keyword-overlap scoring of indexed chunks.

use tracing::debug;

use super::types::{Clause, ClauseCategory, StructuredQuery};
use crate::docs::types::Chunk;
use crate::docs::DocumentIndex;

/// Chunks must score strictly above this to become clauses.
pub const RELEVANCE_THRESHOLD: f64 = 0.3;

/// Upper bound on clauses returned by a search.
pub const MAX_CLAUSES: usize = 5;

/// Find the clauses most relevant to `query`.
///
/// With no documents indexed this returns [`fallback_clauses`] whatever the
/// query says.
pub fn search(query: &StructuredQuery, index: &DocumentIndex) -> Vec<Clause> {
    if index.is_empty() {
        debug!("no documents indexed, using fallback clauses");
        return fallback_clauses();
    }

    let search_query = build_search_query(query);
    let mut clauses: Vec<Clause> = index
        .documents()
        .iter()
        .flat_map(|doc| doc.chunks.iter().enumerate())
        .filter_map(|(n, chunk)| score_chunk(&search_query, n, chunk))
        .collect();

    clauses.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    clauses.truncate(MAX_CLAUSES);

    debug!(
        search_query = %search_query,
        chunks = index.chunk_count(),
        clauses = clauses.len(),
        "evidence search complete"
    );
    clauses
}

fn score_chunk(search_query: &str, n: usize, chunk: &Chunk) -> Option<Clause> {
    let score = relevance(search_query, &chunk.content);
    if score <= RELEVANCE_THRESHOLD {
        return None;
    }
    Some(Clause {
        id: format!("{}-clause-{}", chunk.doc_id, n),
        document_id: chunk.doc_id.clone(),
        content: chunk.content.clone(),
        category: ClauseCategory::classify(&chunk.content),
        confidence: score,
        section: format!(
            "Section {} (words {}-{})",
            n + 1,
            chunk.start_index,
            chunk.end_index
        ),
    })
}

/// Space-joined search terms: procedure, `age N`, location, `policy D`, in
/// that order, for whichever fields are present.
pub fn build_search_query(query: &StructuredQuery) -> String {
    let mut parts = Vec::new();
    if let Some(procedure) = &query.procedure {
        parts.push(procedure.clone());
    }
    if let Some(age) = query.age {
        parts.push(format!("age {}", age));
    }
    if let Some(location) = &query.location {
        parts.push(location.clone());
    }
    if let Some(duration) = &query.policy_duration {
        parts.push(format!("policy {}", duration));
    }
    parts.join(" ")
}

/// Fraction of search tokens that appear in `content`, where a token counts
/// as present if it contains, or is contained in, any content token.
/// Case-insensitive; 0 for an empty search string.
pub fn relevance(search_query: &str, content: &str) -> f64 {
    let query_lower = search_query.to_lowercase();
    let content_lower = content.to_lowercase();
    let query_words: Vec<&str> = query_lower.split_whitespace().collect();
    if query_words.is_empty() {
        return 0.0;
    }
    let content_words: Vec<&str> = content_lower.split_whitespace().collect();

    let matches = query_words
        .iter()
        .filter(|word| {
            content_words
                .iter()
                .any(|c| c.contains(*word) || word.contains(c))
        })
        .count();

    (matches as f64 / query_words.len() as f64).min(1.0)
}

/// Illustrative clauses used when nothing has been uploaded.
pub fn fallback_clauses() -> Vec<Clause> {
    vec![
        Clause {
            id: "clause-1".to_string(),
            document_id: "doc-1".to_string(),
            content: "Knee replacement surgery is covered under the comprehensive plan for \
                      patients aged 40-70 years with a minimum policy tenure of 2 months."
                .to_string(),
            category: ClauseCategory::SurgicalCoverage,
            confidence: 0.92,
            section: "Section 4.2 - Surgical Procedures".to_string(),
        },
        Clause {
            id: "clause-2".to_string(),
            document_id: "doc-2".to_string(),
            content: "Coverage is available across all major cities in India including Mumbai, \
                      Delhi, Bangalore, Chennai, Hyderabad, and Pune."
                .to_string(),
            category: ClauseCategory::GeographicCoverage,
            confidence: 0.85,
            section: "Section 1.3 - Geographic Coverage".to_string(),
        },
    ]
}
