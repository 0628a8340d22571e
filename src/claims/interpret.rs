//! Query interpretation: free text in, `StructuredQuery` out.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use super::prompts;
use super::types::{Gender, StructuredQuery};
use super::Backend;
use crate::llm::{LlmClient, LlmError};

const KNOWN_PROCEDURES: &[&str] = &[
    "knee surgery",
    "appendectomy",
    "heart bypass",
    "cataract surgery",
];

const KNOWN_LOCATIONS: &[&str] = &["pune", "mumbai", "delhi", "bangalore", "chennai"];

struct Patterns {
    age: Regex,
    gender: Regex,
    duration: Regex,
    age_descriptor: Regex,
}

static PATTERNS: LazyLock<Patterns> = LazyLock::new(|| Patterns {
    age: Regex::new(r"\d{1,2}").expect("valid age pattern"),
    gender: Regex::new(r"(?i)male|female|m|f").expect("valid gender pattern"),
    duration: Regex::new(r"(?i)\d+[^\d]*?(?:month|year|yr)").expect("valid duration pattern"),
    // "46-year-old", "46 years old": describes the claimant, not the policy
    age_descriptor: Regex::new(r"(?i)^s?[\s-]*old\b").expect("valid descriptor pattern"),
});

/// Turn a claim description into a structured query. Never fails: model
/// errors fall back to the heuristic extractor.
pub async fn parse(backend: &Backend, text: &str) -> StructuredQuery {
    match backend {
        Backend::Heuristic => parse_heuristic(text),
        Backend::External(llm) => match parse_with_llm(llm, text).await {
            Ok(query) => query,
            Err(e) => {
                warn!(error = %e, "LLM query parsing failed, using heuristic parser");
                parse_heuristic(text)
            }
        },
    }
}

async fn parse_with_llm(llm: &LlmClient, text: &str) -> Result<StructuredQuery, LlmError> {
    let prompt = prompts::query_extraction_prompt(text);
    let query: StructuredQuery = llm.complete_json(&prompt).await?;
    debug!(?query, "LLM parsed query");
    Ok(query.normalized())
}

/// Pattern-matching extractor. Each field is found independently; a field
/// with no match stays unset.
pub fn parse_heuristic(text: &str) -> StructuredQuery {
    let lower = text.to_lowercase();

    StructuredQuery {
        age: extract_age(text),
        gender: extract_gender(text),
        procedure: KNOWN_PROCEDURES
            .iter()
            .find(|p| lower.contains(*p))
            .map(|p| p.to_string()),
        location: KNOWN_LOCATIONS
            .iter()
            .find(|l| lower.contains(*l))
            .map(|l| capitalize(l)),
        policy_duration: extract_policy_duration(text),
        amount: None,
        ..Default::default()
    }
}

fn extract_age(text: &str) -> Option<u32> {
    PATTERNS
        .age
        .find(text)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|age| *age > 0)
}

fn extract_gender(text: &str) -> Option<Gender> {
    let m = PATTERNS.gender.find(text)?;
    if m.as_str().to_lowercase().starts_with('m') {
        Some(Gender::Male)
    } else {
        Some(Gender::Female)
    }
}

fn extract_policy_duration(text: &str) -> Option<String> {
    let candidates: Vec<regex::Match<'_>> = PATTERNS.duration.find_iter(text).collect();
    let describes_person = |m: &regex::Match<'_>| {
        let unit_is_year = !m.as_str().to_lowercase().ends_with("month");
        unit_is_year && PATTERNS.age_descriptor.is_match(&text[m.end()..])
    };

    candidates
        .iter()
        .find(|m| !describes_person(*m))
        .or_else(|| candidates.first())
        .map(|m| m.as_str().to_string())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
