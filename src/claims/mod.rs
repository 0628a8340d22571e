pub mod decide;
pub mod evaluate;
pub mod interpret;
pub mod prompts;
pub mod retrieve;
pub mod types;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::info;

use crate::config::Settings;
use crate::docs::DocumentIndex;
use crate::llm::LlmClient;

use types::{Clause, Decision, StructuredQuery};

/// How the model-backed stages do their work.
///
/// `External` calls the completion service and drops to the heuristic code
/// for that call whenever the service fails; `Heuristic` never leaves the
/// process.
pub enum Backend {
    External(Arc<LlmClient>),
    Heuristic,
}

impl Backend {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        match &settings.llm_api_key {
            Some(key) => Ok(Backend::External(Arc::new(LlmClient::new(
                key.clone(),
                settings.llm_base_url.clone(),
                settings.llm_model.clone(),
            )?))),
            None => Ok(Backend::Heuristic),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backend::External(_) => "llm",
            Backend::Heuristic => "heuristic",
        }
    }
}

/// Output of one pipeline run.
#[derive(Debug, Clone)]
pub struct ClaimAnalysis {
    pub query_id: String,
    pub query_text: String,
    pub parsed: StructuredQuery,
    pub decision: Decision,
    pub elapsed: Duration,
}

/// The interpret → retrieve → decide pipeline. Immutable once built; swap in
/// a new engine to change the credential.
pub struct ClaimEngine {
    backend: Backend,
}

impl ClaimEngine {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(Backend::from_settings(settings)?))
    }

    pub fn heuristic() -> Self {
        Self::new(Backend::Heuristic)
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub async fn parse(&self, text: &str) -> StructuredQuery {
        interpret::parse(&self.backend, text).await
    }

    pub fn search(&self, query: &StructuredQuery, index: &DocumentIndex) -> Vec<Clause> {
        retrieve::search(query, index)
    }

    pub async fn decide(&self, query: &StructuredQuery, clauses: Vec<Clause>) -> Decision {
        decide::decide(&self.backend, query, clauses).await
    }

    /// Run all three stages in order against one index snapshot.
    pub async fn analyze(&self, text: &str, index: &DocumentIndex) -> ClaimAnalysis {
        let started = Instant::now();
        let query_id = format!("query-{}", uuid::Uuid::new_v4());
        info!(
            query_id = %query_id,
            backend = self.backend.name(),
            documents = index.len(),
            "claim analysis started"
        );

        let parsed = self.parse(text).await;
        info!(query_id = %query_id, ?parsed, "query interpreted");

        let clauses = self.search(&parsed, index);
        info!(query_id = %query_id, clauses = clauses.len(), "evidence retrieved");

        let decision = decide::decide_for(&self.backend, &query_id, &parsed, clauses).await;
        let elapsed = started.elapsed();
        info!(
            query_id = %query_id,
            decision = %decision.outcome,
            confidence = decision.confidence,
            elapsed_ms = elapsed.as_millis() as u64,
            "claim analysis complete"
        );

        ClaimAnalysis {
            query_id,
            query_text: text.to_string(),
            parsed,
            decision,
            elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::types::{ClauseCategory, Gender, Outcome, CLAIM_CATEGORY};
    use crate::docs::test_support::text_document;
    use crate::llm::test_support;
    use wiremock::MockServer;

    const REFERENCE_QUERY: &str =
        "46-year-old male, knee surgery in Pune, 3-month-old insurance policy";

    #[test]
    fn test_backend_selected_by_credential() {
        let settings = Settings::default();
        assert_eq!(Backend::from_settings(&settings).unwrap().name(), "heuristic");

        let settings = settings.with_api_key(Some("sk-test"));
        assert_eq!(Backend::from_settings(&settings).unwrap().name(), "llm");
    }

    #[tokio::test]
    async fn test_reference_scenario_without_credential_or_documents() {
        let engine = ClaimEngine::from_settings(&Settings::default()).unwrap();
        let analysis = engine.analyze(REFERENCE_QUERY, &DocumentIndex::empty()).await;

        let parsed = &analysis.parsed;
        assert_eq!(parsed.age, Some(46));
        assert_eq!(parsed.gender, Some(Gender::Male));
        assert_eq!(parsed.procedure.as_deref(), Some("knee surgery"));
        assert_eq!(parsed.location.as_deref(), Some("Pune"));
        assert!(parsed.policy_duration.as_deref().unwrap().contains("3-month"));
        assert_eq!(parsed.category, CLAIM_CATEGORY);

        let decision = &analysis.decision;
        assert_eq!(decision.relevant_clauses, retrieve::fallback_clauses());
        assert_eq!(decision.outcome, Outcome::Approved);
        assert_eq!(decision.amount, Some(500_000.0));
        assert_eq!(decision.confidence, 0.89);
        assert_eq!(decision.query_id, analysis.query_id);
    }

    #[tokio::test]
    async fn test_over_age_scenario() {
        let engine = ClaimEngine::heuristic();
        let text = REFERENCE_QUERY.replace("46", "75");
        let analysis = engine.analyze(&text, &DocumentIndex::empty()).await;

        assert_eq!(analysis.parsed.age, Some(75));
        assert_eq!(analysis.decision.outcome, Outcome::Rejected);
        assert_eq!(analysis.decision.amount, None);
        assert_eq!(analysis.decision.confidence, 0.95);
    }

    #[tokio::test]
    async fn test_uploaded_documents_supply_evidence() {
        let policy = "Knee replacement surgery is covered for patients aged 40-70 in Pune \
                      with a minimum policy tenure of 2 months.";
        let index = DocumentIndex::new(vec![text_document("policy.txt", policy, 500)]);
        let analysis = ClaimEngine::heuristic().analyze(REFERENCE_QUERY, &index).await;

        let clauses = &analysis.decision.relevant_clauses;
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].document_id, index.documents()[0].id());
        assert_eq!(clauses[0].category, ClauseCategory::SurgicalCoverage);
    }

    #[tokio::test]
    async fn test_every_stage_survives_failing_service() {
        let server = MockServer::start().await;
        test_support::mount_status(&server, 503).await;
        let settings = Settings {
            llm_base_url: test_support::base_url(&server),
            ..Settings::default()
        }
        .with_api_key(Some("sk-test"));
        let engine = ClaimEngine::from_settings(&settings).unwrap();
        assert_eq!(engine.backend().name(), "llm");

        let parsed = engine.parse(REFERENCE_QUERY).await;
        assert_eq!(parsed, interpret::parse_heuristic(REFERENCE_QUERY));

        let clauses = engine.search(&parsed, &DocumentIndex::empty());
        assert_eq!(clauses, retrieve::fallback_clauses());

        let decision = engine.decide(&parsed, clauses).await;
        assert_eq!(decision.outcome, Outcome::Approved);
        assert_eq!(decision.amount, Some(500_000.0));
        assert_eq!(decision.confidence, 0.89);

        let received = server.received_requests().await.unwrap_or_default();
        assert_eq!(received.len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_service_falls_back() {
        let base_url = test_support::refused_base_url();
        let settings = Settings {
            llm_base_url: base_url,
            ..Settings::default()
        }
        .with_api_key(Some("sk-test"));
        let engine = ClaimEngine::from_settings(&settings).unwrap();

        let text = REFERENCE_QUERY.replace("46", "75");
        let analysis = engine.analyze(&text, &DocumentIndex::empty()).await;
        assert_eq!(analysis.decision.outcome, Outcome::Rejected);
        assert_eq!(analysis.decision.confidence, 0.95);
    }
}
