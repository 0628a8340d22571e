use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::docs::types::DocId;

/// Category tag carried by every structured query.
pub const CLAIM_CATEGORY: &str = "insurance-claim";

fn claim_category() -> String {
    CLAIM_CATEGORY.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Gender {
    Male,
    Female,
}

impl TryFrom<String> for Gender {
    type Error = String;

    /// Accepts any spelling starting with `m` or `f` ("M", "Male", "female").
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('m') => Ok(Gender::Male),
            Some('f') => Ok(Gender::Female),
            _ => Err(format!("unrecognized gender: {:?}", value)),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => f.write_str("male"),
            Gender::Female => f.write_str("female"),
        }
    }
}

/// Attributes extracted from a free-text claim description. Every field but
/// `category` is present only if it was found in the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default = "claim_category")]
    pub category: String,
}

impl Default for StructuredQuery {
    fn default() -> Self {
        Self {
            age: None,
            gender: None,
            procedure: None,
            location: None,
            policy_duration: None,
            amount: None,
            category: claim_category(),
        }
    }
}

impl StructuredQuery {
    /// Enforce the field invariants on a query that came from outside
    /// (model output): positive age and amount, non-blank text, fixed category.
    pub fn normalized(self) -> Self {
        fn text(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        Self {
            age: self.age.filter(|a| *a > 0),
            gender: self.gender,
            procedure: text(self.procedure),
            location: text(self.location),
            policy_duration: text(self.policy_duration),
            amount: self.amount.filter(|a| a.is_finite() && *a > 0.0),
            category: claim_category(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClauseCategory {
    SurgicalCoverage,
    Eligibility,
    WaitingPeriod,
    GeographicCoverage,
    EmergencyCoverage,
    General,
}

/// Keyword rules in priority order; the first rule with a hit wins.
const CATEGORY_RULES: &[(&[&str], ClauseCategory)] = &[
    (&["surgery", "surgical"], ClauseCategory::SurgicalCoverage),
    (&["age", "eligibility"], ClauseCategory::Eligibility),
    (&["waiting", "period"], ClauseCategory::WaitingPeriod),
    (&["geographic", "location"], ClauseCategory::GeographicCoverage),
    (&["emergency"], ClauseCategory::EmergencyCoverage),
];

impl ClauseCategory {
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();
        CATEGORY_RULES
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(_, category)| *category)
            .unwrap_or(ClauseCategory::General)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClauseCategory::SurgicalCoverage => "surgical-coverage",
            ClauseCategory::Eligibility => "eligibility",
            ClauseCategory::WaitingPeriod => "waiting-period",
            ClauseCategory::GeographicCoverage => "geographic-coverage",
            ClauseCategory::EmergencyCoverage => "emergency-coverage",
            ClauseCategory::General => "general",
        }
    }
}

impl fmt::Display for ClauseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scored, categorized excerpt of policy text offered as evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clause {
    pub id: String,
    pub document_id: DocId,
    pub content: String,
    pub category: ClauseCategory,
    /// Similarity score in [0, 1]; used for ranking and shown as a percentage.
    pub confidence: f64,
    pub section: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Approved,
    Rejected,
    Pending,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Approved => f.write_str("approved"),
            Outcome::Rejected => f.write_str("rejected"),
            Outcome::Pending => f.write_str("pending"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub id: String,
    pub query_id: String,
    #[serde(rename = "decision")]
    pub outcome: Outcome,
    /// Only ever `Some` with a positive value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    pub confidence: f64,
    pub justification: String,
    pub relevant_clauses: Vec<Clause>,
    pub created_at: DateTime<Utc>,
}

impl Decision {
    pub fn new(
        query_id: impl Into<String>,
        outcome: Outcome,
        amount: Option<f64>,
        confidence: f64,
        justification: impl Into<String>,
        relevant_clauses: Vec<Clause>,
    ) -> Self {
        Self {
            id: format!("decision-{}", uuid::Uuid::new_v4()),
            query_id: query_id.into(),
            outcome,
            amount: amount.filter(|a| a.is_finite() && *a > 0.0),
            confidence: if confidence.is_finite() {
                confidence.clamp(0.0, 1.0)
            } else {
                0.0
            },
            justification: justification.into(),
            relevant_clauses,
            created_at: Utc::now(),
        }
    }

    /// `₹5,00,000`, or "no coverage amount" when there is none.
    pub fn amount_label(&self) -> String {
        match self.amount {
            Some(amount) => format_inr(amount),
            None => "no coverage amount".to_string(),
        }
    }

    pub fn export(&self) -> DecisionExport {
        DecisionExport {
            decision: self.outcome,
            amount: self.amount,
            confidence: self.confidence,
            justification: self.justification.clone(),
            relevant_clauses: self
                .relevant_clauses
                .iter()
                .map(|c| ExportedClause {
                    section: c.section.clone(),
                    content: c.content.clone(),
                    confidence: c.confidence,
                })
                .collect(),
            timestamp: self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// The JSON shape downstream consumers read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionExport {
    pub decision: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    pub confidence: f64,
    pub justification: String,
    pub relevant_clauses: Vec<ExportedClause>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedClause {
    pub section: String,
    pub content: String,
    pub confidence: f64,
}

/// Rupee amount with Indian digit grouping (last three digits, then pairs).
pub fn format_inr(amount: f64) -> String {
    let rounded = amount.round().max(0.0) as u64;
    let digits = rounded.to_string();
    if digits.len() <= 3 {
        return format!("₹{}", digits);
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("₹{},{}", groups.join(","), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_priority_order() {
        assert_eq!(
            ClauseCategory::classify("Surgical procedures for all age groups"),
            ClauseCategory::SurgicalCoverage
        );
        assert_eq!(
            ClauseCategory::classify("Eligibility: waiting period applies"),
            ClauseCategory::Eligibility
        );
        assert_eq!(
            ClauseCategory::classify("A waiting period of 30 days"),
            ClauseCategory::WaitingPeriod
        );
        assert_eq!(
            ClauseCategory::classify("Geographic limits apply"),
            ClauseCategory::GeographicCoverage
        );
        assert_eq!(
            ClauseCategory::classify("EMERGENCY care from day one"),
            ClauseCategory::EmergencyCoverage
        );
        assert_eq!(
            ClauseCategory::classify("Claims must be submitted within 30 days"),
            ClauseCategory::General
        );
    }

    #[test]
    fn test_category_serializes_kebab_case() {
        let json = serde_json::to_string(&ClauseCategory::GeographicCoverage).unwrap();
        assert_eq!(json, "\"geographic-coverage\"");
        assert_eq!(ClauseCategory::WaitingPeriod.to_string(), "waiting-period");
    }

    #[test]
    fn test_gender_accepts_loose_spellings() {
        let q: StructuredQuery = serde_json::from_str(r#"{"gender": "M"}"#).unwrap();
        assert_eq!(q.gender, Some(Gender::Male));
        let q: StructuredQuery = serde_json::from_str(r#"{"gender": "Female"}"#).unwrap();
        assert_eq!(q.gender, Some(Gender::Female));
        assert!(serde_json::from_str::<StructuredQuery>(r#"{"gender": "unknown"}"#).is_err());
    }

    #[test]
    fn test_query_defaults_category() {
        let q: StructuredQuery = serde_json::from_str(r#"{"age": 46}"#).unwrap();
        assert_eq!(q.category, CLAIM_CATEGORY);
        assert_eq!(q.age, Some(46));
    }

    #[test]
    fn test_normalized_enforces_invariants() {
        let q = StructuredQuery {
            age: Some(0),
            procedure: Some("  ".to_string()),
            location: Some(" Pune ".to_string()),
            amount: Some(-5.0),
            category: "other".to_string(),
            ..Default::default()
        }
        .normalized();
        assert_eq!(q.age, None);
        assert_eq!(q.procedure, None);
        assert_eq!(q.location.as_deref(), Some("Pune"));
        assert_eq!(q.amount, None);
        assert_eq!(q.category, CLAIM_CATEGORY);
    }

    #[test]
    fn test_query_serializes_camel_case_without_absent_fields() {
        let q = StructuredQuery {
            policy_duration: Some("3-month".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&q).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "policyDuration": "3-month", "category": "insurance-claim" })
        );
    }

    #[test]
    fn test_decision_drops_non_positive_amount() {
        let d = Decision::new("q", Outcome::Rejected, Some(0.0), 0.95, "no", vec![]);
        assert_eq!(d.amount, None);
        assert_eq!(d.amount_label(), "no coverage amount");

        let d = Decision::new("q", Outcome::Approved, Some(500000.0), 1.7, "yes", vec![]);
        assert_eq!(d.amount_label(), "₹5,00,000");
        assert_eq!(d.confidence, 1.0);
    }

    #[test]
    fn test_export_shape() {
        let clause = Clause {
            id: "c1".to_string(),
            document_id: "doc".to_string(),
            content: "Knee surgery is covered.".to_string(),
            category: ClauseCategory::SurgicalCoverage,
            confidence: 0.92,
            section: "Section 4.2".to_string(),
        };
        let d = Decision::new("q", Outcome::Rejected, None, 0.95, "too old", vec![clause]);
        let value = serde_json::to_value(d.export()).unwrap();

        let keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert!(!keys.contains(&"amount"));
        assert_eq!(value["decision"], "rejected");
        assert_eq!(value["justification"], "too old");
        assert_eq!(
            value["relevantClauses"],
            serde_json::json!([{
                "section": "Section 4.2",
                "content": "Knee surgery is covered.",
                "confidence": 0.92
            }])
        );
        assert!(value["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_format_inr() {
        assert_eq!(format_inr(0.0), "₹0");
        assert_eq!(format_inr(999.0), "₹999");
        assert_eq!(format_inr(1000.0), "₹1,000");
        assert_eq!(format_inr(300000.0), "₹3,00,000");
        assert_eq!(format_inr(1000000.0), "₹10,00,000");
        assert_eq!(format_inr(123456789.0), "₹12,34,56,789");
    }
}
