use super::types::{Clause, StructuredQuery};

pub fn query_extraction_prompt(query: &str) -> String {
    format!(
        r#"Parse the following insurance query and extract structured information:
Query: "{query}"

Extract and return JSON with these fields:
- age: number (if mentioned)
- gender: "male" | "female" (if mentioned)
- procedure: string (medical procedure if mentioned)
- location: string (city/location if mentioned)
- policyDuration: string (policy tenure if mentioned)
- amount: number (claim amount if mentioned)
- category: string (always "insurance-claim")

Return only valid JSON, no additional text."#
    )
}

pub fn decision_prompt(query: &StructuredQuery, clauses: &[Clause]) -> String {
    let query_json = serde_json::to_string_pretty(query).unwrap_or_else(|_| "{}".to_string());
    let clause_lines = clauses
        .iter()
        .map(|c| format!("- {}: {}", c.section, c.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Based on the following insurance query and policy clauses, make a decision:

Query Details:
{query_json}

Relevant Policy Clauses:
{clause_lines}

Analyze the query against the clauses and return a JSON decision with:
- decision: "approved" | "rejected" | "pending"
- amount: number (coverage amount if applicable)
- confidence: number (0-1, confidence in decision)
- justification: string (detailed explanation)

Consider factors like age eligibility, procedure coverage, policy tenure, and geographic coverage.
Return only valid JSON, no additional text."#
    )
}
