use tracing::info;

use claimiq::claims::ClaimAnalysis;

use super::{send_chunked, session_key};
use crate::state::Context;

/// Analyze a claim against your uploaded policy documents
#[poise::command(slash_command, guild_only)]
pub async fn analyze(
    ctx: Context<'_>,
    #[description = "Claim description, e.g. \"46M, knee surgery in Pune, 3-month policy\""]
    query: String,
) -> Result<(), anyhow::Error> {
    ctx.defer().await?;

    // One engine and one index snapshot for the whole run
    let engine = ctx.data().engine().await;
    let index = ctx.data().sessions.snapshot(session_key(&ctx)).await;

    info!(
        user = ctx.author().name,
        query,
        documents = index.len(),
        "Claim analysis requested"
    );

    let analysis = engine.analyze(&query, &index).await;
    send_chunked(&ctx, &render_analysis(&analysis, index.is_empty())).await
}

fn render_analysis(analysis: &ClaimAnalysis, demo_evidence: bool) -> String {
    let decision = &analysis.decision;
    let mut out = format!(
        "**Claim:** {}\n\
         **Decision:** {} | **Amount:** {} | **Confidence:** {:.0}%\n\n\
         **Justification:** {}\n",
        analysis.query_text,
        decision.outcome.to_string().to_uppercase(),
        decision.amount_label(),
        decision.confidence * 100.0,
        decision.justification,
    );

    if decision.relevant_clauses.is_empty() {
        out.push_str("\n_No policy clause matched this claim._\n");
    } else {
        out.push_str("\n**Evidence:**\n");
        if demo_evidence {
            out.push_str("_No documents uploaded; showing sample clauses._\n");
        }
        for clause in &decision.relevant_clauses {
            out.push_str(&format!(
                "- **{}** [{}, {:.0}%]\n  {}\n",
                clause.section,
                clause.category,
                clause.confidence * 100.0,
                clause.content
            ));
        }
    }

    let export = serde_json::to_string_pretty(&decision.export())
        .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e));
    out.push_str(&format!(
        "\n_Processed in {} ms_\n```json\n{}\n```",
        analysis.elapsed.as_millis(),
        export
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimiq::claims::ClaimEngine;
    use claimiq::docs::DocumentIndex;

    #[tokio::test]
    async fn test_render_rejected_claim() {
        let analysis = ClaimEngine::heuristic()
            .analyze("75M, knee surgery, Delhi, 1-year policy", &DocumentIndex::empty())
            .await;
        let text = render_analysis(&analysis, true);

        assert!(text.contains("**Decision:** REJECTED"));
        assert!(text.contains("no coverage amount"));
        assert!(text.contains("**Confidence:** 95%"));
        assert!(text.contains("showing sample clauses"));
        assert!(text.contains("Section 4.2 - Surgical Procedures"));
        assert!(text.contains("\"decision\": \"rejected\""));
        assert!(!text.contains("\"amount\""));
    }
}
