use tracing::info;

use claimiq::claims::evaluate::{self, default_test_cases, EvaluationMetrics};

use super::{send_chunked, session_key};
use crate::state::Context;

/// Score decision accuracy on the labeled sample claims
#[poise::command(slash_command, guild_only)]
pub async fn evaluate(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let index = ctx.data().sessions.snapshot(session_key(&ctx)).await;
    if index.is_empty() {
        ctx.say("Please upload documents first to run evaluation (`/claim upload`).")
            .await?;
        return Ok(());
    }

    ctx.defer().await?;

    let engine = ctx.data().engine().await;
    let cases = default_test_cases();
    info!(
        user = ctx.author().name,
        cases = cases.len(),
        backend = engine.backend().name(),
        "Evaluation started"
    );

    let metrics = evaluate::evaluate(&engine, &cases, &index).await;

    let mut output = render_metrics(&metrics);
    output.push_str("\n**Test cases:**\n");
    for case in &cases {
        let amount = case
            .expected_amount
            .map(|a| format!(" ({})", claimiq::claims::types::format_inr(a)))
            .unwrap_or_default();
        output.push_str(&format!(
            "- {} → {}{}\n",
            case.query, case.expected_decision, amount
        ));
    }

    send_chunked(&ctx, &output).await
}

fn render_metrics(metrics: &EvaluationMetrics) -> String {
    format!(
        "**Model Accuracy Evaluation**\n\
         Accuracy: {:.1}%\n\
         Precision: {:.1}%\n\
         Recall: {:.1}%\n\
         F1 Score: {:.3}\n\
         Avg Response Time: {:.0}ms\n\
         Avg Confidence: {:.1}%\n\
         _Precision, recall and F1 mirror accuracy: only right/wrong is tracked per case._\n",
        metrics.accuracy * 100.0,
        metrics.precision * 100.0,
        metrics.recall * 100.0,
        metrics.f1_score,
        metrics.response_time,
        metrics.confidence_score * 100.0,
    )
}
