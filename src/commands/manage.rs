use tracing::info;

use super::session_key;
use crate::state::Context;

/// Remove one document from your session
#[poise::command(slash_command, guild_only)]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Document name or ID prefix"] document: String,
) -> Result<(), anyhow::Error> {
    let session = session_key(&ctx);
    match ctx.data().sessions.remove(session, &document).await {
        Some(doc) => {
            info!(user = ctx.author().name, doc_id = %doc.id(), "Document removed");
            let remaining = ctx.data().sessions.snapshot(session).await.len();
            ctx.say(format!(
                "Removed **{}**. {} document(s) left in your session.",
                doc.name(),
                remaining
            ))
            .await?;
        }
        None => {
            ctx.say(format!(
                "No document matching `{}`. See `/claim documents`.",
                document
            ))
            .await?;
        }
    }
    Ok(())
}

/// Clear all documents from your session
#[poise::command(slash_command, guild_only)]
pub async fn clear(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let removed = ctx.data().sessions.clear(session_key(&ctx)).await;
    info!(user = ctx.author().name, removed, "Session cleared");
    ctx.say(format!("Session cleared ({} document(s) removed).", removed))
        .await?;
    Ok(())
}
