use super::{send_chunked, session_key};
use crate::state::Context;

/// List the policy documents in your session
#[poise::command(slash_command, guild_only)]
pub async fn documents(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let index = ctx.data().sessions.snapshot(session_key(&ctx)).await;

    if index.is_empty() {
        ctx.say(
            "No documents uploaded yet. Use `/claim upload` to add some. \
             Until then `/claim analyze` answers with sample clauses.",
        )
        .await?;
        return Ok(());
    }

    let mut output = format!(
        "**Uploaded Documents** ({} document(s), {} chunk(s))\n\n",
        index.len(),
        index.chunk_count()
    );
    for doc in index.documents() {
        let size_kb = doc.document.size / 1024;
        output.push_str(&format!(
            "  - {} ({} KB, {} words, {} chunks) — `{}`\n    Type: {} | Uploaded: {}\n",
            doc.name(),
            size_kb,
            doc.word_count,
            doc.chunks.len(),
            &doc.id()[..12],
            doc.document.media_type,
            doc.document.uploaded_at.format("%Y-%m-%d %H:%M UTC"),
        ));
    }

    send_chunked(&ctx, &output).await
}
