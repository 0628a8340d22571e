use poise::serenity_prelude as serenity;
use tracing::{info, warn};

use claimiq::docs::ingest::Upload;

use super::{send_chunked, session_key};
use crate::state::Context;

/// Upload policy documents (plain text, markdown or HTML) for claim analysis
#[poise::command(slash_command, guild_only)]
pub async fn upload(
    ctx: Context<'_>,
    #[description = "Policy document"] file: serenity::Attachment,
    #[description = "Another policy document"] file2: Option<serenity::Attachment>,
    #[description = "Another policy document"] file3: Option<serenity::Attachment>,
) -> Result<(), anyhow::Error> {
    ctx.defer().await?;

    let session = session_key(&ctx);
    let chunk_size = ctx.data().settings.read().await.chunk_size;
    let attachments: Vec<serenity::Attachment> =
        std::iter::once(file).chain(file2).chain(file3).collect();

    info!(
        user = ctx.author().name,
        files = attachments.len(),
        "Upload started"
    );

    // One file at a time; each success is visible to queries immediately and
    // stays even if a later file fails.
    let mut report = String::from("**Upload results**\n");
    for attachment in &attachments {
        let bytes = match attachment.download().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(name = %attachment.filename, error = %e, "Attachment download failed");
                report.push_str(&format!(
                    "- ❌ **{}**: download failed ({})\n",
                    attachment.filename, e
                ));
                continue;
            }
        };

        let upload = Upload {
            name: attachment.filename.clone(),
            media_type: attachment.content_type.clone(),
            bytes,
        };

        match ctx.data().sessions.ingest(session, &upload, chunk_size).await {
            Ok(doc) => report.push_str(&format!(
                "- ✅ **{}**: {} words in {} chunk(s) — `{}`\n",
                doc.name(),
                doc.word_count,
                doc.chunks.len(),
                &doc.id()[..12]
            )),
            Err(e) => report.push_str(&format!("- ❌ **{}**: {}\n", upload.name, e)),
        }
    }

    let index = ctx.data().sessions.snapshot(session).await;
    report.push_str(&format!(
        "\nSession now holds {} document(s), {} chunk(s).",
        index.len(),
        index.chunk_count()
    ));

    send_chunked(&ctx, &report).await
}
