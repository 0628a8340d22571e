use poise::CreateReply;

use crate::state::Context;

/// Configure the LLM backend (admin only)
#[poise::command(slash_command, guild_only)]
pub async fn config(
    ctx: Context<'_>,
    #[description = "api_key | model | base_url"] param: Option<String>,
    #[description = "New value (omit with api_key to clear it)"] value: Option<String>,
) -> Result<(), anyhow::Error> {
    let user_id = ctx.author().id.get();
    if !ctx.data().is_admin(user_id) {
        ctx.say("This command is admin-only.").await?;
        return Ok(());
    }

    let current = ctx.data().settings.read().await.clone();

    let message = match (param.as_deref(), value) {
        // Show current config
        (None, _) => format!(
            "**ClaimIQ Configuration:**\n\
             `backend`: {}\n\
             `api_key`: {}\n\
             `model`: {}\n\
             `base_url`: {}\n\
             `chunk_size`: {}",
            if current.has_api_key() { "llm" } else { "heuristic" },
            current.masked_api_key(),
            current.llm_model,
            current.llm_base_url,
            current.chunk_size
        ),
        (Some("api_key"), value) => {
            let updated = current.with_api_key(value.as_deref());
            let enabled = updated.has_api_key();
            ctx.data().reconfigure(updated).await?;
            if enabled {
                "API key saved. Claims now go through the LLM, with heuristic fallback.".to_string()
            } else {
                "API key cleared. Claims now use the heuristic pipeline.".to_string()
            }
        }
        (Some("model"), Some(model)) => {
            let updated = claimiq::config::Settings {
                llm_model: model.trim().to_string(),
                ..current
            };
            ctx.data().reconfigure(updated).await?;
            format!("`model` set to {}", model.trim())
        }
        (Some("base_url"), Some(url)) => {
            let updated = claimiq::config::Settings {
                llm_base_url: url.trim().to_string(),
                ..current
            };
            ctx.data().reconfigure(updated).await?;
            format!("`base_url` set to {}", url.trim())
        }
        (Some(key @ ("model" | "base_url")), None) => format!(
            "Provide a value. Example: `/claim config {} <value>`",
            key
        ),
        (Some(key), _) => format!(
            "Unknown param `{}`. Valid: `api_key`, `model`, `base_url`",
            key
        ),
    };

    // Replies may echo configuration, keep them to the admin
    ctx.send(CreateReply::default().content(message).ephemeral(true))
        .await?;
    Ok(())
}
