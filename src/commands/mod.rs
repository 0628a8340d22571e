mod analyze;
mod config;
mod documents;
mod evaluate;
mod manage;
mod upload;

use crate::state::Context;

/// ClaimIQ - insurance claim decisions from your policy documents
#[poise::command(
    slash_command,
    subcommands(
        "analyze::analyze",
        "upload::upload",
        "documents::documents",
        "manage::remove",
        "manage::clear",
        "evaluate::evaluate",
        "config::config"
    )
)]
pub async fn claim(_ctx: Context<'_>) -> Result<(), anyhow::Error> {
    Ok(())
}

/// Session key for the invoking user.
fn session_key(ctx: &Context<'_>) -> u64 {
    ctx.author().id.get()
}

/// Send a message in Discord-safe chunks (max 1990 chars).
/// Uses ctx.say() for all chunks: poise routes follow-ups through the
/// interaction webhook, which doesn't require Send Messages channel permission.
async fn send_chunked(ctx: &Context<'_>, text: &str) -> Result<(), anyhow::Error> {
    for chunk in split_message(text, 1990) {
        ctx.say(chunk).await?;
    }
    Ok(())
}

/// Split on the last newline (or space) before `limit` bytes, never inside a
/// UTF-8 character.
fn split_message(text: &str, limit: usize) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        if remaining.len() <= limit {
            parts.push(remaining);
            break;
        }
        let mut hard = limit;
        while !remaining.is_char_boundary(hard) {
            hard -= 1;
        }
        if hard == 0 {
            hard = remaining.chars().next().map(char::len_utf8).unwrap_or(1);
        }
        let split_at = remaining[..hard]
            .rfind('\n')
            .or_else(|| remaining[..hard].rfind(' '))
            .map(|i| i + 1)
            .unwrap_or(hard);
        parts.push(&remaining[..split_at]);
        remaining = &remaining[split_at..];
    }
    parts
}
