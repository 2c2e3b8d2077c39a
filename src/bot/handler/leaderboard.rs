use std::{collections::HashMap, sync::Arc};

use teloxide::{prelude::*, types::UserId};

use crate::bot::{
    dispatcher::HandlerResult,
    engine::{EngineError, LeaderboardEngine, LeaderboardView},
    processor::{view_leaderboard, ProcessError},
};

use super::{
    constants::{
        COMMAND_LEADERBOARD, COOLDOWN_LEADERBOARD, DELETE_AFTER_ERROR,
        LEADERBOARD_MAX_NAME_LOOKUPS, UNKNOWN_ERROR_MESSAGE,
    },
    utils::{
        assert_cooldown, delete_command_message, display_leaderboard, send_html_messages,
        send_temporary_message, Cooldowns,
    },
};

/* Utilities */

/* Looks up display names for the players in the view.
 * Group members are fetched from the chat, the requester's own entry first, and at most
 * LEADERBOARD_MAX_NAME_LOOKUPS of them. Players without a name are shown by id.
 */
async fn resolve_names(
    bot: &Bot,
    msg: &Message,
    view: &LeaderboardView,
) -> HashMap<String, String> {
    let mut names = HashMap::new();
    if let Some(sender) = msg.from() {
        names.insert(sender.id.to_string(), sender.full_name());
    }
    if msg.chat.is_private() {
        return names;
    }

    let mut lookups = 0;
    for entry in view.own.iter().chain(view.entries.iter()) {
        if lookups >= LEADERBOARD_MAX_NAME_LOOKUPS {
            break;
        }
        if names.contains_key(&entry.player_id) {
            continue;
        }
        let Ok(id) = entry.player_id.parse::<u64>() else {
            continue;
        };
        lookups += 1;
        match bot.get_chat_member(msg.chat.id, UserId(id)).await {
            Ok(member) => {
                names.insert(entry.player_id.clone(), member.user.full_name());
            }
            Err(err) => {
                log::debug!(
                    "Leaderboard - No member {} in chat {}: {}",
                    entry.player_id,
                    msg.chat.id,
                    err
                );
            }
        }
    }

    names
}

/* Leaderboard command.
 * Shows the top schmee scores, plus the sender's own standing if outside the top.
 */
pub async fn action_leaderboard(
    bot: Bot,
    msg: Message,
    size: String,
    engine: Arc<LeaderboardEngine>,
    cooldowns: Arc<Cooldowns>,
) -> HandlerResult {
    let Some(sender_id) = msg.from().map(|user| user.id.to_string()) else {
        return Ok(());
    };
    if !assert_cooldown(
        &bot,
        &msg,
        &cooldowns,
        COMMAND_LEADERBOARD,
        COOLDOWN_LEADERBOARD,
    )
    .await?
    {
        return Ok(());
    }

    match view_leaderboard(&engine, &sender_id, &size) {
        Ok(view) => {
            let names = resolve_names(&bot, &msg, &view).await;
            send_html_messages(&bot, &msg, &display_leaderboard(&view, &names)).await?;
            delete_command_message(&bot, &msg).await;

            log::info!(
                "Leaderboard - User {} viewed {} of {} players in chat {}",
                sender_id,
                view.entries.len(),
                view.total,
                msg.chat.id
            );
        }
        Err(ProcessError::EngineError(EngineError::InvalidInput(reason))) => {
            send_temporary_message(&bot, &msg, reason, DELETE_AFTER_ERROR).await?;
        }
        Err(err) => {
            send_temporary_message(&bot, &msg, UNKNOWN_ERROR_MESSAGE, DELETE_AFTER_ERROR).await?;
            log::error!(
                "Leaderboard - User {} failed to view leaderboard in chat {}: {}",
                sender_id,
                msg.chat.id,
                err.to_string()
            );
        }
    }

    Ok(())
}
