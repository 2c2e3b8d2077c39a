use std::sync::Arc;

use teloxide::{prelude::*, types::ParseMode};

use crate::bot::{
    dispatcher::HandlerResult,
    draw::ScoreDraw,
    engine::LeaderboardEngine,
    processor::play_schmee,
};

use super::{
    constants::{COMMAND_SCHMEE, COOLDOWN_SCHMEE, DELETE_AFTER_ERROR, UNKNOWN_ERROR_MESSAGE},
    utils::{
        assert_cooldown, delete_command_message, display_outcome, display_schmee, mention,
        send_temporary_message, Cooldowns,
    },
};

/* Schmee command.
 * Draws a score for the sender and records it on the leaderboard.
 * In group chats the reply mentions the player, since the command message is deleted.
 */
pub async fn action_schmee(
    bot: Bot,
    msg: Message,
    engine: Arc<LeaderboardEngine>,
    draw: Arc<dyn ScoreDraw>,
    cooldowns: Arc<Cooldowns>,
) -> HandlerResult {
    let Some(user) = msg.from().cloned() else {
        return Ok(());
    };
    if !assert_cooldown(&bot, &msg, &cooldowns, COMMAND_SCHMEE, COOLDOWN_SCHMEE).await? {
        return Ok(());
    }

    let player_id = user.id.to_string();
    match play_schmee(&engine, draw.as_ref(), &player_id) {
        Ok((score, outcome)) => {
            let schmee = display_schmee(score);
            let text = if msg.chat.is_private() {
                format!("{schmee}\n{}", display_outcome(&outcome))
            } else {
                format!("{} {schmee}\n{}", mention(&user), display_outcome(&outcome))
            };

            delete_command_message(&bot, &msg).await;
            bot.send_message(msg.chat.id, text)
                .parse_mode(ParseMode::Html)
                .await?;

            log::info!(
                "Schmee - User {} scored {} in chat {} (recorded: {})",
                player_id,
                score,
                msg.chat.id,
                outcome.is_improvement()
            );
        }
        Err(err) => {
            cooldowns.release(user.id, COMMAND_SCHMEE);
            send_temporary_message(&bot, &msg, UNKNOWN_ERROR_MESSAGE, DELETE_AFTER_ERROR).await?;
            log::error!(
                "Schmee - User {} failed to record a score in chat {}: {}",
                player_id,
                msg.chat.id,
                err.to_string()
            );
        }
    }

    Ok(())
}
