use teloxide::{prelude::*, utils::command::BotCommands};

use crate::bot::dispatcher::{Command, HandlerResult, State, UserDialogue};

use super::constants::{
    COMMAND_FLIP, COMMAND_HELP, COMMAND_LEADERBOARD, COMMAND_ROLL, COMMAND_SCHMEE, COMMAND_TEAMS,
};

/* Invalid state.
 * This action is invoked when the bot is in start state, and there is a non-command message
 * addressed to it.
 * Currently, simply does not respond to anything. Reduces spam.
 */
pub async fn invalid_state(_bot: Bot, _msg: Message) -> HandlerResult {
    Ok(())
}

/* Start command.
 * Displays a welcome message to the user.
 */
pub async fn action_start(bot: Bot, msg: Message) -> HandlerResult {
    let introduction = "👋 Hello! I'm SchmeeBot, here for your small group games! 🎲";
    let games_info = format!("🎯 {COMMAND_ROLL} some dice, {COMMAND_FLIP} a coin, or let me pick {COMMAND_TEAMS} for you.");
    let schmee_info = format!("🏆 Feeling lucky? Try {COMMAND_SCHMEE} and climb the {COMMAND_LEADERBOARD}!");
    let closing = format!("🤗 Ask me for {COMMAND_HELP} anytime!");

    bot.send_message(
        msg.chat.id,
        format!("{introduction}\n\n{games_info}\n\n{schmee_info}\n\n{closing}"),
    )
    .await?;
    Ok(())
}

/* Help command.
 * Displays a list of commands available to the user.
 */
pub async fn action_help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

/* Cancel command.
 * Leaves whatever the bot was waiting for in this chat.
 */
pub async fn action_cancel(bot: Bot, dialogue: UserDialogue, msg: Message) -> HandlerResult {
    match dialogue.get_or_default().await? {
        State::Start => {
            bot.send_message(
                msg.chat.id,
                "I'm not doing anything... 👀\nThere's nothing to cancel!",
            )
            .await?;
        }
        State::TeamsNames { .. } => {
            dialogue.exit().await?;
            bot.send_message(msg.chat.id, "Okay, no teams then! 👋")
                .await?;
        }
    }
    Ok(())
}
