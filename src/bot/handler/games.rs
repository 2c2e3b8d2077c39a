use std::sync::Arc;

use teloxide::{prelude::*, types::UserId};

use crate::bot::{
    dispatcher::{HandlerResult, State, UserDialogue},
    processor::{flip_coin, parse_dice, roll_dice, split_teams, ProcessError},
};

use super::{
    constants::{
        COMMAND_CANCEL, COMMAND_FLIP, COMMAND_ROLL, COMMAND_TEAMS, COOLDOWN_FLIP, COOLDOWN_ROLL,
        COOLDOWN_TEAMS, DELETE_AFTER_ERROR, DELETE_AFTER_FLIP,
    },
    utils::{assert_cooldown, delete_command_message, send_temporary_message, Cooldowns},
};

/* Utilities */

fn sender_id(msg: &Message) -> String {
    msg.from()
        .map(|user| user.id.to_string())
        .unwrap_or_default()
}

// Only the user who ran the teams command may answer its prompt.
fn answers_prompt(sender: Option<UserId>, requester: UserId) -> bool {
    sender == Some(requester)
}

async fn send_teams(bot: &Bot, msg: &Message, names: &str) -> HandlerResult {
    let teams = split_teams(&mut rand::rng(), names);
    match teams {
        Ok((first, second)) => {
            bot.send_message(
                msg.chat.id,
                format!(
                    "Team 1: {}\nTeam 2: {}",
                    first.join(", "),
                    second.join(", ")
                ),
            )
            .await?;
            log::info!(
                "Teams - User {} split {} players in chat {}",
                sender_id(msg),
                first.len() + second.len(),
                msg.chat.id
            );
        }
        Err(err) => {
            send_temporary_message(bot, msg, err.to_string(), DELETE_AFTER_ERROR).await?;
        }
    }
    Ok(())
}

/* Roll command.
 * Rolls dice in NdN format, defaulting to a single six-sided die.
 */
pub async fn action_roll(
    bot: Bot,
    msg: Message,
    dice: String,
    cooldowns: Arc<Cooldowns>,
) -> HandlerResult {
    if !assert_cooldown(&bot, &msg, &cooldowns, COMMAND_ROLL, COOLDOWN_ROLL).await? {
        return Ok(());
    }

    match parse_dice(&dice) {
        Ok(dice) => {
            let results = roll_dice(&mut rand::rng(), dice);
            let text = results
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<String>>()
                .join(", ");
            delete_command_message(&bot, &msg).await;
            bot.send_message(msg.chat.id, text).await?;
            log::info!(
                "Roll - User {} rolled {}d{} in chat {}",
                sender_id(&msg),
                dice.rolls,
                dice.sides,
                msg.chat.id
            );
        }
        Err(err @ ProcessError::InvalidDice(_)) | Err(err @ ProcessError::TooManyDice(_)) => {
            send_temporary_message(&bot, &msg, err.to_string(), DELETE_AFTER_ERROR).await?;
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}

/* Flip command.
 * Flips a coin. The result disappears after a few seconds.
 */
pub async fn action_flip(bot: Bot, msg: Message, cooldowns: Arc<Cooldowns>) -> HandlerResult {
    if !assert_cooldown(&bot, &msg, &cooldowns, COMMAND_FLIP, COOLDOWN_FLIP).await? {
        return Ok(());
    }

    let coin = flip_coin(&mut rand::rng());
    delete_command_message(&bot, &msg).await;
    send_temporary_message(&bot, &msg, coin.as_str(), DELETE_AFTER_FLIP).await?;
    log::info!(
        "Flip - User {} flipped {} in chat {}",
        sender_id(&msg),
        coin.as_str(),
        msg.chat.id
    );

    Ok(())
}

/* Teams command.
 * Splits the given players into two random teams.
 * Without players, asks for them in the next message.
 */
pub async fn action_teams(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    names: String,
    cooldowns: Arc<Cooldowns>,
) -> HandlerResult {
    if !assert_cooldown(&bot, &msg, &cooldowns, COMMAND_TEAMS, COOLDOWN_TEAMS).await? {
        return Ok(());
    }

    if names.trim().is_empty() {
        let Some(requester) = msg.from().map(|user| user.id) else {
            return Ok(());
        };
        bot.send_message(
            msg.chat.id,
            format!("Who's playing? 🤔 Send me the names, separated by spaces or commas.\nOr {COMMAND_CANCEL} if you've changed your mind."),
        )
        .await?;
        dialogue.update(State::TeamsNames { requester }).await?;
        return Ok(());
    }

    delete_command_message(&bot, &msg).await;
    send_teams(&bot, &msg, &names).await
}

/* Receives the player names asked for by the teams command.
 * Messages from other members of the chat are ignored.
 */
pub async fn action_teams_names(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    requester: UserId,
) -> HandlerResult {
    if !answers_prompt(msg.from().map(|user| user.id), requester) {
        return Ok(());
    }

    match msg.text() {
        Some(names) => {
            send_teams(&bot, &msg, names).await?;
            dialogue.exit().await?;
        }
        None => {
            bot.send_message(
                msg.chat.id,
                format!("I can only read names from a text message! Try again, or {COMMAND_CANCEL}."),
            )
            .await?;
        }
    }
    Ok(())
}
