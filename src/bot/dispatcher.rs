use std::sync::Arc;

use teloxide::{
    dispatching::{
        dialogue,
        dialogue::{InMemStorage, InMemStorageError},
    },
    prelude::*,
    types::UserId,
    utils::command::BotCommands,
    RequestError,
};

use super::{
    draw::ScoreDraw,
    engine::LeaderboardEngine,
    handler::{
        action_cancel, action_flip, action_help, action_leaderboard, action_roll, action_schmee,
        action_start, action_teams, action_teams_names, invalid_state, Cooldowns,
    },
    processor::ProcessError,
};

/* Dispatcher wires Telegram updates to the handlers.
 * Commands are accepted in any dialogue state. Plain messages are only read while a
 * handler is waiting for them (team names), and ignored otherwise.
 * Shared state (leaderboard engine, score draw, cooldowns) is injected as dependencies.
 */

/* Types */
pub type UserDialogue = Dialogue<State, InMemStorage<State>>;
pub type HandlerResult = Result<(), BotError>;

#[derive(thiserror::Error, Debug)]
pub enum BotError {
    #[error("User error: {0}")]
    UserError(String),
    #[error("Process error: {0}")]
    ProcessError(ProcessError),
    #[error("Request error: {0}")]
    RequestError(RequestError),
}

impl From<RequestError> for BotError {
    fn from(request_error: RequestError) -> BotError {
        BotError::RequestError(request_error)
    }
}

impl From<InMemStorageError> for BotError {
    fn from(storage_error: InMemStorageError) -> BotError {
        BotError::UserError(storage_error.to_string())
    }
}

impl From<ProcessError> for BotError {
    fn from(process_error: ProcessError) -> BotError {
        BotError::ProcessError(process_error)
    }
}

#[derive(Clone, Default)]
pub enum State {
    #[default]
    Start,
    // Waiting for the player names from the user who ran the teams command.
    TeamsNames {
        requester: UserId,
    },
}

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "Show this help message.")]
    Help,
    #[command(description = "Start the bot.")]
    Start,
    #[command(description = "Roll dice in NdN format, e.g. /roll 2d6.")]
    Roll(String),
    #[command(description = "Flip a coin.")]
    Flip,
    #[command(description = "Split players into two random teams.")]
    Teams(String),
    #[command(description = "Schmeeee gambler. Beat the high score!")]
    Schmee,
    #[command(description = "Show the schmee leaderboard, e.g. /leaderboard 5 or /leaderboard all.")]
    Leaderboard(String),
    #[command(description = "Cancel the current action.")]
    Cancel,
}

/* Main Dispatch function */
pub async fn run_dispatcher(bot: Bot, engine: LeaderboardEngine, draw: Arc<dyn ScoreDraw>) {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(action_start))
        .branch(case![Command::Help].endpoint(action_help))
        .branch(case![Command::Roll(dice)].endpoint(action_roll))
        .branch(case![Command::Flip].endpoint(action_flip))
        .branch(case![Command::Teams(names)].endpoint(action_teams))
        .branch(case![Command::Schmee].endpoint(action_schmee))
        .branch(case![Command::Leaderboard(size)].endpoint(action_leaderboard))
        .branch(case![Command::Cancel].endpoint(action_cancel));

    let message_handler = Update::filter_message()
        .branch(command_handler)
        .branch(case![State::TeamsNames { requester }].endpoint(action_teams_names))
        .branch(dptree::endpoint(invalid_state));

    let schema = dialogue::enter::<Update, InMemStorage<State>, State, _>().branch(message_handler);

    Dispatcher::builder(bot, schema)
        .dependencies(dptree::deps![
            InMemStorage::<State>::new(),
            Arc::new(engine),
            draw,
            Arc::new(Cooldowns::new())
        ])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
