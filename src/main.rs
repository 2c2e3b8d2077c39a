use std::sync::Arc;

use schmeebot::bot::{run_dispatcher, Config};

#[tokio::main]
pub async fn main() {
    dotenv::dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting SchmeeBot...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    let engine = match config.open_engine() {
        Ok(engine) => engine,
        Err(err) => {
            log::error!(
                "Failed to open the leaderboard: {}. Set LEDGER_RESET_CORRUPT=true to start from an empty leaderboard.",
                err
            );
            std::process::exit(1);
        }
    };

    let draw = match config.score_draw() {
        Ok(draw) => draw,
        Err(err) => {
            log::error!("Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    let bot = teloxide::Bot::from_env();

    log::info!("SchmeeBot started successfully!");

    run_dispatcher(bot, engine, Arc::new(draw)).await;
}
