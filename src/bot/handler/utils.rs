use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use chrono::{DateTime, Duration, Utc};
use teloxide::{
    prelude::*,
    types::{ParseMode, User, UserId},
    utils::html,
};

use crate::bot::{
    engine::{LeaderboardView, Outcome, RankedEntry},
    HandlerResult,
};

use super::constants::{
    DELETE_AFTER_ERROR, LEADERBOARD_SEPARATOR, SCHMEE_MAX_EES, TELEGRAM_MESSAGE_LIMIT,
};

/* Common utilites for handlers. */

/* Per-user, per-command cooldowns.
 * Remembers until when each user must wait before running each command again.
 * Entries are dropped once their cooldown is over.
 */
#[derive(Default)]
pub struct Cooldowns {
    ready_at: Mutex<HashMap<(UserId, &'static str), DateTime<Utc>>>,
}

impl Cooldowns {
    pub fn new() -> Cooldowns {
        Cooldowns::default()
    }

    /* Records a use of the command at the given time, unless still cooling down.
     * Returns the time left when the command may not be used yet.
     */
    pub fn try_use(
        &self,
        user: UserId,
        command: &'static str,
        period: Duration,
        now: DateTime<Utc>,
    ) -> Result<(), Duration> {
        let mut ready_at = self
            .ready_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        ready_at.retain(|_, ready| now < *ready);

        if let Some(ready) = ready_at.get(&(user, command)) {
            return Err(*ready - now);
        }

        ready_at.insert((user, command), now + period);
        Ok(())
    }

    // Forgets the last use of a command, so a failed attempt does not count.
    pub fn release(&self, user: UserId, command: &'static str) {
        self.ready_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(user, command));
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.ready_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

// Sends a message that deletes itself after some seconds.
pub async fn send_temporary_message(
    bot: &Bot,
    msg: &Message,
    text: impl Into<String>,
    seconds: u64,
) -> HandlerResult {
    let sent = bot.send_message(msg.chat.id, text).await?;
    delete_after(bot.clone(), sent, seconds);
    Ok(())
}

pub fn delete_after(bot: Bot, message: Message, seconds: u64) {
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_secs(seconds)).await;
        if let Err(err) = bot.delete_message(message.chat.id, message.id).await {
            log::warn!(
                "Delete Message - Failed to delete message {} in chat {}: {}",
                message.id,
                message.chat.id,
                err
            );
        }
    });
}

/* Deletes the user's command message in group chats, keeping the chat tidy.
 * Needs admin rights; failures are logged and otherwise ignored.
 */
pub async fn delete_command_message(bot: &Bot, msg: &Message) {
    if msg.chat.is_private() {
        return;
    }
    if let Err(err) = bot.delete_message(msg.chat.id, msg.id).await {
        log::warn!(
            "Delete Message - Failed to delete command in chat {}: {}",
            msg.chat.id,
            err
        );
    }
}

/* Checks the sender's cooldown for a command.
 * Replies with the remaining time if still cooling down, and returns false.
 */
pub async fn assert_cooldown(
    bot: &Bot,
    msg: &Message,
    cooldowns: &Cooldowns,
    command: &'static str,
    seconds: i64,
) -> Result<bool, crate::bot::BotError> {
    let Some(user) = msg.from() else {
        return Ok(false);
    };

    match cooldowns.try_use(user.id, command, Duration::seconds(seconds), Utc::now()) {
        Ok(()) => Ok(true),
        Err(remaining) => {
            delete_command_message(bot, msg).await;
            send_temporary_message(bot, msg, cooldown_message(remaining), DELETE_AFTER_ERROR)
                .await?;
            Ok(false)
        }
    }
}

pub fn cooldown_message(remaining: Duration) -> String {
    let seconds = remaining.num_milliseconds() as f64 / 1000.0;
    format!("Command on cooldown. Try again after {:.0}s.", seconds)
}

// HTML link mentioning a user by name.
pub fn mention(user: &User) -> String {
    format!(
        "<a href=\"tg://user?id={}\">{}</a>",
        user.id,
        html::escape(&user.full_name())
    )
}

pub fn display_schmee(score: u64) -> String {
    let ees = "e".repeat(score.min(SCHMEE_MAX_EES) as usize);
    format!("Schm{ees} ({score})")
}

pub fn display_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::NewWorldRecord { previous: None, .. } => {
            "🌍 First schmee on the board, and a new world record!".to_string()
        }
        Outcome::NewWorldRecord {
            previous: Some(previous),
            ..
        } => format!("🌍 New world record! The previous record was {previous}."),
        Outcome::NewPersonalBest { previous, .. } => {
            format!("⭐ New personal best! Your previous best was {previous}.")
        }
        Outcome::FirstScore { .. } => "📝 Your first schmee is on the board!".to_string(),
        Outcome::NoImprovement { best, .. } => format!("Your best is still {best}."),
    }
}

fn display_entry(entry: &RankedEntry, names: &HashMap<String, String>) -> String {
    let name = match names.get(&entry.player_id) {
        Some(name) => html::escape(name),
        None => format!("Player {}", html::escape(&entry.player_id)),
    };
    format!("{}. {}: {}", entry.rank, name, entry.best_score)
}

/* Renders a leaderboard as HTML.
 * Names are looked up by player id; unknown players show their id.
 * The requester's own entry follows a separator when outside the top rows.
 */
pub fn display_leaderboard(view: &LeaderboardView, names: &HashMap<String, String>) -> String {
    if view.entries.is_empty() {
        return "Nobody has schmeed yet! Be the first with /schmee.".to_string();
    }

    let mut lines = vec![format!(
        "🏆 <b>Schmee Leaderboard</b> ({} players) 🏆\n",
        view.total
    )];
    lines.extend(view.entries.iter().map(|e| display_entry(e, names)));

    if let Some(own) = &view.own {
        lines.push(LEADERBOARD_SEPARATOR.to_string());
        lines.push(display_entry(own, names));
    }

    lines.join("\n")
}

fn message_len(text: &str) -> usize {
    text.encode_utf16().count()
}

// Cuts a single line into pieces within the limit, at character boundaries.
fn cut_line(line: &str, limit: usize) -> Vec<String> {
    let mut pieces = vec![String::new()];
    let mut piece_len = 0;
    for c in line.chars() {
        if piece_len > 0 && piece_len + c.len_utf16() > limit {
            pieces.push(String::new());
            piece_len = 0;
        }
        if let Some(piece) = pieces.last_mut() {
            piece.push(c);
        }
        piece_len += c.len_utf16();
    }
    pieces
}

/* Splits text into messages Telegram accepts.
 * Breaks between lines, so HTML tags within a line stay intact.
 */
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut messages = Vec::new();
    let mut current: Option<(String, usize)> = None;

    for line in text.split('\n').flat_map(|line| cut_line(line, limit)) {
        let line_len = message_len(&line);
        current = match current.take() {
            Some((mut message, len)) if len + 1 + line_len <= limit => {
                message.push('\n');
                message.push_str(&line);
                Some((message, len + 1 + line_len))
            }
            Some((message, _)) => {
                messages.push(message);
                Some((line, line_len))
            }
            None => Some((line, line_len)),
        };
    }

    messages.extend(current.map(|(message, _)| message));
    messages
}

pub async fn send_html_messages(bot: &Bot, msg: &Message, text: &str) -> HandlerResult {
    for part in split_message(text, TELEGRAM_MESSAGE_LIMIT) {
        bot.send_message(msg.chat.id, part)
            .parse_mode(ParseMode::Html)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(rank: usize, player_id: &str, best_score: u64) -> RankedEntry {
        RankedEntry {
            rank,
            player_id: player_id.to_string(),
            best_score,
        }
    }

    #[test]
    fn test_cooldown_blocks_within_period() {
        let cooldowns = Cooldowns::new();
        let user = UserId(42);
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let period = Duration::seconds(30);

        assert!(cooldowns.try_use(user, "schmee", period, start).is_ok());
        assert_eq!(
            cooldowns.try_use(user, "schmee", period, start + Duration::seconds(10)),
            Err(Duration::seconds(20))
        );
        assert!(cooldowns
            .try_use(user, "schmee", period, start + Duration::seconds(30))
            .is_ok());
    }

    #[test]
    fn test_cooldown_is_per_user_and_command() {
        let cooldowns = Cooldowns::new();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let period = Duration::seconds(30);

        assert!(cooldowns.try_use(UserId(1), "schmee", period, now).is_ok());
        assert!(cooldowns.try_use(UserId(2), "schmee", period, now).is_ok());
        assert!(cooldowns.try_use(UserId(1), "flip", period, now).is_ok());
        assert!(cooldowns.try_use(UserId(1), "schmee", period, now).is_err());
    }

    #[test]
    fn test_cooldown_entries_expire() {
        let cooldowns = Cooldowns::new();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

        for id in 0..100 {
            assert!(cooldowns
                .try_use(UserId(id), "roll", Duration::seconds(1), start)
                .is_ok());
        }
        assert_eq!(cooldowns.len(), 100);

        assert!(cooldowns
            .try_use(UserId(1), "schmee", Duration::seconds(30), start + Duration::seconds(5))
            .is_ok());
        assert_eq!(cooldowns.len(), 1);
    }

    #[test]
    fn test_cooldown_release_allows_retry() {
        let cooldowns = Cooldowns::new();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let period = Duration::seconds(30);

        assert!(cooldowns.try_use(UserId(7), "schmee", period, now).is_ok());
        cooldowns.release(UserId(7), "schmee");
        assert!(cooldowns
            .try_use(UserId(7), "schmee", period, now + Duration::seconds(1))
            .is_ok());
        assert!(cooldowns
            .try_use(UserId(7), "schmee", period, now + Duration::seconds(2))
            .is_err());
    }

    #[test]
    fn test_cooldown_message() {
        assert_eq!(
            cooldown_message(Duration::milliseconds(19_600)),
            "Command on cooldown. Try again after 20s."
        );
    }

    #[test]
    fn test_display_schmee() {
        assert_eq!(display_schmee(0), "Schm (0)");
        assert_eq!(display_schmee(3), "Schmeee (3)");
        assert_eq!(
            display_schmee(SCHMEE_MAX_EES + 50).matches('e').count() as u64,
            SCHMEE_MAX_EES
        );
    }

    #[test]
    fn test_display_outcome() {
        assert_eq!(
            display_outcome(&Outcome::NoImprovement { best: 9, score: 2 }),
            "Your best is still 9."
        );
        assert!(display_outcome(&Outcome::NewWorldRecord {
            previous: Some(7),
            own_previous: None,
            score: 12
        })
        .contains("previous record was 7"));
    }

    #[test]
    fn test_display_leaderboard_with_own_entry() {
        let view = LeaderboardView {
            entries: vec![entry(1, "10", 12)],
            own: Some(entry(2, "20", 7)),
            total: 2,
        };
        let names = HashMap::from([
            ("10".to_string(), "Bea <3".to_string()),
            ("20".to_string(), "Al".to_string()),
        ]);

        let text = display_leaderboard(&view, &names);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[2..],
            ["1. Bea &lt;3: 12", LEADERBOARD_SEPARATOR, "2. Al: 7"]
        );
    }

    #[test]
    fn test_display_leaderboard_unknown_name_and_empty() {
        let view = LeaderboardView {
            entries: vec![entry(1, "99", 4)],
            own: None,
            total: 1,
        };
        let text = display_leaderboard(&view, &HashMap::new());
        assert!(text.ends_with("1. Player 99: 4"));
        assert!(!text.contains(LEADERBOARD_SEPARATOR));

        let empty = LeaderboardView {
            entries: vec![],
            own: None,
            total: 0,
        };
        assert!(display_leaderboard(&empty, &HashMap::new()).starts_with("Nobody"));
    }

    #[test]
    fn test_large_leaderboard_fits_in_messages() {
        let entries: Vec<RankedEntry> = (1..=300)
            .map(|rank| entry(rank, &(1000 + rank).to_string(), 5000 - rank as u64))
            .collect();
        let names: HashMap<String, String> = entries
            .iter()
            .map(|e| (e.player_id.clone(), format!("Player Number {} 🎲", e.player_id)))
            .collect();
        let view = LeaderboardView {
            entries,
            own: None,
            total: 300,
        };

        let text = display_leaderboard(&view, &names);
        assert!(message_len(&text) > TELEGRAM_MESSAGE_LIMIT);

        let messages = split_message(&text, TELEGRAM_MESSAGE_LIMIT);
        assert!(messages.len() > 1);
        assert!(messages
            .iter()
            .all(|m| message_len(m) <= TELEGRAM_MESSAGE_LIMIT));
        assert_eq!(messages.join("\n"), text);
        assert!(messages[0].starts_with("🏆 <b>Schmee Leaderboard</b>"));
    }

    #[test]
    fn test_split_message() {
        assert_eq!(split_message("a\nb\nc", 3), vec!["a\nb", "c"]);
        assert_eq!(split_message("short", 4096), vec!["short"]);
        assert_eq!(split_message("abcdefg", 3), vec!["abc", "def", "g"]);
        // Emoji take two UTF-16 code units.
        assert_eq!(split_message("🎲🎲🎲", 4), vec!["🎲🎲", "🎲"]);
    }
}
