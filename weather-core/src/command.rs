//! Text command parsing.
//!
//! Recognised forms:
//! - `/weather` or `/погода` alone: ask the user for their location
//! - `/weather <city>` or `/погода <city>`: offer the period keyboard for `<city>`
//!
//! Group chats append a bot name to commands (`/weather@SomeBot Paris`).
//! The command is ours only when the mention names this bot; a command
//! addressed to another bot is [`Command::OtherBot`] and gets no reply.
//! Without a known username every mention is accepted.

/// Command tokens, English first.
pub const COMMAND_TOKENS: &[&str] = &["/weather", "/погода"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RequestLocation,
    City(String),
    /// A command token mentioning some other bot.
    OtherBot,
    Invalid,
}

pub fn parse(text: &str, bot_username: Option<&str>) -> Command {
    let Some((mention, rest)) = strip_token(text) else {
        return Command::Invalid;
    };

    if let (Some(mention), Some(own)) = (mention, bot_username) {
        let own = own.strip_prefix('@').unwrap_or(own);
        if !mention.eq_ignore_ascii_case(own) {
            return Command::OtherBot;
        }
    }

    if rest.is_empty() {
        return Command::RequestLocation;
    }

    match rest.strip_prefix(' ') {
        Some("") => Command::RequestLocation,
        Some(city) => Command::City(city.to_string()),
        // `/weatherfoo` is not our command.
        None => Command::Invalid,
    }
}

/// Splits off the command token and any `@mention`, returning the mention
/// and the remainder of the text.
fn strip_token(text: &str) -> Option<(Option<&str>, &str)> {
    COMMAND_TOKENS.iter().find_map(|token| {
        let rest = text.strip_prefix(token)?;
        match rest.strip_prefix('@') {
            Some(tail) => {
                let end = tail.find(' ').unwrap_or(tail.len());
                Some((Some(&tail[..end]), &tail[end..]))
            }
            None => Some((None, rest)),
        }
    })
}
