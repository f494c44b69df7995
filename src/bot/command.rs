//! Recognition of bot commands in incoming messages.

use crate::subscribers::SubscriberId;
use crate::telegram::Message;

/// A command the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// `/start`: welcome text.
    Start,
    /// `/help`: list of commands.
    Help,
    /// `/subscribe`: join the notification list.
    Subscribe,
    /// `/unsubscribe`: leave the notification list.
    Unsubscribe,
    /// `/current`: fetch the rate now.
    Current,
    /// `/status`: subscription state and subscriber count.
    Status,
}

impl CommandKind {
    /// Recognizes a command at the start of `text`.
    ///
    /// Accepts `/name` and `/name@bot` followed by optional arguments, which
    /// are ignored. When `bot_username` is known, commands addressed to a
    /// different bot are rejected. Returns `None` for plain text and unknown
    /// commands.
    ///
    /// # Example
    ///
    /// ```
    /// use rate_watch::bot::CommandKind;
    ///
    /// assert_eq!(
    ///     CommandKind::parse("/subscribe@rate_bot", Some("rate_bot")),
    ///     Some(CommandKind::Subscribe)
    /// );
    /// assert_eq!(CommandKind::parse("/subscribe@other_bot", Some("rate_bot")), None);
    /// assert_eq!(CommandKind::parse("hello", None), None);
    /// ```
    #[must_use]
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let token = text.split_whitespace().next()?;
        let command = token.strip_prefix('/')?;

        let (name, mention) = match command.split_once('@') {
            Some((name, mention)) => (name, Some(mention)),
            None => (command, None),
        };

        if let (Some(mention), Some(username)) = (mention, bot_username) {
            if !mention.eq_ignore_ascii_case(username) {
                return None;
            }
        }

        Self::from_name(&name.to_ascii_lowercase())
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "start" => Some(Self::Start),
            "help" => Some(Self::Help),
            "subscribe" => Some(Self::Subscribe),
            "unsubscribe" => Some(Self::Unsubscribe),
            "current" => Some(Self::Current),
            "status" => Some(Self::Status),
            _ => None,
        }
    }

    /// Returns the command name without the slash.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Help => "help",
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
            Self::Current => "current",
            Self::Status => "status",
        }
    }
}

/// A recognized command together with where to answer it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    /// What was asked.
    pub kind: CommandKind,
    /// Chat the command came from; also the subscriber identity.
    pub chat: SubscriberId,
    /// Message to reply to.
    pub message_id: i64,
}

impl Command {
    /// Extracts a command from a message, if it carries one.
    #[must_use]
    pub fn from_message(message: &Message, bot_username: Option<&str>) -> Option<Self> {
        let kind = CommandKind::parse(message.text.as_deref()?, bot_username)?;
        Some(Self {
            kind,
            chat: SubscriberId(message.chat.id),
            message_id: message.message_id,
        })
    }
}
