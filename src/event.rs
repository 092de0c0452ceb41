//! Decoding of raw IRC lines into structured events.
//!
//! The decoder is a pure function over one line: no I/O, no state, and the
//! same input always yields the same [`Event`] or the same error.
//!
//! Wire format:
//!
//! ```text
//! [:<prefix> ] <command-or-numeric> [<param> ...] [:<trailing content...>]
//! ```

use std::str::FromStr;

use nom::bytes::complete::take_while;
use nom::character::complete::char;
use nom::sequence::preceded;
use nom::IResult;

use crate::error::EventParseError;

/// Classification of a decoded line: a named command or a numeric reply.
///
/// Exactly one of the two holds for every event. Replies keep their code as
/// parsed, so a literal `0` is a representable reply code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    /// A named protocol directive, e.g. `PING` or `PRIVMSG`.
    Command(String),
    /// A numeric server reply, e.g. `001` for welcome.
    Reply(i32),
}

/// One decoded line of protocol traffic.
///
/// An event is plain data: immutable once constructed, compared by field
/// values, with no lifecycle beyond the dispatch call that consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    /// Origin prefix (`server.host` or `nick!user@host`), when present.
    pub sender: Option<String>,
    /// First positional token after the command or code, usually the target
    /// nickname or channel. Empty when the line has none.
    pub recipient: String,
    /// Command-or-reply classification.
    pub kind: EventKind,
    /// Positional tokens between the recipient and the trailing content.
    pub params: Vec<String>,
    /// Whitespace-split words of the `:`-introduced trailing segment.
    pub content: Option<Vec<String>>,
}

/// The `:prefix` head of a line.
fn prefix(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_while(|c| c != ' '))(input)
}

impl Event {
    /// Decode one raw line.
    ///
    /// A trailing `\r\n` (or bare `\n`) is trimmed first, so lines may be
    /// handed over exactly as a line reader produced them.
    ///
    /// # Errors
    ///
    /// Returns [`EventParseError::InvalidFormat`] when the line splits into
    /// fewer than two space-separated tokens.
    pub fn parse(raw: &str) -> Result<Self, EventParseError> {
        let line = raw.trim_end_matches(['\r', '\n']);
        let tokens: Vec<&str> = line.split(' ').collect();
        if tokens.len() < 2 {
            return Err(EventParseError::InvalidFormat {
                line: line.to_string(),
            });
        }

        let (sender, rest) = match prefix(tokens[0]) {
            Ok((_, name)) => (Some(name.to_string()), &tokens[1..]),
            Err(_) => (None, tokens.as_slice()),
        };

        // The sole classification signal: an integer token is a reply.
        let kind = match rest[0].parse::<i32>() {
            Ok(code) => EventKind::Reply(code),
            Err(_) => EventKind::Command(rest[0].to_string()),
        };

        let mut recipient = String::new();
        let mut params = Vec::new();
        let mut content = None;
        let remainder = &rest[1..];
        for (i, token) in remainder.iter().enumerate() {
            if let Some(stripped) = token.strip_prefix(':') {
                // Content runs to end of line; positional parsing is over.
                let mut words = Vec::with_capacity(remainder.len() - i);
                words.push(stripped.to_string());
                words.extend(remainder[i + 1..].iter().map(|s| s.to_string()));
                content = Some(words);
                break;
            }
            if i == 0 {
                recipient = token.to_string();
            } else {
                params.push(token.to_string());
            }
        }

        Ok(Self {
            sender,
            recipient,
            kind,
            params,
            content,
        })
    }

    /// Whether this event is a named command.
    #[must_use]
    pub fn is_command(&self) -> bool {
        matches!(self.kind, EventKind::Command(_))
    }

    /// Whether this event is a numeric reply.
    #[must_use]
    pub fn is_reply(&self) -> bool {
        matches!(self.kind, EventKind::Reply(_))
    }

    /// The command name, for command events.
    #[must_use]
    pub fn command(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Command(name) => Some(name),
            EventKind::Reply(_) => None,
        }
    }

    /// The numeric code, for reply events.
    #[must_use]
    pub fn code(&self) -> Option<i32> {
        match self.kind {
            EventKind::Reply(code) => Some(code),
            EventKind::Command(_) => None,
        }
    }

    /// The trailing content re-joined on single spaces, when present.
    #[must_use]
    pub fn content_text(&self) -> Option<String> {
        self.content.as_ref().map(|words| words.join(" "))
    }
}

impl FromStr for Event {
    type Err = EventParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_reply() {
        let event = Event::parse(":irc.example.net 001 ben").unwrap();
        assert_eq!(event.sender.as_deref(), Some("irc.example.net"));
        assert_eq!(event.recipient, "ben");
        assert_eq!(event.kind, EventKind::Reply(1));
        assert!(event.params.is_empty());
        assert!(event.content.is_none());
    }

    #[test]
    fn test_parse_command_with_prefix() {
        let event = Event::parse(":bob!~bobdavies@localhost PRIVMSG ben :hello").unwrap();
        assert_eq!(event.sender.as_deref(), Some("bob!~bobdavies@localhost"));
        assert_eq!(event.command(), Some("PRIVMSG"));
        assert_eq!(event.recipient, "ben");
        assert_eq!(event.content, Some(vec!["hello".to_string()]));
    }

    #[test]
    fn test_parse_content_without_recipient() {
        let event = Event::parse("PING :irc.example.net").unwrap();
        assert!(event.sender.is_none());
        assert_eq!(event.command(), Some("PING"));
        assert_eq!(event.recipient, "");
        assert_eq!(event.content_text().as_deref(), Some("irc.example.net"));
    }

    #[test]
    fn test_parse_params_stop_at_content() {
        let event = Event::parse(":irc.example.net 353 ben = #rust :ben alice bob").unwrap();
        assert_eq!(event.code(), Some(353));
        assert_eq!(event.recipient, "ben");
        assert_eq!(event.params, vec!["=", "#rust"]);
        assert_eq!(
            event.content,
            Some(vec![
                "ben".to_string(),
                "alice".to_string(),
                "bob".to_string()
            ])
        );
    }

    #[test]
    fn test_parse_positional_looking_token_after_content() {
        let event = Event::parse(":server CMD ben p1 :c1 p2").unwrap();
        assert_eq!(event.params, vec!["p1"]);
        assert_eq!(
            event.content,
            Some(vec!["c1".to_string(), "p2".to_string()])
        );
    }

    #[test]
    fn test_parse_zero_code_is_a_reply() {
        let event = Event::parse(":server 0 ben").unwrap();
        assert_eq!(event.kind, EventKind::Reply(0));
        assert!(event.is_reply());
        assert!(!event.is_command());
    }

    #[test]
    fn test_parse_signed_codes() {
        let event = Event::parse("+001 ben").unwrap();
        assert_eq!(event.code(), Some(1));

        let event = Event::parse("-42 ben").unwrap();
        assert_eq!(event.code(), Some(-42));
    }

    #[test]
    fn test_parse_out_of_range_numeric_is_a_command() {
        let event = Event::parse("99999999999 ben").unwrap();
        assert_eq!(event.command(), Some("99999999999"));
    }

    #[test]
    fn test_parse_trims_line_terminator() {
        let terminated = Event::parse("PING :irc.example.net\r\n").unwrap();
        let bare = Event::parse("PING :irc.example.net").unwrap();
        assert_eq!(terminated, bare);
    }

    #[test]
    fn test_parse_tolerates_empty_tokens() {
        let event = Event::parse("PING  :irc.example.net").unwrap();
        assert_eq!(event.recipient, "");
        assert_eq!(event.content, Some(vec!["irc.example.net".to_string()]));
    }

    #[test]
    fn test_parse_rejects_short_lines() {
        assert!(Event::parse("").is_err());
        assert!(Event::parse("PING").is_err());
        assert!(Event::parse(":irc.example.net").is_err());
        assert!(Event::parse("PING\r\n").is_err());
    }

    #[test]
    fn test_from_str() {
        let event: Event = "PING :irc.example.net".parse().unwrap();
        assert_eq!(event.command(), Some("PING"));
    }
}
