//! Wire protocol for the pontoon table.
//!
//! One token-prefixed line per message, fields separated by single spaces.
//! Client lines are parsed into [`ClientMsg`]; anything that does not match
//! a known token parses to `None` and is dropped without a response — the
//! server is deliberately tolerant of junk input.

use crate::cards::Card;
use std::fmt;

pub const BROADCAST: &str = "Broadcast";
pub const PLAYER_NAME: &str = "Name";
pub const READY: &str = "Ready";
pub const DEAL: &str = "Deal";
pub const HOLD: &str = "Hold";
pub const ALL_NAMES: &str = "Names";
pub const CONNECTION_STATUS: &str = "Connection";
pub const MAX_PLAYERS: &str = "MaxPlayers";
pub const QUIT: &str = "Quit";
pub const MESSAGE: &str = "Message";
pub const START_ROUND: &str = "StartRound";
pub const END_ROUND: &str = "EndRound";
pub const DEAL_CARD: &str = "DealCard";
pub const END: &str = "End";
pub const ASK: &str = "Ask";
pub const DEALER_SCORE: &str = "DealerScore";
pub const WIN: &str = "Win";
pub const ALL: &str = "All";
pub const HIGH_SCORES: &str = "HighScores";
pub const GAME_OVER: &str = "GameOver";

/// A line received from a client, already classified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientMsg {
    /// Handshake; establishes the session's player name.
    Name(String),
    Ready,
    Deal,
    Hold,
    Names,
    Connection,
    MaxPlayers,
    Quit,
}

impl ClientMsg {
    /// Classify one incoming line. Returns `None` for anything outside the
    /// recognized token set (including a bare `Name` with no argument).
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        match parts.next()? {
            PLAYER_NAME => parts.next().map(|n| ClientMsg::Name(n.to_string())),
            READY => Some(ClientMsg::Ready),
            DEAL => Some(ClientMsg::Deal),
            HOLD => Some(ClientMsg::Hold),
            ALL_NAMES => Some(ClientMsg::Names),
            CONNECTION_STATUS => Some(ClientMsg::Connection),
            MAX_PLAYERS => Some(ClientMsg::MaxPlayers),
            QUIT => Some(ClientMsg::Quit),
            _ => None,
        }
    }
}

/// Outcome field of a `Win` line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WinOutcome {
    /// Dealer busted; every active player takes the round.
    All,
    /// Dealer wins (rendered as index `-1`).
    Dealer,
    /// A single winning registry slot.
    Seat(usize),
}

impl fmt::Display for WinOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WinOutcome::All => write!(f, "{}", ALL),
            WinOutcome::Dealer => write!(f, "-1"),
            WinOutcome::Seat(i) => write!(f, "{}", i),
        }
    }
}

/// A server-originated line. `Display` renders the exact wire form, without
/// the `Broadcast` wrapper (the coordinator adds that on delivery).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerMsg {
    /// Free-text notice for the client log.
    Message(String),
    StartRound,
    EndRound,
    /// Terminates a burst of related lines.
    End,
    /// Direct prompt: the client should answer `Deal` or `Hold`.
    Ask,
    /// Broadcast commentary on the ask-loop (`Ask <text>` on the wire).
    AskNotice(String),
    DealCard { player: String, card: Card },
    DealerScore(u32),
    Win(WinOutcome),
    /// Pre-formatted `name tally` pairs in registry order.
    HighScores(String),
    GameOver,
    Quit,
}

impl fmt::Display for ServerMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMsg::Message(text) => write!(f, "{} {}", MESSAGE, text),
            ServerMsg::StartRound => write!(f, "{}", START_ROUND),
            ServerMsg::EndRound => write!(f, "{}", END_ROUND),
            ServerMsg::End => write!(f, "{}", END),
            ServerMsg::Ask => write!(f, "{}", ASK),
            ServerMsg::AskNotice(text) => write!(f, "{} {}", ASK, text),
            ServerMsg::DealCard { player, card } => write!(
                f,
                "{} {} {} {} {}",
                DEAL_CARD,
                player,
                card.rank.name(),
                card.suit.name(),
                card.value()
            ),
            ServerMsg::DealerScore(score) => write!(f, "{} {}", DEALER_SCORE, score),
            ServerMsg::Win(outcome) => write!(f, "{} {}", WIN, outcome),
            ServerMsg::HighScores(scores) => write!(f, "{} {}", HIGH_SCORES, scores),
            ServerMsg::GameOver => write!(f, "{}", GAME_OVER),
            ServerMsg::Quit => write!(f, "{}", QUIT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank, Suit};

    #[test]
    fn parses_full_client_token_set() {
        assert_eq!(
            ClientMsg::parse("Name Ann"),
            Some(ClientMsg::Name("Ann".into()))
        );
        assert_eq!(ClientMsg::parse("Ready"), Some(ClientMsg::Ready));
        assert_eq!(ClientMsg::parse("Deal"), Some(ClientMsg::Deal));
        assert_eq!(ClientMsg::parse("Hold"), Some(ClientMsg::Hold));
        assert_eq!(ClientMsg::parse("Names"), Some(ClientMsg::Names));
        assert_eq!(ClientMsg::parse("Connection"), Some(ClientMsg::Connection));
        assert_eq!(ClientMsg::parse("MaxPlayers"), Some(ClientMsg::MaxPlayers));
        assert_eq!(ClientMsg::parse("Quit"), Some(ClientMsg::Quit));
    }

    #[test]
    fn unknown_lines_are_silently_ignored() {
        assert_eq!(ClientMsg::parse(""), None);
        assert_eq!(ClientMsg::parse("   "), None);
        assert_eq!(ClientMsg::parse("Fold"), None);
        assert_eq!(ClientMsg::parse("deal"), None);
        assert_eq!(ClientMsg::parse("Name"), None);
    }

    #[test]
    fn name_takes_first_token_only() {
        assert_eq!(
            ClientMsg::parse("Name Long John Silver"),
            Some(ClientMsg::Name("Long".into()))
        );
    }

    #[test]
    fn renders_wire_lines() {
        let card = Card::new(Suit::Spades, Rank::Ace);
        let msg = ServerMsg::DealCard {
            player: "Ann".into(),
            card,
        };
        assert_eq!(msg.to_string(), "DealCard Ann Ace Spades 1");
        assert_eq!(ServerMsg::Win(WinOutcome::All).to_string(), "Win All");
        assert_eq!(ServerMsg::Win(WinOutcome::Dealer).to_string(), "Win -1");
        assert_eq!(ServerMsg::Win(WinOutcome::Seat(2)).to_string(), "Win 2");
        assert_eq!(ServerMsg::DealerScore(19).to_string(), "DealerScore 19");
        assert_eq!(
            ServerMsg::HighScores("Ann 2 Bo 0".into()).to_string(),
            "HighScores Ann 2 Bo 0"
        );
        assert_eq!(
            ServerMsg::Message("Welcome to Pirates Pontoon".into()).to_string(),
            "Message Welcome to Pirates Pontoon"
        );
    }
}
