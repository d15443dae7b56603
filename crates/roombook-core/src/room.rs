//! The fixed set of bookable rooms.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// A bookable room.
///
/// Serialized with the kebab-case identifiers used in persisted state
/// (`conference-room`, `board-room`, `free-room`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Room {
    ConferenceRoom,
    BoardRoom,
    FreeRoom,
}

impl Room {
    /// Every room, in display order.
    pub const ALL: [Room; 3] = [Self::ConferenceRoom, Self::BoardRoom, Self::FreeRoom];

    /// Returns the persisted identifier for this room.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConferenceRoom => "conference-room",
            Self::BoardRoom => "board-room",
            Self::FreeRoom => "free-room",
        }
    }

    /// Returns the human-readable label (`conference room`).
    ///
    /// Only the first dash becomes a space.
    pub fn label(&self) -> String {
        self.as_str().replacen('-', " ", 1)
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Room {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|room| room.as_str() == s.trim())
            .ok_or_else(|| ParseError::Room(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_rooms() {
        assert_eq!("conference-room".parse::<Room>(), Ok(Room::ConferenceRoom));
        assert_eq!("board-room".parse::<Room>(), Ok(Room::BoardRoom));
        assert_eq!(" free-room ".parse::<Room>(), Ok(Room::FreeRoom));
    }

    #[test]
    fn parse_unknown_room() {
        assert_eq!(
            "ballroom".parse::<Room>(),
            Err(ParseError::Room("ballroom".to_string()))
        );
    }

    #[test]
    fn labels_replace_first_dash() {
        assert_eq!(Room::ConferenceRoom.label(), "conference room");
        assert_eq!(Room::BoardRoom.label(), "board room");
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&Room::FreeRoom).unwrap();
        assert_eq!(json, "\"free-room\"");
        let parsed: Room = serde_json::from_str("\"board-room\"").unwrap();
        assert_eq!(parsed, Room::BoardRoom);
    }
}
