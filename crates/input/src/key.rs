use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The fixed key set the frame core queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    /// Toggles bone gizmos.
    G,
}

impl Key {
    pub const ALL: [Key; 5] = [Key::W, Key::A, Key::S, Key::D, Key::G];

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'W' => Some(Self::W),
            'A' => Some(Self::A),
            'S' => Some(Self::S),
            'D' => Some(Self::D),
            'G' => Some(Self::G),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown key {0:?}")]
pub struct ParseKeyError(pub String);

impl FromStr for Key {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c).ok_or_else(|| ParseKeyError(s.to_string())),
            _ => Err(ParseKeyError(s.to_string())),
        }
    }
}
