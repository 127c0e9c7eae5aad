use crate::key::KeyToken;
use serde::{Deserialize, Serialize};

/// One of the ten glove sensors. Each finger is wired to a fixed key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Finger {
    LeftThumb,
    LeftIndex,
    LeftMiddle,
    LeftRing,
    LeftPinky,
    RightThumb,
    RightIndex,
    RightMiddle,
    RightRing,
    RightPinky,
}

impl Finger {
    /// Canonical order, which is also the order presets are laid out in.
    pub const ALL: [Finger; 10] = [
        Finger::LeftThumb,
        Finger::LeftIndex,
        Finger::LeftMiddle,
        Finger::LeftRing,
        Finger::LeftPinky,
        Finger::RightThumb,
        Finger::RightIndex,
        Finger::RightMiddle,
        Finger::RightRing,
        Finger::RightPinky,
    ];

    pub fn key(self) -> char {
        match self {
            Finger::LeftThumb => 'Q',
            Finger::LeftIndex => 'W',
            Finger::LeftMiddle => 'E',
            Finger::LeftRing => 'R',
            Finger::LeftPinky => 'T',
            Finger::RightThumb => 'Y',
            Finger::RightIndex => 'U',
            Finger::RightMiddle => 'I',
            Finger::RightRing => 'O',
            Finger::RightPinky => 'P',
        }
    }

    pub fn key_token(self) -> KeyToken {
        KeyToken::from(self.key())
    }

    pub fn name(self) -> &'static str {
        match self {
            Finger::LeftThumb => "leftThumb",
            Finger::LeftIndex => "leftIndex",
            Finger::LeftMiddle => "leftMiddle",
            Finger::LeftRing => "leftRing",
            Finger::LeftPinky => "leftPinky",
            Finger::RightThumb => "rightThumb",
            Finger::RightIndex => "rightIndex",
            Finger::RightMiddle => "rightMiddle",
            Finger::RightRing => "rightRing",
            Finger::RightPinky => "rightPinky",
        }
    }
}
