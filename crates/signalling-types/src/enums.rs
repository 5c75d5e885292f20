//! Enumeration types for the signalling game.
//!
//! Player types and signals share the same three-level ordinal scale
//! (light, moderate, heavy drinking); a signal is truthful exactly when it
//! names the sender's own type. Responses are binary.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PlayerType
// ---------------------------------------------------------------------------

/// The hidden type of a player.
///
/// For signallers this is the private state they may or may not disclose.
/// For responders it is their judgement harshness, which scales the social
/// cost a signaller pays for admitting to heavier drinking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerType {
    /// Low type (light drinker, or non-judgemental responder).
    Low,
    /// Middle type (moderate drinker, or moderately judgemental responder).
    Middle,
    /// High type (heavy drinker, or harshly judgemental responder).
    High,
}

impl PlayerType {
    /// Every player type in ordinal order.
    pub const ALL: [Self; 3] = [Self::Low, Self::Middle, Self::High];

    /// Ordinal position (0, 1, 2).
    pub const fn index(self) -> usize {
        match self {
            Self::Low => 0,
            Self::Middle => 1,
            Self::High => 2,
        }
    }

    /// Look up a player type by ordinal position.
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Low),
            1 => Some(Self::Middle),
            2 => Some(Self::High),
            _ => None,
        }
    }

    /// The signal that truthfully discloses this type.
    pub const fn honest_signal(self) -> Signal {
        match self {
            Self::Low => Signal::Light,
            Self::Middle => Signal::Moderate,
            Self::High => Signal::Heavy,
        }
    }
}

impl core::fmt::Display for PlayerType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Low => "low",
            Self::Middle => "middle",
            Self::High => "high",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Signal
// ---------------------------------------------------------------------------

/// A signal a signaller sends about their own type.
///
/// Signals are ordered by severity: a heavier admitted level carries a
/// larger social cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Claims light drinking.
    Light,
    /// Claims moderate drinking.
    Moderate,
    /// Claims heavy drinking.
    Heavy,
}

impl Signal {
    /// Every signal in enumeration order.
    pub const ALL: [Self; 3] = [Self::Light, Self::Moderate, Self::Heavy];

    /// Ordinal position (0, 1, 2).
    pub const fn index(self) -> usize {
        match self {
            Self::Light => 0,
            Self::Moderate => 1,
            Self::Heavy => 2,
        }
    }

    /// Look up a signal by ordinal position.
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Light),
            1 => Some(Self::Moderate),
            2 => Some(Self::Heavy),
            _ => None,
        }
    }

    /// The player type this signal claims.
    pub const fn claimed_type(self) -> PlayerType {
        match self {
            Self::Light => PlayerType::Low,
            Self::Moderate => PlayerType::Middle,
            Self::Heavy => PlayerType::High,
        }
    }

    /// Whether sending this signal discloses `player_type` truthfully.
    pub fn is_truthful_for(self, player_type: PlayerType) -> bool {
        self.claimed_type() == player_type
    }
}

impl core::fmt::Display for Signal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Heavy => "heavy",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// A responder's action after observing a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    /// Take no action.
    NoAction,
    /// Refer the signaller for treatment.
    Refer,
}

impl Response {
    /// Every response in enumeration order.
    pub const ALL: [Self; 2] = [Self::NoAction, Self::Refer];

    /// Ordinal position (0, 1).
    pub const fn index(self) -> usize {
        match self {
            Self::NoAction => 0,
            Self::Refer => 1,
        }
    }
}

impl core::fmt::Display for Response {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::NoAction => "no_action",
            Self::Refer => "refer",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Which side of the game an agent plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Knows their own type and chooses a signal.
    Signaller,
    /// Sees only the signal and chooses a response.
    Responder,
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Signaller => "signaller",
            Self::Responder => "responder",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_roundtrip() {
        for player_type in PlayerType::ALL {
            assert_eq!(PlayerType::from_index(player_type.index()), Some(player_type));
        }
        for signal in Signal::ALL {
            assert_eq!(Signal::from_index(signal.index()), Some(signal));
        }
        assert_eq!(PlayerType::from_index(3), None);
        assert_eq!(Signal::from_index(3), None);
    }

    #[test]
    fn honest_signal_is_truthful() {
        for player_type in PlayerType::ALL {
            assert!(player_type.honest_signal().is_truthful_for(player_type));
        }
        assert!(!Signal::Light.is_truthful_for(PlayerType::High));
    }

    #[test]
    fn enums_serialize_snake_case() {
        let json = serde_json::to_string(&Response::NoAction).unwrap_or_default();
        assert_eq!(json, "\"no_action\"");
        let json = serde_json::to_string(&PlayerType::Middle).unwrap_or_default();
        assert_eq!(json, "\"middle\"");
    }
}
