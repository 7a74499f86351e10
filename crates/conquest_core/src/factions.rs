//! Faction definitions and identifiers.

use serde::{Deserialize, Serialize};

use crate::error::{ConquestError, Result};

/// The three factions a homeworld can belong to.
///
/// A planet's faction is fixed at creation. Fleets carry the faction of
/// the planet that launched them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Faction {
    /// Faction A.
    A,
    /// Faction B.
    B,
    /// Faction C.
    C,
}

impl Faction {
    /// All factions in code order.
    pub const ALL: [Faction; 3] = [Faction::A, Faction::B, Faction::C];

    /// Decode a faction from its numeric code (1, 2 or 3).
    ///
    /// # Errors
    ///
    /// Returns [`ConquestError::InvalidFaction`] for any other code.
    pub const fn from_code(code: u8) -> Result<Self> {
        match code {
            1 => Ok(Self::A),
            2 => Ok(Self::B),
            3 => Ok(Self::C),
            other => Err(ConquestError::InvalidFaction(other)),
        }
    }

    /// Get the numeric code for this faction.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::A => 1,
            Self::B => 2,
            Self::C => 3,
        }
    }

    /// Get the short name for this faction.
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_code_roundtrip() {
        for faction in Faction::ALL {
            assert_eq!(Faction::from_code(faction.code()).ok(), Some(faction));
        }
    }

    #[test]
    fn test_short_names() {
        let names: Vec<_> = Faction::ALL.iter().map(|f| f.short_name()).collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn test_unknown_codes_rejected() {
        for code in [0u8, 4, 150, 255] {
            let err = Faction::from_code(code).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidFaction);
        }
    }
}
