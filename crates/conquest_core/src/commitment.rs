//! Location derivation and defense commitments.
//!
//! Pure functions over blake3. Given the same inputs they produce the same
//! bytes on every machine and in every process, so a location id can be used
//! as a ledger key and a commitment can be re-derived by whoever knows the
//! salt.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fleet::PlanetaryDefense;

macro_rules! digest_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub [u8; 32]);

        impl $name {
            /// The all-zero value.
            pub const ZERO: Self = Self([0u8; 32]);

            /// Get the raw bytes.
            #[must_use]
            pub const fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Whether this is the all-zero value.
            #[must_use]
            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; 32]
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ZERO
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                for byte in &self.0[..8] {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({self})", stringify!($name))
            }
        }
    };
}

digest_newtype!(
    /// Hash-derived primary key of a planet.
    ///
    /// Ordered as a big-endian 256-bit integer.
    LocationId
);

digest_newtype!(
    /// Hash binding a hidden [`PlanetaryDefense`] and a salt.
    ///
    /// [`DefenseCommitment::ZERO`] means no defense has been committed.
    DefenseCommitment
);

digest_newtype!(
    /// Salt mixed into a defense commitment.
    ///
    /// Callers pick a fresh random salt per commitment and keep it to later
    /// prove knowledge of the defense.
    Salt
);

digest_newtype!(
    /// Identity of a player, e.g. a public key.
    PlayerId
);

impl PlayerId {
    /// Derive an identity from a readable name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self(*blake3::hash(name.as_bytes()).as_bytes())
    }
}

/// A point on the game map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinates {
    /// X coordinate.
    pub x: u64,
    /// Y coordinate.
    pub y: u64,
}

impl Coordinates {
    /// Create new coordinates.
    #[must_use]
    pub const fn new(x: u64, y: u64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are within `0..=max`.
    #[must_use]
    pub const fn within(&self, max: u64) -> bool {
        self.x <= max && self.y <= max
    }
}

/// Derive a location id from coordinates by iterated hashing.
///
/// ```text
/// seed = H(x || y)
/// for round in 1..rounds: seed = H(seed || round)
/// ```
///
/// `rounds` of zero is treated as one.
#[must_use]
pub fn location_id(coords: Coordinates, rounds: u32) -> LocationId {
    let mut input = [0u8; 16];
    input[0..8].copy_from_slice(&coords.x.to_le_bytes());
    input[8..16].copy_from_slice(&coords.y.to_le_bytes());
    let mut seed = *blake3::hash(&input).as_bytes();

    for round in 1..rounds {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&seed);
        hasher.update(&round.to_le_bytes());
        seed = *hasher.finalize().as_bytes();
    }

    LocationId(seed)
}

/// Proof-of-work style admission filter for homeworld locations.
///
/// A location is suitable when, read as a big-endian integer, it does not
/// exceed the largest 256-bit value with `leading_zero_bits` leading zeros.
/// Each extra bit halves the share of suitable coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthingDifficulty {
    /// Leading zero bits a suitable location id must have.
    pub leading_zero_bits: u16,
}

impl BirthingDifficulty {
    /// Create a difficulty. Values above 256 are clamped.
    #[must_use]
    pub const fn new(leading_zero_bits: u16) -> Self {
        Self {
            leading_zero_bits: if leading_zero_bits > 256 {
                256
            } else {
                leading_zero_bits
            },
        }
    }

    /// The largest acceptable location id.
    #[must_use]
    pub fn cutoff(&self) -> LocationId {
        let bits = usize::from(self.leading_zero_bits.min(256));
        let mut bytes = [0xFFu8; 32];
        let full = bits / 8;
        for byte in bytes.iter_mut().take(full) {
            *byte = 0;
        }
        if full < 32 {
            bytes[full] = 0xFF >> (bits % 8);
        }
        LocationId(bytes)
    }
}

impl Default for BirthingDifficulty {
    fn default() -> Self {
        Self::new(15)
    }
}

/// Whether a location passes the birthing difficulty.
#[must_use]
pub fn is_suitable(location: &LocationId, difficulty: BirthingDifficulty) -> bool {
    *location <= difficulty.cutoff()
}

/// Commit to a defense configuration: `H(encode(defense) || salt)`.
#[must_use]
pub fn defense_commitment(defense: &PlanetaryDefense, salt: &Salt) -> DefenseCommitment {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&defense.encode());
    hasher.update(salt.as_bytes());
    DefenseCommitment(*hasher.finalize().as_bytes())
}

impl Salt {
    /// Build a salt from a number, mostly for tests and scripted scenarios.
    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[0..8].copy_from_slice(&value.to_le_bytes());
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_is_repeatable() {
        let coords = Coordinates::new(150, 28);
        assert_eq!(location_id(coords, 10), location_id(coords, 10));
    }

    #[test]
    fn test_location_depends_on_inputs() {
        let a = location_id(Coordinates::new(150, 28), 10);
        assert_ne!(a, location_id(Coordinates::new(28, 150), 10));
        assert_ne!(a, location_id(Coordinates::new(150, 29), 10));
        assert_ne!(a, location_id(Coordinates::new(150, 28), 9));
    }

    #[test]
    fn test_single_round_is_plain_hash() {
        let mut input = [0u8; 16];
        input[0..8].copy_from_slice(&7u64.to_le_bytes());
        input[8..16].copy_from_slice(&9u64.to_le_bytes());
        let expected = *blake3::hash(&input).as_bytes();
        assert_eq!(location_id(Coordinates::new(7, 9), 1).0, expected);
        assert_eq!(location_id(Coordinates::new(7, 9), 0).0, expected);
    }

    #[test]
    fn test_cutoff_bits() {
        assert_eq!(BirthingDifficulty::new(0).cutoff().0, [0xFF; 32]);
        assert_eq!(BirthingDifficulty::new(256).cutoff().0, [0; 32]);

        let cutoff = BirthingDifficulty::new(12).cutoff().0;
        assert_eq!(cutoff[0], 0x00);
        assert_eq!(cutoff[1], 0x0F);
        assert_eq!(cutoff[2], 0xFF);
    }

    #[test]
    fn test_suitability_threshold_is_inclusive() {
        let difficulty = BirthingDifficulty::new(8);
        let cutoff = difficulty.cutoff();
        assert!(is_suitable(&cutoff, difficulty));

        let mut above = cutoff.0;
        above[0] = 0x01;
        assert!(!is_suitable(&LocationId(above), difficulty));
        assert!(is_suitable(&LocationId::ZERO, difficulty));
    }

    #[test]
    fn test_zero_difficulty_accepts_everything() {
        let loc = location_id(Coordinates::new(1, 1), 10);
        assert!(is_suitable(&loc, BirthingDifficulty::new(0)));
    }

    #[test]
    fn test_commitment_binds_salt_and_defense() {
        let defense = PlanetaryDefense::new(4, 3, 2, 1);
        let salt = Salt::from_u64(69);
        let commitment = defense_commitment(&defense, &salt);

        assert_eq!(commitment, defense_commitment(&defense, &salt));
        assert_ne!(commitment, defense_commitment(&defense, &Salt::from_u64(70)));
        assert_ne!(
            commitment,
            defense_commitment(&PlanetaryDefense::new(4, 3, 2, 0), &salt)
        );
        assert!(!commitment.is_zero());
    }

    #[test]
    fn test_coordinates_within() {
        assert!(Coordinates::new(0, 10_000).within(10_000));
        assert!(!Coordinates::new(10_001, 0).within(10_000));
    }
}
