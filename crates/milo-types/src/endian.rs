use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Physical bytes of the terminator sentinel.
///
/// The same four bytes end a standalone record in either byte order; only the
/// integer a reader compares against differs (see [`Endian::terminator_value`]).
pub const TERMINATOR: [u8; 4] = [0xAD, 0xDE, 0xAD, 0xDE];

/// Byte order of a scene stream.
///
/// Console titles ship both orders. The order can change mid-decode when a
/// container's version word reveals the initial assumption was wrong.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    /// The opposite byte order.
    pub fn flipped(self) -> Self {
        match self {
            Self::Little => Self::Big,
            Self::Big => Self::Little,
        }
    }

    /// The terminator as a `u32` read in this byte order.
    pub const fn terminator_value(self) -> u32 {
        match self {
            Self::Little => 0xDEAD_DEAD,
            Self::Big => 0xADDE_ADDE,
        }
    }
}

impl fmt::Display for Endian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Little => f.write_str("little"),
            Self::Big => f.write_str("big"),
        }
    }
}

impl FromStr for Endian {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "little" | "le" => Ok(Self::Little),
            "big" | "be" => Ok(Self::Big),
            _ => Err(TypeError::UnknownEndian(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminator_value_matches_bytes_in_both_orders() {
        assert_eq!(u32::from_le_bytes(TERMINATOR), Endian::Little.terminator_value());
        assert_eq!(u32::from_be_bytes(TERMINATOR), Endian::Big.terminator_value());
    }

    #[test]
    fn flip_is_involution() {
        assert_eq!(Endian::Little.flipped(), Endian::Big);
        assert_eq!(Endian::Big.flipped().flipped(), Endian::Big);
    }

    #[test]
    fn parse() {
        assert_eq!("BE".parse::<Endian>().unwrap(), Endian::Big);
        assert_eq!("little".parse::<Endian>().unwrap(), Endian::Little);
        assert_eq!(
            "middle".parse::<Endian>(),
            Err(TypeError::UnknownEndian("middle".into()))
        );
    }

    #[test]
    fn serde_lowercase() {
        assert_eq!(serde_json::to_string(&Endian::Big).unwrap(), "\"big\"");
    }
}
