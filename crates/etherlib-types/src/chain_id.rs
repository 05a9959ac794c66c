//! Chain identifiers.
//!
//! Chain ids are integers, but JSON and TOML object keys are always strings, so
//! an id may arrive as `1` or `"1"`. Both forms deserialize into the same
//! [`ChainId`], and ordering is numeric either way.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Numeric EVM chain id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
    /// Ethereum mainnet. Bare (non per-chain) addresses are filed under this id.
    pub const MAINNET: ChainId = ChainId(1);

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for ChainId {
    fn from(value: u64) -> Self {
        ChainId(value)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChainId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(ChainId)
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ChainIdVisitor)
    }
}

struct ChainIdVisitor;

impl<'de> Visitor<'de> for ChainIdVisitor {
    type Value = ChainId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative chain id as an integer or a decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ChainId, E> {
        Ok(ChainId(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ChainId, E> {
        u64::try_from(v)
            .map(ChainId)
            .map_err(|_| E::custom(format!("chain id must be non-negative, got {v}")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<ChainId, E> {
        if v.fract() == 0.0 && v >= 0.0 && v <= u64::MAX as f64 {
            Ok(ChainId(v as u64))
        } else {
            Err(E::custom(format!("chain id must be an integer, got {v}")))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ChainId, E> {
        v.parse::<ChainId>()
            .map_err(|_| E::custom(format!("invalid chain id \"{v}\"")))
    }
}
