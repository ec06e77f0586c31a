//! Perceptual signature - order-preserving combination of per-image hashes
//!
//! Each image contributes one 64-bit perceptual hash. The stored text form is
//! the lowercase 16-digit hex of every hash joined with `|`, e.g.
//! `c3a1f0e0d0b09080|0f0f0f0f0f0f0f0f`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Number of bits in one per-image hash
pub const HASH_BITS: u32 = 64;

const SEPARATOR: char = '|';

/// Combined perceptual signature of all images of one meme
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(Vec<u64>);

impl Signature {
    /// Create a signature from per-image hashes, in image order
    pub fn new(hashes: Vec<u64>) -> Self {
        Self(hashes)
    }

    /// Per-image hashes in image order
    pub fn hashes(&self) -> &[u64] {
        &self.0
    }

    /// Number of images covered by the signature
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bounded Hamming-style distance between two signatures.
    ///
    /// Positions present in both signatures contribute their Hamming distance;
    /// every image present in only one of them contributes the full
    /// [`HASH_BITS`]. The result never exceeds `HASH_BITS * max(len_a, len_b)`.
    pub fn distance(&self, other: &Signature) -> u32 {
        let shared: u32 = self
            .0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| (a ^ b).count_ones())
            .sum();
        let unmatched = self.0.len().abs_diff(other.0.len()) as u32;
        shared + unmatched * HASH_BITS
    }
}

/// Error when parsing a stored signature
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureParseError {
    #[error("signature is empty")]
    Empty,

    #[error("invalid hash segment: {0}")]
    InvalidSegment(String),
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, hash) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            write!(f, "{hash:016x}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Signature {
    type Err = SignatureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Trailing separators are tolerated
        let hashes = s
            .split(SEPARATOR)
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                if segment.len() != 16 {
                    return Err(SignatureParseError::InvalidSegment(segment.to_string()));
                }
                u64::from_str_radix(segment, 16)
                    .map_err(|_| SignatureParseError::InvalidSegment(segment.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if hashes.is_empty() {
            return Err(SignatureParseError::Empty);
        }
        Ok(Self(hashes))
    }
}

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
