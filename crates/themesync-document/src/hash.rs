//! Content hashing for normalized documents
//!
//! Provides [`DocumentHash`], a 32-byte Blake3 digest of a document's
//! canonical form. Two documents that normalize to the same string share a
//! hash, so the short form is handy for logs and change summaries.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A 32-byte Blake3 hash of a canonical document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentHash([u8; 32]);

impl DocumentHash {
    /// Wrap raw digest bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash a canonical string
    #[inline]
    #[must_use]
    pub fn of_canonical(canonical: &str) -> Self {
        Self(*blake3::hash(canonical.as_bytes()).as_bytes())
    }

    /// Raw digest bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Short representation (first 8 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl Display for DocumentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for DocumentHash {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| HashParseError::InvalidLength(bytes.len()))?;
        Ok(Self(arr))
    }
}

impl serde::Serialize for DocumentHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for DocumentHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors parsing a hex-encoded hash
#[derive(Debug, thiserror::Error)]
pub enum HashParseError {
    /// Decoded digest is not 32 bytes
    #[error("invalid hash length: expected 32 bytes, got {0}")]
    InvalidLength(usize),

    /// Hex encoding error
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_canonical_same_hash() {
        let h1 = DocumentHash::of_canonical("{\"a\":1}");
        let h2 = DocumentHash::of_canonical("{\"a\":1}");
        assert_eq!(h1, h2);
        assert_ne!(h1, DocumentHash::of_canonical("{\"a\":2}"));
    }

    #[test]
    fn short_is_prefix_of_full() {
        let hash = DocumentHash::of_canonical("theme");
        let short = hash.short();
        assert_eq!(short.len(), 8);
        assert!(hash.to_string().starts_with(&short));
    }

    #[test]
    fn display_and_parse() {
        let hash = DocumentHash::of_canonical("branding");
        let parsed: DocumentHash = hash.to_string().parse().unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn parse_rejects_wrong_length() {
        let result = "abcd".parse::<DocumentHash>();
        assert!(matches!(result, Err(HashParseError::InvalidLength(2))));
    }

    #[test]
    fn serde_as_hex_string() {
        let hash = DocumentHash::of_canonical("x");
        let json = serde_json::to_string(&hash).unwrap();
        assert!(json.starts_with('"'));
        let decoded: DocumentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(hash, decoded);
    }
}
