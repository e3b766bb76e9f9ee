//! Digest algorithms and digest values.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Cryptographic digest used for a whole pipeline run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-256 (32-byte digest).
    Sha256,
    /// SHA-512 (64-byte digest).
    #[default]
    Sha512,
    /// BLAKE3 (32-byte digest).
    Blake3,
}

impl DigestAlgorithm {
    /// Length of the raw digest in bytes.
    pub fn digest_len(&self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha512 => 64,
            Self::Blake3 => 32,
        }
    }

    /// Length of the hex-encoded digest.
    pub fn hex_len(&self) -> usize {
        self.digest_len() * 2
    }
}

/// Final digest of a file's content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentDigest {
    /// Algorithm that produced this digest.
    pub algorithm: DigestAlgorithm,
    /// Raw digest bytes.
    #[serde(with = "hex_bytes")]
    pub bytes: Vec<u8>,
}

impl ContentDigest {
    /// Create a digest from raw bytes.
    pub fn new(algorithm: DigestAlgorithm, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            algorithm,
            bytes: bytes.into(),
        }
    }

    /// Get the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Digests travel as hex strings in serialized reports.
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        serializer.serialize_str(&hex)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let hex = String::deserialize(deserializer)?;
        if hex.len() % 2 != 0 {
            return Err(serde::de::Error::custom("odd-length hex digest"));
        }
        (0..hex.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).map_err(serde::de::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_algorithm_parse() {
        assert_eq!("sha256".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha256);
        assert_eq!("SHA512".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha512);
        assert_eq!("Blake3".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Blake3);
        assert!("md5".parse::<DigestAlgorithm>().is_err());
    }

    #[test]
    fn test_algorithm_display_round_trips() {
        for algorithm in DigestAlgorithm::iter() {
            let name = algorithm.to_string();
            assert_eq!(name, name.to_lowercase());
            assert_eq!(name.parse::<DigestAlgorithm>().unwrap(), algorithm);
        }
    }

    #[test]
    fn test_default_is_sha512() {
        assert_eq!(DigestAlgorithm::default(), DigestAlgorithm::Sha512);
        assert_eq!(DigestAlgorithm::Sha512.hex_len(), 128);
    }

    #[test]
    fn test_content_digest_hex() {
        let digest = ContentDigest::new(DigestAlgorithm::Sha256, vec![0xab; 32]);
        assert_eq!(digest.to_hex().len(), 64);
        assert!(digest.to_hex().starts_with("abab"));
        assert_eq!(digest.to_string(), digest.to_hex());
    }
}
