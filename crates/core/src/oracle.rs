//! Hash oracle
//!
//! The protocol fixes SHA-256 for both stages of the pipeline. The engine
//! only talks to the [`Checksum`] trait so the primitive can be swapped for
//! testing, at the cost of interoperability with other miners.

use sha2::{Digest as _, Sha256};

use crate::params::DIGEST_SIZE;

/// 256-bit digest produced by the oracle
pub type Digest = [u8; DIGEST_SIZE];

/// Streaming digest accumulator
pub trait Checksum: Default {
    /// Absorb more input
    fn update(&mut self, data: &[u8]);

    /// Consume the accumulator and produce the digest
    fn finalize(self) -> Digest;

    /// One-shot helper
    fn digest(data: &[u8]) -> Digest {
        let mut checksum = Self::default();
        checksum.update(data);
        checksum.finalize()
    }
}

/// SHA-256 oracle backed by the `sha2` crate
#[derive(Clone, Default)]
pub struct Sha256Checksum {
    inner: Sha256,
}

impl Checksum for Sha256Checksum {
    #[inline]
    fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    #[inline]
    fn finalize(self) -> Digest {
        self.inner.finalize().into()
    }
}

/// Seed for the generator: first 8 digest bytes, little-endian
#[inline(always)]
pub fn digest_seed(digest: &Digest) -> u64 {
    u64::from_le_bytes([
        digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
    ])
}

/// Comparison prefix: first 2 digest bytes, little-endian
#[inline(always)]
pub fn digest_prefix(digest: &Digest) -> u16 {
    u16::from_le_bytes([digest[0], digest[1]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_empty_vector() {
        let digest = Sha256Checksum::digest(b"");
        assert_eq!(
            hex::encode(digest),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let mut checksum = Sha256Checksum::default();
        checksum.update(b"12");
        checksum.update(b"345");
        assert_eq!(checksum.finalize(), Sha256Checksum::digest(b"12345"));
    }

    #[test]
    fn test_digest_views_are_little_endian() {
        let mut digest = [0u8; DIGEST_SIZE];
        digest[..8].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);

        assert_eq!(digest_seed(&digest), 0x0807_0605_0403_0201);
        assert_eq!(digest_prefix(&digest), 0x0201);
    }
}
