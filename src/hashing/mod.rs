//! BLAKE3 hashing for cache keys and log-safe caller fingerprints.

use blake3::Hasher;

/// Cache key for an ordered batch of cleaned input strings.
pub type BatchKey = [u8; 32];

/// Hashes an ordered batch of strings into a [`BatchKey`].
///
/// The batch length and every string's byte length are fed to the hasher ahead of its bytes,
/// so `["ab", "c"]`, `["a", "bc"]` and `["abc"]` all produce distinct keys. Order matters:
/// `["a", "b"]` and `["b", "a"]` are different batches.
pub fn hash_batch<S: AsRef<str>>(texts: &[S]) -> BatchKey {
    let mut hasher = Hasher::new();
    hasher.update(&(texts.len() as u64).to_le_bytes());
    for text in texts {
        let bytes = text.as_ref().as_bytes();
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    *hasher.finalize().as_bytes()
}

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Used for fingerprints that only need to be stable and well distributed, never for
/// uniqueness guarantees. Use [`hash_batch`] for cache keys.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Fingerprint of a caller identifier, suitable for logs (identifiers are often client IPs).
#[inline]
pub fn hash_identifier(identifier: &str) -> u64 {
    hash_to_u64(identifier.as_bytes())
}
