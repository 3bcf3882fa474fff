//! Cryptographic operations for the Strata runtime.
//!
//! - blake2b-256 for block hashes, trie nodes and large signing payloads
//! - xxHash64 (two seeds, 128 bits) for storage key namespacing only
//! - Ed25519 for extrinsic signatures
//!
//! Signing is only available with the `std` feature.

use crate::types::{Hash, Signature};

/// Compute the blake2b-256 hash of the input data.
pub fn blake2_256(data: &[u8]) -> Hash {
    use blake2::digest::consts::U32;
    use blake2::{Blake2b, Digest};

    let result = Blake2b::<U32>::digest(data);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Compute the 128-bit xxHash of the input: the little-endian outputs of
/// xxHash64 with seeds 0 and 1, concatenated.
///
/// Not collision resistant against adversarial input. Only used to turn
/// fixed storage prefixes into evenly distributed keys.
pub fn twox_128(data: &[u8]) -> [u8; 16] {
    use core::hash::Hasher;

    let mut h0 = twox_hash::XxHash64::with_seed(0);
    let mut h1 = twox_hash::XxHash64::with_seed(1);
    h0.write(data);
    h1.write(data);

    let mut out = [0u8; 16];
    out[..8].copy_from_slice(&h0.finish().to_le_bytes());
    out[8..].copy_from_slice(&h1.finish().to_le_bytes());
    out
}

/// Check `signature` over `message` against a raw public key.
///
/// Malformed keys and signatures simply fail.
pub fn verify_ed25519(message: &[u8], signature: &Signature, public_key: &[u8; 32]) -> bool {
    use ed25519_dalek::{Verifier, VerifyingKey};

    match VerifyingKey::from_bytes(public_key) {
        Ok(key) => key
            .verify(message, &ed25519_dalek::Signature::from_bytes(signature))
            .is_ok(),
        Err(_) => false,
    }
}

/// Sign with an Ed25519 secret key. For tests and off-chain tooling that
/// builds extrinsics.
#[cfg(feature = "std")]
pub fn sign_ed25519(message: &[u8], secret_key: &ed25519_dalek::SigningKey) -> Signature {
    use ed25519_dalek::Signer;
    secret_key.sign(message).to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SigningKey;
    use hex_literal::hex;

    fn key(seed: u8) -> (SigningKey, [u8; 32]) {
        let secret = SigningKey::from_bytes(&[seed; 32]);
        let public = secret.verifying_key().to_bytes();
        (secret, public)
    }

    #[test]
    fn test_blake2_256_known_vector() {
        assert_eq!(
            blake2_256(b""),
            hex!("0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8")
        );
        assert_ne!(blake2_256(b"header"), blake2_256(b"header!"));
    }

    #[test]
    fn test_twox_128_known_vector() {
        assert_eq!(twox_128(b""), hex!("99e9d85137db46ef4bbea33613baafd5"));
    }

    #[test]
    fn test_twox_128_distinguishes_prefixes() {
        assert_ne!(twox_128(b"System Number"), twox_128(b"System ParentHash"));
    }

    #[test]
    fn test_signed_payload_verifies() {
        let (secret, public) = key(1);
        let signature = sign_ed25519(b"payload", &secret);
        assert!(verify_ed25519(b"payload", &signature, &public));
        assert_eq!(signature, sign_ed25519(b"payload", &secret), "ed25519 signing is deterministic");
    }

    #[test]
    fn test_verify_rejects_mismatches() {
        let (secret, public) = key(1);
        let (_, other) = key(2);
        let signature = sign_ed25519(b"payload", &secret);
        assert!(!verify_ed25519(b"payloaD", &signature, &public));
        assert!(!verify_ed25519(b"payload", &signature, &other));
        assert!(!verify_ed25519(b"payload", &[0u8; 64], &[0xFF; 32]));
    }
}
