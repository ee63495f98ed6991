use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::SecretKey;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::types::Hash160;

/// secp256k1 curve order N
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B,
    0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// Check if private key is valid (0 < key < N)
#[inline]
pub fn is_valid_private_key(key: &[u8; 32]) -> bool {
    let is_zero = key.iter().all(|&b| b == 0);
    if is_zero {
        return false;
    }
    for i in 0..32 {
        if key[i] < SECP256K1_ORDER[i] {
            return true;
        }
        if key[i] > SECP256K1_ORDER[i] {
            return false;
        }
    }
    false
}

/// Hash160 = RIPEMD160(SHA256(data))
#[inline]
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    let ripemd = Ripemd160::digest(sha);
    let mut result = [0u8; 20];
    result.copy_from_slice(&ripemd);
    result
}

/// Public key hashes derived from one candidate private key.
///
/// Both SEC1 encodings are hashed so a single pass over the key space
/// covers targets built from either pubkey form.
#[derive(Clone, Copy, Debug)]
pub struct DerivedHashes {
    pub compressed: Hash160,
    pub uncompressed: Hash160,
}

/// Derive the candidate identity for a private key.
///
/// Returns None for keys outside [1, N). Callers skip such candidates and
/// keep iterating; a failed derivation is never a match and never an error.
pub fn derive(key: &[u8; 32]) -> Option<DerivedHashes> {
    if !is_valid_private_key(key) {
        return None;
    }

    let secret = SecretKey::from_slice(key).ok()?;
    let pubkey = secret.public_key();

    let comp = hash160(pubkey.to_encoded_point(true).as_bytes());
    let uncomp = hash160(pubkey.to_encoded_point(false).as_bytes());

    Some(DerivedHashes {
        compressed: Hash160::from_slice(&comp),
        uncompressed: Hash160::from_slice(&uncomp),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_key_invalid() {
        assert!(!is_valid_private_key(&[0u8; 32]));
        assert!(derive(&[0u8; 32]).is_none());
    }

    #[test]
    fn test_order_boundary() {
        assert!(!is_valid_private_key(&SECP256K1_ORDER));

        // N - 1 is the largest valid key
        let mut key = SECP256K1_ORDER;
        key[31] -= 1;
        assert!(is_valid_private_key(&key));
        assert!(derive(&key).is_some());
    }

    #[test]
    fn test_derive_key_one() {
        // hash160 of the uncompressed pubkey for k=1 is a well-known vector
        // (address 1EHNa6Q4Jz2uvNExL497mE43ikXhwF6kZm)
        let mut key = [0u8; 32];
        key[31] = 1;

        let derived = derive(&key).unwrap();
        let expected = hex::decode("91b24bf9f5288532960ac687abb035127b1d28a5").unwrap();
        assert_eq!(derived.uncompressed.as_bytes(), &expected[..]);
    }

    #[test]
    fn test_derive_deterministic() {
        let mut key = [0u8; 32];
        key[31] = 42;

        let a = derive(&key).unwrap();
        let b = derive(&key).unwrap();
        assert_eq!(a.compressed, b.compressed);
        assert_eq!(a.uncompressed, b.uncompressed);
        assert_ne!(a.compressed, a.uncompressed);
    }
}
