use sha2::{Digest, Sha256};

use crate::crypto::hash160;

/// P2SH-P2WPKH witness script: OP_0 PUSH20 <pubkey_hash>
#[inline]
pub fn p2sh_script_hash(pubkey_hash: &[u8; 20]) -> [u8; 20] {
    let mut script = [0u8; 22];
    script[0] = 0x00; // OP_0
    script[1] = 0x14; // PUSH 20
    script[2..22].copy_from_slice(pubkey_hash);
    hash160(&script)
}

/// Private key to WIF. `compressed` must match the pubkey form that
/// produced the matched address, or the WIF imports to the wrong address.
pub fn to_wif(key: &[u8; 32], compressed: bool) -> String {
    let mut data = Vec::with_capacity(38);
    data.push(0x80);
    data.extend_from_slice(key);
    if compressed {
        data.push(0x01);
    }

    let checksum = Sha256::digest(Sha256::digest(&data));
    data.extend_from_slice(&checksum[..4]);

    bs58::encode(data).into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wif_prefix() {
        let mut key = [0u8; 32];
        key[31] = 1;

        let compressed = to_wif(&key, true);
        let uncompressed = to_wif(&key, false);

        // Mainnet WIF prefixes: K/L for compressed, 5 for uncompressed
        assert!(compressed.starts_with('K') || compressed.starts_with('L'));
        assert!(uncompressed.starts_with('5'));
        assert_ne!(compressed, uncompressed);
    }

    #[test]
    fn test_wif_known_vector() {
        // k=1 uncompressed WIF is a well-known constant
        let mut key = [0u8; 32];
        key[31] = 1;
        assert_eq!(
            to_wif(&key, false),
            "5HpHagT65TZzG1PH3CSu63k8DbpvD8s5ip4nEB3kEsreAnchuDf"
        );
    }
}
