use fxhash::FxHashMap;
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use crate::address::p2sh_script_hash;
use crate::crypto::DerivedHashes;
use crate::error::{Result, SweepError};
use crate::types::{hash160_to_address, AddressType, Hash160};

/// A target set hit for one candidate key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetHit {
    pub address: String,
    pub kind: AddressType,
    /// Which pubkey form produced the match; decides the WIF encoding.
    pub compressed: bool,
}

/// Immutable set of target identities, keyed by hash160 for O(1) membership.
///
/// Built once before any worker spawns, then shared read-only across all of
/// them. Address strings are reconstructed from the hash on a hit, never
/// stored per entry.
pub struct TargetSet {
    targets: FxHashMap<Hash160, AddressType>,
}

impl TargetSet {
    /// Load targets from a text file, one address per line.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_lines(content.lines())
    }

    /// Build from raw address lines. Invalid lines are skipped with a
    /// warning count; an empty resulting set is a fatal configuration error.
    pub fn from_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Result<Self> {
        let candidates: Vec<&str> = lines.map(str::trim).filter(|l| !l.is_empty()).collect();
        let total = candidates.len();

        // Parallel decode; large target files are decode-bound
        let entries: Vec<_> = candidates
            .par_iter()
            .filter_map(|addr| Self::decode(addr))
            .collect();

        let mut targets = FxHashMap::default();
        targets.reserve(entries.len());
        for (hash, addr_type) in entries {
            targets.insert(hash, addr_type);
        }

        let skipped = total - targets.len();
        if skipped > 0 {
            eprintln!("[!] Skipped {} invalid or unsupported addresses", skipped);
        }

        if targets.is_empty() {
            return Err(SweepError::EmptyTargets);
        }

        Ok(Self { targets })
    }

    fn decode(addr: &str) -> Option<(Hash160, AddressType)> {
        // P2PKH (1...)
        if addr.starts_with('1') {
            let decoded = bs58::decode(addr).into_vec().ok()?;
            if decoded.len() != 25 || decoded[0] != 0x00 {
                return None;
            }
            let checksum = Sha256::digest(Sha256::digest(&decoded[..21]));
            if checksum[..4] != decoded[21..] {
                return None;
            }
            return Some((Hash160::from_slice(&decoded[1..21]), AddressType::P2PKH));
        }

        // P2SH (3...)
        if addr.starts_with('3') {
            let decoded = bs58::decode(addr).into_vec().ok()?;
            if decoded.len() != 25 || decoded[0] != 0x05 {
                return None;
            }
            let checksum = Sha256::digest(Sha256::digest(&decoded[..21]));
            if checksum[..4] != decoded[21..] {
                return None;
            }
            return Some((Hash160::from_slice(&decoded[1..21]), AddressType::P2SH));
        }

        // P2WPKH (bc1q...)
        if addr.starts_with("bc1q") {
            let (hrp, data, _) = bech32::decode(addr).ok()?;
            if hrp != "bc" || data.is_empty() || data[0].to_u8() != 0 {
                return None;
            }
            let program: Vec<u8> = bech32::convert_bits(&data[1..], 5, 8, false).ok()?;
            if program.len() != 20 {
                return None;
            }
            return Some((Hash160::from_slice(&program), AddressType::P2WPKH));
        }

        None
    }

    pub fn total(&self) -> usize {
        self.targets.len()
    }

    /// Direct hash lookup, any hash kind (pubkey hash or script hash).
    #[inline]
    pub fn check_direct(&self, hash: &Hash160) -> Option<(String, AddressType)> {
        self.targets.get(hash).map(|&atype| {
            let addr = hash160_to_address(hash, atype);
            (addr, atype)
        })
    }

    /// Test the derived hashes of one candidate key against the set.
    ///
    /// Checks the uncompressed and compressed pubkey hashes directly, then
    /// the P2SH-P2WPKH script hash built from the compressed hash. This runs
    /// once per candidate and dominates throughput, so everything stays on
    /// the hash map with no string work until a hit.
    pub fn check(&self, derived: &DerivedHashes) -> Option<TargetHit> {
        if let Some((address, kind)) = self.check_direct(&derived.uncompressed) {
            return Some(TargetHit {
                address,
                kind,
                compressed: false,
            });
        }

        if let Some((address, kind)) = self.check_direct(&derived.compressed) {
            return Some(TargetHit {
                address,
                kind,
                compressed: true,
            });
        }

        let script_hash = p2sh_script_hash(derived.compressed.as_bytes());
        if let Some((address, kind)) = self.check_direct(&Hash160::from_slice(&script_hash)) {
            return Some(TargetHit {
                address,
                kind,
                compressed: true,
            });
        }

        None
    }
}
