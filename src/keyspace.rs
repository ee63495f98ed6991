use rand::RngCore;

use crate::error::{Result, SweepError};

/// Inclusive range of candidate private keys.
///
/// Cursors are u128, which covers ranges up to 2^128. Keys themselves are
/// 256-bit; the cursor is zero-extended into the low 16 bytes of the key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeySpace {
    start: u128,
    end: u128,
}

impl KeySpace {
    pub fn new(start: u128, end: u128) -> Result<Self> {
        if start > end {
            return Err(SweepError::InvalidKeySpace(format!(
                "start {:x} is above end {:x}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    #[inline]
    pub fn start(&self) -> u128 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> u128 {
        self.end
    }

    /// Number of keys in the range. Saturates at u128::MAX for the
    /// (unreachable in practice) full 2^128 range.
    pub fn count(&self) -> u128 {
        (self.end - self.start).saturating_add(1)
    }

    #[inline]
    pub fn contains(&self, cursor: u128) -> bool {
        cursor >= self.start && cursor <= self.end
    }

    /// Split into at most `n` disjoint contiguous slices covering the range
    /// exactly once, each internally ascending. Remainder keys go to the
    /// leading slices. Returns fewer than `n` slices when the range is
    /// smaller than `n`.
    pub fn partition(&self, n: usize) -> Vec<KeySpace> {
        // Full u128 range: count() saturates one short, which would leave
        // u128::MAX unassigned. Split everything below it, then stretch the
        // final slice to cover the last key.
        if self.start == 0 && self.end == u128::MAX {
            let mut slices = Self {
                start: 0,
                end: u128::MAX - 1,
            }
            .partition(n);
            if let Some(last) = slices.last_mut() {
                last.end = u128::MAX;
            }
            return slices;
        }

        let n = n.max(1) as u128;
        let count = self.count();
        let base = count / n;
        let remainder = count % n;

        let mut slices = Vec::with_capacity(n as usize);
        let mut cursor = self.start;

        for i in 0..n {
            let size = base + u128::from(i < remainder);
            if size == 0 {
                break;
            }
            let slice_end = cursor + (size - 1);
            slices.push(Self {
                start: cursor,
                end: slice_end,
            });
            if slice_end == self.end {
                break;
            }
            cursor = slice_end + 1;
        }

        slices
    }

    /// Draw a uniform candidate from the range: 16 bytes from a CSPRNG,
    /// reduced modulo the range width, shifted by the range start. Always
    /// lands inside [start, end]. Modulo bias is negligible against 2^128.
    pub fn random_cursor<R: RngCore>(&self, rng: &mut R) -> u128 {
        let mut buf = [0u8; 16];
        rng.fill_bytes(&mut buf);
        let raw = u128::from_be_bytes(buf);

        match (self.end - self.start).checked_add(1) {
            Some(width) => self.start + raw % width,
            None => raw, // full u128 range, nothing to reduce
        }
    }
}

/// Cursor to 32-byte big-endian private key, zero-extended.
pub fn key_bytes(cursor: u128) -> [u8; 32] {
    let mut key = [0u8; 32];
    key[16..32].copy_from_slice(&cursor.to_be_bytes());
    key
}

/// Cursor as fixed-width 64-char hex, matching the key encoding in the
/// checkpoint and found files.
pub fn key_hex(cursor: u128) -> String {
    hex::encode(key_bytes(cursor))
}

/// Parse a checkpoint cursor written by `key_hex` (or hand-edited).
/// Tolerates an optional 0x prefix and shorter strings; rejects values
/// above u128.
pub fn parse_cursor_hex(s: &str) -> Option<u128> {
    let s = s.trim();
    let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let trimmed = s.trim_start_matches('0');
    if trimmed.len() > 32 {
        return None; // beyond u128
    }
    if trimmed.is_empty() {
        return Some(0);
    }
    u128::from_str_radix(trimmed, 16).ok()
}

/// Parse a "start:end" hex range from the CLI.
pub fn parse_range(s: &str) -> Result<KeySpace> {
    let (start_s, end_s) = s
        .split_once(':')
        .ok_or_else(|| SweepError::InvalidKeySpace(format!("expected START:END, got '{}'", s)))?;

    let start = parse_cursor_hex(start_s)
        .ok_or_else(|| SweepError::InvalidKeySpace(format!("bad start '{}'", start_s)))?;
    let end = parse_cursor_hex(end_s)
        .ok_or_else(|| SweepError::InvalidKeySpace(format!("bad end '{}'", end_s)))?;

    KeySpace::new(start, end)
}
