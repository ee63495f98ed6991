use crate::types::AddressType;

/// A confirmed match, terminal for the whole search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundMatch {
    pub key: [u8; 32],
    pub address: String,
    pub kind: AddressType,
    /// Pubkey form behind the match, carried through to WIF encoding.
    pub compressed: bool,
}

impl FoundMatch {
    pub fn key_hex(&self) -> String {
        hex::encode(self.key)
    }
}

/// Message from a worker to the coordinator.
///
/// Heartbeats are informational and may arrive interleaved across workers in
/// any order. Found is terminal; workers send it with a blocking send so it
/// is never dropped, even under channel backpressure.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Heartbeat { count: u64, cursor: u128 },
    Found(FoundMatch),
}
