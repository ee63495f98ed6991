//! keysweep: partitioned Bitcoin private key space search
//!
//! Architecture:
//! - `keyspace`: the range to search, partitioning, and cursor encoding
//! - `targets`: immutable target set with O(1) hash160 membership
//! - `crypto` / `address` / `types`: key validity, derivation, encodings
//! - `worker`: one thread per slice, streaming events over a channel
//! - `coordinator`: owns all mutable progress, checkpoints, first-match stop
//! - `checkpoint`: JSON progress file and the append-only found log
//!
//! Workers and the coordinator share nothing mutable. Workers emit immutable
//! events; the coordinator folds them in a single loop, so progress needs no
//! locks and a Found is processed exactly once.

pub mod address;
pub mod checkpoint;
pub mod cli;
pub mod coordinator;
pub mod crypto;
pub mod error;
pub mod events;
pub mod keyspace;
pub mod stats;
pub mod targets;
pub mod types;
pub mod worker;
