use crossbeam_channel::Sender;
use rand::rngs::OsRng;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::crypto::derive;
use crate::events::{FoundMatch, WorkerEvent};
use crate::keyspace::{key_bytes, KeySpace};
use crate::targets::TargetSet;

/// Fraction of randomized iterations that flush a heartbeat.
const RANDOM_HEARTBEAT_PROBABILITY: f64 = 0.01;

/// Shared per-worker environment. Workers own a cursor and nothing else;
/// all durable state belongs to the coordinator.
#[derive(Clone)]
pub struct WorkerContext {
    pub targets: Arc<TargetSet>,
    pub events: Sender<WorkerEvent>,
    pub cancel: Arc<AtomicBool>,
    pub heartbeat_batch: u64,
}

pub fn spawn_sequential(id: usize, slice: KeySpace, ctx: WorkerContext) -> JoinHandle<()> {
    thread::Builder::new()
        .name(format!("sweep-{}", id))
        .spawn(move || run_sequential(slice, &ctx))
        .expect("spawning a worker thread should not fail")
}

pub fn spawn_random(id: usize, space: KeySpace, ctx: WorkerContext) -> JoinHandle<()> {
    thread::Builder::new()
        .name(format!("sweep-{}", id))
        .spawn(move || run_random(space, &ctx))
        .expect("spawning a worker thread should not fail")
}

/// Walk the assigned slice in ascending order, deriving and checking every
/// key exactly once. A heartbeat goes out every `heartbeat_batch` keys, plus
/// one final partial batch so per-worker counts sum to the slice size.
pub fn run_sequential(slice: KeySpace, ctx: &WorkerContext) {
    let batch = ctx.heartbeat_batch.max(1);
    let mut cursor = slice.start();
    let mut pending: u64 = 0;

    loop {
        if ctx.cancel.load(Ordering::Relaxed) {
            return;
        }

        let key = key_bytes(cursor);
        // Derivation can fail for cursors outside [1, N); skip and keep going
        if let Some(derived) = derive(&key) {
            if let Some(hit) = ctx.targets.check(&derived) {
                // Flush keys examined since the last heartbeat, including
                // this one, so the aggregate count stays exact up to the
                // match. Blocking sends; a Found must never be dropped
                let _ = ctx.events.send(WorkerEvent::Heartbeat {
                    count: pending + 1,
                    cursor,
                });
                let _ = ctx.events.send(WorkerEvent::Found(FoundMatch {
                    key,
                    address: hit.address,
                    kind: hit.kind,
                    compressed: hit.compressed,
                }));
                return;
            }
        }

        pending += 1;
        if pending >= batch {
            let event = WorkerEvent::Heartbeat {
                count: pending,
                cursor,
            };
            if ctx.events.send(event).is_err() {
                return; // coordinator is gone
            }
            pending = 0;
        }

        if cursor == slice.end() {
            break;
        }
        cursor += 1;
    }

    if pending > 0 {
        let _ = ctx.events.send(WorkerEvent::Heartbeat {
            count: pending,
            cursor: slice.end(),
        });
    }
}

/// Draw fresh uniform candidates from the full space with replacement.
/// Overlap across workers is intentional under this policy. The local count
/// accumulates and flushes with a small fixed probability, carrying the
/// current candidate as a representative cursor.
pub fn run_random(space: KeySpace, ctx: &WorkerContext) {
    let mut rng = OsRng;
    let mut coin = rand::thread_rng();
    let mut pending: u64 = 0;

    loop {
        if ctx.cancel.load(Ordering::Relaxed) {
            return;
        }

        let cursor = space.random_cursor(&mut rng);
        let key = key_bytes(cursor);

        if let Some(derived) = derive(&key) {
            if let Some(hit) = ctx.targets.check(&derived) {
                let _ = ctx.events.send(WorkerEvent::Heartbeat {
                    count: pending + 1,
                    cursor,
                });
                let _ = ctx.events.send(WorkerEvent::Found(FoundMatch {
                    key,
                    address: hit.address,
                    kind: hit.kind,
                    compressed: hit.compressed,
                }));
                return;
            }
        }

        pending += 1;
        if coin.gen_bool(RANDOM_HEARTBEAT_PROBABILITY) {
            let event = WorkerEvent::Heartbeat {
                count: pending,
                cursor,
            };
            if ctx.events.send(event).is_err() {
                return;
            }
            pending = 0;
        }
    }
}
