use chrono::{DateTime, Local, Utc};
use crossbeam_channel::{bounded, RecvTimeoutError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::checkpoint::{Checkpoint, CheckpointStore, FoundLog};
use crate::error::{Result, SweepError};
use crate::events::{FoundMatch, WorkerEvent};
use crate::keyspace::{key_hex, KeySpace};
use crate::stats;
use crate::targets::TargetSet;
use crate::worker::{self, WorkerContext};

/// Bounded event queue depth. Deep enough that heartbeat sends rarely block;
/// backpressure is acceptable, dropped events are not.
const EVENT_QUEUE_DEPTH: usize = 1024;

/// How long the event loop waits before checking timers and cancellation.
const EVENT_POLL: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SamplingPolicy {
    Sequential,
    Random,
}

/// Explicit knobs for one search run. No global configuration; everything
/// the coordinator and workers need arrives through this struct.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    pub worker_count: usize,
    pub key_space: KeySpace,
    pub policy: SamplingPolicy,
    pub checkpoint_interval: Duration,
    pub heartbeat_batch: u64,
    pub display_interval: Duration,
}

impl SearchConfig {
    fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(SweepError::InvalidConfig(
                "worker count must be at least 1".into(),
            ));
        }
        if self.heartbeat_batch == 0 {
            return Err(SweepError::InvalidConfig(
                "heartbeat batch must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Canonical progress. Owned by the coordinator; workers only ever see the
/// events they emit, never this value.
#[derive(Debug, Clone)]
pub struct Progress {
    /// Epoch milliseconds; survives resume so the rate covers the whole run.
    pub start_time: i64,
    pub total_examined: u64,
    pub current_cursor: u128,
    pub last_saved: Option<DateTime<Local>>,
}

impl Progress {
    pub fn fresh(space: KeySpace) -> Self {
        Self {
            start_time: Utc::now().timestamp_millis(),
            total_examined: 0,
            current_cursor: space.start(),
            last_saved: None,
        }
    }

    /// Seed from a loaded checkpoint, or fresh when there is none. A cursor
    /// below the configured range start is clamped up to it.
    pub fn resume(checkpoint: Option<Checkpoint>, space: KeySpace) -> Self {
        match checkpoint {
            Some(cp) => {
                let cursor = cp.cursor().unwrap_or(space.start()).max(space.start());
                println!("[*] Resuming from saved progress: {}", key_hex(cursor));
                Self {
                    start_time: cp.start_time,
                    total_examined: cp.total_examined,
                    current_cursor: cursor,
                    last_saved: None,
                }
            }
            None => Self::fresh(space),
        }
    }

    pub fn to_checkpoint(&self) -> Checkpoint {
        Checkpoint {
            start_time: self.start_time,
            total_examined: self.total_examined,
            current_cursor: key_hex(self.current_cursor),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        (Utc::now().timestamp_millis() - self.start_time).max(0) as f64 / 1000.0
    }

    /// Keys per second since start. Non-negative and finite once any time
    /// has elapsed; purely observational.
    pub fn rate(&self) -> f64 {
        let elapsed = self.elapsed_secs();
        if elapsed > 0.0 {
            self.total_examined as f64 / elapsed
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Status {
    Running,
    Solved(FoundMatch),
    Exhausted,
}

/// Progress plus termination status, folded from worker events. All mutation
/// is serialized through `fold`, so no locking is ever needed.
pub struct SearchState {
    pub progress: Progress,
    status: Status,
}

impl SearchState {
    pub fn new(progress: Progress) -> Self {
        Self {
            progress,
            status: Status::Running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == Status::Running
    }

    /// Apply one worker event. Returns the match when this event is the
    /// first Found; any later Found is redundant and folds to a no-op, as do
    /// heartbeats arriving after termination.
    pub fn fold(&mut self, event: WorkerEvent) -> Option<FoundMatch> {
        if !self.is_running() {
            return None;
        }
        match event {
            WorkerEvent::Heartbeat { count, cursor } => {
                self.progress.total_examined = self.progress.total_examined.saturating_add(count);
                // Last writer wins; approximate by design
                self.progress.current_cursor = cursor;
                None
            }
            WorkerEvent::Found(found) => {
                self.status = Status::Solved(found.clone());
                Some(found)
            }
        }
    }

    /// All sequential workers finished without a match.
    pub fn exhaust(&mut self, end: u128) {
        if self.is_running() {
            self.status = Status::Exhausted;
            self.progress.current_cursor = end;
        }
    }
}

/// Terminal result of a search run.
#[derive(Debug)]
pub enum Outcome {
    Solved {
        found: FoundMatch,
        total_examined: u64,
        elapsed_secs: f64,
    },
    Exhausted {
        total_examined: u64,
    },
    Interrupted {
        total_examined: u64,
    },
}

pub struct Coordinator {
    config: SearchConfig,
    targets: Arc<TargetSet>,
    store: CheckpointStore,
    found_log: FoundLog,
    shutdown: Arc<AtomicBool>,
}

impl Coordinator {
    pub fn new(
        config: SearchConfig,
        targets: Arc<TargetSet>,
        store: CheckpointStore,
        found_log: FoundLog,
        shutdown: Arc<AtomicBool>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            targets,
            store,
            found_log,
            shutdown,
        })
    }

    /// Run the search to a terminal state. Spawns the worker pool, folds
    /// their events, persists checkpoints on a timer, and reacts to the
    /// first Found by cancelling everyone else.
    pub fn run(&self) -> Result<Outcome> {
        let space = self.config.key_space;
        let progress = Progress::resume(self.store.load(), space);

        // Work assignment. Sequential slices cover [resume, end] exactly
        // once; randomized workers each sample the full space independently.
        let assignment: Vec<KeySpace> = match self.config.policy {
            SamplingPolicy::Sequential => {
                if progress.current_cursor > space.end() {
                    println!("[!] Key space already exhausted, nothing to search");
                    return Ok(Outcome::Exhausted {
                        total_examined: progress.total_examined,
                    });
                }
                KeySpace::new(progress.current_cursor, space.end())?
                    .partition(self.config.worker_count)
            }
            SamplingPolicy::Random => vec![space; self.config.worker_count],
        };

        println!(
            "[*] Searching {}:{} with {} workers ({:?})",
            key_hex(space.start()),
            key_hex(space.end()),
            assignment.len(),
            self.config.policy
        );
        println!("[*] Targets: {}", self.targets.total());

        let (tx, rx) = bounded::<WorkerEvent>(EVENT_QUEUE_DEPTH);
        let cancel = self.shutdown.clone();

        let mut handles = Vec::with_capacity(assignment.len());
        for (id, slice) in assignment.into_iter().enumerate() {
            let ctx = WorkerContext {
                targets: self.targets.clone(),
                events: tx.clone(),
                cancel: cancel.clone(),
                heartbeat_batch: self.config.heartbeat_batch,
            };
            let handle = match self.config.policy {
                SamplingPolicy::Sequential => worker::spawn_sequential(id, slice, ctx),
                SamplingPolicy::Random => worker::spawn_random(id, slice, ctx),
            };
            handles.push(handle);
        }
        // The coordinator's own sender must go away or disconnection is
        // never observed
        drop(tx);

        let mut state = SearchState::new(progress);
        let mut last_checkpoint = Instant::now();
        let mut last_display = Instant::now();

        let outcome = loop {
            if cancel.load(Ordering::Relaxed) && state.is_running() {
                self.save_checkpoint(&mut state);
                println!("\n[*] Interrupted, checkpoint saved");
                break Outcome::Interrupted {
                    total_examined: state.progress.total_examined,
                };
            }

            match rx.recv_timeout(EVENT_POLL) {
                Ok(event) => {
                    if let Some(found) = state.fold(event) {
                        cancel.store(true, Ordering::SeqCst);
                        if let Err(e) = self.found_log.append(&found) {
                            // The key is still on the console below; say so loudly
                            eprintln!(
                                "\n[✗] CRITICAL: could not write found record ({}): key {}",
                                e,
                                found.key_hex()
                            );
                        }
                        self.store.delete();
                        break Outcome::Solved {
                            total_examined: state.progress.total_examined,
                            elapsed_secs: state.progress.elapsed_secs(),
                            found,
                        };
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    // Every worker has exited
                    if cancel.load(Ordering::Relaxed) && state.is_running() {
                        self.save_checkpoint(&mut state);
                        println!("\n[*] Interrupted, checkpoint saved");
                        break Outcome::Interrupted {
                            total_examined: state.progress.total_examined,
                        };
                    }
                    state.exhaust(space.end());
                    self.save_checkpoint(&mut state);
                    break Outcome::Exhausted {
                        total_examined: state.progress.total_examined,
                    };
                }
            }

            if state.is_running() && last_checkpoint.elapsed() >= self.config.checkpoint_interval {
                self.save_checkpoint(&mut state);
                last_checkpoint = Instant::now();
            }

            if last_display.elapsed() >= self.config.display_interval {
                let p = &state.progress;
                let saved = p.last_saved.map(|t| t.format("%H:%M:%S").to_string());
                stats::print_status(p.total_examined, p.rate(), p.current_cursor, saved.as_deref());
                last_display = Instant::now();
            }
        };

        // Unblock any worker mid-send, then reap the pool. A panicked worker
        // abandoned its slice; nothing re-dispatches it, so say so instead of
        // staying silent.
        drop(rx);
        for handle in handles {
            if handle.join().is_err() {
                eprintln!("[!] A worker thread panicked; its key slice was abandoned (not re-dispatched)");
            }
        }

        Ok(outcome)
    }

    fn save_checkpoint(&self, state: &mut SearchState) {
        match self.store.save(&state.progress.to_checkpoint()) {
            Ok(()) => state.progress.last_saved = Some(Local::now()),
            Err(e) => eprintln!("[!] Checkpoint write failed ({}), will retry", e),
        }
    }
}
