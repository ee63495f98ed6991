//! CLI argument parsing.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::coordinator::{SamplingPolicy, SearchConfig};
use crate::error::Result;
use crate::keyspace::parse_range;

#[derive(Parser, Debug, Clone)]
#[command(name = "keysweep", version, about = "Partitioned Bitcoin key space search")]
pub struct Args {
    /// Target address file, one address per line
    #[arg(long, default_value = "target.txt", value_name = "FILE")]
    pub targets: PathBuf,

    /// Key space as hex START:END (inclusive, optional 0x prefix)
    #[arg(
        long,
        default_value = "20000000000000000:3ffffffffffffffff",
        value_name = "START:END"
    )]
    pub range: String,

    /// Number of worker threads
    #[arg(short = 'w', long, default_value_t = 8, value_name = "N")]
    pub workers: usize,

    /// Sample keys uniformly at random instead of walking sequentially
    #[arg(long)]
    pub random: bool,

    /// Checkpoint file (JSON, hand-editable to adjust the resume cursor)
    #[arg(long, default_value = "progress.json", value_name = "FILE")]
    pub checkpoint: PathBuf,

    /// Append-only log of found keys
    #[arg(long, default_value = "found/found.txt", value_name = "FILE")]
    pub found_file: PathBuf,

    /// Seconds between checkpoint writes
    #[arg(long, default_value_t = 60, value_name = "SECS")]
    pub checkpoint_interval: u64,

    /// Keys per heartbeat in sequential mode
    #[arg(long, default_value_t = 1000, value_name = "N")]
    pub batch: u64,

    /// Seconds between status line updates
    #[arg(long, default_value_t = 1, value_name = "SECS")]
    pub display_interval: u64,
}

impl Args {
    pub fn search_config(&self) -> Result<SearchConfig> {
        Ok(SearchConfig {
            worker_count: self.workers,
            key_space: parse_range(&self.range)?,
            policy: if self.random {
                SamplingPolicy::Random
            } else {
                SamplingPolicy::Sequential
            },
            checkpoint_interval: Duration::from_secs(self.checkpoint_interval),
            heartbeat_batch: self.batch,
            display_interval: Duration::from_secs(self.display_interval),
        })
    }
}
