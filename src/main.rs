use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use keysweep::address::to_wif;
use keysweep::checkpoint::{CheckpointStore, FoundLog};
use keysweep::cli::Args;
use keysweep::coordinator::{Coordinator, Outcome};
use keysweep::stats::{format_num, format_time};
use keysweep::targets::TargetSet;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let args = Args::parse();

    println!("\n=== keysweep • Bitcoin key space search ===\n");

    let config = match args.search_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[✗] {}", e);
            return 1;
        }
    };

    let targets = match TargetSet::load(&args.targets) {
        Ok(t) => {
            println!("[✓] Loaded {} targets from {}", t.total(), args.targets.display());
            Arc::new(t)
        }
        Err(e) => {
            eprintln!("[✗] {}", e);
            return 1;
        }
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_sig = shutdown.clone();
    ctrlc::set_handler(move || {
        println!("\n[!] Stopping...");
        shutdown_sig.store(true, Ordering::SeqCst);
    })
    .ok();

    let coordinator = match Coordinator::new(
        config,
        targets,
        CheckpointStore::new(&args.checkpoint),
        FoundLog::new(&args.found_file),
        shutdown,
    ) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[✗] {}", e);
            return 1;
        }
    };

    match coordinator.run() {
        Ok(Outcome::Solved {
            found,
            total_examined,
            elapsed_secs,
        }) => {
            println!("\n[✓] MATCH FOUND");
            println!("    Private Key: {}", found.key_hex());
            println!("    WIF:         {}", to_wif(&found.key, found.compressed));
            println!("    Address:     {} ({})", found.address, found.kind);
            println!("    Elapsed:     {}", format_time(elapsed_secs));
            println!("    Keys:        {}", format_num(total_examined));
            0
        }
        Ok(Outcome::Exhausted { total_examined }) => {
            println!(
                "\n[!] No match in key space ({} keys examined)",
                format_num(total_examined)
            );
            2
        }
        Ok(Outcome::Interrupted { total_examined }) => {
            println!("[*] {} keys examined so far", format_num(total_examined));
            130
        }
        Err(e) => {
            eprintln!("[✗] {}", e);
            1
        }
    }
}
