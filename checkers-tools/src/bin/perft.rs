//! Count move-tree leaf nodes from the initial position.
//!
//! Usage:
//!   cargo run --release --bin perft -- --depth 8
//!   cargo run --release --bin perft -- --depth 6 --divide
//!
//! Ctrl-C stops after the current root move and prints the partial count.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use checkers_core::perft::perft_after;
use checkers_core::{Game, Rules};

#[derive(Parser, Debug)]
#[command(about = "Count checkers move-tree leaf nodes")]
struct Args {
    /// Plies to search; a whole capture chain is one ply.
    #[arg(short, long, default_value_t = 6)]
    depth: u32,
    /// Print the node count below each root move.
    #[arg(long)]
    divide: bool,
    /// Allow steps while a capture is available.
    #[arg(long)]
    no_forced_capture: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        println!("\nInterrupt received, stopping after the current root move...");
        r.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl-C handler")?;

    let rules = Rules { forced_capture: !args.no_forced_capture, ..Rules::default() };
    let mut game = Game::with_rules(rules);

    println!("Checkers perft");
    println!("==============");
    println!("Depth: {}", args.depth);
    println!("Forced capture: {}", rules.forced_capture);
    println!();

    let start = Instant::now();
    let mut nodes = 0u64;
    let mut complete = true;

    let root_moves = if args.depth == 0 { Vec::new() } else { game.turn_moves() };
    if root_moves.is_empty() {
        nodes = 1;
    }
    for mov in root_moves {
        if !running.load(Ordering::SeqCst) {
            complete = false;
            break;
        }
        let below = perft_after(&mut game, mov, args.depth)
            .with_context(|| format!("while expanding {mov}"))?;
        if args.divide {
            println!("{mov}: {below}");
        }
        nodes += below;
    }

    let elapsed = start.elapsed().as_secs_f64();
    let rate = if elapsed > 0.0 { nodes as f64 / elapsed } else { 0.0 };

    println!();
    if complete {
        println!("Nodes: {nodes}");
    } else {
        println!("Nodes (partial): {nodes}");
    }
    println!("Time: {elapsed:.2}s ({rate:.0} nodes/s)");
    Ok(())
}
