//! Temporal Ledger CLI
//!
//! Replays ledger operations from a CSV file and writes one result row per
//! operation to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > results.csv
//! cargo run -- --strategy sync operations.csv > results.csv
//! cargo run -- --strategy async --batch-size 2000 --max-pending 8 operations.csv > results.csv
//! RUST_LOG=debug cargo run -- operations.csv > results.csv
//! ```
//!
//! # Processing Strategies
//!
//! - **sync**: Synchronous CSV parsing on the calling thread
//! - **async**: Batched async reading feeding a dedicated ledger task (default)
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use std::process;
use temporal_ledger::{cli, logging, strategy};
use tracing::error;

fn main() {
    logging::init();

    let args = cli::parse_args();

    let strategy = strategy::create_strategy(args.strategy, args.batch_config());

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        error!(error = %e, "processing failed");
        process::exit(1);
    }
}
