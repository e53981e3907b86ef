//! Asynchronous batch processing strategy
//!
//! This module provides an asynchronous implementation of the
//! ProcessingStrategy trait. The input is read in batches on a tokio runtime
//! and handed to a single task that owns the ledger.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_pending_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── mpsc channel (bounded by max_pending_batches)
//!     └── ledger task (sole owner of the Ledger)
//! ```
//!
//! # Ordering
//!
//! Every operation may touch any account (transfers, merges, cashback
//! settlement), so the ledger cannot be partitioned. The reader and the ledger
//! run concurrently, but one task applies all records strictly in input order.
//! The bounded channel keeps the reader at most `max_pending_batches` batches
//! ahead of the ledger.

use crate::core::Ledger;
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::write_outcomes_csv;
use crate::strategy::ProcessingStrategy;
use crate::types::{LedgerError, OperationOutcome, OperationRecord};
use std::io::{ErrorKind, Write};
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Runtime worker threads: one for the reader, one for the ledger task
const WORKER_THREADS: usize = 2;

/// Configuration for batch processing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of records per batch
    pub batch_size: usize,
    /// Maximum number of batches read but not yet applied
    pub max_pending_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_pending_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values fall back to the defaults with a warning.
    pub fn new(batch_size: usize, max_pending_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_pending_batches = if max_pending_batches == 0 {
            warn!(
                max_pending_batches,
                default = default.max_pending_batches,
                "invalid pending batch limit, using default"
            );
            default.max_pending_batches
        } else {
            max_pending_batches
        };

        Self {
            batch_size,
            max_pending_batches,
        }
    }
}

/// Asynchronous batch processing strategy
///
/// Reads batches with [`AsyncReader`] and applies them on a dedicated ledger
/// task. Outcomes are written once the whole input has been applied.
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }
}

/// Apply every received batch to a fresh ledger, in order
async fn run_ledger(mut batches: mpsc::Receiver<Vec<OperationRecord>>) -> Vec<OperationOutcome> {
    let mut ledger = Ledger::new();
    let mut outcomes = Vec::new();

    while let Some(batch) = batches.recv().await {
        debug!(records = batch.len(), "applying batch");
        outcomes.extend(batch.into_iter().map(|record| ledger.process(record)));
    }

    outcomes
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Process operations from the input file and write outcomes to output
    ///
    /// 1. Creates a tokio multi-threaded runtime
    /// 2. Spawns the ledger task behind a bounded channel
    /// 3. Reads batches with AsyncReader and sends them to the ledger task
    /// 4. Closes the channel at end of input and waits for the outcomes
    /// 5. Writes the outcomes using the csv_format module
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), LedgerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(WORKER_THREADS)
            .build()
            .map_err(|e| LedgerError::runtime(format!("Failed to create tokio runtime: {}", e)))?;

        runtime.block_on(async {
            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| match e.kind() {
                    ErrorKind::NotFound => LedgerError::FileNotFound {
                        path: input_path.display().to_string(),
                    },
                    _ => LedgerError::IoError {
                        message: format!(
                            "Failed to open file '{}': {}",
                            input_path.display(),
                            e
                        ),
                    },
                })?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            let (sender, receiver) = mpsc::channel(self.config.max_pending_batches.max(1));
            let ledger_task = tokio::spawn(run_ledger(receiver));

            loop {
                let batch = reader.read_batch(self.config.batch_size.max(1)).await;
                if batch.is_empty() {
                    break;
                }
                if sender.send(batch).await.is_err() {
                    // The ledger task is gone; its join error is reported below
                    break;
                }
            }
            drop(sender);

            let outcomes = ledger_task
                .await
                .map_err(|e| LedgerError::runtime(format!("Ledger task failed: {}", e)))?;

            info!(operations = outcomes.len(), "input processed");
            write_outcomes_csv(&outcomes, output)
        })
    }
}
