//! Synchronous processing strategy
//!
//! Single-threaded implementation of the ProcessingStrategy trait. It
//! delegates:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Operation processing to `Ledger`
//! - CSV output to `csv_format::write_outcomes_csv`
//!
//! Records are streamed one at a time; only the outcomes are kept until the
//! end of the input.

use crate::core::Ledger;
use crate::io::csv_format::write_outcomes_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::ProcessingStrategy;
use crate::types::LedgerError;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use temporal_ledger::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy;
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("operations.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), LedgerError> {
        let mut ledger = Ledger::new();
        let reader = SyncReader::new(input_path)?;

        let mut outcomes = Vec::new();
        for result in reader {
            match result {
                Ok(record) => outcomes.push(ledger.process(record)),
                Err(e) => warn!(error = %e, "skipping record"),
            }
        }

        info!(operations = outcomes.len(), "input processed");
        write_outcomes_csv(&outcomes, output)
    }
}
