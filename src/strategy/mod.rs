//! Processing strategy module
//!
//! This module defines the Strategy pattern for complete processing pipelines,
//! covering CSV parsing, ledger processing and outcome output. Different
//! implementations (synchronous, asynchronous batch) can be selected at runtime
//! and produce identical output for the same input.

use crate::cli::StrategyType;
use crate::types::LedgerError;
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete processing pipelines
///
/// Each strategy reads operation records from a CSV file, applies them to a
/// fresh ledger in input order, and writes one outcome row per applied record.
pub trait ProcessingStrategy: Send + Sync {
    /// Process operations from the input file and write outcomes to output
    ///
    /// # Arguments
    ///
    /// * `input_path` - Path to the input CSV file containing operation records
    /// * `output` - Mutable reference to a writer for outputting outcomes
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened (file not found, permission denied)
    /// - The async runtime cannot be started or its ledger task fails
    /// - Output cannot be written
    ///
    /// Malformed rows are logged and skipped; rejected operations are part of
    /// the output. Neither causes this method to fail.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), LedgerError>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `config` - Optional configuration for async batch processing (ignored for sync)
///
/// # Returns
///
/// A boxed trait object implementing the ProcessingStrategy trait
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config))
        }
    }
}
