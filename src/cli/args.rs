use crate::strategy::BatchConfig;
use clap::{Args, Parser, ValueEnum};
use std::path::PathBuf;

/// Replay ledger operations from a CSV file and print one result row per operation
#[derive(Parser, Debug)]
#[command(name = "temporal-ledger", version, long_about = None)]
pub struct CliArgs {
    /// CSV file with `type,timestamp,account,other,value` rows
    #[arg(value_name = "INPUT")]
    pub input_file: PathBuf,

    /// How the input is read and fed to the ledger
    #[arg(long, value_enum, value_name = "STRATEGY", default_value_t = StrategyType::Async)]
    pub strategy: StrategyType,

    #[command(flatten)]
    pub batching: BatchArgs,
}

/// Available processing strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    /// Parse and apply rows one by one on the calling thread
    Sync,
    /// Read batches on a tokio task while a second task applies them
    Async,
}

/// Tuning of the async strategy; ignored by `sync`
#[derive(Args, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[command(next_help_heading = "Async batching")]
pub struct BatchArgs {
    /// Records read per batch [default: 1000]
    #[arg(long = "batch-size", value_name = "SIZE")]
    pub batch_size: Option<usize>,

    /// Batches read ahead of the ledger before the reader waits [default: CPU count]
    #[arg(long = "max-pending", value_name = "COUNT")]
    pub max_pending: Option<usize>,
}

impl From<BatchArgs> for BatchConfig {
    fn from(args: BatchArgs) -> Self {
        let default = BatchConfig::default();
        match (args.batch_size, args.max_pending) {
            (None, None) => default,
            (batch_size, max_pending) => BatchConfig::new(
                batch_size.unwrap_or(default.batch_size),
                max_pending.unwrap_or(default.max_pending_batches),
            ),
        }
    }
}

impl CliArgs {
    /// Batch settings for the selected strategy
    ///
    /// `None` for the sync strategy, which does not batch.
    pub fn batch_config(&self) -> Option<BatchConfig> {
        match self.strategy {
            StrategyType::Sync => None,
            StrategyType::Async => Some(self.batching.into()),
        }
    }
}
