//! Core library for disk usage stats: df invocation, output parsing and the cached stats provider.

mod error;
mod models;
mod parse;
mod provider;
mod query;

pub use error::{Result, StatsError};
pub use models::DiskStatsRecord;
pub use parse::{parse_df_output, ParsedUsage, BLOCK_SIZE};
pub use provider::StatsProvider;
pub use query::{DfArgs, DfCommand, UsageQuery};
