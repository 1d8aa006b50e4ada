//! Scalar time series and run bookkeeping.
//!
//! ## Sinks
//!
//! - [`CsvScalarSink`]: `name,step,value` rows in a CSV file
//! - [`LogScalarSink`]: scalars forwarded to the `log` facade
//! - [`MemoryScalarSink`]: in-memory store behind a cloneable handle
//! - [`MultiSink`]: fan out to several sinks
//!
//! ## Run log
//!
//! - [`RunLog`]: `Parameters.txt`, `log.txt` and `agent_config.json` for one run

pub mod run_log;
pub mod sink;

pub use run_log::{RunLog, RunLogConfig, RunParameters};
pub use sink::{CsvScalarSink, LogScalarSink, MemoryScalarSink, MultiSink, ScalarRecord, ScalarSink};
