//! Batch front end for leaf segmentation: configuration, input discovery,
//! mask files and the JSON report.

pub mod batch;
pub mod cli;
pub mod output;
pub mod progress;
pub mod settings;

pub use batch::{BatchError, BatchSummary, InputImage, discover_inputs, run_batch};
pub use cli::{CliArgs, CliSources, parse_cli, parse_cli_from};
pub use output::{ImageRecord, OutputError};
pub use settings::{ConfigError, EffectiveSettings, ReportSettings, resolve_settings};
