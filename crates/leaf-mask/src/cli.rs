use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};

/// Tracks which options were given explicitly so file values can fill the
/// rest.
#[derive(Debug, Default)]
pub struct CliSources {
    pub relative_threshold_from_cli: bool,
    pub output_dir_from_cli: bool,
    pub tile_size_from_cli: bool,
    pub min_tile_coverage_from_cli: bool,
}

impl CliSources {
    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            relative_threshold_from_cli: value_from_cli(matches, "relative_threshold"),
            output_dir_from_cli: value_from_cli(matches, "output_dir"),
            tile_size_from_cli: value_from_cli(matches, "tile_size"),
            min_tile_coverage_from_cli: value_from_cli(matches, "min_tile_coverage"),
        }
    }
}

fn value_from_cli(matches: &ArgMatches, id: &str) -> bool {
    matches
        .value_source(id)
        .is_some_and(|source| matches!(source, ValueSource::CommandLine))
}

pub fn parse_cli() -> (CliArgs, CliSources) {
    let command = CliArgs::command();
    let matches = command.get_matches();
    let args = match CliArgs::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(err) => err.exit(),
    };
    let sources = CliSources::from_matches(&matches);
    (args, sources)
}

/// Parses an explicit argument list; used by tests and embedding callers.
pub fn parse_cli_from<I, T>(args: I) -> Result<(CliArgs, CliSources), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = CliArgs::command().try_get_matches_from(args)?;
    let parsed = CliArgs::from_arg_matches(&matches)?;
    Ok((parsed, CliSources::from_matches(&matches)))
}

#[derive(Debug, Parser)]
#[command(
    name = "leaf-mask",
    about = "Segment in-focus leaves from photographs and write binary masks",
    disable_help_subcommand = true
)]
pub struct CliArgs {
    /// Override the configuration file path
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Directory receiving `<stem>_mask.png` files
    #[arg(short = 'o', long = "output-dir", id = "output_dir", default_value = "masks")]
    pub output_dir: PathBuf,

    /// Fraction of the sharpest focus score used as the first threshold
    #[arg(
        short = 't',
        long = "relative-threshold",
        id = "relative_threshold",
        default_value_t = leaf_mask_core::DEFAULT_RELATIVE_THRESHOLD
    )]
    pub relative_threshold: f32,

    /// Edge length in pixels of the square tiles used for focus coverage
    #[arg(
        long = "tile-size",
        id = "tile_size",
        default_value_t = leaf_mask_core::DEFAULT_TILE_SIZE,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub tile_size: u32,

    /// Minimum mask coverage for a tile to count as in focus (0-1)
    #[arg(
        long = "min-tile-coverage",
        id = "min_tile_coverage",
        default_value_t = leaf_mask_core::DEFAULT_MIN_COVERAGE
    )]
    pub min_tile_coverage: f32,

    /// Write a JSON report of every processed image to this path
    #[arg(long = "report", value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Descend into subdirectories of directory inputs
    #[arg(short = 'r', long = "recursive")]
    pub recursive: bool,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Image files or directories of images
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
}
