use std::process::ExitCode;

use log::{LevelFilter, error, info};

use leaf_mask::{parse_cli, resolve_settings, run_batch};

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    if verbose {
        builder.filter_module("leaf_mask_core", LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn main() -> ExitCode {
    let (cli, sources) = parse_cli();
    init_logging(cli.verbose);

    let settings = match resolve_settings(&cli, &sources) {
        Ok(settings) => settings,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(path) = settings.config_path.as_ref() {
        info!("using configuration {}", path.display());
    }

    match run_batch(&settings, &cli.inputs) {
        Ok(summary) => {
            info!(
                "{} processed, {} masked, {} without mask, {} failed",
                summary.processed, summary.masked, summary.without_mask, summary.failed
            );
            if summary.has_failures() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
