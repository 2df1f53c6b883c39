use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use leaf_mask_core::TileLayout;
use serde::Deserialize;
use thiserror::Error;

use crate::cli::{CliArgs, CliSources};

const PROJECT_CONFIG_FILE: &str = "leaf-mask.toml";
const DEFAULT_REPORT_FILE: &str = "leaf-mask-report.json";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    relative_threshold: Option<f32>,
    output_dir: Option<String>,
    recursive: Option<bool>,
    tiles: Option<TilesFileConfig>,
    report: Option<ReportFileConfig>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
struct TilesFileConfig {
    size: Option<u32>,
    min_coverage: Option<f32>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
struct ReportFileConfig {
    enable: Option<bool>,
    path: Option<String>,
    pretty: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct EffectiveSettings {
    pub relative_threshold: f32,
    pub output_dir: PathBuf,
    pub recursive: bool,
    pub tiles: TileLayout,
    pub report: Option<ReportSettings>,
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    pub path: PathBuf,
    pub pretty: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value '{value}' for '{field}'{}", describe_origin(.path.as_deref()))]
    InvalidValue {
        path: Option<PathBuf>,
        field: &'static str,
        value: String,
    },
    #[error("config file {} does not exist", .path.display())]
    NotFound { path: PathBuf },
}

fn describe_origin(path: Option<&Path>) -> String {
    match path {
        Some(path) => format!(" in {}", path.display()),
        None => String::new(),
    }
}

pub fn resolve_settings(
    cli: &CliArgs,
    sources: &CliSources,
) -> Result<EffectiveSettings, ConfigError> {
    let (file, config_path) = load_config(cli.config.as_deref())?;
    merge(cli, sources, file, config_path)
}

fn load_config(path_override: Option<&Path>) -> Result<(FileConfig, Option<PathBuf>), ConfigError> {
    if let Some(path) = path_override {
        let path = path.to_path_buf();
        if !path.exists() {
            return Err(ConfigError::NotFound { path });
        }
        let config = read_config(&path)?;
        return Ok((config, Some(path)));
    }

    let candidates = [project_config_path(), default_config_path()];
    for path in candidates.into_iter().flatten() {
        if path.exists() {
            let config = read_config(&path)?;
            return Ok((config, Some(path)));
        }
    }
    Ok((FileConfig::default(), None))
}

fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Combines command line values with a parsed configuration file.
///
/// Options given on the command line win, file values fill in the rest and
/// the clap defaults cover whatever neither provides.
pub fn merge(
    cli: &CliArgs,
    sources: &CliSources,
    file: FileConfig,
    config_path: Option<PathBuf>,
) -> Result<EffectiveSettings, ConfigError> {
    let config_dir = config_path
        .as_ref()
        .and_then(|path| path.parent().map(|dir| dir.to_path_buf()));

    let FileConfig {
        relative_threshold: file_relative_threshold,
        output_dir: file_output_dir,
        recursive: file_recursive,
        tiles: file_tiles,
        report: file_report,
    } = file;

    let mut relative_threshold = cli.relative_threshold;
    if !sources.relative_threshold_from_cli {
        if let Some(value) = file_relative_threshold {
            relative_threshold = value;
        }
    }
    if !relative_threshold.is_finite() {
        let origin = if sources.relative_threshold_from_cli {
            None
        } else {
            config_path.clone()
        };
        return Err(ConfigError::InvalidValue {
            path: origin,
            field: "relative_threshold",
            value: relative_threshold.to_string(),
        });
    }

    let mut output_dir = expand_pathbuf(cli.output_dir.clone());
    if !sources.output_dir_from_cli {
        if let Some(path) = normalize_string(file_output_dir)
            .and_then(|dir| resolve_path_from_config(dir, config_dir.as_deref()))
        {
            output_dir = path;
        }
    }

    let recursive = cli.recursive || file_recursive.unwrap_or(false);

    let mut tile_size = cli.tile_size;
    if !sources.tile_size_from_cli {
        if let Some(value) = file_tiles.as_ref().and_then(|cfg| cfg.size) {
            if value < 1 {
                return Err(ConfigError::InvalidValue {
                    path: config_path,
                    field: "tiles.size",
                    value: value.to_string(),
                });
            }
            tile_size = value;
        }
    }

    let mut min_coverage = cli.min_tile_coverage;
    let mut coverage_origin = None;
    if !sources.min_tile_coverage_from_cli {
        if let Some(value) = file_tiles.as_ref().and_then(|cfg| cfg.min_coverage) {
            min_coverage = value;
            coverage_origin = config_path.clone();
        }
    }
    if !(0.0..=1.0).contains(&min_coverage) {
        return Err(ConfigError::InvalidValue {
            path: coverage_origin,
            field: "tiles.min_coverage",
            value: min_coverage.to_string(),
        });
    }

    let report_enabled = file_report
        .as_ref()
        .and_then(|cfg| cfg.enable)
        .unwrap_or(false);
    let pretty = file_report
        .as_ref()
        .and_then(|cfg| cfg.pretty)
        .unwrap_or(true);
    let report = if let Some(path) = cli.report.clone() {
        Some(ReportSettings {
            path: expand_pathbuf(path),
            pretty,
        })
    } else if report_enabled {
        let path = file_report
            .as_ref()
            .and_then(|cfg| normalize_string(cfg.path.clone()))
            .unwrap_or_else(|| DEFAULT_REPORT_FILE.to_string());
        resolve_path_from_config(path, config_dir.as_deref())
            .map(|path| ReportSettings { path, pretty })
    } else {
        None
    };

    Ok(EffectiveSettings {
        relative_threshold,
        output_dir,
        recursive,
        tiles: TileLayout::square(tile_size, min_coverage),
        report,
        config_path,
    })
}

impl FileConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("rs", "leaf-mask", "leaf-mask")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    env::current_dir()
        .ok()
        .map(|dir| dir.join(PROJECT_CONFIG_FILE))
}

fn normalize_string(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn expand_pathbuf(path: PathBuf) -> PathBuf {
    match path.to_str() {
        Some(s) => expand_home_path(s),
        None => path,
    }
}

fn resolve_path_from_config(value: String, base: Option<&Path>) -> Option<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let expanded = expand_home_path(trimmed);
    match base {
        Some(base) if !expanded.is_absolute() => Some(base.join(expanded)),
        _ => Some(expanded),
    }
}

fn expand_home_path(value: &str) -> PathBuf {
    if value == "~" {
        if let Some(base) = BaseDirs::new() {
            return base.home_dir().to_path_buf();
        }
    } else if let Some(stripped) = value.strip_prefix("~/") {
        if let Some(base) = BaseDirs::new() {
            return base.home_dir().join(stripped);
        }
    }
    PathBuf::from(value)
}
