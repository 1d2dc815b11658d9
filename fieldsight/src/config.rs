//! Engine configuration file and command-line overrides.

use std::path::{Path, PathBuf};

use fieldsight_core::Point;
use fieldsight_los::{EngineConfig, EnemyUpdate};

/// Error type for loading the configuration file.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// The file is not a valid configuration.
    Parse { path: PathBuf, source: serde_json::Error },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "cannot read config {}: {source}", path.display())
            }
            ConfigError::Parse { path, source } => {
                write!(f, "invalid config {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

/// Parse a configuration from JSON text. Missing fields take their defaults.
pub fn parse(text: &str) -> Result<EngineConfig, serde_json::Error> {
    serde_json::from_str(text)
}

/// Read the configuration at `path`, or the defaults when there is none.
pub fn load(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("loaded config {}", path.display());
    Ok(config)
}

/// Command-line values that take precedence over the configuration file.
#[derive(clap::Args, Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    /// Camera height above the terrain, in meters
    #[arg(long)]
    pub camera_height: Option<f64>,

    /// Armor height above the terrain, in meters
    #[arg(long)]
    pub target_height: Option<f64>,

    /// Maximum sight distance, in meters
    #[arg(long)]
    pub max_range: Option<f64>,

    /// Only re-walk the observer-enemy line when the enemy moves
    #[arg(long)]
    pub line_patch: bool,
}

impl Overrides {
    pub fn apply(&self, config: &mut EngineConfig) {
        if let Some(h) = self.camera_height {
            config.params.camera_height = h;
        }
        if let Some(h) = self.target_height {
            config.params.target_height = h;
        }
        if let Some(r) = self.max_range {
            config.params.max_range = r;
        }
        if self.line_patch {
            config.enemy_update = EnemyUpdate::LinePatch;
        }
    }
}

/// Parse a grid cell written as `X,Y`.
pub fn parse_cell(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got {s:?}"))?;
    let coord = |v: &str| {
        v.trim()
            .parse::<i32>()
            .map_err(|e| format!("bad coordinate {v:?}: {e}"))
    };
    Ok(Point::new(coord(x)?, coord(y)?))
}
