//! Configuration models and loaders for the voyage optimizer.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use voyage_physics::{LoadingCondition, ShipParameters};

/// Ship physical parameters and the voyage deadline, parsed from a config
/// manifest.
#[derive(Debug, Deserialize, Clone)]
pub struct ShipConfig {
    pub length_m: f64,
    pub beam_m: f64,
    pub draft_m: f64,
    pub displacement_tonnes: f64,
    pub block_coefficient: f64,
    #[serde(default)]
    pub wetted_surface_m2: f64,
    pub rated_power_kw: f64,
    pub speed_range_knots: [f64; 2],
    pub eta_hours: f64,
}

impl ShipConfig {
    /// Build the physics kernel's [`ShipParameters`] from this config.
    pub fn to_ship_parameters(&self) -> ShipParameters {
        ShipParameters {
            length_m: self.length_m,
            beam_m: self.beam_m,
            draft_m: self.draft_m,
            displacement_tonnes: self.displacement_tonnes,
            block_coefficient: self.block_coefficient,
            wetted_surface_m2: self.wetted_surface_m2,
            rated_power_kw: self.rated_power_kw,
            min_speed_knots: self.speed_range_knots[0],
            max_speed_knots: self.speed_range_knots[1],
            loading: LoadingCondition::Normal,
        }
    }
}

/// Node-filter policy for the dynamic tiers.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodesMode {
    All,
    Original,
}

/// Weather source policy for the dynamic tiers.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeatherSource {
    Predicted,
    Actual,
}

/// Static LP tier parameters.
#[derive(Debug, Deserialize, Clone)]
pub struct StaticDetConfig {
    pub segments: usize,
    pub weather_snapshot: i64,
    pub speed_choices: usize,
    #[serde(default = "default_optimizer")]
    pub optimizer: String,
}

fn default_optimizer() -> String {
    "cbc".to_string()
}

/// Dynamic DP tier parameters.
#[derive(Debug, Deserialize, Clone)]
pub struct DynamicDetConfig {
    pub forecast_origin: i64,
    pub time_granularity: f64,
    pub speed_granularity: f64,
    #[serde(default)]
    pub max_forecast_horizon: Option<i64>,
    #[serde(default = "default_nodes_mode")]
    pub nodes: NodesMode,
    #[serde(default = "default_weather_source")]
    pub weather_source: WeatherSource,
}

fn default_nodes_mode() -> NodesMode {
    NodesMode::All
}

fn default_weather_source() -> WeatherSource {
    WeatherSource::Predicted
}

/// Rolling-horizon tier parameters.
#[derive(Debug, Deserialize, Clone)]
pub struct DynamicRhConfig {
    pub replan_frequency_hours: f64,
}

/// Weather-collector parameters. Parsed for schema completeness; the
/// collector itself lives outside this workspace's core.
#[derive(Debug, Deserialize, Clone)]
pub struct CollectionConfig {
    pub route: String,
    pub interval_nm: f64,
    pub hours: u32,
    pub api_delay_seconds: f64,
}

/// The full experiment configuration: ship plus every tier's parameters.
#[derive(Debug, Deserialize, Clone)]
pub struct ExperimentConfig {
    pub ship: ShipConfig,
    pub static_det: StaticDetConfig,
    pub dynamic_det: DynamicDetConfig,
    pub dynamic_rh: DynamicRhConfig,
    #[serde(default)]
    pub collection: Option<CollectionConfig>,
}

/// Errors that can occur while loading or validating configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Load and validate the experiment configuration from a YAML or TOML file.
pub fn load_experiment_config<P: AsRef<Path>>(path: P) -> Result<ExperimentConfig, ConfigError> {
    let config: ExperimentConfig = load_record(path)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ExperimentConfig) -> Result<(), ConfigError> {
    let [min_speed, max_speed] = config.ship.speed_range_knots;
    if !(min_speed > 0.0 && max_speed > min_speed) {
        return Err(ConfigError::Invalid(format!(
            "ship.speed_range_knots must be an increasing positive pair, got [{min_speed}, {max_speed}]"
        )));
    }
    if config.ship.eta_hours <= 0.0 {
        return Err(ConfigError::Invalid("ship.eta_hours must be positive".to_string()));
    }
    if config.static_det.segments == 0 {
        return Err(ConfigError::Invalid("static_det.segments must be positive".to_string()));
    }
    if config.static_det.speed_choices == 0 {
        return Err(ConfigError::Invalid("static_det.speed_choices must be positive".to_string()));
    }
    if config.dynamic_det.time_granularity <= 0.0 {
        return Err(ConfigError::Invalid("dynamic_det.time_granularity must be positive".to_string()));
    }
    if config.dynamic_det.speed_granularity <= 0.0 {
        return Err(ConfigError::Invalid("dynamic_det.speed_granularity must be positive".to_string()));
    }
    if config.dynamic_rh.replan_frequency_hours <= 0.0 {
        return Err(ConfigError::Invalid(
            "dynamic_rh.replan_frequency_hours must be positive".to_string(),
        ));
    }
    Ok(())
}

fn load_record<T, P>(path: P) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

/// Load a directory of per-node TOML fragments into a sorted list, used by
/// the pickle importer when waypoint metadata arrives split across files.
pub fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map(|ext| ext == "toml").unwrap_or(false))
        .collect();
    entries.sort();

    let mut records = Vec::new();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        records.push(toml::from_str(&contents)?);
    }
    Ok(records)
}
