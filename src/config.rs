//! TOML-based scenario configuration and preset definitions.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::Duration;
use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;

use crate::pv::{
    ArrayConfig, Mounting, SandiaInverter, SapmModule, SingleAxisTracker, Site, SkyModel,
    ThermalModel, catalog,
};

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Installation location.
    #[serde(default)]
    pub site: SiteConfig,
    /// PV array and inverter parameters.
    #[serde(default)]
    pub array: PlantConfig,
    /// Resampling cadence.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Rescaling to the community's capacity.
    #[serde(default)]
    pub netload: NetloadConfig,
    /// Extra module and inverter parameter sets.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Installation location.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Latitude in degrees, north positive.
    pub latitude: f64,
    /// Longitude in degrees, east positive.
    pub longitude: f64,
    /// Altitude above sea level (m).
    pub altitude_m: f64,
    /// IANA timezone that localises input timestamps written without an
    /// offset (e.g. `"Europe/Madrid"`).
    pub timezone: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            latitude: 40.4168,
            longitude: -3.7038,
            altitude_m: 650.0,
            timezone: "Europe/Madrid".to_string(),
        }
    }
}

/// PV array and inverter parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlantConfig {
    /// `"fixed"` or `"single_axis"`.
    pub mounting: String,
    /// Fixed mounting tilt from horizontal (degrees).
    pub surface_tilt: f64,
    /// Fixed mounting azimuth from north, clockwise (degrees).
    pub surface_azimuth: f64,
    /// Tracker axis azimuth (degrees).
    pub axis_azimuth: f64,
    /// Tracker rotation limit (degrees).
    pub max_angle: f64,
    /// Tracker backtracking.
    pub backtrack: bool,
    /// Ground coverage ratio for backtracking.
    pub gcr: f64,
    /// Module database key.
    pub module: String,
    /// Inverter database key.
    pub inverter: String,
    /// SAPM parameter-set name or `"faiman"`.
    pub temperature_model: String,
    pub modules_per_string: u32,
    pub strings_per_inverter: u32,
    /// Ground reflectance (0.0-1.0).
    pub albedo: f64,
    /// `"isotropic"` or `"haydavies"`.
    pub sky_model: String,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            mounting: "fixed".to_string(),
            surface_tilt: 30.0,
            surface_azimuth: 180.0,
            axis_azimuth: 180.0,
            max_angle: 60.0,
            backtrack: true,
            gcr: 0.35,
            module: catalog::DEFAULT_MODULE.to_string(),
            inverter: catalog::DEFAULT_INVERTER.to_string(),
            temperature_model: "open_rack_glass_glass".to_string(),
            modules_per_string: 1,
            strings_per_inverter: 1,
            albedo: 0.25,
            sky_model: "haydavies".to_string(),
        }
    }
}

/// Resampling cadence.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Weather is resampled to this cadence before modeling (must be > 0).
    pub cadence_minutes: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { cadence_minutes: 1 }
    }
}

/// Scenario-defined hardware, looked up before the built-in catalog.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    pub modules: BTreeMap<String, SapmModule>,
    pub inverters: BTreeMap<String, SandiaInverter>,
}

impl CatalogConfig {
    /// # Errors
    ///
    /// Returns a `ConfigError` on `array.module` if no set has this key.
    pub fn module(&self, name: &str) -> Result<SapmModule, ConfigError> {
        match self.modules.get(name) {
            Some(m) => Ok(m.clone()),
            None => catalog::module(name),
        }
    }

    /// # Errors
    ///
    /// Returns a `ConfigError` on `array.inverter` if no set has this key.
    pub fn inverter(&self, name: &str) -> Result<SandiaInverter, ConfigError> {
        match self.inverters.get(name) {
            Some(i) => Ok(i.clone()),
            None => catalog::inverter(name),
        }
    }
}

/// Rescaling of the modeled series to the community's capacity.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetloadConfig {
    /// Nameplate the modeled array represents (W).
    pub reference_capacity_w: f64,
    /// Explicit target capacity (W). Takes priority over the contracted power.
    pub target_capacity_w: Option<f64>,
    /// Community contracted power (W).
    pub contracted_power_w: Option<f64>,
    /// Share of the contracted power allotted to production.
    pub contracted_share: f64,
}

impl Default for NetloadConfig {
    fn default() -> Self {
        Self {
            reference_capacity_w: 220.0,
            target_capacity_w: None,
            contracted_power_w: Some(9000.0),
            contracted_share: 0.5,
        }
    }
}

impl NetloadConfig {
    /// Target capacity (W): the explicit value, else contracted power × share.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when neither is configured or the result is not positive.
    pub fn target_capacity_w(&self) -> Result<f64, ConfigError> {
        let target = match (self.target_capacity_w, self.contracted_power_w) {
            (Some(t), _) => t,
            (None, Some(c)) => {
                if !(self.contracted_share > 0.0 && self.contracted_share <= 1.0) {
                    return Err(ConfigError::new(
                        "netload.contracted_share",
                        "must be in (0, 1]",
                    ));
                }
                c * self.contracted_share
            }
            (None, None) => {
                return Err(ConfigError::new(
                    "netload.target_capacity_w",
                    "set target_capacity_w or contracted_power_w",
                ));
            }
        };
        if !(target.is_finite() && target > 0.0) {
            return Err(ConfigError::new(
                "netload.target_capacity_w",
                format!("must be > 0, got {target}"),
            ));
        }
        Ok(target)
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"array.module"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: one 220 W module on a microinverter,
    /// fixed at 30° facing south.
    pub fn baseline() -> Self {
        Self {
            site: SiteConfig::default(),
            array: PlantConfig::default(),
            simulation: SimulationConfig::default(),
            netload: NetloadConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }

    /// Returns the tracker preset: same module on a backtracking single-axis
    /// tracker, with the CEC 2014 listing of the microinverter.
    pub fn tracker() -> Self {
        Self {
            array: PlantConfig {
                mounting: "single_axis".to_string(),
                inverter: catalog::ABB_MICRO_CEC_2014.to_string(),
                albedo: 0.2,
                ..PlantConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "tracker"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "tracker" => Ok(Self::tracker()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Timezone used to localise naive input timestamps.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the name is not in the IANA database.
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.site.timezone.parse::<Tz>().map_err(|e| {
            ConfigError::new(
                "site.timezone",
                format!("unknown IANA timezone \"{}\": {e}", self.site.timezone),
            )
        })
    }

    /// Resampling cadence as a duration.
    pub fn cadence(&self) -> Duration {
        Duration::minutes(i64::from(self.simulation.cadence_minutes))
    }

    /// Resolves model keys and builds the array for the PV model.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found; unknown module, inverter or
    /// temperature-model keys are errors, never defaulted.
    pub fn array_config(&self) -> Result<ArrayConfig, ConfigError> {
        let a = &self.array;
        let site = Site::new(
            self.site.latitude,
            self.site.longitude,
            self.site.altitude_m,
        )?;

        let mounting = match a.mounting.as_str() {
            "fixed" => Mounting::FixedTilt {
                surface_tilt: a.surface_tilt,
                surface_azimuth: a.surface_azimuth,
            },
            "single_axis" => Mounting::SingleAxis(SingleAxisTracker {
                axis_azimuth: a.axis_azimuth,
                max_angle: a.max_angle,
                backtrack: a.backtrack,
                gcr: a.gcr,
            }),
            other => {
                return Err(ConfigError::new(
                    "array.mounting",
                    format!("must be \"fixed\" or \"single_axis\", got \"{other}\""),
                ));
            }
        };

        let sky_model = match a.sky_model.as_str() {
            "isotropic" => SkyModel::Isotropic,
            "haydavies" => SkyModel::HayDavies,
            other => {
                return Err(ConfigError::new(
                    "array.sky_model",
                    format!("must be \"isotropic\" or \"haydavies\", got \"{other}\""),
                ));
            }
        };

        let thermal = ThermalModel::from_name(&a.temperature_model).ok_or_else(|| {
            ConfigError::new(
                "array.temperature_model",
                format!(
                    "unknown model \"{}\", available: {}",
                    a.temperature_model,
                    ThermalModel::names().collect::<Vec<_>>().join(", ")
                ),
            )
        })?;

        let array = ArrayConfig {
            site,
            mounting,
            module: self.catalog.module(&a.module)?,
            inverter: self.catalog.inverter(&a.inverter)?,
            thermal,
            modules_per_string: a.modules_per_string,
            strings_per_inverter: a.strings_per_inverter,
            albedo: a.albedo,
            sky_model,
        };
        array.validate()?;
        Ok(array)
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Err(e) = self.timezone() {
            errors.push(e);
        }
        if let Err(e) = self.array_config() {
            errors.push(e);
        }
        if self.simulation.cadence_minutes == 0 {
            errors.push(ConfigError::new("simulation.cadence_minutes", "must be > 0"));
        }

        let n = &self.netload;
        if !(n.reference_capacity_w.is_finite() && n.reference_capacity_w > 0.0) {
            errors.push(ConfigError::new(
                "netload.reference_capacity_w",
                "must be > 0",
            ));
        }
        if let Err(e) = n.target_capacity_w() {
            errors.push(e);
        }

        errors
    }
}
