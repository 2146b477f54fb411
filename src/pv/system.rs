//! Array configuration and the irradiance-to-AC conversion chain.

use chrono::{Datelike, Utc};
use tracing::{debug, warn};

use super::inverter::{DcWindow, SandiaInverter};
use super::irradiance::{self, PoaIrradiance, SkyModel, TranspositionInput};
use super::module::{DcOutput, SapmModule};
use super::solar_position::{self, SolarPosition};
use super::temperature::ThermalModel;
use super::tracking::SingleAxisTracker;
use crate::config::ConfigError;
use crate::error::{NetloadError, Result};
use crate::series::{PowerSeries, Sample, TimeSeries, WeatherRecord, WeatherSeries};

/// Geographic location of the installation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_m: f64,
}

impl Site {
    /// # Errors
    ///
    /// Returns a `ConfigError` for coordinates outside the valid ranges.
    pub fn new(
        latitude: f64,
        longitude: f64,
        altitude_m: f64,
    ) -> std::result::Result<Self, ConfigError> {
        let site = Self {
            latitude,
            longitude,
            altitude_m,
        };
        site.validate()?;
        Ok(site)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ConfigError::new("site.latitude", "must be in [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ConfigError::new("site.longitude", "must be in [-180, 180]"));
        }
        if !self.altitude_m.is_finite() {
            return Err(ConfigError::new("site.altitude_m", "must be finite"));
        }
        Ok(())
    }
}

/// How the modules are mounted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mounting {
    /// Fixed tilt (degrees from horizontal) and azimuth (degrees from north).
    FixedTilt {
        surface_tilt: f64,
        surface_azimuth: f64,
    },
    SingleAxis(SingleAxisTracker),
}

/// Everything needed to simulate one PV installation.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayConfig {
    pub site: Site,
    pub mounting: Mounting,
    pub module: SapmModule,
    pub inverter: SandiaInverter,
    pub thermal: ThermalModel,
    pub modules_per_string: u32,
    pub strings_per_inverter: u32,
    /// Ground reflectance (0-1).
    pub albedo: f64,
    pub sky_model: SkyModel,
}

impl ArrayConfig {
    /// Rejects configurations the conversion chain cannot run with.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.site.validate()?;
        match self.mounting {
            Mounting::FixedTilt {
                surface_tilt,
                surface_azimuth,
            } => {
                if !(0.0..=90.0).contains(&surface_tilt) {
                    return Err(ConfigError::new("array.surface_tilt", "must be in [0, 90]"));
                }
                if !(0.0..360.0).contains(&surface_azimuth) {
                    return Err(ConfigError::new(
                        "array.surface_azimuth",
                        "must be in [0, 360)",
                    ));
                }
            }
            Mounting::SingleAxis(t) => {
                if !(0.0..360.0).contains(&t.axis_azimuth) {
                    return Err(ConfigError::new("array.axis_azimuth", "must be in [0, 360)"));
                }
                if !(t.max_angle > 0.0 && t.max_angle <= 90.0) {
                    return Err(ConfigError::new("array.max_angle", "must be in (0, 90]"));
                }
                if !(t.gcr > 0.0 && t.gcr <= 1.0) {
                    return Err(ConfigError::new("array.gcr", "must be in (0, 1]"));
                }
            }
        }
        self.module
            .validate()
            .map_err(|m| ConfigError::new("array.module", m))?;
        self.inverter
            .validate()
            .map_err(|m| ConfigError::new("array.inverter", m))?;
        if self.modules_per_string == 0 {
            return Err(ConfigError::new("array.modules_per_string", "must be > 0"));
        }
        if self.strings_per_inverter == 0 {
            return Err(ConfigError::new("array.strings_per_inverter", "must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.albedo) {
            return Err(ConfigError::new("array.albedo", "must be in [0, 1]"));
        }
        Ok(())
    }
}

/// Intermediate values of one simulated timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerBreakdown {
    pub solar: SolarPosition,
    pub surface_tilt: f64,
    pub surface_azimuth: f64,
    pub aoi: f64,
    pub poa: PoaIrradiance,
    pub effective_irradiance: f64,
    pub cell_temperature: f64,
    /// Array-level DC operating point.
    pub dc: DcOutput,
    /// Where the DC operating point sits against the inverter input limits.
    pub dc_window: DcWindow,
    /// Inverter AC output (W); slightly negative at night.
    pub ac_power: f64,
}

/// A validated array ready to simulate.
#[derive(Debug, Clone)]
pub struct PvSystem {
    config: ArrayConfig,
    pressure_pa: f64,
}

impl PvSystem {
    /// # Errors
    ///
    /// Returns [`NetloadError::Config`] if `config` fails validation.
    pub fn new(config: ArrayConfig) -> Result<Self> {
        config.validate()?;
        let pressure_pa = solar_position::pressure_at_altitude(config.site.altitude_m);
        Ok(Self {
            config,
            pressure_pa,
        })
    }

    /// Runs the optical, thermal, electrical and inverter stages for one row.
    ///
    /// # Errors
    ///
    /// Returns [`NetloadError::DataContract`] if the row fails
    /// [`WeatherRecord::validate`] or its instant is outside the solar
    /// position algorithm's range.
    pub fn simulate(&self, record: &WeatherRecord) -> Result<PowerBreakdown> {
        record.validate().map_err(|m| {
            NetloadError::contract(format!("weather row {}: {m}", record.timestamp))
        })?;

        let cfg = &self.config;
        let solar = solar_position::solar_position(
            &record.timestamp,
            &cfg.site,
            self.pressure_pa,
            record.temp_air,
        )?;
        let zenith = solar.apparent_zenith;
        let day_of_year = record.timestamp.with_timezone(&Utc).ordinal();
        let dni_extra = solar_position::extraterrestrial_dni(day_of_year);

        let ghi = record.ghi;
        let (dni, dhi) = match (finite(record.dni), finite(record.dhi)) {
            (Some(dni), Some(dhi)) => (dni, dhi),
            _ => {
                let split = irradiance::erbs(ghi, zenith, dni_extra);
                (split.dni, split.dhi)
            }
        };

        let (surface_tilt, surface_azimuth) = match cfg.mounting {
            Mounting::FixedTilt {
                surface_tilt,
                surface_azimuth,
            } => (surface_tilt, surface_azimuth),
            Mounting::SingleAxis(tracker) => {
                let o = tracker.orient(zenith, solar.azimuth);
                (o.surface_tilt, o.surface_azimuth)
            }
        };

        let aoi = irradiance::aoi(surface_tilt, surface_azimuth, zenith, solar.azimuth);
        let poa = irradiance::poa_components(
            &TranspositionInput {
                surface_tilt,
                surface_azimuth,
                zenith,
                azimuth: solar.azimuth,
                dni,
                ghi,
                dhi,
                dni_extra,
                albedo: cfg.albedo,
            },
            cfg.sky_model,
        );

        let airmass = solar_position::relative_airmass(zenith)
            .map(|am| solar_position::absolute_airmass(am, self.pressure_pa));
        let effective_irradiance =
            cfg.module
                .effective_irradiance(poa.direct, poa.diffuse(), airmass, aoi);

        let wind_speed = finite(record.wind_speed).unwrap_or(0.0);
        let cell_temperature =
            cfg.thermal
                .cell_temperature(poa.global(), record.temp_air, wind_speed);

        let dc = cfg
            .module
            .dc_output(effective_irradiance, cell_temperature)
            .scale(cfg.modules_per_string, cfg.strings_per_inverter);
        let dc_window = cfg.inverter.dc_window(dc.v_mp, dc.i_mp);
        let ac_power = cfg.inverter.ac_power(dc.v_mp, dc.p_mp);

        Ok(PowerBreakdown {
            solar,
            surface_tilt,
            surface_azimuth,
            aoi,
            poa,
            effective_irradiance,
            cell_temperature,
            dc,
            dc_window,
            ac_power,
        })
    }

    /// AC power for every row of `weather`, index-aligned with it.
    ///
    /// Rows where the inverter runs outside its DC input window are counted
    /// and reported with one `warn!`; their output is kept as modeled.
    ///
    /// # Errors
    ///
    /// Fails on the first row that violates the weather data contract.
    pub fn ac_power_series(&self, weather: &WeatherSeries) -> Result<PowerSeries> {
        let mut samples = Vec::with_capacity(weather.len());
        let mut outside = 0usize;
        for r in weather.iter() {
            let step = self.simulate(r)?;
            if step.dc.p_mp >= self.config.inverter.pso && !step.dc_window.is_within() {
                outside += 1;
            }
            samples.push(Sample::new(r.timestamp, step.ac_power));
        }
        if outside > 0 {
            warn!(
                rows = outside,
                "dc operating point outside the inverter input window"
            );
        }
        debug!(rows = samples.len(), "modeled ac power");
        Ok(TimeSeries::from_ordered(samples))
    }
}

/// Computes the AC power series of `array_config` under `weather`.
///
/// `weather` must already be at the simulation cadence; this function does
/// not resample. The result may contain small negative values at night.
///
/// # Errors
///
/// Returns [`NetloadError::Config`] for an invalid array and
/// [`NetloadError::DataContract`] for malformed weather rows.
pub fn compute_power(weather: &WeatherSeries, array_config: &ArrayConfig) -> Result<PowerSeries> {
    PvSystem::new(array_config.clone())?.ac_power_series(weather)
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
