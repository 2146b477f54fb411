//! Weather input rows and resampling to the simulation cadence.

use chrono::{DateTime, Duration};

use super::types::{Timestamp, ensure_strictly_increasing};
use crate::error::{NetloadError, Result};

/// One row of the weather time series.
///
/// # Fields
/// * `ghi` - Global horizontal irradiance (W/m²)
/// * `dni` - Direct normal irradiance (W/m²); decomposed from `ghi` when absent
/// * `dhi` - Diffuse horizontal irradiance (W/m²); decomposed from `ghi` when absent
/// * `temp_air` - Ambient air temperature (°C)
/// * `wind_speed` - Wind speed at 10 m (m/s); treated as calm when absent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherRecord {
    pub timestamp: Timestamp,
    pub ghi: f64,
    pub dni: Option<f64>,
    pub dhi: Option<f64>,
    pub temp_air: f64,
    pub wind_speed: Option<f64>,
}

impl WeatherRecord {
    /// Row with all three irradiance components.
    pub fn new(
        timestamp: Timestamp,
        ghi: f64,
        dni: f64,
        dhi: f64,
        temp_air: f64,
        wind_speed: f64,
    ) -> Self {
        Self {
            timestamp,
            ghi,
            dni: Some(dni),
            dhi: Some(dhi),
            temp_air,
            wind_speed: Some(wind_speed),
        }
    }

    /// Checks the physical ranges the PV model relies on.
    ///
    /// `ghi` and `temp_air` must be finite. Irradiance and wind speed must not
    /// be negative; a NaN optional field counts as absent.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.ghi.is_finite() || !self.temp_air.is_finite() {
            return Err(format!(
                "ghi and temp_air must be finite, got ghi={} temp_air={}",
                self.ghi, self.temp_air
            ));
        }
        for (name, value) in [
            ("ghi", Some(self.ghi)),
            ("dni", self.dni),
            ("dhi", self.dhi),
            ("wind_speed", self.wind_speed),
        ] {
            if let Some(v) = value.filter(|v| *v < 0.0) {
                return Err(format!("{name} must not be negative, got {v}"));
            }
        }
        Ok(())
    }

    /// Row carrying only global irradiance and air temperature.
    pub fn ghi_only(timestamp: Timestamp, ghi: f64, temp_air: f64) -> Self {
        Self {
            timestamp,
            ghi,
            dni: None,
            dhi: None,
            temp_air,
            wind_speed: None,
        }
    }
}

/// Ordered, duplicate-free weather series.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSeries {
    records: Vec<WeatherRecord>,
}

impl WeatherSeries {
    /// # Errors
    ///
    /// Returns [`NetloadError::DataContract`] when `records` is empty, a row
    /// fails [`WeatherRecord::validate`], or the timestamps are not strictly
    /// increasing.
    pub fn new(records: Vec<WeatherRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(NetloadError::contract("weather series is empty"));
        }
        for r in &records {
            r.validate()
                .map_err(|m| NetloadError::contract(format!("weather row {}: {m}", r.timestamp)))?;
        }
        ensure_strictly_increasing(records.iter().map(|r| r.timestamp))?;
        Ok(Self { records })
    }

    pub fn records(&self) -> &[WeatherRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WeatherRecord> {
        self.records.iter()
    }

    /// Resamples onto a regular grid with spacing `cadence`.
    ///
    /// The grid starts at the first cadence boundary (counted from the Unix
    /// epoch) at or after the first row and ends at or before the last row.
    /// Each field is interpolated linearly in time between the two bracketing
    /// rows; an optional field stays absent when either neighbour lacks it.
    /// Output timestamps keep the offset of the first input row.
    ///
    /// # Errors
    ///
    /// Returns [`NetloadError::Config`] for a non-positive cadence and
    /// [`NetloadError::DataContract`] if the series spans less than one grid point.
    pub fn resample(&self, cadence: Duration) -> Result<WeatherSeries> {
        let step = cadence.num_seconds();
        if step <= 0 {
            return Err(NetloadError::config(
                "simulation.cadence_minutes",
                "resample cadence must be positive",
            ));
        }

        let first = self.records[0].timestamp;
        let offset = *first.offset();
        let start = first.timestamp();
        let end = self.records[self.records.len() - 1].timestamp.timestamp();
        let rem = start.rem_euclid(step);
        let mut t = if rem == 0 { start } else { start + step - rem };

        let mut out = Vec::new();
        let mut j = 0;
        while t <= end {
            while j + 1 < self.records.len() && self.records[j + 1].timestamp.timestamp() <= t {
                j += 1;
            }
            let timestamp = DateTime::from_timestamp(t, 0)
                .ok_or_else(|| NetloadError::contract(format!("timestamp {t} out of range")))?
                .with_timezone(&offset);

            let lo = &self.records[j];
            let record = if lo.timestamp.timestamp() == t || j + 1 == self.records.len() {
                WeatherRecord { timestamp, ..*lo }
            } else {
                let hi = &self.records[j + 1];
                let t0 = lo.timestamp.timestamp();
                let t1 = hi.timestamp.timestamp();
                let w = (t - t0) as f64 / (t1 - t0) as f64;
                WeatherRecord {
                    timestamp,
                    ghi: lerp(lo.ghi, hi.ghi, w),
                    dni: lerp_opt(lo.dni, hi.dni, w),
                    dhi: lerp_opt(lo.dhi, hi.dhi, w),
                    temp_air: lerp(lo.temp_air, hi.temp_air, w),
                    wind_speed: lerp_opt(lo.wind_speed, hi.wind_speed, w),
                }
            };
            out.push(record);
            t += step;
        }

        if out.is_empty() {
            return Err(NetloadError::contract(format!(
                "weather series from {first} does not reach a {step}s cadence boundary"
            )));
        }
        Ok(WeatherSeries { records: out })
    }
}

fn lerp(a: f64, b: f64, w: f64) -> f64 {
    a + (b - a) * w
}

fn lerp_opt(a: Option<f64>, b: Option<f64>, w: f64) -> Option<f64> {
    Some(lerp(a?, b?, w))
}
