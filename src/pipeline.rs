//! End-to-end run: weather to modeled power to the netload table.

use std::fs;
use std::path::Path;

use chrono::Duration;
use tracing::{debug, info, warn};

use crate::config::ScenarioConfig;
use crate::error::{NetloadError, Result};
use crate::io;
use crate::netload::{self, NetloadRecord, NetloadSummary};
use crate::pv::{self, ArrayConfig};
use crate::series::{DemandSeries, PowerSeries, WeatherSeries};

/// Raw production file name.
pub const ENERGY_FILE: &str = "energy.csv";
/// Joined demand/production file name.
pub const NETLOAD_FILE: &str = "netload.csv";

/// Everything a run needs besides the two input series.
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub array: ArrayConfig,
    /// Weather is resampled to this spacing before modeling.
    pub cadence: Duration,
    /// Nameplate the modeled array represents (W).
    pub reference_capacity: f64,
    /// Capacity the production is rescaled to (W).
    pub target_capacity: f64,
}

/// Both tables of a successful run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Span-filtered power before rescaling (the `energy.csv` table).
    pub energy: PowerSeries,
    /// Joined demand and rescaled production (the `netload.csv` table).
    pub netload: Vec<NetloadRecord>,
    /// Row spacing in hours.
    pub step_hours: f64,
}

impl PipelineOutput {
    pub fn summary(&self) -> NetloadSummary {
        NetloadSummary::from_records(&self.netload, self.step_hours)
    }
}

impl Pipeline {
    /// Builds a pipeline from a scenario, resolving model keys and the target capacity.
    ///
    /// # Errors
    ///
    /// Returns [`NetloadError::Config`] with the first invalid field.
    pub fn from_scenario(scenario: &ScenarioConfig) -> Result<Self> {
        if let Some(first) = scenario.validate().into_iter().next() {
            return Err(first.into());
        }
        Ok(Self {
            array: scenario.array_config()?,
            cadence: scenario.cadence(),
            reference_capacity: scenario.netload.reference_capacity_w,
            target_capacity: scenario.netload.target_capacity_w()?,
        })
    }

    /// Runs the model and the netload assembly entirely in memory.
    ///
    /// # Errors
    ///
    /// Fails on the first configuration or data-contract violation; nothing
    /// partial is returned.
    pub fn run(&self, weather: &WeatherSeries, demand: &DemandSeries) -> Result<PipelineOutput> {
        let resampled = weather.resample(self.cadence)?;
        info!(
            rows = weather.len(),
            resampled = resampled.len(),
            cadence_s = self.cadence.num_seconds(),
            "weather resampled"
        );

        let power = pv::compute_power(&resampled, &self.array)?;
        let (first, last) = netload::date_span(demand)?;
        let energy = netload::filter_to_span(&power, first, last);
        if energy.is_empty() {
            warn!(%first, %last, "modeled power does not overlap the demand span");
        } else if energy.len() < demand.len() {
            debug!(
                power_rows = energy.len(),
                demand_rows = demand.len(),
                "modeled power covers part of the demand span"
            );
        }

        let normalized =
            netload::normalize(&energy, self.reference_capacity, self.target_capacity)?;
        let netload = netload::assemble_netload(demand, &normalized);
        info!(
            energy_rows = energy.len(),
            netload_rows = netload.len(),
            factor = self.target_capacity / self.reference_capacity,
            "netload assembled"
        );

        Ok(PipelineOutput {
            energy,
            netload,
            step_hours: self.cadence.num_seconds() as f64 / 3600.0,
        })
    }

    /// Runs the pipeline and writes `energy.csv` and `netload.csv` into `dir`.
    ///
    /// Files are written only after the computation succeeded.
    ///
    /// # Errors
    ///
    /// As [`Pipeline::run`], plus [`NetloadError::Io`] if `dir` or a file
    /// cannot be created.
    pub fn run_to_dir(
        &self,
        weather: &WeatherSeries,
        demand: &DemandSeries,
        dir: &Path,
    ) -> Result<PipelineOutput> {
        let output = self.run(weather, demand)?;
        fs::create_dir_all(dir).map_err(|source| NetloadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        io::export_energy(&output.energy, &dir.join(ENERGY_FILE))?;
        io::export_netload(&output.netload, &dir.join(NETLOAD_FILE))?;
        info!(dir = %dir.display(), "tables written");
        Ok(output)
    }
}
