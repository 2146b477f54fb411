//! Physical PV power model: weather rows to inverter AC output.
//!
//! The chain per timestep is solar position, irradiance decomposition and
//! transposition, cell temperature, SAPM module DC output, Sandia inverter.

pub mod catalog;
/// Sandia grid-tie inverter model.
pub mod inverter;
pub mod irradiance;
/// SAPM module electrical model.
pub mod module;
pub mod solar_position;
pub mod system;
pub mod temperature;
/// Single-axis tracker geometry.
pub mod tracking;

pub use inverter::{DcWindow, SandiaInverter};
pub use irradiance::SkyModel;
pub use module::SapmModule;
pub use system::{ArrayConfig, Mounting, PowerBreakdown, PvSystem, Site, compute_power};
pub use temperature::ThermalModel;
pub use tracking::SingleAxisTracker;
