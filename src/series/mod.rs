//! Time series inputs and intermediates: weather, modeled power, demand.

pub mod types;
/// Weather rows and resampling.
pub mod weather;

pub use types::{DemandSeries, PowerSeries, Sample, TimeSeries, Timestamp};
pub use weather::{WeatherRecord, WeatherSeries};
