//! File adapters around the in-memory pipeline.

pub mod csv;

pub use self::csv::{
    export_energy, export_netload, load_demand, load_weather, parse_timestamp, read_demand,
    read_weather, write_energy, write_netload,
};
