//! PV production modeling and netload assembly for an energy community.

pub mod config;
pub mod error;
pub mod io;
pub mod logging;
/// Rescaling, span filtering and the demand/production join.
pub mod netload;
pub mod pipeline;
/// Weather-to-AC power conversion chain.
pub mod pv;
pub mod series;

pub use error::{NetloadError, Result};
