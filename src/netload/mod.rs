//! Rescaling and time alignment of modeled production against community demand.
//!
//! The steps run in this order:
//! 1. [`date_span`] of the demand series
//! 2. [`filter_to_span`] on the modeled power
//! 3. [`normalize`] to the community's capacity, clamping negatives to zero
//! 4. [`assemble_netload`] joins both series on timestamp

pub mod summary;

pub use summary::NetloadSummary;

use crate::error::{NetloadError, Result};
use crate::series::{DemandSeries, PowerSeries, Timestamp};

/// One row of the netload table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetloadRecord {
    pub timestamp: Timestamp,
    /// Community demand (W), as read.
    pub demand: f64,
    /// Rescaled production (W), never negative.
    pub production: f64,
}

/// Inclusive `(first, last)` timestamps of `demand`.
///
/// # Errors
///
/// Returns [`NetloadError::DataContract`] if `demand` is empty.
pub fn date_span(demand: &DemandSeries) -> Result<(Timestamp, Timestamp)> {
    match (demand.first(), demand.last()) {
        (Some(first), Some(last)) => Ok((first.timestamp, last.timestamp)),
        _ => Err(NetloadError::contract("demand series is empty")),
    }
}

/// Keeps the rows of `power` with `first <= timestamp <= last`.
///
/// A power series narrower than the span yields fewer rows; it is never padded.
pub fn filter_to_span(power: &PowerSeries, first: Timestamp, last: Timestamp) -> PowerSeries {
    power.retain_timestamps(|ts| first <= *ts && *ts <= last)
}

/// Rescales `power` by `target_capacity / reference_capacity` and clamps
/// negative results to zero.
///
/// Missing (NaN) values come out as zero.
///
/// # Errors
///
/// Returns [`NetloadError::Config`] if either capacity is not a positive number.
pub fn normalize(
    power: &PowerSeries,
    reference_capacity: f64,
    target_capacity: f64,
) -> Result<PowerSeries> {
    if !(reference_capacity.is_finite() && reference_capacity > 0.0) {
        return Err(NetloadError::config(
            "netload.reference_capacity_w",
            format!("must be > 0, got {reference_capacity}"),
        ));
    }
    if !(target_capacity.is_finite() && target_capacity > 0.0) {
        return Err(NetloadError::config(
            "netload.target_capacity_w",
            format!("must be > 0, got {target_capacity}"),
        ));
    }

    let factor = target_capacity / reference_capacity;
    // f64::max returns the non-NaN operand
    Ok(power.map_values(|v| (v * factor).max(0.0)))
}

/// Inner-joins `demand` and `production` on timestamp in ascending order.
///
/// Non-finite values in either input are replaced by zero before joining, so
/// a missing reading never drops a row. Timestamps present in only one input
/// are absent from the result.
pub fn assemble_netload(demand: &DemandSeries, production: &PowerSeries) -> Vec<NetloadRecord> {
    let demand = demand.fill_missing(0.0);
    let production = production.fill_missing(0.0);
    let (d, p) = (demand.samples(), production.samples());

    let mut records = Vec::with_capacity(d.len().min(p.len()));
    let (mut i, mut j) = (0, 0);
    while i < d.len() && j < p.len() {
        match d[i].timestamp.cmp(&p[j].timestamp) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                records.push(NetloadRecord {
                    timestamp: d[i].timestamp,
                    demand: d[i].value,
                    production: p[j].value,
                });
                i += 1;
                j += 1;
            }
        }
    }
    records
}
