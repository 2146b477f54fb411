//! Timestamped scalar series used for modeled power and community demand.

use chrono::{DateTime, FixedOffset};

use crate::error::{NetloadError, Result};

/// Timezone-aware timestamp. Equality and ordering compare instants, so two
/// timestamps written with different offsets still match in a join.
pub type Timestamp = DateTime<FixedOffset>;

/// One value of a series at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: Timestamp,
    /// Power in watts. May be NaN for a missing reading.
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: Timestamp, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// An ordered series with strictly increasing timestamps.
///
/// Constructed through [`TimeSeries::new`], which rejects empty input and
/// non-monotonic or duplicate timestamps. Transformations (filtering,
/// rescaling) preserve the ordering and may legitimately produce an empty
/// series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    samples: Vec<Sample>,
}

/// Modeled AC power output (W), one row per weather timestamp.
pub type PowerSeries = TimeSeries;

/// Community power demand (W) as produced by the consumption generator.
pub type DemandSeries = TimeSeries;

impl TimeSeries {
    /// Builds a series from samples in time order.
    ///
    /// # Errors
    ///
    /// Returns [`NetloadError::DataContract`] if `samples` is empty or its
    /// timestamps are not strictly increasing.
    pub fn new(samples: Vec<Sample>) -> Result<Self> {
        if samples.is_empty() {
            return Err(NetloadError::contract("series is empty"));
        }
        ensure_strictly_increasing(samples.iter().map(|s| s.timestamp))?;
        Ok(Self { samples })
    }

    /// Builds a series from `(timestamp, value)` pairs.
    ///
    /// # Errors
    ///
    /// Same as [`TimeSeries::new`].
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Timestamp, f64)>) -> Result<Self> {
        Self::new(
            pairs
                .into_iter()
                .map(|(timestamp, value)| Sample::new(timestamp, value))
                .collect(),
        )
    }

    /// Wraps samples already known to be ordered (derived from a validated series).
    pub(crate) fn from_ordered(samples: Vec<Sample>) -> Self {
        debug_assert!(
            samples
                .windows(2)
                .all(|w| w[0].timestamp < w[1].timestamp)
        );
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.samples.iter().map(|s| s.timestamp)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.value)
    }

    /// Applies `f` to every value, keeping the timestamps.
    pub fn map_values(&self, mut f: impl FnMut(f64) -> f64) -> Self {
        Self::from_ordered(
            self.samples
                .iter()
                .map(|s| Sample::new(s.timestamp, f(s.value)))
                .collect(),
        )
    }

    /// Keeps the samples whose timestamp satisfies `keep`.
    pub fn retain_timestamps(&self, mut keep: impl FnMut(&Timestamp) -> bool) -> Self {
        Self::from_ordered(
            self.samples
                .iter()
                .filter(|s| keep(&s.timestamp))
                .copied()
                .collect(),
        )
    }

    /// Replaces every non-finite value (missing reading) with `fill`.
    pub fn fill_missing(&self, fill: f64) -> Self {
        self.map_values(|v| if v.is_finite() { v } else { fill })
    }
}

/// Fails on the first timestamp that does not come strictly after its predecessor.
pub(crate) fn ensure_strictly_increasing(
    timestamps: impl IntoIterator<Item = Timestamp>,
) -> Result<()> {
    let mut prev: Option<Timestamp> = None;
    for (row, ts) in timestamps.into_iter().enumerate() {
        if let Some(p) = prev {
            if ts == p {
                return Err(NetloadError::contract(format!(
                    "duplicate timestamp {ts} at row {row}"
                )));
            }
            if ts < p {
                return Err(NetloadError::contract(format!(
                    "timestamp {ts} at row {row} is earlier than {p}"
                )));
            }
        }
        prev = Some(ts);
    }
    Ok(())
}
