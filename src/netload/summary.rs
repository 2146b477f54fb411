//! Post-hoc energy figures computed from an assembled netload table.

use std::fmt;

use super::NetloadRecord;

/// Aggregate figures of a netload table.
#[derive(Debug, Clone, PartialEq)]
pub struct NetloadSummary {
    /// Number of joined rows.
    pub rows: usize,
    /// Total demand energy (kWh).
    pub demand_kwh: f64,
    /// Total production energy (kWh).
    pub production_kwh: f64,
    /// Peak demand (W).
    pub peak_demand_w: f64,
    /// Peak production (W).
    pub peak_production_w: f64,
    /// Demand covered by local production, `Σ min(demand, production)` (kWh).
    pub self_consumed_kwh: f64,
    /// Demand left for the grid, `Σ max(demand - production, 0)` (kWh).
    pub net_import_kwh: f64,
}

impl NetloadSummary {
    /// Computes the summary of `records` sampled every `step_hours` hours.
    pub fn from_records(records: &[NetloadRecord], step_hours: f64) -> Self {
        let to_kwh = step_hours / 1000.0;
        let mut summary = Self {
            rows: records.len(),
            demand_kwh: 0.0,
            production_kwh: 0.0,
            peak_demand_w: 0.0,
            peak_production_w: 0.0,
            self_consumed_kwh: 0.0,
            net_import_kwh: 0.0,
        };

        for r in records {
            summary.demand_kwh += r.demand * to_kwh;
            summary.production_kwh += r.production * to_kwh;
            summary.peak_demand_w = summary.peak_demand_w.max(r.demand);
            summary.peak_production_w = summary.peak_production_w.max(r.production);
            summary.self_consumed_kwh += r.demand.min(r.production).max(0.0) * to_kwh;
            summary.net_import_kwh += (r.demand - r.production).max(0.0) * to_kwh;
        }
        summary
    }

    /// Share of demand energy covered by local production (0-1).
    pub fn self_sufficiency(&self) -> f64 {
        if self.demand_kwh > 0.0 {
            self.self_consumed_kwh / self.demand_kwh
        } else {
            0.0
        }
    }
}

impl fmt::Display for NetloadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Netload Summary ---")?;
        writeln!(f, "Rows:                {}", self.rows)?;
        writeln!(f, "Demand:              {:.2} kWh", self.demand_kwh)?;
        writeln!(f, "Production:          {:.2} kWh", self.production_kwh)?;
        writeln!(f, "Peak demand:         {:.1} W", self.peak_demand_w)?;
        writeln!(f, "Peak production:     {:.1} W", self.peak_production_w)?;
        writeln!(
            f,
            "Self-consumed:       {:.2} kWh ({:.1}%)",
            self.self_consumed_kwh,
            100.0 * self.self_sufficiency()
        )?;
        write!(f, "Net import:          {:.2} kWh", self.net_import_kwh)
    }
}
