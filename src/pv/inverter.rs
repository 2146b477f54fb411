//! Sandia grid-tie inverter model (King et al. 2007).

use serde::Deserialize;

/// Sandia inverter parameters.
///
/// # Fields
/// * `paco` - Maximum AC output (W)
/// * `pdco` - DC input at which `paco` is reached at `vdco` (W)
/// * `vdco` - Nominal DC voltage (V)
/// * `pso` - DC power needed to start the inversion process (W)
/// * `c0`..`c3` - Efficiency curve shape coefficients
/// * `pnt` - AC power drawn at night (W, positive)
/// * `mppt_low`, `mppt_high` - DC voltage range of the MPP tracker (V)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SandiaInverter {
    pub paco: f64,
    pub pdco: f64,
    pub vdco: f64,
    pub pso: f64,
    pub c0: f64,
    pub c1: f64,
    pub c2: f64,
    pub c3: f64,
    pub pnt: f64,
    /// Upper DC voltage limit (V).
    pub vdcmax: f64,
    /// Upper DC current limit (A).
    pub idcmax: f64,
    pub mppt_low: f64,
    pub mppt_high: f64,
}

impl SandiaInverter {
    /// Checks the parameters the conversion divides by or clips against.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("paco", self.paco),
            ("pdco", self.pdco),
            ("vdco", self.vdco),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("{name} must be a positive number, got {value}"));
            }
        }
        if !(self.pso >= 0.0 && self.pso < self.pdco) {
            return Err(format!(
                "pso must be in [0, pdco), got {} with pdco {}",
                self.pso, self.pdco
            ));
        }
        if !(self.vdcmax > 0.0 && self.idcmax > 0.0) {
            return Err(format!(
                "vdcmax and idcmax must be positive, got {} and {}",
                self.vdcmax, self.idcmax
            ));
        }
        if !(0.0 <= self.mppt_low && self.mppt_low < self.mppt_high) {
            return Err(format!(
                "mppt range must satisfy 0 <= low < high, got [{}, {}]",
                self.mppt_low, self.mppt_high
            ));
        }
        Ok(())
    }

    /// AC output (W) for DC voltage `v_dc` (V) and DC power `p_dc` (W).
    ///
    /// Output is clipped at `paco`. Below the start-up power `pso` the
    /// inverter draws its night tare, returned as `-pnt`.
    pub fn ac_power(&self, v_dc: f64, p_dc: f64) -> f64 {
        if p_dc < self.pso {
            return -self.pnt.abs();
        }

        let dv = v_dc - self.vdco;
        let a = self.pdco * (1.0 + self.c1 * dv);
        let b = self.pso * (1.0 + self.c2 * dv);
        let c = self.c0 * (1.0 + self.c3 * dv);
        let span = a - b;

        let p_ac = (self.paco / span - c * span) * (p_dc - b) + c * (p_dc - b).powi(2);
        p_ac.min(self.paco)
    }

    /// Classifies a DC operating point against the input limits.
    ///
    /// Hard limits take precedence over the MPPT range.
    pub fn dc_window(&self, v_dc: f64, i_dc: f64) -> DcWindow {
        if v_dc > self.vdcmax {
            DcWindow::OverVoltage
        } else if i_dc > self.idcmax {
            DcWindow::OverCurrent
        } else if v_dc < self.mppt_low {
            DcWindow::BelowMppt
        } else if v_dc > self.mppt_high {
            DcWindow::AboveMppt
        } else {
            DcWindow::Within
        }
    }
}

/// Position of a DC operating point relative to the inverter's input range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DcWindow {
    Within,
    BelowMppt,
    AboveMppt,
    /// Above `vdcmax`.
    OverVoltage,
    /// Above `idcmax`.
    OverCurrent,
}

impl DcWindow {
    pub fn is_within(self) -> bool {
        self == Self::Within
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pv::catalog;

    fn inverter() -> SandiaInverter {
        catalog::inverter(catalog::DEFAULT_INVERTER).expect("catalog inverter")
    }

    #[test]
    fn rated_dc_at_nominal_voltage_gives_rated_ac() {
        let inv = inverter();
        let p = inv.ac_power(inv.vdco, inv.pdco);
        assert!((p - inv.paco).abs() < 1e-6, "p_ac was {p}");
    }

    #[test]
    fn clips_at_paco() {
        let inv = inverter();
        assert_eq!(inv.ac_power(inv.vdco, inv.pdco * 1.5), inv.paco);
    }

    #[test]
    fn night_tare_is_small_negative() {
        let inv = inverter();
        let p = inv.ac_power(0.0, 0.0);
        assert!(p < 0.0);
        assert_eq!(p, -inv.pnt);
    }

    #[test]
    fn nominal_point_is_inside_the_window() {
        let inv = inverter();
        assert!(inv.dc_window(inv.vdco, 0.5 * inv.pdco / inv.vdco).is_within());
    }

    #[test]
    fn hard_limits_win_over_mppt_range() {
        let inv = inverter();
        assert_eq!(inv.dc_window(inv.vdcmax + 1.0, 1.0), DcWindow::OverVoltage);
        assert_eq!(
            inv.dc_window(inv.vdcmax + 1.0, inv.idcmax + 1.0),
            DcWindow::OverVoltage
        );
        assert_eq!(inv.dc_window(inv.vdco, inv.idcmax + 0.5), DcWindow::OverCurrent);
        assert_eq!(inv.dc_window(inv.mppt_low - 1.0, 1.0), DcWindow::BelowMppt);
    }

    #[test]
    fn above_mppt_only_when_the_range_ends_below_vdcmax() {
        let mut inv = inverter();
        inv.mppt_high = inv.vdcmax - 5.0;
        assert_eq!(inv.dc_window(inv.vdcmax - 2.0, 1.0), DcWindow::AboveMppt);
    }

    #[test]
    fn validate_rejects_inverted_mppt_range() {
        let mut inv = inverter();
        inv.mppt_low = inv.mppt_high + 1.0;
        assert!(inv.validate().is_err());
    }

    #[test]
    fn validate_rejects_start_power_above_rating() {
        let mut inv = inverter();
        inv.pso = inv.pdco + 1.0;
        assert!(inv.validate().is_err());
    }
}
