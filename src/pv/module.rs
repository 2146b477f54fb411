//! Sandia Array Performance Model (SAPM) for module DC output.

use serde::Deserialize;

/// Boltzmann constant (J/K).
const BOLTZMANN: f64 = 1.380_66e-23;
/// Elementary charge (C).
const ELEMENTARY_CHARGE: f64 = 1.602_18e-19;
/// Reference cell temperature (°C).
const T_REF: f64 = 25.0;
/// Reference irradiance (W/m²).
const E_REF: f64 = 1000.0;

/// SAPM module parameters as published in the Sandia module database.
///
/// Currents are in A, voltages in V, temperature coefficients per °C.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SapmModule {
    pub cells_in_series: u32,
    /// Short-circuit current at reference conditions.
    pub isco: f64,
    /// Open-circuit voltage at reference conditions.
    pub voco: f64,
    /// Max-power current at reference conditions.
    pub impo: f64,
    /// Max-power voltage at reference conditions.
    pub vmpo: f64,
    /// Isc temperature coefficient (1/°C, normalized).
    pub aisc: f64,
    /// Imp temperature coefficient (1/°C, normalized).
    pub aimp: f64,
    /// Voc temperature coefficient (V/°C).
    pub bvoco: f64,
    /// Irradiance dependence of `bvoco`.
    pub mbvoc: f64,
    /// Vmp temperature coefficient (V/°C).
    pub bvmpo: f64,
    /// Irradiance dependence of `bvmpo`.
    pub mbvmp: f64,
    /// Diode factor.
    pub n: f64,
    pub c0: f64,
    pub c1: f64,
    pub c2: f64,
    pub c3: f64,
    /// Air-mass modifier polynomial `A0..A4`.
    pub a: [f64; 5],
    /// Incidence-angle modifier polynomial `B0..B5`.
    pub b: [f64; 6],
    /// Fraction of diffuse irradiance used by the module.
    pub fd: f64,
}

/// Operating point of a module or an array.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DcOutput {
    pub i_sc: f64,
    pub v_oc: f64,
    pub i_mp: f64,
    pub v_mp: f64,
    pub p_mp: f64,
}

impl DcOutput {
    /// Scales a single-module output to an array of `series` modules per
    /// string and `parallel` strings.
    pub fn scale(self, series: u32, parallel: u32) -> Self {
        let (s, p) = (f64::from(series), f64::from(parallel));
        Self {
            i_sc: self.i_sc * p,
            v_oc: self.v_oc * s,
            i_mp: self.i_mp * p,
            v_mp: self.v_mp * s,
            p_mp: self.p_mp * s * p,
        }
    }
}

impl SapmModule {
    /// Rated power at reference conditions (W).
    pub fn nameplate_w(&self) -> f64 {
        self.impo * self.vmpo
    }

    /// Checks that the reference electrical values are usable.
    pub fn validate(&self) -> Result<(), String> {
        if self.cells_in_series == 0 {
            return Err("cells_in_series must be > 0".into());
        }
        for (name, value) in [
            ("isco", self.isco),
            ("voco", self.voco),
            ("impo", self.impo),
            ("vmpo", self.vmpo),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("{name} must be a positive number, got {value}"));
            }
        }
        if !(0.0..=1.0).contains(&self.fd) {
            return Err(format!("fd must be in [0, 1], got {}", self.fd));
        }
        Ok(())
    }

    /// Spectral (air-mass) modifier `F1`, clipped at zero.
    pub fn airmass_modifier(&self, airmass_absolute: f64) -> f64 {
        polyval(&self.a, airmass_absolute).max(0.0)
    }

    /// Incidence-angle modifier `F2`; zero for light arriving from behind.
    pub fn aoi_modifier(&self, aoi: f64) -> f64 {
        if !(0.0..90.0).contains(&aoi) {
            return 0.0;
        }
        polyval(&self.b, aoi).max(0.0)
    }

    /// Effective irradiance (W/m²) reaching the cells.
    ///
    /// `airmass_absolute` is `None` when the sun is below the horizon, in which
    /// case the module is treated as dark.
    pub fn effective_irradiance(
        &self,
        poa_direct: f64,
        poa_diffuse: f64,
        airmass_absolute: Option<f64>,
        aoi: f64,
    ) -> f64 {
        let Some(am) = airmass_absolute else {
            return 0.0;
        };
        self.airmass_modifier(am) * (poa_direct * self.aoi_modifier(aoi) + self.fd * poa_diffuse)
    }

    /// Single-module operating point for `effective_irradiance` (W/m²) and
    /// `cell_temperature` (°C).
    pub fn dc_output(&self, effective_irradiance: f64, cell_temperature: f64) -> DcOutput {
        let ee = effective_irradiance / E_REF;
        if !(ee > 0.0) {
            return DcOutput::default();
        }

        let dt = cell_temperature - T_REF;
        let ns = f64::from(self.cells_in_series);
        let thermal_voltage =
            self.n * BOLTZMANN * (cell_temperature + 273.15) / ELEMENTARY_CHARGE;
        let log_ee = ee.ln();

        let bvoco = self.bvoco + self.mbvoc * (1.0 - ee);
        let bvmpo = self.bvmpo + self.mbvmp * (1.0 - ee);

        let i_sc = self.isco * ee * (1.0 + self.aisc * dt);
        let i_mp = self.impo * (self.c0 * ee + self.c1 * ee * ee) * (1.0 + self.aimp * dt);
        let v_oc = (self.voco + ns * thermal_voltage * log_ee + bvoco * dt).max(0.0);
        let v_mp = (self.vmpo
            + self.c2 * ns * thermal_voltage * log_ee
            + self.c3 * ns * (thermal_voltage * log_ee).powi(2)
            + bvmpo * dt)
            .max(0.0);

        DcOutput {
            i_sc,
            v_oc,
            i_mp,
            v_mp,
            p_mp: i_mp * v_mp,
        }
    }
}

/// Evaluates `c[0] + c[1] x + c[2] x² + ...`.
fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}
