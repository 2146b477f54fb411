//! Cell temperature models.

/// Sandia (King et al. 2004) module/cell temperature coefficients.
///
/// # Fields
/// * `a` - Upper bound of module temperature rise at low wind (dimensionless, log scale)
/// * `b` - Wind-speed cooling rate (s/m)
/// * `delta_t` - Cell-to-back-surface temperature difference at 1000 W/m² (°C)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SapmTemperature {
    pub a: f64,
    pub b: f64,
    pub delta_t: f64,
}

/// Named SAPM parameter sets for common mountings.
pub const SAPM_PARAMETER_SETS: &[(&str, SapmTemperature)] = &[
    (
        "open_rack_glass_glass",
        SapmTemperature {
            a: -3.47,
            b: -0.0594,
            delta_t: 3.0,
        },
    ),
    (
        "close_mount_glass_glass",
        SapmTemperature {
            a: -2.98,
            b: -0.0471,
            delta_t: 1.0,
        },
    ),
    (
        "open_rack_glass_polymer",
        SapmTemperature {
            a: -3.56,
            b: -0.0750,
            delta_t: 3.0,
        },
    ),
    (
        "insulated_back_glass_polymer",
        SapmTemperature {
            a: -2.81,
            b: -0.0455,
            delta_t: 0.0,
        },
    ),
];

/// Thermal model applied to plane-of-array irradiance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThermalModel {
    Sapm(SapmTemperature),
    /// Faiman (2008): `T_cell = T_air + E / (u0 + u1 * ws)`.
    Faiman { u0: f64, u1: f64 },
}

impl ThermalModel {
    /// Name accepted by [`ThermalModel::from_name`] for the Faiman model with
    /// typical crystalline-silicon heat-loss factors.
    pub const FAIMAN: &'static str = "faiman";

    /// Resolves a SAPM parameter-set name or `"faiman"`.
    pub fn from_name(name: &str) -> Option<Self> {
        if name == Self::FAIMAN {
            return Some(Self::Faiman {
                u0: 25.0,
                u1: 6.84,
            });
        }
        SAPM_PARAMETER_SETS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, p)| Self::Sapm(*p))
    }

    /// All accepted model names.
    pub fn names() -> impl Iterator<Item = &'static str> {
        SAPM_PARAMETER_SETS
            .iter()
            .map(|(n, _)| *n)
            .chain(std::iter::once(Self::FAIMAN))
    }

    /// Cell temperature (°C) for plane-of-array irradiance `poa_global` (W/m²),
    /// air temperature `temp_air` (°C) and wind speed (m/s).
    pub fn cell_temperature(&self, poa_global: f64, temp_air: f64, wind_speed: f64) -> f64 {
        match *self {
            Self::Sapm(p) => {
                let module = poa_global * (p.a + p.b * wind_speed).exp() + temp_air;
                module + poa_global / 1000.0 * p.delta_t
            }
            Self::Faiman { u0, u1 } => temp_air + poa_global / (u0 + u1 * wind_speed),
        }
    }
}

impl Default for ThermalModel {
    fn default() -> Self {
        Self::Sapm(SAPM_PARAMETER_SETS[0].1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sapm_open_rack_reference_point() {
        let model = ThermalModel::from_name("open_rack_glass_glass").expect("known set");
        let t = model.cell_temperature(1000.0, 25.0, 1.0);
        assert!((t - 57.32).abs() < 0.05, "cell temperature was {t}");
    }

    #[test]
    fn dark_cell_matches_air() {
        let model = ThermalModel::default();
        assert_eq!(model.cell_temperature(0.0, 12.5, 3.0), 12.5);
    }

    #[test]
    fn wind_cools_the_cell() {
        let model = ThermalModel::default();
        assert!(model.cell_temperature(800.0, 20.0, 6.0) < model.cell_temperature(800.0, 20.0, 0.0));
    }

    #[test]
    fn faiman_by_name() {
        let model = ThermalModel::from_name("faiman");
        assert!(matches!(model, Some(ThermalModel::Faiman { .. })));
        let t = model.map(|m| m.cell_temperature(1000.0, 20.0, 0.0));
        assert_eq!(t, Some(60.0));
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(ThermalModel::from_name("roof_bolted").is_none());
        assert_eq!(ThermalModel::names().count(), 5);
    }
}
