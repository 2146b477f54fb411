//! Built-in module and inverter parameter sets, keyed by their Sandia/CEC
//! database names.
//!
//! Lookups fail with a [`ConfigError`] naming the offending key; unknown
//! models are never replaced by a default. Scenarios can add their own
//! parameter sets under `[catalog.modules.<key>]` and
//! `[catalog.inverters.<key>]`.

use super::inverter::SandiaInverter;
use super::module::SapmModule;
use crate::config::ConfigError;

/// 220 W monocrystalline module.
pub const DEFAULT_MODULE: &str = "Canadian_Solar_CS5P_220M___2009_";

/// 250 W microinverter, one per module.
pub const DEFAULT_INVERTER: &str = "ABB__MICRO_0_25_I_OUTD_US_208__208V_";

/// The same microinverter as certified in the CEC 2014 listing: lower tare,
/// wider MPPT range, higher DC limits.
pub const ABB_MICRO_CEC_2014: &str = "ABB__MICRO_0_25_I_OUTD_US_208_208V__CEC_2014_";

/// Known module keys.
pub const MODULES: &[&str] = &[DEFAULT_MODULE];

/// Known inverter keys.
pub const INVERTERS: &[&str] = &[DEFAULT_INVERTER, ABB_MICRO_CEC_2014];

/// Looks up SAPM parameters by database key.
///
/// # Errors
///
/// Returns a `ConfigError` on `array.module` if the key is unknown.
pub fn module(name: &str) -> Result<SapmModule, ConfigError> {
    match name {
        DEFAULT_MODULE => Ok(SapmModule {
            cells_in_series: 96,
            isco: 5.09115,
            voco: 59.2608,
            impo: 4.54629,
            vmpo: 48.3156,
            aisc: 0.000397,
            aimp: 0.000181,
            bvoco: -0.21696,
            mbvoc: 0.0,
            bvmpo: -0.235488,
            mbvmp: 0.0,
            n: 1.4032,
            c0: 1.01284,
            c1: -0.0128398,
            c2: -0.0341129,
            c3: -32.1963,
            a: [0.928385, 0.068093, -0.0157738, 0.0016606, -6.93e-05],
            b: [1.0, -0.002438, 0.0003103, -1.246e-05, 2.11e-07, -1.36e-09],
            fd: 1.0,
        }),
        _ => Err(unknown("array.module", name, MODULES)),
    }
}

/// Looks up Sandia inverter parameters by database key.
///
/// # Errors
///
/// Returns a `ConfigError` on `array.inverter` if the key is unknown.
pub fn inverter(name: &str) -> Result<SandiaInverter, ConfigError> {
    match name {
        DEFAULT_INVERTER => Ok(SandiaInverter {
            paco: 250.0,
            pdco: 259.588593,
            vdco: 40.0,
            pso: 2.089607,
            c0: -4.1e-05,
            c1: -9.1e-05,
            c2: 0.000494,
            c3: -0.013171,
            pnt: 0.075,
            vdcmax: 50.0,
            idcmax: 6.489715,
            mppt_low: 30.0,
            mppt_high: 50.0,
        }),
        ABB_MICRO_CEC_2014 => Ok(SandiaInverter {
            paco: 250.0,
            pdco: 259.5880038,
            vdco: 40.24214,
            pso: 1.7711,
            c0: -2.48e-05,
            c1: -9.01e-05,
            c2: 6.69e-04,
            c3: -0.0189,
            pnt: 0.02,
            vdcmax: 65.0,
            idcmax: 10.0,
            mppt_low: 20.0,
            mppt_high: 50.0,
        }),
        _ => Err(unknown("array.inverter", name, INVERTERS)),
    }
}

fn unknown(field: &str, name: &str, known: &[&str]) -> ConfigError {
    ConfigError::new(
        field,
        format!("unknown model \"{name}\", available: {}", known.join(", ")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_model_resolves_and_validates() {
        for name in MODULES {
            let m = module(name);
            assert!(m.is_ok(), "module {name} should resolve");
            assert!(m.map(|m| m.validate().is_ok()).unwrap_or(false));
        }
        for name in INVERTERS {
            let inv = inverter(name);
            assert!(inv.is_ok(), "inverter {name} should resolve");
            assert!(inv.map(|i| i.validate().is_ok()).unwrap_or(false));
        }
    }

    #[test]
    fn default_module_is_a_220_w_reference() {
        let nameplate = module(DEFAULT_MODULE).map(|m| m.nameplate_w()).unwrap_or(0.0);
        assert!((nameplate - 220.0).abs() < 1.0, "nameplate was {nameplate}");
    }

    #[test]
    fn inverter_listings_differ() {
        let a = inverter(DEFAULT_INVERTER).expect("default");
        let b = inverter(ABB_MICRO_CEC_2014).expect("2014 listing");
        assert_eq!(a.paco, b.paco);
        assert!(b.pnt < a.pnt);
        assert!(b.vdcmax > a.vdcmax && b.mppt_low < a.mppt_low);
    }

    #[test]
    fn unknown_module_names_the_field() {
        let err = module("Acme_9000").expect_err("unknown key");
        assert_eq!(err.field, "array.module");
        assert!(err.message.contains("Acme_9000"));
    }

    #[test]
    fn unknown_inverter_lists_alternatives() {
        let err = inverter("nope").expect_err("unknown key");
        assert_eq!(err.field, "array.inverter");
        assert!(err.message.contains(DEFAULT_INVERTER));
    }
}
