//! Sun position and the atmospheric quantities derived from it.
//!
//! Zenith and azimuth come from the NREL Solar Position Algorithm
//! (`solar_positioning::spa`), evaluated at the site altitude with ΔT
//! estimated from the calendar date.

use std::f64::consts::PI;
use std::fmt;

use chrono::{Datelike, Utc};
use solar_positioning::{spa, time::DeltaT, types::RefractionCorrection};

use super::system::Site;
use crate::error::{NetloadError, Result};
use crate::series::Timestamp;

/// Solar constant (W/m²) used for extraterrestrial irradiance.
pub const SOLAR_CONSTANT: f64 = 1366.1;

/// Standard sea-level pressure (Pa).
pub const SEA_LEVEL_PRESSURE: f64 = 101_325.0;

/// Sun position for one instant, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarPosition {
    /// Geometric zenith, without refraction.
    pub zenith: f64,
    /// Zenith as seen through the atmosphere; every model stage uses this one.
    pub apparent_zenith: f64,
    /// Measured from north, clockwise (east = 90, south = 180).
    pub azimuth: f64,
}

/// Computes the sun position seen from `site` at `timestamp`.
///
/// Refraction is corrected for `pressure_pa` and `temp_air` (°C). The
/// timestamp's offset only affects how it is written.
///
/// # Errors
///
/// Returns [`NetloadError::DataContract`] when the instant lies outside the
/// range the algorithm supports or the refraction inputs are out of range.
pub fn solar_position(
    timestamp: &Timestamp,
    site: &Site,
    pressure_pa: f64,
    temp_air: f64,
) -> Result<SolarPosition> {
    let utc = timestamp.with_timezone(&Utc);
    let delta_t = DeltaT::estimate_from_date(utc.year(), utc.month())
        .map_err(|e| spa_error(timestamp, e))?;
    let refraction = RefractionCorrection::new(pressure_pa / 100.0, temp_air)
        .map_err(|e| spa_error(timestamp, e))?;

    let geometric = spa::solar_position(
        *timestamp,
        site.latitude,
        site.longitude,
        site.altitude_m,
        delta_t,
        None,
    )
    .map_err(|e| spa_error(timestamp, e))?;
    let apparent = spa::solar_position(
        *timestamp,
        site.latitude,
        site.longitude,
        site.altitude_m,
        delta_t,
        Some(refraction),
    )
    .map_err(|e| spa_error(timestamp, e))?;

    Ok(SolarPosition {
        zenith: geometric.zenith_angle(),
        apparent_zenith: apparent.zenith_angle(),
        azimuth: apparent.azimuth(),
    })
}

fn spa_error(timestamp: &Timestamp, e: impl fmt::Display) -> NetloadError {
    NetloadError::contract(format!("solar position at {timestamp}: {e}"))
}

fn day_angle(day_of_year: u32) -> f64 {
    2.0 * PI * (f64::from(day_of_year) - 1.0) / 365.0
}

/// Extraterrestrial direct normal irradiance (W/m²) for a day of year,
/// Spencer (1971) Earth-Sun distance correction.
pub fn extraterrestrial_dni(day_of_year: u32) -> f64 {
    let b = day_angle(day_of_year);
    SOLAR_CONSTANT
        * (1.00011
            + 0.034221 * b.cos()
            + 0.00128 * b.sin()
            + 0.000719 * (2.0 * b).cos()
            + 0.000077 * (2.0 * b).sin())
}

/// Kasten-Young (1989) relative optical air mass; `None` below the horizon.
pub fn relative_airmass(zenith: f64) -> Option<f64> {
    if !(0.0..90.0).contains(&zenith) {
        return None;
    }
    Some(1.0 / (zenith.to_radians().cos() + 0.50572 * (96.07995 - zenith).powf(-1.6364)))
}

/// Pressure-corrected air mass.
pub fn absolute_airmass(relative: f64, pressure_pa: f64) -> f64 {
    relative * pressure_pa / SEA_LEVEL_PRESSURE
}

/// Standard-atmosphere pressure (Pa) at `altitude_m` above sea level.
pub fn pressure_at_altitude(altitude_m: f64) -> f64 {
    100.0 * ((44331.514 - altitude_m) / 11880.516).powf(1.0 / 0.1902632)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> Timestamp {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .unwrap()
    }

    fn site(latitude: f64, longitude: f64) -> Site {
        Site {
            latitude,
            longitude,
            altitude_m: 0.0,
        }
    }

    fn at_sea_level(ts: &Timestamp, s: &Site) -> SolarPosition {
        solar_position(ts, s, SEA_LEVEL_PRESSURE, 12.0).unwrap()
    }

    // Reference case of the NREL SPA report (Reda & Andreas 2008, table A4.1):
    // Golden, Colorado, 2003-10-17 12:30:30 -07:00.
    #[test]
    fn matches_the_nrel_reference_case() {
        let ts = FixedOffset::west_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2003, 10, 17, 12, 30, 30)
            .unwrap();
        let golden = Site {
            latitude: 39.742476,
            longitude: -105.1786,
            altitude_m: 1830.14,
        };
        let pos = solar_position(&ts, &golden, 82_000.0, 11.0).unwrap();
        // ΔT is estimated rather than the report's 67 s, worth about 0.01°
        assert!(
            (pos.apparent_zenith - 50.11162).abs() < 0.03,
            "zenith was {}",
            pos.apparent_zenith
        );
        assert!((pos.azimuth - 194.34024).abs() < 0.03, "azimuth was {}", pos.azimuth);
        assert!(pos.zenith > pos.apparent_zenith);
    }

    #[test]
    fn summer_solstice_noon_matches_latitude_minus_tilt() {
        let pos = at_sea_level(&utc(2022, 6, 21, 12, 0), &site(40.0, 0.0));
        assert!((pos.zenith - 16.56).abs() < 0.2, "zenith was {}", pos.zenith);
        assert!((pos.azimuth - 180.0).abs() < 3.0, "azimuth was {}", pos.azimuth);
    }

    #[test]
    fn morning_sun_is_east_and_afternoon_sun_is_west() {
        let s = site(45.0, 0.0);
        let morning = at_sea_level(&utc(2022, 6, 21, 8, 0), &s);
        let afternoon = at_sea_level(&utc(2022, 6, 21, 16, 0), &s);
        assert!(morning.azimuth > 0.0 && morning.azimuth < 180.0);
        assert!(afternoon.azimuth > 180.0 && afternoon.azimuth < 360.0);
    }

    #[test]
    fn midnight_is_below_horizon() {
        let pos = at_sea_level(&utc(2022, 2, 25, 0, 0), &site(40.4, -3.7));
        assert!(pos.apparent_zenith > 90.0);
        assert_eq!(relative_airmass(pos.apparent_zenith), None);
    }

    #[test]
    fn offset_does_not_change_position() {
        let plus_two = FixedOffset::east_opt(7200)
            .unwrap()
            .with_ymd_and_hms(2022, 6, 21, 14, 0, 0)
            .unwrap();
        let s = site(45.0, 7.0);
        let a = at_sea_level(&plus_two, &s);
        let b = at_sea_level(&utc(2022, 6, 21, 12, 0), &s);
        assert!((a.zenith - b.zenith).abs() < 1e-9);
        assert!((a.azimuth - b.azimuth).abs() < 1e-9);
    }

    #[test]
    fn refraction_lifts_the_low_sun() {
        // sunrise region in Madrid, late February
        let pos = at_sea_level(&utc(2022, 2, 25, 7, 10), &site(40.4, -3.7));
        let lift = pos.zenith - pos.apparent_zenith;
        assert!(lift > 0.1 && lift < 1.0, "refraction was {lift}");
    }

    #[test]
    fn extraterrestrial_peaks_near_perihelion() {
        let january = extraterrestrial_dni(3);
        let july = extraterrestrial_dni(185);
        assert!(january > july);
        assert!((1300.0..1420.0).contains(&january));
        assert!((1300.0..1420.0).contains(&july));
    }

    #[test]
    fn airmass_is_one_overhead_and_two_at_sixty_degrees() {
        let overhead = relative_airmass(0.0).unwrap_or_default();
        let sixty = relative_airmass(60.0).unwrap_or_default();
        assert!((overhead - 1.0).abs() < 0.01);
        assert!((sixty - 2.0).abs() < 0.01);
        assert_eq!(relative_airmass(95.0), None);
    }

    #[test]
    fn sea_level_pressure_is_standard() {
        assert!((pressure_at_altitude(0.0) - SEA_LEVEL_PRESSURE).abs() < 10.0);
        assert!(pressure_at_altitude(1500.0) < 90_000.0);
    }
}
