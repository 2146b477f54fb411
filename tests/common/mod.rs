//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use std::f64::consts::PI;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use chrono::{Duration, FixedOffset, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use pv_netload::series::{DemandSeries, TimeSeries, Timestamp, WeatherRecord, WeatherSeries};

/// Central European winter time.
pub fn cet() -> FixedOffset {
    FixedOffset::east_opt(3600).unwrap()
}

/// Timezone of the baseline site.
pub fn madrid() -> Tz {
    chrono_tz::Europe::Madrid
}

/// Midnight of the demand day, 2022-02-25 CET.
pub fn day_start() -> Timestamp {
    cet().with_ymd_and_hms(2022, 2, 25, 0, 0, 0).unwrap()
}

/// Clear-sky-like global irradiance (W/m²) for a local hour, peaking at 13:00.
pub fn bell_ghi(hour: f64) -> f64 {
    if (7.0..=19.0).contains(&hour) {
        600.0 * (PI * (hour - 7.0) / 12.0).sin()
    } else {
        0.0
    }
}

/// Hourly GHI-only weather from the day before to the day after the demand day.
pub fn three_day_weather() -> WeatherSeries {
    let start = day_start() - Duration::days(1);
    let rows = (0..72)
        .map(|h| {
            let ghi = bell_ghi((h % 24) as f64);
            WeatherRecord::ghi_only(start + Duration::hours(h), ghi, 9.0)
        })
        .collect();
    WeatherSeries::new(rows).unwrap()
}

/// Demand (W) at minute `m` of the day: a 2 kW base with an evening peak.
pub fn demand_at(m: i64) -> f64 {
    let hour = m as f64 / 60.0;
    2000.0 + 1500.0 * (-(hour - 20.0).powi(2) / 8.0).exp()
}

/// One day of 1-minute community demand, 1440 rows.
pub fn community_demand() -> DemandSeries {
    TimeSeries::from_pairs((0..1440).map(|m| (day_start() + Duration::minutes(m), demand_at(m))))
        .unwrap()
}

/// Renders `weather` as a semicolon table with naive local timestamps.
pub fn weather_csv(weather: &WeatherSeries) -> String {
    let mut out = String::from("Date;ghi;temp_air\n");
    for r in weather.iter() {
        writeln!(
            out,
            "{};{};{}",
            r.timestamp.format("%Y-%m-%d %H:%M:%S"),
            r.ghi,
            r.temp_air
        )
        .unwrap();
    }
    out
}

/// Renders `demand` as a `Date;Power` table with naive local timestamps.
pub fn demand_csv(demand: &DemandSeries) -> String {
    let mut out = String::from("Date;Power\n");
    for s in demand.iter() {
        writeln!(out, "{};{}", s.timestamp.format("%Y-%m-%d %H:%M:%S"), s.value).unwrap();
    }
    out
}

/// Hourly GHI-only weather over 2022-03-26..=28, written with naive Madrid
/// wall-clock times. The spring change skips 02:00 on the 27th.
pub fn spring_change_weather_csv() -> String {
    let start = Utc.with_ymd_and_hms(2022, 3, 25, 23, 0, 0).unwrap();
    let mut out = String::from("Date;ghi;temp_air\n");
    for h in 0..72 {
        let local = (start + Duration::hours(h)).with_timezone(&madrid());
        let ghi = bell_ghi(f64::from(local.hour()));
        writeln!(out, "{};{};12", local.format("%Y-%m-%d %H:%M:%S"), ghi).unwrap();
    }
    out
}

/// 1-minute demand for the 23-hour local day of 2022-03-27, naive Madrid times.
pub fn spring_change_demand_csv() -> String {
    let start = Utc.with_ymd_and_hms(2022, 3, 26, 23, 0, 0).unwrap();
    let mut out = String::from("Date;Power\n");
    for m in 0..23 * 60 {
        let local = (start + Duration::minutes(m)).with_timezone(&madrid());
        writeln!(out, "{};{}", local.format("%Y-%m-%d %H:%M:%S"), demand_at(m)).unwrap();
    }
    out
}

/// Fresh, empty scratch directory unique to this process and `name`.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("pv-netload-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}
