//! Integration tests for the weather-to-netload pipeline.

mod common;

use std::fs;

use pv_netload::config::ScenarioConfig;
use pv_netload::io::{read_demand, read_weather};
use pv_netload::netload::{assemble_netload, date_span, filter_to_span, normalize};
use pv_netload::pipeline::{ENERGY_FILE, NETLOAD_FILE, Pipeline};
use pv_netload::pv::compute_power;
use pv_netload::{NetloadError, series::TimeSeries};

fn baseline() -> Pipeline {
    Pipeline::from_scenario(&ScenarioConfig::baseline()).unwrap()
}

#[test]
fn compute_power_is_deterministic() {
    let pipeline = baseline();
    let weather = common::three_day_weather().resample(pipeline.cadence).unwrap();
    let a = compute_power(&weather, &pipeline.array).unwrap();
    let b = compute_power(&weather, &pipeline.array).unwrap();
    assert_eq!(a.len(), b.len());
    for (x, y) in a.values().zip(b.values()) {
        assert_eq!(x.to_bits(), y.to_bits());
    }
}

#[test]
fn full_day_run_yields_one_row_per_minute() {
    let demand = common::community_demand();
    let out = baseline().run(&common::three_day_weather(), &demand).unwrap();

    let (first, last) = date_span(&demand).unwrap();
    assert_eq!(out.energy.len(), 1440);
    assert!(out.energy.timestamps().all(|t| first <= t && t <= last));
    assert_eq!(out.netload.len(), 1440);
    for (row, d) in out.netload.iter().zip(demand.iter()) {
        assert_eq!(row.timestamp, d.timestamp);
        assert_eq!(row.demand, d.value);
        assert!(row.production >= 0.0);
    }
}

#[test]
fn production_is_the_rescaled_energy() {
    let pipeline = baseline();
    let out = pipeline
        .run(&common::three_day_weather(), &common::community_demand())
        .unwrap();
    let factor = pipeline.target_capacity / pipeline.reference_capacity;
    for (row, raw) in out.netload.iter().zip(out.energy.values()) {
        assert_eq!(row.production, (raw * factor).max(0.0));
    }
    // a 220 W reference rescaled to 4.5 kW stays below the scaled inverter limit
    let peak = out.netload.iter().map(|r| r.production).fold(0.0, f64::max);
    assert!(peak > 1000.0 && peak <= 250.0 * factor, "peak was {peak}");
}

#[test]
fn night_rows_have_zero_production() {
    let out = baseline()
        .run(&common::three_day_weather(), &common::community_demand())
        .unwrap();
    // 00:00 to 05:59 local
    assert!(out.netload[..360].iter().all(|r| r.production == 0.0));
    assert!(out.energy.values().take(360).all(|v| v < 0.0));
}

#[test]
fn partial_demand_day_is_joined_not_padded() {
    let demand = common::community_demand().retain_timestamps(|t| {
        *t >= common::day_start() + chrono::Duration::hours(10)
            && *t < common::day_start() + chrono::Duration::hours(12)
    });
    let out = baseline().run(&common::three_day_weather(), &demand).unwrap();
    assert_eq!(out.energy.len(), 120);
    assert_eq!(out.netload.len(), 120);
}

#[test]
fn steps_compose_like_the_pipeline() {
    let pipeline = baseline();
    let demand = common::community_demand();
    let weather = common::three_day_weather().resample(pipeline.cadence).unwrap();
    let power = compute_power(&weather, &pipeline.array).unwrap();
    let (first, last) = date_span(&demand).unwrap();
    let filtered = filter_to_span(&power, first, last);
    let normalized = normalize(
        &filtered,
        pipeline.reference_capacity,
        pipeline.target_capacity,
    )
    .unwrap();
    let manual = assemble_netload(&demand, &normalized);

    let out = pipeline.run(&common::three_day_weather(), &demand).unwrap();
    assert_eq!(out.energy, filtered);
    assert_eq!(out.netload, manual);
}

#[test]
fn summary_reports_the_day() {
    let out = baseline()
        .run(&common::three_day_weather(), &common::community_demand())
        .unwrap();
    let s = out.summary();
    assert_eq!(s.rows, 1440);
    assert!(s.demand_kwh > 48.0);
    assert!(s.production_kwh > 0.0);
    assert!(s.self_consumed_kwh <= s.production_kwh + 1e-9);
    assert!((s.self_consumed_kwh + s.net_import_kwh - s.demand_kwh).abs() < 1e-6);
}

#[test]
fn run_to_dir_writes_both_tables() {
    let dir = common::scratch_dir("run-to-dir");
    let demand = common::community_demand();
    let out = baseline()
        .run_to_dir(&common::three_day_weather(), &demand, &dir)
        .unwrap();

    let energy = fs::read_to_string(dir.join(ENERGY_FILE)).unwrap();
    let netload = fs::read_to_string(dir.join(NETLOAD_FILE)).unwrap();
    assert_eq!(energy.lines().next(), Some("Date;Power"));
    assert_eq!(netload.lines().next(), Some("Date;Demand;Production"));
    assert_eq!(energy.lines().count(), out.energy.len() + 1);
    assert_eq!(netload.lines().count(), out.netload.len() + 1);
    assert!(netload.lines().nth(1).is_some_and(|l| l.starts_with("2022-02-25 00:00:00+01:00;")));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn failed_run_writes_nothing() {
    let dir = common::scratch_dir("failed-run");
    let mut scenario = ScenarioConfig::baseline();
    scenario.netload.target_capacity_w = None;
    scenario.netload.contracted_power_w = None;
    assert!(Pipeline::from_scenario(&scenario).is_err());

    // an empty demand span fails before any file is created
    let empty = TimeSeries::default();
    let err = baseline().run_to_dir(&common::three_day_weather(), &empty, &dir);
    assert!(matches!(err, Err(NetloadError::DataContract(_))));
    assert!(!dir.join(ENERGY_FILE).exists());
    assert!(!dir.join(NETLOAD_FILE).exists());

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn tables_read_from_text_match_the_fixtures() {
    let weather = common::three_day_weather();
    let demand = common::community_demand();
    let parsed_weather =
        read_weather(common::weather_csv(&weather).as_bytes(), common::madrid()).unwrap();
    let parsed_demand =
        read_demand(common::demand_csv(&demand).as_bytes(), common::madrid()).unwrap();

    let a = baseline().run(&weather, &demand).unwrap();
    let b = baseline().run(&parsed_weather, &parsed_demand).unwrap();
    assert_eq!(a.netload.len(), b.netload.len());
    for (x, y) in a.netload.iter().zip(&b.netload) {
        assert_eq!(x.timestamp, y.timestamp);
        assert!((x.production - y.production).abs() < 1e-6);
    }
}

#[test]
fn tracker_collects_more_energy_than_fixed_tilt() {
    let weather = common::three_day_weather();
    let demand = common::community_demand();
    let fixed = baseline().run(&weather, &demand).unwrap().summary();
    let tracked = Pipeline::from_scenario(&ScenarioConfig::tracker())
        .unwrap()
        .run(&weather, &demand)
        .unwrap()
        .summary();
    assert!(tracked.production_kwh > 0.0 && fixed.production_kwh > 0.0);
    assert!(
        (tracked.production_kwh - fixed.production_kwh).abs() > 1e-3,
        "mounting should change the yield"
    );
}

#[test]
fn spring_forward_day_keeps_one_row_per_real_minute() {
    let weather = read_weather(common::spring_change_weather_csv().as_bytes(), common::madrid())
        .unwrap();
    let demand =
        read_demand(common::spring_change_demand_csv().as_bytes(), common::madrid()).unwrap();
    assert_eq!(demand.len(), 23 * 60);

    let out = baseline().run(&weather, &demand).unwrap();
    assert_eq!(out.netload.len(), 23 * 60);
    assert_eq!(out.energy.len(), 23 * 60);
    for pair in out.netload.windows(2) {
        assert_eq!(pair[1].timestamp - pair[0].timestamp, chrono::Duration::minutes(1));
    }

    // local noon is summer time and the sun is up
    let noon = out
        .netload
        .iter()
        .find(|r| r.timestamp.to_rfc3339() == "2022-03-27T12:00:00+02:00")
        .expect("local noon row");
    assert!(noon.production > 0.0);
    assert!(out.netload[..60].iter().all(|r| r.production == 0.0));
}
