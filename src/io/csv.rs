//! Semicolon-delimited readers and writers for weather, demand, energy and
//! netload tables.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use chrono::{DateTime, LocalResult, NaiveDateTime};
use chrono_tz::Tz;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::Deserialize;

use crate::error::{NetloadError, Result};
use crate::netload::NetloadRecord;
use crate::series::{
    DemandSeries, PowerSeries, Sample, TimeSeries, Timestamp, WeatherRecord, WeatherSeries,
};

/// Field separator of every table this crate reads or writes.
pub const DELIMITER: u8 = b';';

/// Output timestamp layout, e.g. `2022-02-25 13:05:00+01:00`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%z"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

const POWER_HEADER: [&str; 2] = ["Date", "Power"];
const NETLOAD_HEADER: [&str; 3] = ["Date", "Demand", "Production"];
const WEATHER_REQUIRED: [&str; 3] = ["Date", "ghi", "temp_air"];

#[derive(Debug, Deserialize)]
struct DemandRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Power")]
    power: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WeatherRow {
    #[serde(rename = "Date")]
    date: String,
    ghi: Option<f64>,
    dni: Option<f64>,
    dhi: Option<f64>,
    temp_air: Option<f64>,
    wind_speed: Option<f64>,
}

/// Parses a timestamp with an explicit offset, or a naive one localised in
/// `zone`.
///
/// Accepted layouts: RFC 3339, `YYYY-MM-DD HH:MM:SS±HH:MM`, and naive
/// `YYYY-MM-DD HH:MM[:SS]` with either a space or `T` separator.
///
/// # Errors
///
/// Returns [`NetloadError::DataContract`] if no layout matches, or if a naive
/// time falls in a daylight-saving gap or fold of `zone`.
pub fn parse_timestamp(s: &str, zone: Tz) -> Result<Timestamp> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts);
    }
    if let Some(ts) = OFFSET_FORMATS
        .iter()
        .find_map(|f| DateTime::parse_from_str(s, f).ok())
    {
        return Ok(ts);
    }
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .ok_or_else(|| NetloadError::contract(format!("unparseable timestamp \"{s}\"")))?;
    match naive.and_local_timezone(zone) {
        LocalResult::Single(ts) => Ok(ts.fixed_offset()),
        LocalResult::Ambiguous(early, late) => Err(NetloadError::contract(format!(
            "local time \"{s}\" is ambiguous in {} ({} or {})",
            zone.name(),
            early.fixed_offset(),
            late.fixed_offset()
        ))),
        LocalResult::None => Err(NetloadError::contract(format!(
            "local time \"{s}\" does not exist in {}",
            zone.name()
        ))),
    }
}

/// Formats a timestamp the way every output table writes it.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn reader<R: Read>(source: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .delimiter(DELIMITER)
        .trim(Trim::All)
        .from_reader(source)
}

fn require_columns(headers: &StringRecord, required: &[&str], table: &str) -> Result<()> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|name| !headers.iter().any(|h| h == *name))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(NetloadError::contract(format!(
            "{table} table lacks column(s): {}",
            missing.join(", ")
        )))
    }
}

/// Reads a `Date;Power` demand table.
///
/// An empty `Power` cell is kept as a missing reading (NaN).
///
/// # Errors
///
/// Returns [`NetloadError::DataContract`] for missing columns, unparseable
/// cells or timestamps, and empty or non-monotonic tables.
pub fn read_demand(source: impl Read, zone: Tz) -> Result<DemandSeries> {
    let mut rdr = reader(source);
    require_columns(rdr.headers()?, &POWER_HEADER, "demand")?;

    let mut samples = Vec::new();
    for (i, row) in rdr.deserialize::<DemandRow>().enumerate() {
        let line = i + 2;
        let row = row.map_err(|e| NetloadError::contract(format!("demand line {line}: {e}")))?;
        let timestamp = parse_timestamp(&row.date, zone)?;
        samples.push(Sample::new(timestamp, row.power.unwrap_or(f64::NAN)));
    }
    TimeSeries::new(samples)
}

/// Reads a `Date;ghi;dni;dhi;temp_air;wind_speed` weather table.
///
/// `dni`, `dhi` and `wind_speed` may be absent as columns or as cells.
/// Unknown columns are ignored.
///
/// # Errors
///
/// Returns [`NetloadError::DataContract`] when `Date`, `ghi` or `temp_air`
/// is missing, for unparseable cells or timestamps, for negative irradiance
/// or wind speed, and for empty or non-monotonic tables.
pub fn read_weather(source: impl Read, zone: Tz) -> Result<WeatherSeries> {
    let mut rdr = reader(source);
    require_columns(rdr.headers()?, &WEATHER_REQUIRED, "weather")?;

    let mut records = Vec::new();
    for (i, row) in rdr.deserialize::<WeatherRow>().enumerate() {
        let line = i + 2;
        let row = row.map_err(|e| NetloadError::contract(format!("weather line {line}: {e}")))?;
        let timestamp = parse_timestamp(&row.date, zone)?;
        let (Some(ghi), Some(temp_air)) = (row.ghi, row.temp_air) else {
            return Err(NetloadError::contract(format!(
                "weather line {line}: ghi and temp_air are required"
            )));
        };
        let record = WeatherRecord {
            timestamp,
            ghi,
            dni: row.dni,
            dhi: row.dhi,
            temp_air,
            wind_speed: row.wind_speed,
        };
        record
            .validate()
            .map_err(|m| NetloadError::contract(format!("weather line {line}: {m}")))?;
        records.push(record);
    }
    WeatherSeries::new(records)
}

/// Opens `path` and reads it with [`read_demand`].
///
/// # Errors
///
/// Returns [`NetloadError::Io`] if the file cannot be opened.
pub fn load_demand(path: &Path, zone: Tz) -> Result<DemandSeries> {
    read_demand(open(path)?, zone)
}

/// Opens `path` and reads it with [`read_weather`].
///
/// # Errors
///
/// Returns [`NetloadError::Io`] if the file cannot be opened.
pub fn load_weather(path: &Path, zone: Tz) -> Result<WeatherSeries> {
    read_weather(open(path)?, zone)
}

/// Writes a `Date;Power` table.
///
/// # Errors
///
/// Returns [`NetloadError::Csv`] if writing fails.
pub fn write_energy(power: &PowerSeries, writer: impl Write) -> Result<()> {
    let mut wtr = WriterBuilder::new().delimiter(DELIMITER).from_writer(writer);
    wtr.write_record(POWER_HEADER)?;
    for s in power.iter() {
        wtr.write_record(&[format_timestamp(&s.timestamp), s.value.to_string()])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Writes a `Date;Demand;Production` table in record order, without an index column.
///
/// # Errors
///
/// Returns [`NetloadError::Csv`] if writing fails.
pub fn write_netload(records: &[NetloadRecord], writer: impl Write) -> Result<()> {
    let mut wtr = WriterBuilder::new().delimiter(DELIMITER).from_writer(writer);
    wtr.write_record(NETLOAD_HEADER)?;
    for r in records {
        wtr.write_record(&[
            format_timestamp(&r.timestamp),
            r.demand.to_string(),
            r.production.to_string(),
        ])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Creates `path` and writes it with [`write_energy`].
///
/// # Errors
///
/// Returns [`NetloadError::Io`] if the file cannot be created.
pub fn export_energy(power: &PowerSeries, path: &Path) -> Result<()> {
    write_energy(power, create(path)?)
}

/// Creates `path` and writes it with [`write_netload`].
///
/// # Errors
///
/// Returns [`NetloadError::Io`] if the file cannot be created.
pub fn export_netload(records: &[NetloadRecord], path: &Path) -> Result<()> {
    write_netload(records, create(path)?)
}

fn open(path: &Path) -> Result<io::BufReader<File>> {
    File::open(path)
        .map(io::BufReader::new)
        .map_err(|source| NetloadError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn create(path: &Path) -> Result<io::BufWriter<File>> {
    File::create(path)
        .map(io::BufWriter::new)
        .map_err(|source| NetloadError::Io {
            path: path.to_path_buf(),
            source,
        })
}
