//! pv-netload entry point: CLI wiring around the library pipeline.

use std::path::{Path, PathBuf};
use std::process;

use pv_netload::config::ScenarioConfig;
use pv_netload::io::{load_demand, load_weather};
use pv_netload::logging;
use pv_netload::pipeline::Pipeline;
use tracing::error;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<PathBuf>,
    preset: Option<String>,
    weather: Option<PathBuf>,
    demand: Option<PathBuf>,
    out_dir: PathBuf,
    log: Option<String>,
}

fn print_help() {
    eprintln!("pv-netload: PV production model and netload assembler");
    eprintln!();
    eprintln!("Usage: pv-netload [OPTIONS] --weather <csv> --demand <csv>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>   Load scenario from TOML config file");
    eprintln!(
        "  --preset <name>     Use a built-in preset ({})",
        ScenarioConfig::PRESETS.join(", ")
    );
    eprintln!("  --weather <path>    Weather table (Date;ghi;dni;dhi;temp_air;wind_speed)");
    eprintln!("  --demand <path>     Community demand table (Date;Power)");
    eprintln!("  --out-dir <path>    Directory for energy.csv and netload.csv (default: .)");
    eprintln!("  --log <filter>      Log filter when RUST_LOG is unset (default: info)");
    eprintln!("  --help              Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}

fn value(args: &[String], i: usize, flag: &str, what: &str) -> String {
    match args.get(i) {
        Some(v) => v.clone(),
        None => fail(format!("{flag} requires a {what} argument")),
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        weather: None,
        demand: None,
        out_dir: PathBuf::from("."),
        log: None,
    };

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                cli.scenario_path = Some(value(&args, i, flag, "path").into());
            }
            "--preset" => {
                i += 1;
                cli.preset = Some(value(&args, i, flag, "name"));
            }
            "--weather" => {
                i += 1;
                cli.weather = Some(value(&args, i, flag, "path").into());
            }
            "--demand" => {
                i += 1;
                cli.demand = Some(value(&args, i, flag, "path").into());
            }
            "--out-dir" => {
                i += 1;
                cli.out_dir = value(&args, i, flag, "path").into();
            }
            "--log" => {
                i += 1;
                cli.log = Some(value(&args, i, flag, "filter"));
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    if cli.scenario_path.is_some() && cli.preset.is_some() {
        fail("--scenario and --preset are mutually exclusive");
    }
    cli
}

fn load_scenario(cli: &CliArgs) -> ScenarioConfig {
    let loaded = if let Some(ref path) = cli.scenario_path {
        ScenarioConfig::from_toml_file(path)
    } else if let Some(ref name) = cli.preset {
        ScenarioConfig::from_preset(name)
    } else {
        Ok(ScenarioConfig::baseline())
    };
    match loaded {
        Ok(cfg) => cfg,
        Err(e) => fail(e),
    }
}

fn required<'a>(path: &'a Option<PathBuf>, flag: &str) -> &'a Path {
    match path {
        Some(p) => p,
        None => fail(format!("{flag} is required")),
    }
}

fn main() {
    let cli = parse_args();
    logging::init(cli.log.as_deref().unwrap_or(logging::DEFAULT_FILTER));

    let scenario = load_scenario(&cli);
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let weather_path = required(&cli.weather, "--weather");
    let demand_path = required(&cli.demand, "--demand");
    let zone = match scenario.timezone() {
        Ok(z) => z,
        Err(e) => fail(e),
    };

    let result = Pipeline::from_scenario(&scenario).and_then(|pipeline| {
        let weather = load_weather(weather_path, zone)?;
        let demand = load_demand(demand_path, zone)?;
        pipeline.run_to_dir(&weather, &demand, &cli.out_dir)
    });

    match result {
        Ok(output) => println!("{}", output.summary()),
        Err(e) => {
            error!(error = %e, "run failed");
            fail(e);
        }
    }
}
