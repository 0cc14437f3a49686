/*
 * This file is part of Ecsense.
 *
 * Copyright (C) 2025 Ecsense contributors
 *
 * Ecsense is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Ecsense is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Ecsense. If not, see <https://www.gnu.org/licenses/>.
 */

use std::thread;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use ecsense::board::{find_profile, SUPPORTED_BOARDS};
use ecsense::catalog::SensorKind;
use ecsense::config;
use ecsense::driver::{EcSensors, Reading};
use ecsense::ec::EcDev;
use ecsense::guard::FileLockGuard;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_help() {
    eprintln!("ecsense {} - ASUS EC sensor reader", VERSION);
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    ecsense [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -w, --watch           Keep printing readings until interrupted");
    eprintln!("        --interval-ms N   Refresh period in watch mode (default 1000)");
    eprintln!("        --board NAME      Use this DMI board name instead of autodetection");
    eprintln!("        --json            Print readings as JSON");
    eprintln!("        --list-boards     List supported boards and exit");
    eprintln!("    -v, --version         Print version");
    eprintln!("    -h, --help            Print this help");
    eprintln!();
    eprintln!("ENVIRONMENT:");
    eprintln!("    ECSENSE_LOG           Log level (trace, debug, info, warn, error)");
}

fn init_logging() {
    let log_level = std::env::var("ECSENSE_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(EnvFilter::new(&log_level))
        .with_writer(std::io::stderr)
        .init();
}

fn format_value(kind: SensorKind, value: u32) -> String {
    match kind {
        SensorKind::Temperature => format!("{:.1} °C", f64::from(value) / 1000.0),
        SensorKind::Fan => format!("{} RPM", value),
        SensorKind::Current => format!("{:.3} A", f64::from(value) / 1000.0),
        SensorKind::Voltage => format!("{:.3} V", f64::from(value) / 1000.0),
    }
}

fn print_readings(board: &str, readings: &[Reading]) {
    println!("{}", board);
    let sections = [
        (SensorKind::Temperature, "Temperatures"),
        (SensorKind::Fan, "Fans"),
        (SensorKind::Current, "Currents"),
        (SensorKind::Voltage, "Voltages"),
    ];
    for (kind, title) in sections {
        let rows: Vec<&Reading> = readings.iter().filter(|r| r.kind == kind).collect();
        if rows.is_empty() {
            continue;
        }
        println!("{}:", title);
        for reading in rows {
            println!(
                "  {:<12} {}",
                reading.label,
                format_value(reading.kind, reading.value)
            );
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let mut watch = false;
    let mut json = false;
    let mut interval_override: Option<u64> = None;
    let mut board_override: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return Ok(());
            }
            "-v" | "--version" => {
                println!("ecsense {}", VERSION);
                return Ok(());
            }
            "--list-boards" => {
                for board in &SUPPORTED_BOARDS {
                    println!("{}", board.name);
                }
                return Ok(());
            }
            "-w" | "--watch" => watch = true,
            "--json" => json = true,
            "--interval-ms" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --interval-ms requires a value");
                    std::process::exit(1);
                }
                match args[i].parse::<u64>() {
                    Ok(ms) => interval_override = Some(ms),
                    Err(_) => {
                        eprintln!("Error: --interval-ms expects milliseconds");
                        std::process::exit(1);
                    }
                }
            }
            "--board" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --board requires a name argument");
                    std::process::exit(1);
                }
                board_override = Some(args[i].clone());
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    init_logging();

    // The EC register window under debugfs is root-only.
    if unsafe { libc::geteuid() } != 0 {
        eprintln!("Error: ecsense requires root privileges to read the EC register window.");
        eprintln!(
            "Please run with: sudo {}",
            args.first().map(String::as_str).unwrap_or("ecsense")
        );
        std::process::exit(1);
    }

    let settings = config::load_settings().unwrap_or_default();
    if let Err(err) = config::validate_settings(&settings) {
        anyhow::bail!("invalid config {}: {}", config::config_path().display(), err);
    }

    let interval = Duration::from_millis(interval_override.unwrap_or(settings.poll_ms));

    let sensors = match board_override.or_else(|| settings.board.clone()) {
        Some(name) => {
            let profile = *find_profile(&name)
                .ok_or_else(|| anyhow::anyhow!("board {:?} is not supported", name))?;
            EcSensors::new(
                profile,
                EcDev::open()?,
                FileLockGuard::for_name(profile.guard),
            )?
        }
        None => EcSensors::probe()?,
    };

    loop {
        let readings = sensors.snapshot()?;
        if json {
            println!("{}", serde_json::to_string_pretty(&readings)?);
        } else {
            print_readings(sensors.board().name, &readings);
        }
        if !watch {
            break;
        }
        thread::sleep(interval);
    }

    Ok(())
}
