#![allow(unknown_lints)]

extern crate chrono;
extern crate fern;
extern crate tempodb;

#[macro_use]
extern crate log;

use chrono::Utc;
use std::io::{self, Write};
use std::process;
use tempodb::config::{self, Args, Command};
use tempodb::{Client, HttpTransport, Series};

fn run(args: Args) -> tempodb::Result<()> {
    let client = Client::from_config(&args.client)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Read { filter, window } => {
            let cursor = client.read_multi_data_points(
                &filter,
                &window.interval,
                window.tz,
                window.rollup.as_ref(),
                window.interpolation.as_ref(),
            );
            let mut points = 0;
            for point in cursor {
                let point = point?;
                let values: Vec<String> = point
                    .data
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect();
                writeln!(out, "{} {}", point.timestamp.to_rfc3339(), values.join(" "))?;
                points += 1;
            }
            info!("read {} multi points", points);
        }
        Command::ReadSeries { key, window } => {
            let cursor = client.read_data_points(
                &Series::new(key),
                &window.interval,
                window.tz,
                window.rollup.as_ref(),
                window.interpolation.as_ref(),
            )?;
            let mut points = 0;
            for point in cursor {
                let point = point?;
                writeln!(out, "{} {}", point.timestamp.to_rfc3339(), point.value)?;
                points += 1;
            }
            info!("read {} points", points);
        }
        Command::DeleteSeries { key } => {
            delete(&client, &key)?;
            writeln!(out, "deleted {}", key)?;
        }
    }
    Ok(())
}

fn delete(client: &Client<HttpTransport>, key: &str) -> tempodb::Result<()> {
    let series = client.get_series(key)?;
    debug!("deleting {:?}", series);
    client.delete_series(&series)
}

fn main() {
    let args = match config::parse_args() {
        Ok(args) => args,
        Err(e) => {
            let _ = writeln!(io::stderr(), "{}", e);
            process::exit(2);
        }
    };

    let level = match args.verbose {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    let logging = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}][{}][{}] {}",
                record.module_path().unwrap_or("tempodb"),
                record.line().unwrap_or(0),
                Utc::now().to_rfc3339(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(io::stderr())
        .apply();
    if let Err(e) = logging {
        let _ = writeln!(io::stderr(), "could not set up logging: {}", e);
        process::exit(2);
    }

    info!("tempodb - {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(args) {
        error!("{}", e);
        let _ = writeln!(io::stderr(), "{}", e);
        process::exit(1);
    }
}
