//! Provides the configuration file and CLI option parsers
//!
//! The library itself never reads configuration on its own. A caller builds a
//! `ClientConfig`, by hand or from a TOML file, and hands it to
//! `Client::from_config`. The `tempodb` executable additionally parses its
//! command line into `Args`.

use chrono_tz::Tz;
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use error::{Error, Result};
use http::Credentials;
use model::{Filter, Interpolation, Interval, Rollup};
use std::ffi::OsString;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use time;
use toml;
use url::Url;

const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");

/// Where and how to reach the TempoDB API.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    /// API host name or IP address.
    pub host: String,
    /// API port.
    pub port: u16,
    /// Determines whether to use HTTP or HTTPS.
    pub secure: bool,
    /// API key, sent as the basic auth user.
    pub key: String,
    /// API secret, sent as the basic auth password.
    pub secret: String,
    /// API version path prefix.
    pub version: String,
    /// Round-trip timeout handed to the HTTP transport. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            host: "api.tempo-db.com".to_string(),
            port: 443,
            secure: true,
            key: String::new(),
            secret: String::new(),
            version: "v1".to_string(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// The API root, `https://api.tempo-db.com:443/` by default.
    pub fn base_url(&self) -> Result<Url> {
        let proto = if self.secure { "https" } else { "http" };
        Url::parse(&format!("{}://{}:{}/", proto, self.host, self.port))
            .map_err(|e| Error::Config(format!("bad host {:?}: {}", self.host, e)))
    }

    /// The credentials requests are signed with.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            key: self.key.clone(),
            secret: self.secret.clone(),
        }
    }
}

fn get_str(value: &toml::Value, name: &str) -> Result<Option<String>> {
    match value.get(name) {
        Some(v) => v.as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| Error::Config(format!("{} must be a string", name))),
        None => Ok(None),
    }
}

fn get_int(value: &toml::Value, name: &str) -> Result<Option<i64>> {
    match value.get(name) {
        Some(v) => v.as_integer()
            .map(Some)
            .ok_or_else(|| Error::Config(format!("{} must be an integer", name))),
        None => Ok(None),
    }
}

/// Parse a TOML client configuration.
///
/// Recognized keys are `host`, `port`, `secure`, `key`, `secret`, `version`
/// and `timeout` (seconds). Missing keys keep their defaults, unknown keys are
/// ignored.
pub fn parse_config_file(buffer: &str) -> Result<ClientConfig> {
    let mut config = ClientConfig::default();
    let value: toml::Value = toml::from_str(buffer)?;

    if let Some(host) = get_str(&value, "host")? {
        config.host = host;
    }
    if let Some(port) = get_int(&value, "port")? {
        if port < 1 || port > i64::from(u16::max_value()) {
            return Err(Error::Config(format!("port {} out of range", port)));
        }
        config.port = port as u16;
    }
    if let Some(secure) = value.get("secure") {
        config.secure = secure
            .as_bool()
            .ok_or_else(|| Error::Config("secure must be a boolean".to_string()))?;
    }
    if let Some(key) = get_str(&value, "key")? {
        config.key = key;
    }
    if let Some(secret) = get_str(&value, "secret")? {
        config.secret = secret;
    }
    if let Some(version) = get_str(&value, "version")? {
        config.version = version;
    }
    if let Some(timeout) = get_int(&value, "timeout")? {
        if timeout < 0 {
            return Err(Error::Config("timeout must not be negative".to_string()));
        }
        config.timeout = Some(Duration::from_secs(timeout as u64));
    }
    Ok(config)
}

/// Read and parse the TOML client configuration at `path`.
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<ClientConfig> {
    let path = path.as_ref();
    let mut fp = File::open(path)
        .map_err(|e| Error::Config(format!("could not open {}: {}", path.display(), e)))?;
    let mut buffer = String::new();
    fp.read_to_string(&mut buffer)
        .map_err(|e| Error::Config(format!("could not read {}: {}", path.display(), e)))?;
    parse_config_file(&buffer)
}

/// The time window and server-side processing of a read.
#[derive(Clone, Debug, PartialEq)]
pub struct Window {
    /// Bounds of the read.
    pub interval: Interval,
    /// Timezone bounds are sent in and points come back in.
    pub tz: Tz,
    /// Optional rollup.
    pub rollup: Option<Rollup>,
    /// Optional interpolation.
    pub interpolation: Option<Interpolation>,
}

/// What the executable was asked to do.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Multi-series read.
    Read {
        /// Series selection.
        filter: Filter,
        /// Window of the read.
        window: Window,
    },
    /// Single-series read.
    ReadSeries {
        /// Series key.
        key: String,
        /// Window of the read.
        window: Window,
    },
    /// Delete a series.
    DeleteSeries {
        /// Series key.
        key: String,
    },
}

/// Configuration of the `tempodb` executable.
#[derive(Clone, Debug, PartialEq)]
pub struct Args {
    /// The client configuration loaded from `--config`.
    pub client: ClientConfig,
    /// The verbosity setting. The higher the value the more chatty the
    /// executable gets.
    pub verbose: u64,
    /// The requested command.
    pub command: Command,
}

fn window_args<'a, 'b>(cmd: App<'a, 'b>) -> App<'a, 'b> {
    cmd.arg(
        Arg::with_name("start")
            .long("start")
            .takes_value(true)
            .required(true)
            .help("Inclusive start, ISO-8601."),
    ).arg(
            Arg::with_name("end")
                .long("end")
                .takes_value(true)
                .required(true)
                .help("Exclusive end, ISO-8601."),
        )
        .arg(
            Arg::with_name("tz")
                .long("tz")
                .takes_value(true)
                .default_value("UTC")
                .help("Timezone for bounds and output."),
        )
        .arg(
            Arg::with_name("rollup-period")
                .long("rollup-period")
                .takes_value(true)
                .requires("rollup-fold")
                .help("Rollup bucket width, ISO-8601 period."),
        )
        .arg(
            Arg::with_name("rollup-fold")
                .long("rollup-fold")
                .takes_value(true)
                .requires("rollup-period")
                .help("Rollup fold: sum, mean, max, min, count, stddev, ss, range, first, last."),
        )
        .arg(
            Arg::with_name("interpolation-period")
                .long("interpolation-period")
                .takes_value(true)
                .requires("interpolation-function")
                .help("Interpolation spacing, ISO-8601 period."),
        )
        .arg(
            Arg::with_name("interpolation-function")
                .long("interpolation-function")
                .takes_value(true)
                .requires("interpolation-period")
                .help("Interpolation function: linear or zoh."),
        )
}

fn parse_window(matches: &ArgMatches) -> Result<Window> {
    let tz = time::parse_timezone(matches.value_of("tz").unwrap_or("UTC"))?;
    let bound = |name: &str| -> Result<_> {
        let raw = matches
            .value_of(name)
            .ok_or_else(|| Error::Precondition(format!("--{} is required", name)))?;
        time::parse_timestamp(raw, &tz)
    };
    let interval = Interval::new(bound("start")?, bound("end")?)?;

    let rollup = match (matches.value_of("rollup-period"), matches.value_of("rollup-fold")) {
        (Some(period), Some(fold)) => Some(Rollup::new(period.parse()?, fold.parse()?)),
        _ => None,
    };
    let interpolation = match (
        matches.value_of("interpolation-period"),
        matches.value_of("interpolation-function"),
    ) {
        (Some(period), Some(function)) => Some(Interpolation::new(period.parse()?, function.parse()?)),
        _ => None,
    };
    Ok(Window {
        interval: interval,
        tz: tz,
        rollup: rollup,
        interpolation: interpolation,
    })
}

fn parse_filter(matches: &ArgMatches) -> Result<Filter> {
    let mut filter = Filter::new();
    for key in matches.values_of("key").into_iter().flat_map(|v| v) {
        filter = filter.add_key(key);
    }
    for tag in matches.values_of("tag").into_iter().flat_map(|v| v) {
        filter = filter.add_tag(tag);
    }
    for attr in matches.values_of("attr").into_iter().flat_map(|v| v) {
        let mut parts = attr.splitn(2, '=');
        match (parts.next(), parts.next()) {
            (Some(name), Some(value)) if !name.is_empty() => {
                filter = filter.add_attribute(name, value);
            }
            _ => {
                return Err(Error::Precondition(format!(
                    "attribute {:?} must look like name=value",
                    attr
                )))
            }
        }
    }
    Ok(filter)
}

/// Parse the executable's arguments from the process environment.
///
/// See `tempodb --help` for the full set of options.
pub fn parse_args() -> Result<Args> {
    parse_args_from(::std::env::args_os())
}

/// Parse the executable's arguments from `argv`, program name first.
pub fn parse_args_from<I, T>(argv: I) -> Result<Args>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let series_key = Arg::with_name("series-key")
        .index(1)
        .required(true)
        .help("The series key.");
    let matches = App::new("tempodb")
        .version(VERSION.unwrap_or("unknown"))
        .about("read from and manage a TempoDB database")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("config-file")
                .long("config")
                .short("C")
                .value_name("config")
                .required(true)
                .help("The config file to feed in.")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Turn on verbose output."),
        )
        .subcommand(window_args(
            SubCommand::with_name("read")
                .about("Read several series, one line per timestamp.")
                .arg(
                    Arg::with_name("key")
                        .long("key")
                        .takes_value(true)
                        .multiple(true)
                        .number_of_values(1)
                        .help("Select a series by key."),
                )
                .arg(
                    Arg::with_name("tag")
                        .long("tag")
                        .takes_value(true)
                        .multiple(true)
                        .number_of_values(1)
                        .help("Select series carrying a tag."),
                )
                .arg(
                    Arg::with_name("attr")
                        .long("attr")
                        .takes_value(true)
                        .multiple(true)
                        .number_of_values(1)
                        .help("Select series carrying an attribute, name=value."),
                ),
        ))
        .subcommand(window_args(
            SubCommand::with_name("read-series")
                .about("Read one series, one line per point.")
                .arg(series_key.clone()),
        ))
        .subcommand(
            SubCommand::with_name("delete-series")
                .about("Delete a series and all its data.")
                .arg(series_key),
        )
        .get_matches_from_safe(argv)
        .map_err(|e| Error::Config(e.message))?;

    let verbose = matches.occurrences_of("verbose");
    let config_path = matches
        .value_of("config-file")
        .ok_or_else(|| Error::Config("--config is required".to_string()))?;
    let client = load_config_file(config_path)?;

    let command = match matches.subcommand() {
        ("read", Some(sub)) => Command::Read {
            filter: parse_filter(sub)?,
            window: parse_window(sub)?,
        },
        ("read-series", Some(sub)) => Command::ReadSeries {
            key: sub.value_of("series-key").unwrap_or_default().to_string(),
            window: parse_window(sub)?,
        },
        ("delete-series", Some(sub)) => Command::DeleteSeries {
            key: sub.value_of("series-key").unwrap_or_default().to_string(),
        },
        (other, _) => return Err(Error::Config(format!("unknown command {:?}", other))),
    };

    Ok(Args {
        client: client,
        verbose: verbose,
        command: command,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use model::Fold;
    use std::io::Write;
    use tempdir::TempDir;
    use time::{utc, Period};

    #[test]
    fn config_defaults() {
        let config = parse_config_file("").unwrap();
        assert_eq!(ClientConfig::default(), config);
        assert_eq!(
            "https://api.tempo-db.com/",
            config.base_url().unwrap().as_str()
        );
    }

    #[test]
    fn config_file_full() {
        let config = r#"
host = "localhost"
port = 4242
secure = false
key = "my-key"
secret = "my-secret"
version = "v2"
timeout = 30
"#;
        let config = parse_config_file(config).unwrap();

        assert_eq!("localhost", config.host);
        assert_eq!(4242, config.port);
        assert_eq!(false, config.secure);
        assert_eq!("my-key", config.credentials().key);
        assert_eq!("my-secret", config.credentials().secret);
        assert_eq!("v2", config.version);
        assert_eq!(Some(Duration::from_secs(30)), config.timeout);
        assert_eq!("http://localhost:4242/", config.base_url().unwrap().as_str());
    }

    #[test]
    fn config_ignores_unknown_keys() {
        let config = parse_config_file("flush-interval = 60\n").unwrap();
        assert_eq!(ClientConfig::default(), config);
    }

    #[test]
    fn config_rejects_wrong_types() {
        for bad in &["port = \"eighty\"", "secure = 1", "host = 7", "port = 70000", "timeout = -1"] {
            match parse_config_file(bad) {
                Err(Error::Config(_)) => {}
                other => panic!("{} gave {:?}", bad, other),
            }
        }
    }

    #[test]
    fn config_rejects_bad_toml() {
        match parse_config_file("host = ") {
            Err(Error::Config(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    fn config_on_disk(dir: &TempDir) -> String {
        let path = dir.path().join("tempodb.toml");
        let mut fp = File::create(&path).unwrap();
        fp.write_all(b"host = \"localhost\"\nsecure = false\nport = 8080\n")
            .unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn load_config_from_disk() {
        let dir = TempDir::new("tempodb-config").unwrap();
        let config = load_config_file(config_on_disk(&dir)).unwrap();
        assert_eq!("localhost", config.host);
        assert_eq!(8080, config.port);
    }

    #[test]
    fn load_missing_config_is_config_error() {
        let dir = TempDir::new("tempodb-config").unwrap();
        match load_config_file(dir.path().join("absent.toml")) {
            Err(Error::Config(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn args_read_command() {
        let dir = TempDir::new("tempodb-args").unwrap();
        let path = config_on_disk(&dir);
        let args = parse_args_from(vec![
            "tempodb", "-C", path.as_str(), "-vv", "read",
            "--key", "key1", "--key", "key2", "--tag", "tag1", "--attr", "host=web01",
            "--start", "2012-01-01T00:00:00.000+0000", "--end", "2012-01-02",
            "--rollup-period", "PT1M", "--rollup-fold", "sum",
        ]).unwrap();

        assert_eq!(2, args.verbose);
        assert_eq!(8080, args.client.port);
        match args.command {
            Command::Read { filter, window } => {
                assert_eq!(
                    Filter::new()
                        .add_key("key1")
                        .add_key("key2")
                        .add_tag("tag1")
                        .add_attribute("host", "web01"),
                    filter
                );
                assert_eq!(utc(2012, 1, 1, 0, 0, 0).unwrap(), window.interval.start());
                assert_eq!(utc(2012, 1, 2, 0, 0, 0).unwrap(), window.interval.end());
                assert_eq!(Tz::UTC, window.tz);
                assert_eq!(Some(Rollup::new(Period::minutes(1), Fold::Sum)), window.rollup);
                assert_eq!(None, window.interpolation);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn args_read_series_in_zone() {
        let dir = TempDir::new("tempodb-args").unwrap();
        let path = config_on_disk(&dir);
        let args = parse_args_from(vec![
            "tempodb", "--config", path.as_str(), "read-series", "key1",
            "--start", "2012-01-01", "--end", "2012-01-02", "--tz", "America/Chicago",
            "--interpolation-period", "PT1H", "--interpolation-function", "linear",
        ]).unwrap();

        match args.command {
            Command::ReadSeries { key, window } => {
                assert_eq!("key1", key);
                assert_eq!(utc(2012, 1, 1, 6, 0, 0).unwrap(), window.interval.start());
                assert_eq!(Some(Interpolation::linear(Period::hours(1))), window.interpolation);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn args_delete_series() {
        let dir = TempDir::new("tempodb-args").unwrap();
        let path = config_on_disk(&dir);
        let args = parse_args_from(vec!["tempodb", "-C", path.as_str(), "delete-series", "key1"]).unwrap();
        assert_eq!(0, args.verbose);
        assert_eq!(
            Command::DeleteSeries {
                key: "key1".to_string(),
            },
            args.command
        );
    }

    #[test]
    fn args_reject_malformed_attribute() {
        let dir = TempDir::new("tempodb-args").unwrap();
        let path = config_on_disk(&dir);
        let res = parse_args_from(vec![
            "tempodb", "-C", path.as_str(), "read", "--attr", "novalue",
            "--start", "2012-01-01", "--end", "2012-01-02",
        ]);
        match res {
            Err(Error::Precondition(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}
