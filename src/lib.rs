//! A client for the TempoDB time series database.
//!
//! The heart of the crate is the paginated read. A caller describes which
//! series it wants (`Filter`), over which window (`Interval`), in which
//! timezone, and optionally how the server should roll up or interpolate the
//! data. The client hands back a `Cursor` immediately. Pages are fetched only
//! as the cursor is advanced, and the server's `Link: rel="next"` header is
//! followed until the window is exhausted.
//!
//! ```no_run
//! extern crate chrono;
//! extern crate chrono_tz;
//! extern crate tempodb;
//!
//! use chrono::{TimeZone, Utc};
//! use chrono_tz::Tz;
//! use tempodb::{Client, ClientConfig, Filter, Interval};
//!
//! # fn main() {
//! let client = Client::from_config(&ClientConfig::default()).unwrap();
//! let filter = Filter::new().add_key("key1").add_key("key2");
//! let interval = Interval::new(
//!     Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap(),
//!     Utc.with_ymd_and_hms(2012, 1, 2, 0, 0, 0).unwrap(),
//! ).unwrap();
//! for point in client.read_multi_data_points(&filter, &interval, Tz::UTC, None, None) {
//!     let point = point.unwrap();
//!     println!("{} {:?}", point.timestamp, point.data);
//! }
//! # }
//! ```
#![allow(unknown_lints)]
#![deny(trivial_numeric_casts, missing_docs, unstable_features, unused_import_braces)]
extern crate chrono;
extern crate chrono_tz;
extern crate clap;
extern crate regex;
extern crate reqwest;
extern crate serde;
extern crate serde_json;
extern crate toml;
extern crate url;

#[macro_use]
extern crate log;

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate serde_derive;

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
extern crate tempdir;

pub mod client;
pub mod config;
pub mod cursor;
pub mod error;
pub mod http;
pub mod model;
pub mod protocols;
pub mod query;
pub mod time;

pub use client::Client;
pub use config::ClientConfig;
pub use cursor::{Cursor, CursorState};
pub use error::{Error, Result};
pub use http::{Credentials, HttpTransport, Method, Request, Response, Transport};
pub use model::{AttributeMap, DataPoint, Filter, Fold, Interpolation, InterpolationFunction,
                Interval, MultiDataPoint, Rollup, Series, WritableDataPoint, WriteRequest};
pub use time::Period;
