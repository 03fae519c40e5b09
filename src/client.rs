//! The TempoDB client.
//!
//! `Client` turns typed read calls into requests for its `Transport`. Reads
//! return a `Cursor` straight away; no request is sent until the cursor is
//! advanced. Simple single-resource calls (`get_series`, `delete_series`) run
//! their one round trip immediately.

use chrono_tz::Tz;
use config::ClientConfig;
use cursor::Cursor;
use error::{Error, Result};
use http::{HttpTransport, Method, Request, Transport};
use model::{DataPoint, Filter, Interpolation, Interval, MultiDataPoint, Rollup, Series};
use protocols::json;
use query;
use url::Url;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Client for one TempoDB database.
pub struct Client<T: Transport = HttpTransport> {
    transport: T,
    version: String,
    user_agent: String,
}

impl Client<HttpTransport> {
    /// Build a client speaking HTTP to the server described by `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Client<HttpTransport>> {
        let transport = HttpTransport::new(
            config.base_url()?,
            config.credentials(),
            config.timeout,
        )?;
        info!("tempodb client for {}", transport.base());
        Ok(Client::new(transport).api_version(config.version.clone()))
    }
}

impl<T: Transport> Client<T> {
    /// Build a client over any transport, talking to API version `v1`.
    pub fn new(transport: T) -> Client<T> {
        Client {
            transport: transport,
            version: "v1".to_string(),
            user_agent: format!("tempodb-rust/{}", VERSION),
        }
    }

    /// Use a different API version path prefix.
    pub fn api_version<S>(mut self, version: S) -> Client<T>
    where
        S: Into<String>,
    {
        self.version = version.into();
        self
    }

    /// The transport requests go through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn request(&self, method: Method, path: String) -> Request {
        Request::new(method, path).header("User-Agent", self.user_agent.as_str())
    }

    fn series_path(&self, key: &str, rest: &[&str]) -> Result<String> {
        if key.is_empty() {
            return Err(Error::Precondition("series key must not be empty".to_string()));
        }
        let mut url = Url::parse("http://localhost/")?;
        {
            let mut segments = url.path_segments_mut()
                .map_err(|_| Error::Precondition("cannot build series path".to_string()))?;
            segments
                .clear()
                .extend(&[self.version.as_str(), "series", "key", key])
                .extend(rest)
                .push("");
        }
        Ok(url.path().to_string())
    }

    /// Read several series at once, one `MultiDataPoint` per timestamp.
    ///
    /// The series are chosen by `filter`. Bounds are sent, and timestamps
    /// come back, in `tz`. Rollup and interpolation are sent only when
    /// given.
    pub fn read_multi_data_points(
        &self,
        filter: &Filter,
        interval: &Interval,
        tz: Tz,
        rollup: Option<&Rollup>,
        interpolation: Option<&Interpolation>,
    ) -> Cursor<MultiDataPoint> {
        let params = query::multi_params(filter, interval, &tz, rollup, interpolation);
        let path = format!("/{}/multi/", self.version);
        debug!("multi read {} with {} params", path, params.len());
        let request = self.request(Method::Get, path).params(params);
        Cursor::new(&self.transport, request, tz)
    }

    /// Read a single series.
    ///
    /// Fails immediately if the series key is empty; every other failure is
    /// reported by the cursor.
    pub fn read_data_points(
        &self,
        series: &Series,
        interval: &Interval,
        tz: Tz,
        rollup: Option<&Rollup>,
        interpolation: Option<&Interpolation>,
    ) -> Result<Cursor<DataPoint>> {
        let path = self.series_path(&series.key, &["segment"])?;
        let params = query::series_params(interval, &tz, rollup, interpolation);
        debug!("series read {} with {} params", path, params.len());
        let request = self.request(Method::Get, path).params(params);
        Ok(Cursor::new(&self.transport, request, tz))
    }

    /// Fetch a series' metadata by key.
    pub fn get_series(&self, key: &str) -> Result<Series> {
        let path = self.series_path(key, &[])?;
        let response = self.transport
            .send(&self.request(Method::Get, path))?
            .check()?;
        json::decode_series(&response.body)
    }

    /// Delete a series and all of its data.
    pub fn delete_series(&self, series: &Series) -> Result<()> {
        let path = self.series_path(&series.key, &[])?;
        info!("deleting series {}", series.key);
        self.transport
            .send(&self.request(Method::Delete, path))?
            .check()?;
        Ok(())
    }
}
