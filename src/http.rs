//! Tiny, unassuming HTTP dispatch.
//!
//! The client speaks to the server through `Transport`: hand it a request,
//! get back status, headers and body. No retries happen here; whatever retry
//! or timeout policy exists belongs to the transport implementation.

use error::{Error, Result};
use query::QueryParams;
use reqwest;
use std::fmt;
use std::time::{Duration, Instant};
use time;
use url::Url;

/// HTTP methods the client issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read a resource.
    Get,
    /// Remove a resource.
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Method::Get => f.write_str("GET"),
            Method::Delete => f.write_str("DELETE"),
        }
    }
}

/// One request, path relative to the API root.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Already percent-encoded path, `/v1/multi/` for instance.
    pub path: String,
    /// Query parameters, encoded when the URL is built.
    pub params: QueryParams,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// Create a request with no parameters or headers.
    pub fn new<S>(method: Method, path: S) -> Request
    where
        S: Into<String>,
    {
        Request {
            method: method,
            path: path.into(),
            params: QueryParams::new(),
            headers: Vec::new(),
        }
    }

    /// Replace the query parameters.
    pub fn params(mut self, params: QueryParams) -> Request {
        self.params = params;
        self
    }

    /// Add a header.
    pub fn header<K, V>(mut self, name: K, value: V) -> Request
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Resolve the request against `base`, encoding the query parameters.
    pub fn url(&self, base: &Url) -> Result<Url> {
        let mut url = base.join(&self.path)?;
        url.set_query(None);
        if !self.params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for &(ref k, ref v) in &self.params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }
}

/// What came back from the server.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, names as received.
    pub headers: Vec<(String, String)>,
    /// Raw body.
    pub body: Vec<u8>,
}

impl Response {
    /// Create a response with no headers.
    pub fn new<B>(status: u16, body: B) -> Response
    where
        B: Into<Vec<u8>>,
    {
        Response {
            status: status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Add a header.
    pub fn header<K, V>(mut self, name: K, value: V) -> Response
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Every value of the header `name`, compared case-insensitively.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |&&(ref k, _)| k.eq_ignore_ascii_case(name))
            .map(|&(_, ref v)| v.as_str())
    }

    /// Determine if the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Turn a non-success response into `Error::Protocol`.
    pub fn check(self) -> Result<Response> {
        if self.is_success() {
            Ok(self)
        } else {
            let message = String::from_utf8_lossy(&self.body).trim().to_string();
            warn!("server returned status {}: {}", self.status, message);
            Err(Error::Protocol {
                status: self.status,
                message: message,
            })
        }
    }
}

/// The HTTP capability the client is built on.
pub trait Transport {
    /// Send `request` and wait for the whole response.
    fn send(&self, request: &Request) -> Result<Response>;
}

impl<'a, T: Transport + ?Sized> Transport for &'a T {
    fn send(&self, request: &Request) -> Result<Response> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: &Request) -> Result<Response> {
        (**self).send(request)
    }
}

/// Credentials sent as HTTP basic auth on every request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Credentials {
    /// API key.
    pub key: String,
    /// API secret.
    pub secret: String,
}

/// Blocking `Transport` over reqwest.
pub struct HttpTransport {
    base: Url,
    credentials: Credentials,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Create a transport rooted at `base`, `https://api.tempo-db.com/` for
    /// instance.
    pub fn new(base: Url, credentials: Credentials, timeout: Option<Duration>) -> Result<HttpTransport> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("could not build http client: {}", e)))?;
        Ok(HttpTransport {
            base: base,
            credentials: credentials,
            client: client,
        })
    }

    /// The API root requests are resolved against.
    pub fn base(&self) -> &Url {
        &self.base
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &Request) -> Result<Response> {
        let url = request.url(&self.base)?;
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Delete => reqwest::Method::DELETE,
        };
        debug!("{} {}", request.method, url);
        let started = Instant::now();

        let mut builder = self.client.request(method, url);
        if !self.credentials.key.is_empty() {
            builder = builder.basic_auth(&self.credentials.key, Some(&self.credentials.secret));
        }
        for &(ref k, ref v) in &request.headers {
            builder = builder.header(k.as_str(), v.as_str());
        }
        let resp = builder.send()?;

        let status = resp.status().as_u16();
        let headers = resp.headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|v| (k.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = resp.bytes()?.to_vec();
        trace!(
            "{} {} answered {} with {} bytes in {}ns",
            request.method,
            request.path,
            status,
            body.len(),
            time::elapsed_ns(started)
        );
        Ok(Response {
            status: status,
            headers: headers,
            body: body,
        })
    }
}
