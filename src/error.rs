//! Errors surfaced by the client.
//!
//! Every failure that depends on I/O is carried to the caller through a
//! `Cursor` at the moment the affected page is consumed. Only
//! `Error::Precondition` is raised at call time.

use std::error;
use std::fmt;
use std::io;
use std::result;

/// Crate-wide result alias.
pub type Result<T> = result::Result<T, Error>;

/// The ways a call against the TempoDB API can fail.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// The HTTP capability could not complete a round trip.
    Transport(String),
    /// The server answered with a non-success status. `message` is the body
    /// the server sent along with it.
    Protocol {
        /// HTTP status code of the response.
        status: u16,
        /// Server supplied message.
        message: String,
    },
    /// A response body or continuation could not be decoded.
    Decode(String),
    /// A caller supplied argument was rejected before any I/O happened.
    Precondition(String),
    /// Configuration could not be read or parsed.
    Config(String),
}

impl Error {
    /// The HTTP status carried by a protocol error, if any.
    pub fn status(&self) -> Option<u16> {
        match *self {
            Error::Protocol { status, .. } => Some(status),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Transport(ref msg) => write!(f, "transport failure: {}", msg),
            Error::Protocol {
                status,
                ref message,
            } => write!(f, "server returned {}: {}", status, message),
            Error::Decode(ref msg) => write!(f, "could not decode response: {}", msg),
            Error::Precondition(ref msg) => write!(f, "invalid argument: {}", msg),
            Error::Config(ref msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl error::Error for Error {}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::Transport(e.to_string())
    }
}

impl From<::serde_json::Error> for Error {
    fn from(e: ::serde_json::Error) -> Error {
        Error::Decode(e.to_string())
    }
}

impl From<::url::ParseError> for Error {
    fn from(e: ::url::ParseError) -> Error {
        Error::Decode(format!("malformed url: {}", e))
    }
}

impl From<::reqwest::Error> for Error {
    fn from(e: ::reqwest::Error) -> Error {
        Error::Transport(e.to_string())
    }
}

impl From<::toml::de::Error> for Error {
    fn from(e: ::toml::de::Error) -> Error {
        Error::Config(e.to_string())
    }
}
