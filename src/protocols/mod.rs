//! Wire protocols spoken by the TempoDB API.
//!
//! `json` turns response bodies into typed points and series, `link` reads
//! the pagination continuation a response carries in its headers.

pub mod json;
pub mod link;
