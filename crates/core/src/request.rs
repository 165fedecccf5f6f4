//! Intercepted request and network response types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

/// What kind of resource the page asked for.
///
/// Mirrors the fetch `destination` hint a browser attaches to requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Document,
    Image,
    Style,
    Script,
    Font,
    Manifest,
    /// `fetch()`/XHR calls, which carry no destination.
    #[default]
    Empty,
    Other,
}

impl Destination {
    /// Destinations that are always static assets regardless of URL shape.
    pub fn is_static_asset(self) -> bool {
        matches!(self, Self::Image | Self::Style | Self::Script | Self::Font)
    }
}

impl FromStr for Destination {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "document" => Self::Document,
            "image" => Self::Image,
            "style" => Self::Style,
            "script" => Self::Script,
            "font" => Self::Font,
            "manifest" => Self::Manifest,
            "" => Self::Empty,
            _ => Self::Other,
        })
    }
}

/// A request offered to the engine for interception.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: String,
    url: Url,
    destination: Destination,
}

impl Request {
    /// Build a request; the method is normalized to upper case.
    pub fn new(method: &str, url: Url) -> Self {
        Self { method: method.trim().to_ascii_uppercase(), url, destination: Destination::Empty }
    }

    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn destination(&self) -> Destination {
        self.destination
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// A response, either fresh from the network or read back from a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub url: String,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { url: url.into(), status, headers: BTreeMap::new(), body: body.into() }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Whether this response may be written to a store.
    ///
    /// Any 2xx except 206: a partial body cannot stand in for the full resource.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) && self.status != 206
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
