// Pure navigation logic - no session or UI state in here.
// Location parsing, address-bar input resolution and status-bar previews.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::settings::Settings;

/// Longest location string shown in the status bar before it gets cut.
pub const PREVIEW_LIMIT: usize = 300;

/// Schemes accepted verbatim from user input.
const KNOWN_SCHEMES: &[&str] = &["gemini", "gopher", "finger", "http", "https", "file", "about"];

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location is empty")]
    Empty,
    #[error("invalid location '{input}': {source}")]
    Parse {
        input: String,
        #[source]
        source: url::ParseError,
    },
}

/// A syntactically valid resource locator.
///
/// An invalid location has no `Location` value at all: parsing returns an
/// error and lookups return `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Location(Url);

impl Location {
    pub fn parse(input: &str) -> Result<Self, LocationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(LocationError::Empty);
        }
        Url::parse(trimmed)
            .map(Self)
            .map_err(|source| LocationError::Parse {
                input: trimmed.to_string(),
                source,
            })
    }

    /// Canonical string form.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    pub fn host_str(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// Local path for `file://` locations.
    pub fn file_path(&self) -> Option<PathBuf> {
        if self.scheme() != "file" {
            return None;
        }
        self.0.to_file_path().ok()
    }
}

impl From<Url> for Location {
    fn from(url: Url) -> Self {
        Self(url)
    }
}

impl FromStr for Location {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Location {
    type Error = LocationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Location> for String {
    fn from(location: Location) -> Self {
        location.0.into()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves address-bar input into a navigable location.
///
/// Purely local string heuristics: no DNS lookups, no prefetching. The only
/// request happens once the resulting location is handed to a tab.
pub fn resolve_input(input: &str, settings: &Settings) -> Location {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return blank();
    }

    // 1. Explicit, known scheme
    if let Ok(u) = Url::parse(trimmed) {
        if KNOWN_SCHEMES.contains(&u.scheme()) {
            return Location(u);
        }
    }

    // 2. Host-like input without a scheme -> Gemini
    // (spaces imply a search query)
    let has_scheme_separator = trimmed.contains("://");
    let is_localhost = trimmed.starts_with("localhost");
    let is_ip = trimmed.parse::<std::net::IpAddr>().is_ok();
    let is_dotted = trimmed.contains('.') && !trimmed.ends_with('.');

    if !has_scheme_separator && !trimmed.contains(' ') && (is_localhost || is_ip || is_dotted) {
        let candidate = format!("gemini://{}", trimmed);
        if let Ok(u) = Url::parse(&candidate) {
            if u.host().is_some() {
                return Location(u);
            }
        }
    }

    // 3. Fallback to the configured search engine
    match Url::parse(&settings.search_engine.query_url(trimmed)) {
        Ok(u) => Location(u),
        Err(e) => {
            log::warn!("[Navigation] Search URL for {:?} did not parse: {}", trimmed, e);
            blank()
        }
    }
}

fn blank() -> Location {
    Location(Url::parse("about:blank").expect("about:blank is a valid URL"))
}

/// Status-bar text for a hovered or current location.
pub fn format_url_preview(location: Option<&Location>) -> String {
    let Some(location) = location else {
        return String::new();
    };
    let text = location.as_str();
    if text.chars().count() > PREVIEW_LIMIT {
        let mut cut: String = text.chars().take(PREVIEW_LIMIT).collect();
        cut.push_str("...");
        cut
    } else {
        text.to_string()
    }
}
