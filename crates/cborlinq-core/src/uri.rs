//! URI references: absolute URLs and relative references.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use uriparse::RelativeReference;
use url::{ParseError, Url};

/// An RFC 3986 URI reference.
///
/// Absolute references are held as a parsed [`Url`] and serialize the way
/// `url` normalizes them. Relative references keep their validated text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UriRef {
    Absolute(Url),
    Relative(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UriRefError {
    #[error("invalid absolute URI: {0}")]
    Absolute(#[from] ParseError),

    #[error("invalid relative reference: {0}")]
    Relative(String),
}

impl UriRef {
    pub fn as_str(&self) -> &str {
        match self {
            UriRef::Absolute(url) => url.as_str(),
            UriRef::Relative(text) => text,
        }
    }

    pub fn is_relative(&self) -> bool {
        matches!(self, UriRef::Relative(_))
    }

    /// The parsed URL, for absolute references only.
    pub fn as_url(&self) -> Option<&Url> {
        match self {
            UriRef::Absolute(url) => Some(url),
            UriRef::Relative(_) => None,
        }
    }
}

impl FromStr for UriRef {
    type Err = UriRefError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match Url::parse(text) {
            Ok(url) => Ok(UriRef::Absolute(url)),
            Err(ParseError::RelativeUrlWithoutBase) => {
                RelativeReference::try_from(text)
                    .map_err(|e| UriRefError::Relative(e.to_string()))?;
                Ok(UriRef::Relative(text.to_owned()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl From<Url> for UriRef {
    fn from(url: Url) -> Self {
        UriRef::Absolute(url)
    }
}

impl fmt::Display for UriRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
