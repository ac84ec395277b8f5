//! MIME type specification value

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use strata_convert::{ConvertError, ConvertResult, Convertible};

/// Base types accepted in a MIME specification
pub const MIME_TYPES: &[&str] = &[
    "text",
    "image",
    "audio",
    "video",
    "application",
    "multipart",
    "message",
];

/// Validated `type/subtype[;param=value;...]` specification
///
/// ```
/// use strata_config::types::Mime;
///
/// let mime: Mime = "text/html; charset=UTF-8".parse().unwrap();
/// assert_eq!(mime.mime_type(), "text/html");
/// assert_eq!(mime.subtype(), "html");
/// assert_eq!(mime.params().get("charset").map(String::as_str), Some("UTF-8"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mime {
    spec: String,
    slash: usize,
    params_at: Option<usize>,
}

impl Mime {
    /// Validate a specification
    pub fn new(spec: impl Into<String>) -> ConvertResult<Self> {
        let spec = spec.into();
        let mut parts = spec.split(';');
        let mime_type = parts.next().unwrap_or_default().trim();
        let Some(slash) = mime_type.find('/') else {
            return Err(invalid(
                "MIME type specification must be 'type/subtype[;param=value;...]'",
            ));
        };
        let base = &mime_type[..slash];
        if !MIME_TYPES.contains(&base) {
            return Err(invalid(format!("MIME type '{base}' not supported")));
        }
        if parts.any(|param| !param.contains('=')) {
            return Err(invalid("Wrong specification of MIME type parameters"));
        }
        Ok(Self {
            slash: spec.find('/').unwrap_or(slash),
            params_at: spec.find(';'),
            spec,
        })
    }

    /// `type/subtype` without parameters
    pub fn mime_type(&self) -> &str {
        match self.params_at {
            Some(at) => &self.spec[..at],
            None => &self.spec,
        }
    }

    /// Base type, such as `text`
    pub fn type_(&self) -> &str {
        &self.spec[..self.slash]
    }

    /// Subtype, such as `plain`
    pub fn subtype(&self) -> &str {
        match self.params_at {
            Some(at) => &self.spec[self.slash + 1..at],
            None => &self.spec[self.slash + 1..],
        }
    }

    /// Parameters in declaration order
    pub fn params(&self) -> IndexMap<String, String> {
        let Some(at) = self.params_at else {
            return IndexMap::new();
        };
        self.spec[at + 1..]
            .split(';')
            .filter_map(|param| param.split_once('='))
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
            .collect()
    }

    /// Full specification text
    pub fn as_str(&self) -> &str {
        &self.spec
    }
}

fn invalid(message: impl Into<String>) -> ConvertError {
    ConvertError::invalid_value(Mime::TYPE_NAME, message)
}

impl fmt::Display for Mime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spec)
    }
}

impl FromStr for Mime {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Convertible for Mime {
    const TYPE_NAME: &'static str = "MIME";

    fn to_config_string(&self) -> String {
        self.spec.clone()
    }

    fn from_config_string(text: &str) -> ConvertResult<Self> {
        Self::new(text)
    }
}
