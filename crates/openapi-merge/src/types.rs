//! Typed structures for upstream sources and the local document's metadata.
//!
//! The info objects model the subset of OpenAPI 3 that describes this service itself;
//! unmodeled fields are kept in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Network address of one upstream OpenAPI document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Upstream(String);

/// Top-level keys forced onto the aggregated document.
pub type OverrideDocument = Map<String, Value>;

/// An OpenAPI server entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenApiServer {
    /// Server URL, possibly relative.
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Additional fields (e.g. `variables`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An OpenAPI tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenApiTag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Contact information for the exposed API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OpenApiContact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// License information for the exposed API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenApiLicense {
    pub name: String,
    /// SPDX expression; mutually exclusive with `url` in OpenAPI 3.1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Upstream {
    /// Create an upstream from its address.
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// The address to fetch.
    pub fn url(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Upstream {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for Upstream {
    fn from(url: String) -> Self {
        Self(url)
    }
}

impl OpenApiServer {
    /// Create a server entry.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: None,
            extra: Map::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }
}

impl OpenApiTag {
    /// Create a tag.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            extra: Map::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }
}

impl OpenApiLicense {
    /// Create a license entry.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier: None,
            url: None,
            extra: Map::new(),
        }
    }
}
