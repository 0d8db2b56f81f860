//! Builder for this service's own OpenAPI document.

use crate::types::{OpenApiContact, OpenApiLicense, OpenApiServer, OpenApiTag};
use serde_json::{Map, Value};

/// Builder for the local document folded in after all upstreams.
///
/// # Example
///
/// ```ignore
/// use openapi_merge::OpenApiBuilder;
///
/// let spec = OpenApiBuilder::new()
///     .title("Gateway")
///     .version("1.0.0")
///     .server(OpenApiServer::new("/api"))
///     .build();
/// ```
///
/// The document always carries a `paths` mapping, empty unless paths are added, so that
/// upstream paths merge into an object rather than being replaced by an absent key.
#[derive(Debug, Clone)]
pub struct OpenApiBuilder {
    openapi_version: String,
    title: Option<String>,
    summary: Option<String>,
    version: Option<String>,
    description: Option<String>,
    terms_of_service: Option<String>,
    contact: Option<OpenApiContact>,
    license: Option<OpenApiLicense>,
    servers: Vec<OpenApiServer>,
    tags: Vec<OpenApiTag>,
    paths: Map<String, Value>,
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenApiBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            openapi_version: "3.1.0".to_string(),
            title: None,
            summary: None,
            version: None,
            description: None,
            terms_of_service: None,
            contact: None,
            license: None,
            servers: Vec::new(),
            tags: Vec::new(),
            paths: Map::new(),
        }
    }

    /// Set the `openapi` field (default `3.1.0`).
    pub fn openapi_version(mut self, version: impl Into<String>) -> Self {
        self.openapi_version = version.into();
        self
    }

    /// Set the API title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the API summary.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Set the API version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the API description. Empty descriptions are omitted.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn terms_of_service(mut self, url: impl Into<String>) -> Self {
        self.terms_of_service = Some(url.into());
        self
    }

    pub fn contact(mut self, contact: OpenApiContact) -> Self {
        self.contact = Some(contact);
        self
    }

    pub fn license(mut self, license: OpenApiLicense) -> Self {
        self.license = Some(license);
        self
    }

    /// Append a server entry.
    pub fn server(mut self, server: OpenApiServer) -> Self {
        self.servers.push(server);
        self
    }

    /// Append server entries.
    pub fn servers(mut self, servers: impl IntoIterator<Item = OpenApiServer>) -> Self {
        self.servers.extend(servers);
        self
    }

    /// Put a server entry first, unless one with the same URL is already listed.
    ///
    /// Used to advertise the root path a proxy mounts this service under.
    pub fn root_server(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        if !self.servers.iter().any(|s| s.url == url) {
            self.servers.insert(0, OpenApiServer::new(url));
        }
        self
    }

    /// Append tag entries.
    pub fn tags(mut self, tags: impl IntoIterator<Item = OpenApiTag>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Add one path item. Last write wins for a repeated path.
    pub fn path(mut self, path: impl Into<String>, item: Value) -> Self {
        self.paths.insert(path.into(), item);
        self
    }

    /// Build the document.
    pub fn build(self) -> Value {
        let mut spec = Map::new();

        spec.insert("openapi".to_string(), Value::String(self.openapi_version));

        // Info object
        let mut info = Map::new();
        info.insert(
            "title".to_string(),
            Value::String(self.title.unwrap_or_else(|| "API".to_string())),
        );
        if let Some(summary) = self.summary {
            info.insert("summary".to_string(), Value::String(summary));
        }
        if let Some(desc) = self.description.filter(|d| !d.is_empty()) {
            info.insert("description".to_string(), Value::String(desc));
        }
        info.insert(
            "version".to_string(),
            Value::String(self.version.unwrap_or_else(|| "0.1.0".to_string())),
        );
        if let Some(tos) = self.terms_of_service {
            info.insert("termsOfService".to_string(), Value::String(tos));
        }
        if let Some(contact) = self.contact {
            info.insert("contact".to_string(), to_value(&contact));
        }
        if let Some(license) = self.license {
            info.insert("license".to_string(), to_value(&license));
        }
        spec.insert("info".to_string(), Value::Object(info));

        if !self.servers.is_empty() {
            let servers = self.servers.iter().map(to_value).collect();
            spec.insert("servers".to_string(), Value::Array(servers));
        }

        spec.insert("paths".to_string(), Value::Object(self.paths));

        if !self.tags.is_empty() {
            let tags = self.tags.iter().map(to_value).collect();
            spec.insert("tags".to_string(), Value::Array(tags));
        }

        Value::Object(spec)
    }
}

// The info types hold only strings and JSON maps, so serialization cannot fail.
fn to_value<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|_| Value::Object(Map::new()))
}
