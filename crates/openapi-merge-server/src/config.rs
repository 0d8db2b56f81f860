//! Configuration file loading.

use openapi_merge::{
    OpenApiBuilder, OpenApiContact, OpenApiLicense, OpenApiServer, OpenApiTag, OverrideDocument,
    Upstream,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::serve::HEALTH_PATH;

/// Default location when neither `--config` nor `CONFIG_FILE` is given.
pub const DEFAULT_CONFIG_FILE: &str = "./config.yaml";

/// Errors raised while reading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in '{path}': {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid TOML in '{path}': {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Complete service configuration, immutable once loaded.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub serving: ServingConfig,
    pub merge: MergeConfig,
    /// Public base URL; derived from `serving` when absent.
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Metadata of this service's own document and the URLs it is served under.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub summary: Option<String>,
    pub description: String,
    pub version: String,
    /// Path of the aggregated document; `null` disables it and the docs pages.
    pub openapi_url: Option<String>,
    pub docs_url: Option<String>,
    pub redoc_url: Option<String>,
    /// Served next to `docs_url` for Swagger UI's OAuth2 flow.
    pub swagger_ui_oauth2_redirect_url: Option<String>,
    /// Passed to Swagger UI's `initOAuth`.
    pub swagger_ui_init_oauth: Option<Map<String, Value>>,
    pub openapi_tags: Vec<OpenApiTag>,
    pub servers: Vec<OpenApiServer>,
    pub terms_of_service: Option<String>,
    pub contact: Option<OpenApiContact>,
    pub license_info: Option<OpenApiLicense>,
    /// Prefix a proxy mounts this service under.
    pub root_path: String,
    pub root_path_in_servers: bool,
}

/// Listener address.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServingConfig {
    pub host: String,
    pub port: u16,
}

/// What to aggregate and how.
#[derive(Debug, Clone, Deserialize)]
pub struct MergeConfig {
    /// Upstream document addresses, merged in this order.
    pub upstreams: Vec<Upstream>,
    /// Top-level keys replaced after all merges.
    #[serde(default, rename = "override")]
    pub overrides: OverrideDocument,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Reuse an aggregated document for this long. Unset: aggregate on every request.
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "API".to_string(),
            summary: None,
            description: String::new(),
            version: "0.1.0".to_string(),
            openapi_url: Some("/openapi.json".to_string()),
            docs_url: Some("/docs".to_string()),
            redoc_url: Some("/redoc".to_string()),
            swagger_ui_oauth2_redirect_url: Some("/docs/oauth2-redirect".to_string()),
            swagger_ui_init_oauth: None,
            openapi_tags: Vec::new(),
            servers: Vec::new(),
            terms_of_service: None,
            contact: None,
            license_info: None,
            root_path: String::new(),
            root_path_in_servers: true,
        }
    }
}

impl AppConfig {
    /// Routes the router registers for this config, with the field each comes from.
    ///
    /// Docs pages exist only while the document itself is served; the OAuth2 redirect
    /// only alongside Swagger UI.
    pub fn routes(&self) -> Vec<(&'static str, &str)> {
        let mut routes = Vec::new();
        let Some(openapi_url) = &self.openapi_url else {
            return routes;
        };
        routes.push(("app.openapi_url", openapi_url.as_str()));
        if let Some(docs_url) = &self.docs_url {
            routes.push(("app.docs_url", docs_url.as_str()));
            if let Some(redirect) = &self.swagger_ui_oauth2_redirect_url {
                routes.push(("app.swagger_ui_oauth2_redirect_url", redirect.as_str()));
            }
        }
        if let Some(redoc_url) = &self.redoc_url {
            routes.push(("app.redoc_url", redoc_url.as_str()));
        }
        routes
    }

    /// Reject paths the router could not register.
    fn validate_routes(&self) -> Result<(), ConfigError> {
        let mut seen = vec![("health check", HEALTH_PATH)];

        for (field, path) in self.routes() {
            let invalid = |reason: String| ConfigError::Invalid { field, reason };

            if !path.starts_with('/') {
                return Err(invalid(format!("path '{path}' must start with '/'")));
            }
            if path
                .split('/')
                .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
            {
                return Err(invalid(format!(
                    "path '{path}' must not contain ':' or '*' segments"
                )));
            }
            if let Some((other, _)) = seen.iter().find(|(_, p)| *p == path) {
                return Err(invalid(format!("path '{path}' is already used by {other}")));
            }
            seen.push((field, path));
        }
        Ok(())
    }
}

impl Default for ServingConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Config {
    /// Load from `path`; `.toml` files are read as TOML, everything else as YAML
    /// (which also accepts JSON).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &data)
    }

    /// Parse `data` using the format implied by `path`'s extension.
    pub fn parse(path: &Path, data: &str) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let config: Self = match ext.as_deref() {
            Some("toml") => toml::from_str(data).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            })?,
            _ => serde_yaml::from_str(data).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?,
        };
        config.app.validate_routes()?;
        Ok(config)
    }

    /// Public base URL of this service.
    pub fn endpoint(&self) -> String {
        if let Some(endpoint) = &self.endpoint {
            return endpoint.clone();
        }
        let host = match self.serving.host.as_str() {
            "0.0.0.0" => "localhost",
            host => host,
        };
        format!("http://{host}:{}", self.serving.port)
    }

    /// Address to bind the listener to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.serving.host, self.serving.port)
    }

    /// This service's own OpenAPI document.
    pub fn local_document(&self) -> Value {
        let app = &self.app;
        let mut builder = OpenApiBuilder::new()
            .title(&app.title)
            .version(&app.version)
            .description(&app.description)
            .servers(app.servers.iter().cloned())
            .tags(app.openapi_tags.iter().cloned());

        if let Some(summary) = &app.summary {
            builder = builder.summary(summary);
        }
        if let Some(tos) = &app.terms_of_service {
            builder = builder.terms_of_service(tos);
        }
        if let Some(contact) = &app.contact {
            builder = builder.contact(contact.clone());
        }
        if let Some(license) = &app.license_info {
            builder = builder.license(license.clone());
        }
        if !app.root_path.is_empty() && app.root_path_in_servers {
            builder = builder.root_server(&app.root_path);
        }

        builder.build()
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.merge.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.merge.cache_ttl_secs.map(Duration::from_secs)
    }
}
