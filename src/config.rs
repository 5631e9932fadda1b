use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::client::ClientBuilder;
use crate::document_writer::DocumentStyle;

pub const DEFAULT_CONFIG_PATH: &str = "graphql-freeze.json";

/// Client settings read from a JSON file such as:
///
/// ```json
/// {
///   "endpoint": "https://api.github.com/graphql",
///   "headers": { "User-Agent": "graphql-freeze" },
///   "timeoutSeconds": 30,
///   "indent": "    ",
///   "lineBreak": "\n"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub endpoint: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub timeout_seconds: Option<u64>,
    pub indent: Option<String>,
    pub line_break: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unable to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config at `{path}`: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<ClientConfig, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ClientConfig::from_json_str(&content)
    }

    /// Reads `graphql-freeze.json` from the working directory.
    pub fn from_default_path() -> Result<ClientConfig, ConfigError> {
        ClientConfig::from_path(DEFAULT_CONFIG_PATH)
    }

    pub fn from_json_str(content: &str) -> Result<ClientConfig, ConfigError> {
        let deserializer = &mut serde_json::Deserializer::from_str(content);
        serde_path_to_error::deserialize(deserializer).map_err(|error| ConfigError::Parse {
            path: error.path().to_string(),
            source: error.into_inner(),
        })
    }

    pub fn style(&self) -> DocumentStyle {
        let default = DocumentStyle::default();
        DocumentStyle {
            indent: self.indent.clone().unwrap_or(default.indent),
            line_break: self.line_break.clone().unwrap_or(default.line_break),
        }
    }

    pub fn to_builder(&self) -> ClientBuilder {
        let mut builder = ClientBuilder::new(&self.endpoint).style(self.style());
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        if let Some(seconds) = self.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        builder
    }
}
