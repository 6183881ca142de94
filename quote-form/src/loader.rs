//! Loading the form description.
//!
//! The configuration is fetched exactly once per run, from a local file or
//! over HTTP(S). A failure here is fatal to rendering: the caller shows the
//! error in place of the form. Loads are neither retried nor timed out.

use std::fmt;
use std::path::PathBuf;

use quote_form_types::FormConfig;

/// Location of the configuration when none is given.
pub const DEFAULT_CONFIG_LOCATION: &str = "formConfig.json";

/// Error type for loading the form description.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The resource could not be retrieved (missing file, non-success status,
    /// transport failure).
    #[error("Cannot load {location}")]
    Load {
        location: String,
        #[source]
        source: anyhow::Error,
    },

    /// The resource was retrieved but is not a valid form description.
    #[error("Cannot parse {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    fn load(source: &ConfigSource, err: impl Into<anyhow::Error>) -> Self {
        Self::Load {
            location: source.to_string(),
            source: err.into(),
        }
    }
}

/// Where the form description comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A file on the local file system.
    Path(PathBuf),

    /// An `http://` or `https://` URL.
    Url(String),
}

impl ConfigSource {
    /// Interpret a command-line argument: URLs by scheme, anything else as a path.
    pub fn from_arg(arg: &str) -> Self {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            Self::Url(arg.to_string())
        } else {
            Self::Path(PathBuf::from(arg))
        }
    }
}

impl Default for ConfigSource {
    fn default() -> Self {
        Self::Path(PathBuf::from(DEFAULT_CONFIG_LOCATION))
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Retrieve and parse the form description.
///
/// Blocks until the body has been read and parsed.
pub fn load_config(source: &ConfigSource) -> Result<FormConfig, ConfigError> {
    tracing::debug!(%source, "loading form configuration");
    let body = match source {
        ConfigSource::Path(path) => {
            std::fs::read_to_string(path).map_err(|err| ConfigError::load(source, err))?
        }
        ConfigSource::Url(url) => fetch(url).map_err(|err| ConfigError::load(source, err))?,
    };
    let config = FormConfig::from_json(&body).map_err(|err| ConfigError::Parse {
        location: source.to_string(),
        source: err,
    })?;
    tracing::debug!(fields = config.fields.len(), "form configuration loaded");
    Ok(config)
}

fn fetch(url: &str) -> anyhow::Result<String> {
    let response = reqwest::blocking::get(url)?;
    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("server answered {status}");
    }
    Ok(response.text()?)
}
