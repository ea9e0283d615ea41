use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("Missing required setting `{key}`")]
    #[diagnostic(
        code(pkgindex_config::missing_setting),
        help("Set the `{env}` environment variable or add `{key}` to the config file")
    )]
    MissingSetting { key: &'static str, env: &'static str },

    #[error("Remote publishing is not configured")]
    #[diagnostic(
        code(pkgindex_config::remote_not_configured),
        help("Set CI_API_V4_URL, CI_PROJECT_ID and PRIVATE_API_TOKEN, or use --local")
    )]
    RemoteNotConfigured,

    #[error("Invalid URL for `{key}`: {value}")]
    #[diagnostic(
        code(pkgindex_config::invalid_url),
        help("Ensure the URL is absolute, e.g. https://gitlab.com/group/project")
    )]
    InvalidUrl {
        key: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to read config file {}", .path.display())]
    #[diagnostic(code(pkgindex_config::io))]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(pkgindex_config::toml_deserialize),
        help("Check your config file syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
