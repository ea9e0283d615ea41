//! Publishing configuration.
//!
//! Settings come from an optional TOML file and from the environment, with the
//! environment taking precedence. Resolution goes through an injectable lookup
//! function so the rest of the workspace never touches the process environment
//! directly.

use std::{fmt, fs, path::Path};

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{ConfigError, Result};

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_AUTHOR_NAME: &str = "pkgindex CI bot";
pub const DEFAULT_AUTHOR_EMAIL: &str = "pkgindex-ci-bot@localhost";

pub const ENV_PROJECT_URL: &str = "CI_PROJECT_URL";
pub const ENV_BRANCH: &str = "PKGINDEX_BRANCH";
pub const ENV_AUTHOR_NAME: &str = "PKGINDEX_AUTHOR_NAME";
pub const ENV_AUTHOR_EMAIL: &str = "PKGINDEX_AUTHOR_EMAIL";
pub const ENV_API_URL: &str = "CI_API_V4_URL";
pub const ENV_PROJECT_ID: &str = "CI_PROJECT_ID";
pub const ENV_TOKEN: &str = "PRIVATE_API_TOKEN";

/// On-disk shape of the config file. Every key is optional here; required
/// keys are enforced after merging with the environment.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    project_url: Option<String>,
    branch: Option<String>,
    author_name: Option<String>,
    author_email: Option<String>,
    remote: RemoteFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RemoteFile {
    api_url: Option<String>,
    project_id: Option<String>,
    token: Option<String>,
}

/// Application's configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Web address of the hosted index repository, without trailing slash.
    pub project_url: String,

    /// Branch commits are pushed to and artifacts are served from.
    pub branch: String,

    /// Commit author name.
    pub author_name: String,

    /// Commit author e-mail.
    pub author_email: String,

    /// Settings for the hosted commit API. `None` when only local publishing
    /// is possible.
    pub remote: Option<RemoteConfig>,
}

/// Settings needed to talk to the hosted repository's commit API.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// API base address, e.g. `https://gitlab.com/api/v4`.
    pub api_url: String,

    /// Numeric id or full path of the project.
    pub project_id: String,

    /// Credential passed through verbatim in the auth header.
    pub token: String,
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("api_url", &self.api_url)
            .field("project_id", &self.project_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Loads configuration from `path` (if given) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::resolve(path, |key| std::env::var(key).ok())
    }

    /// Loads configuration from `path` (if given), with `lookup` standing in
    /// for the environment.
    pub fn resolve<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let content = match path {
            Some(path) => {
                debug!("Reading config from {}", path.display());
                fs::read_to_string(path).map_err(|err| {
                    ConfigError::IoError {
                        path: path.to_path_buf(),
                        source: err,
                    }
                })?
            }
            None => String::new(),
        };
        Self::from_toml_str(&content, lookup)
    }

    /// Builds a configuration from TOML text and an environment lookup.
    pub fn from_toml_str<F>(content: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file: ConfigFile = toml::from_str(content)?;
        let env = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let project_url = env(ENV_PROJECT_URL)
            .or(file.project_url)
            .ok_or(ConfigError::MissingSetting {
                key: "project_url",
                env: ENV_PROJECT_URL,
            })?;
        let project_url = validate_url("project_url", &project_url)?;

        let branch = env(ENV_BRANCH)
            .or(file.branch)
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());
        let author_name = env(ENV_AUTHOR_NAME)
            .or(file.author_name)
            .unwrap_or_else(|| DEFAULT_AUTHOR_NAME.to_string());
        let author_email = env(ENV_AUTHOR_EMAIL)
            .or(file.author_email)
            .unwrap_or_else(|| DEFAULT_AUTHOR_EMAIL.to_string());

        let api_url = env(ENV_API_URL).or(file.remote.api_url);
        let project_id = env(ENV_PROJECT_ID).or(file.remote.project_id);
        let token = env(ENV_TOKEN).or(file.remote.token);

        let remote = if api_url.is_none() && project_id.is_none() && token.is_none() {
            None
        } else {
            let api_url = api_url.ok_or(ConfigError::MissingSetting {
                key: "remote.api_url",
                env: ENV_API_URL,
            })?;
            let project_id = project_id.ok_or(ConfigError::MissingSetting {
                key: "remote.project_id",
                env: ENV_PROJECT_ID,
            })?;
            let token = token.ok_or(ConfigError::MissingSetting {
                key: "remote.token",
                env: ENV_TOKEN,
            })?;

            Some(RemoteConfig {
                api_url: validate_url("remote.api_url", &api_url)?,
                project_id,
                token,
            })
        };

        Ok(Config {
            project_url,
            branch,
            author_name,
            author_email,
            remote,
        })
    }

    /// Returns the remote settings, failing when they were never provided.
    pub fn remote(&self) -> Result<&RemoteConfig> {
        self.remote.as_ref().ok_or(ConfigError::RemoteNotConfigured)
    }

    /// Address the published catalog is served from.
    pub fn packages_url(&self) -> String {
        format!("{}/-/raw/{}/packages.json", self.project_url, self.branch)
    }

    /// Address the published resource bundle is served from.
    pub fn resources_url(&self) -> String {
        format!(
            "{}/-/jobs/artifacts/{}/raw/artifacts/resources.zip?job=update",
            self.project_url, self.branch
        )
    }
}

fn validate_url(key: &'static str, value: &str) -> Result<String> {
    let value = value.trim().trim_end_matches('/');
    Url::parse(value).map_err(|err| {
        ConfigError::InvalidUrl {
            key,
            value: value.to_string(),
            source: err,
        }
    })?;
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serial_test::serial;

    use super::*;
    use crate::test_utils::with_env;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_toml_str(
            "",
            lookup(&[(ENV_PROJECT_URL, "https://gitlab.com/acme/index/")]),
        )
        .unwrap();

        assert_eq!(config.project_url, "https://gitlab.com/acme/index");
        assert_eq!(config.branch, DEFAULT_BRANCH);
        assert_eq!(config.author_name, DEFAULT_AUTHOR_NAME);
        assert_eq!(config.author_email, DEFAULT_AUTHOR_EMAIL);
        assert!(config.remote.is_none());
        assert!(matches!(
            config.remote(),
            Err(ConfigError::RemoteNotConfigured)
        ));
    }

    #[test]
    fn test_missing_project_url() {
        let err = Config::from_toml_str("", lookup(&[])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingSetting {
                key: "project_url",
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_project_url() {
        let err = Config::from_toml_str("", lookup(&[(ENV_PROJECT_URL, "not a url")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn test_file_values_with_env_override() {
        let toml = r#"
            project_url = "https://gitlab.com/acme/index"
            branch = "release"
            author_name = "Index Bot"

            [remote]
            api_url = "https://gitlab.com/api/v4"
            project_id = "42"
            token = "file-token"
        "#;
        let config = Config::from_toml_str(
            toml,
            lookup(&[(ENV_TOKEN, "env-token"), (ENV_BRANCH, "")]),
        )
        .unwrap();

        assert_eq!(config.branch, "release");
        assert_eq!(config.author_name, "Index Bot");
        let remote = config.remote().unwrap();
        assert_eq!(remote.api_url, "https://gitlab.com/api/v4");
        assert_eq!(remote.project_id, "42");
        assert_eq!(remote.token, "env-token");
    }

    #[test]
    fn test_partial_remote_is_an_error() {
        let err = Config::from_toml_str(
            "",
            lookup(&[
                (ENV_PROJECT_URL, "https://gitlab.com/acme/index"),
                (ENV_PROJECT_ID, "42"),
            ]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingSetting {
                env: ENV_API_URL,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Config::from_toml_str("unknown = 1", lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::TomlDeError(_)));
    }

    #[test]
    fn test_published_urls() {
        let config = Config::from_toml_str(
            "",
            lookup(&[(ENV_PROJECT_URL, "https://gitlab.com/acme/index")]),
        )
        .unwrap();

        assert_eq!(
            config.packages_url(),
            "https://gitlab.com/acme/index/-/raw/main/packages.json"
        );
        assert_eq!(
            config.resources_url(),
            "https://gitlab.com/acme/index/-/jobs/artifacts/main/raw/artifacts/resources.zip?job=update"
        );
    }

    #[test]
    fn test_token_is_redacted_in_debug() {
        let remote = RemoteConfig {
            api_url: "https://gitlab.com/api/v4".into(),
            project_id: "42".into(),
            token: "glpat-secret".into(),
        };
        let debug = format!("{remote:?}");
        assert!(!debug.contains("glpat-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_resolve_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pkgindex.toml");
        fs::write(&path, "project_url = \"https://example.com/index\"\n").unwrap();

        let config = Config::resolve(Some(&path), lookup(&[])).unwrap();
        assert_eq!(config.project_url, "https://example.com/index");
    }

    #[test]
    fn test_resolve_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::resolve(Some(&dir.path().join("nope.toml")), lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::IoError { .. }));
    }

    #[test]
    #[serial]
    fn test_load_from_process_env() {
        with_env(
            &[
                (ENV_PROJECT_URL, Some("https://gitlab.com/acme/index")),
                (ENV_API_URL, Some("https://gitlab.com/api/v4")),
                (ENV_PROJECT_ID, Some("7")),
                (ENV_TOKEN, Some("secret")),
                (ENV_BRANCH, None),
            ],
            || {
                let config = Config::load(None).unwrap();
                assert_eq!(config.branch, DEFAULT_BRANCH);
                assert_eq!(config.remote().unwrap().project_id, "7");
            },
        );
    }
}
