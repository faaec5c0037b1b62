//! Client configuration.
//!
//! Values are resolved from CLI flags, then `PDFCHAT_*` environment variables,
//! then the TOML config file, then built-in defaults.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// When the client asks the server to rebuild its search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReprocessPolicy {
    /// Once per session, right after the initial file listing.
    #[default]
    OnStartup,
    /// After every successful upload.
    AfterUpload,
    Never,
}

impl ReprocessPolicy {
    pub fn label(self) -> &'static str {
        match self {
            Self::OnStartup => "on-startup",
            Self::AfterUpload => "after-upload",
            Self::Never => "never",
        }
    }
}

impl fmt::Display for ReprocessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReprocessPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "on-startup" | "startup" => Ok(Self::OnStartup),
            "after-upload" | "upload" => Ok(Self::AfterUpload),
            "never" | "off" => Ok(Self::Never),
            other => Err(format!(
                "unknown reprocess policy {other:?} (expected on-startup, after-upload or never)"
            )),
        }
    }
}

/// Fully resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    /// Per-request timeout. `None` waits for the server indefinitely.
    pub timeout_secs: Option<u64>,
    /// Context chunks retrieved per chat query.
    pub n_results: u32,
    pub reprocess: ReprocessPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
            n_results: 1,
            reprocess: ReprocessPolicy::default(),
        }
    }
}

/// Values supplied on the command line; `None` defers to lower layers.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub n_results: Option<u32>,
    pub reprocess: Option<ReprocessPolicy>,
}

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub n_results: Option<u32>,
    pub reprocess: Option<ReprocessPolicy>,
}

/// `<config dir>/pdfchat/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pdfchat").join("config.toml"))
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Load the file at `path`, or the default location when `path` is `None`.
    ///
    /// A missing default file is not an error; a missing explicit file is.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Config {
    /// Resolve against the process environment.
    pub fn resolve(overrides: ConfigOverrides, file: FileConfig) -> Result<Self, ConfigError> {
        Self::resolve_with(overrides, file, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup.
    pub fn resolve_with(
        overrides: ConfigOverrides,
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let base_url = overrides
            .base_url
            .or_else(|| env("PDFCHAT_API_URL"))
            .or(file.base_url)
            .unwrap_or(defaults.base_url);

        let timeout_secs = match overrides.timeout_secs {
            Some(secs) => Some(secs),
            None => match env("PDFCHAT_TIMEOUT") {
                Some(raw) => Some(parse_env("PDFCHAT_TIMEOUT", &raw)?),
                None => file.timeout_secs,
            },
        }
        .filter(|&secs| secs > 0);

        let n_results = match overrides.n_results {
            Some(n) => n,
            None => match env("PDFCHAT_N_RESULTS") {
                Some(raw) => parse_env("PDFCHAT_N_RESULTS", &raw)?,
                None => file.n_results.unwrap_or(defaults.n_results),
            },
        };
        if n_results == 0 {
            return Err(ConfigError::InvalidValue {
                key: "n_results",
                value: n_results.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let reprocess = match overrides.reprocess {
            Some(policy) => policy,
            None => match env("PDFCHAT_REPROCESS") {
                Some(raw) => raw.parse().map_err(|reason| ConfigError::InvalidValue {
                    key: "PDFCHAT_REPROCESS",
                    value: raw.clone(),
                    reason,
                })?,
                None => file.reprocess.unwrap_or(defaults.reprocess),
            },
        };

        Ok(Self {
            base_url,
            timeout_secs,
            n_results,
            reprocess,
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn parse_env<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config =
            Config::resolve_with(ConfigOverrides::default(), FileConfig::default(), env_of(&[]))
                .unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.base_url, "http://localhost:8000");
        assert!(config.timeout().is_none());
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let file = FileConfig {
            base_url: Some("http://file:1".into()),
            n_results: Some(4),
            ..Default::default()
        };
        let env = env_of(&[("PDFCHAT_API_URL", "http://env:2"), ("PDFCHAT_N_RESULTS", "3")]);

        let from_env =
            Config::resolve_with(ConfigOverrides::default(), file.clone(), &env).unwrap();
        assert_eq!(from_env.base_url, "http://env:2");
        assert_eq!(from_env.n_results, 3);

        let overrides = ConfigOverrides {
            base_url: Some("http://cli:3".into()),
            ..Default::default()
        };
        let from_cli = Config::resolve_with(overrides, file.clone(), &env).unwrap();
        assert_eq!(from_cli.base_url, "http://cli:3");

        let from_file =
            Config::resolve_with(ConfigOverrides::default(), file, env_of(&[])).unwrap();
        assert_eq!(from_file.base_url, "http://file:1");
        assert_eq!(from_file.n_results, 4);
    }

    #[test]
    fn zero_timeout_means_none() {
        let config = Config::resolve_with(
            ConfigOverrides::default(),
            FileConfig::default(),
            env_of(&[("PDFCHAT_TIMEOUT", "0")]),
        )
        .unwrap();
        assert!(config.timeout_secs.is_none());
    }

    #[test]
    fn bad_env_values_rejected() {
        let err = Config::resolve_with(
            ConfigOverrides::default(),
            FileConfig::default(),
            env_of(&[("PDFCHAT_TIMEOUT", "soon")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "PDFCHAT_TIMEOUT", .. }));

        let err = Config::resolve_with(
            ConfigOverrides::default(),
            FileConfig::default(),
            env_of(&[("PDFCHAT_REPROCESS", "sometimes")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "PDFCHAT_REPROCESS", .. }));
    }

    #[test]
    fn zero_n_results_rejected() {
        let overrides = ConfigOverrides {
            n_results: Some(0),
            ..Default::default()
        };
        assert!(Config::resolve_with(overrides, FileConfig::default(), env_of(&[])).is_err());
    }

    #[test]
    fn parse_toml_file() {
        let file = FileConfig::parse(
            r#"
base_url = "http://pdf.local:9000"
timeout_secs = 30
reprocess = "after-upload"
"#,
            Path::new("config.toml"),
        )
        .unwrap();
        assert_eq!(file.base_url.as_deref(), Some("http://pdf.local:9000"));
        assert_eq!(file.timeout_secs, Some(30));
        assert_eq!(file.reprocess, Some(ReprocessPolicy::AfterUpload));
    }

    #[test]
    fn unknown_toml_keys_rejected() {
        let err = FileConfig::parse("base_uri = \"x\"", Path::new("config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "n_results = 2\n").unwrap();
        let file = FileConfig::load_or_default(Some(&path)).unwrap();
        assert_eq!(file.n_results, Some(2));

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            FileConfig::load_or_default(Some(&missing)),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn reprocess_policy_parsing() {
        assert_eq!("on-startup".parse::<ReprocessPolicy>(), Ok(ReprocessPolicy::OnStartup));
        assert_eq!("AFTER_UPLOAD".parse::<ReprocessPolicy>(), Ok(ReprocessPolicy::AfterUpload));
        assert_eq!("never".parse::<ReprocessPolicy>(), Ok(ReprocessPolicy::Never));
        assert!("sometimes".parse::<ReprocessPolicy>().is_err());
        assert_eq!(ReprocessPolicy::AfterUpload.to_string(), "after-upload");
    }
}
