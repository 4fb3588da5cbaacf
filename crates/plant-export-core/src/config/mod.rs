//! Layered configuration loading.
//!
//! Configuration structs live in the crates that own them; this module
//! only knows how to merge sources into one of them via the `config`
//! crate. Precedence, lowest first: serde defaults on the target struct,
//! an optional file, then prefixed environment variables.

pub mod logging;

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{AppError, ErrorKind};
use crate::result::AppResult;

pub use self::logging::LoggingConfig;

/// Variable map accepted in place of the process environment.
pub type EnvMap = config::Map<String, String>;

/// Where environment overrides are read from.
#[derive(Debug, Clone, Default)]
pub enum EnvSource {
    /// The current process environment.
    #[default]
    Process,
    /// An explicit variable map, used in place of the process environment.
    Map(EnvMap),
}

/// Builder-style description of the sources to merge.
#[derive(Debug, Clone)]
pub struct ConfigSources<'a> {
    /// Optional configuration file; its format is inferred from the extension.
    pub file: Option<&'a Path>,
    /// Environment variable prefix, without the trailing underscore.
    pub env_prefix: &'a str,
    /// Environment variable source.
    pub env: EnvSource,
}

impl<'a> ConfigSources<'a> {
    /// Sources reading the process environment under `env_prefix`.
    pub fn new(env_prefix: &'a str) -> Self {
        Self {
            file: None,
            env_prefix,
            env: EnvSource::Process,
        }
    }

    /// Add a configuration file. The file must exist.
    pub fn with_file(mut self, file: Option<&'a Path>) -> Self {
        self.file = file;
        self
    }

    /// Replace the process environment with an explicit map.
    pub fn with_env_map(mut self, vars: EnvMap) -> Self {
        self.env = EnvSource::Map(vars);
        self
    }

    /// Merge all sources and deserialize into `T`.
    ///
    /// Environment variables map `PREFIX_SOME_KEY` to the field `some_key`.
    /// Keys are not nested; nested sections can only come from the file.
    pub fn load<T: DeserializeOwned>(self) -> AppResult<T> {
        let mut builder = config::Config::builder();

        if let Some(file) = self.file {
            debug!(file = %file.display(), "Adding configuration file source");
            builder = builder.add_source(config::File::from(file).required(true));
        }

        let mut environment =
            config::Environment::with_prefix(self.env_prefix).prefix_separator("_");
        if let EnvSource::Map(vars) = self.env {
            environment = environment.source(Some(vars));
        }
        builder = builder.add_source(environment);

        let merged = builder.build().map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Failed to build config: {e}"),
                e,
            )
        })?;

        merged.try_deserialize().map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Failed to deserialize config: {e}"),
                e,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(default)]
    struct Sample {
        name: String,
        retries: u32,
        logging: LoggingConfig,
    }

    impl Default for Sample {
        fn default() -> Self {
            Self {
                name: "fallback".to_string(),
                retries: 1,
                logging: LoggingConfig::default(),
            }
        }
    }

    fn env(pairs: &[(&str, &str)]) -> EnvMap {
        let mut map = EnvMap::new();
        for (k, v) in pairs {
            map.insert((*k).to_string(), (*v).to_string());
        }
        map
    }

    #[test]
    fn test_defaults_when_no_sources() {
        let sample: Sample = ConfigSources::new("SAMPLE")
            .with_env_map(env(&[]))
            .load()
            .expect("load");
        assert_eq!(sample.name, "fallback");
        assert_eq!(sample.retries, 1);
        assert_eq!(sample.logging, LoggingConfig::default());
    }

    #[test]
    fn test_env_overrides_defaults() {
        let sample: Sample = ConfigSources::new("SAMPLE")
            .with_env_map(env(&[("SAMPLE_NAME", "from-env"), ("SAMPLE_RETRIES", "4")]))
            .load()
            .expect("load");
        assert_eq!(sample.name, "from-env");
        assert_eq!(sample.retries, 4);
    }

    #[test]
    fn test_unprefixed_variables_ignored() {
        let sample: Sample = ConfigSources::new("SAMPLE")
            .with_env_map(env(&[("NAME", "nope"), ("OTHER_NAME", "nope")]))
            .load()
            .expect("load");
        assert_eq!(sample.name, "fallback");
    }

    #[test]
    fn test_env_overrides_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("sample.toml");
        std::fs::write(
            &file,
            "name = \"from-file\"\nretries = 2\n\n[logging]\nformat = \"json\"\n",
        )
        .expect("write");

        let sample: Sample = ConfigSources::new("SAMPLE")
            .with_file(Some(&file))
            .with_env_map(env(&[("SAMPLE_RETRIES", "9")]))
            .load()
            .expect("load");
        assert_eq!(sample.name, "from-file");
        assert_eq!(sample.retries, 9);
        assert!(sample.logging.is_json());
        assert_eq!(sample.logging.level, "info");
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("absent.toml");
        let result: Result<Sample, _> = ConfigSources::new("SAMPLE")
            .with_file(Some(&file))
            .with_env_map(env(&[]))
            .load();
        let err = result.expect_err("missing file must fail");
        assert_eq!(err.kind, ErrorKind::Configuration);
        let cause = std::error::Error::source(&err).expect("config error kept as source");
        assert!(cause.downcast_ref::<config::ConfigError>().is_some());
    }

    #[test]
    fn test_bad_type_is_configuration_error() {
        let result: Result<Sample, _> = ConfigSources::new("SAMPLE")
            .with_env_map(env(&[("SAMPLE_RETRIES", "many")]))
            .load();
        let err = result.expect_err("bad type");
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.source.is_some());
    }
}
