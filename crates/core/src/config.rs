use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

/// Tunables for the analysis engine. The cache TTLs track how quickly the
/// affinity structure and per-item pairings may go stale; aggregate
/// statistics are recomputed fresh on every classification run and have no
/// TTL here.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    pub affinity_ttl_secs: u64,
    pub pairing_ttl_secs: u64,
    pub min_support: f64,
    pub min_confidence: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            affinity_ttl_secs: 900,
            pairing_ttl_secs: 1800,
            min_support: crate::affinity::DEFAULT_MIN_SUPPORT,
            min_confidence: crate::affinity::DEFAULT_MIN_CONFIDENCE,
        }
    }
}

impl EngineConfig {
    pub fn affinity_ttl(&self) -> Duration {
        Duration::from_secs(self.affinity_ttl_secs)
    }

    pub fn pairing_ttl(&self) -> Duration {
        Duration::from_secs(self.pairing_ttl_secs)
    }
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://menuwise.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            engine: EngineConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("menuwise.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(engine) = patch.engine {
            if let Some(affinity_ttl_secs) = engine.affinity_ttl_secs {
                self.engine.affinity_ttl_secs = affinity_ttl_secs;
            }
            if let Some(pairing_ttl_secs) = engine.pairing_ttl_secs {
                self.engine.pairing_ttl_secs = pairing_ttl_secs;
            }
            if let Some(min_support) = engine.min_support {
                self.engine.min_support = min_support;
            }
            if let Some(min_confidence) = engine.min_confidence {
                self.engine.min_confidence = min_confidence;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("MENUWISE_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("MENUWISE_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_u32("MENUWISE_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("MENUWISE_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("MENUWISE_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("MENUWISE_ENGINE_AFFINITY_TTL_SECS") {
            self.engine.affinity_ttl_secs =
                parse_u64("MENUWISE_ENGINE_AFFINITY_TTL_SECS", &value)?;
        }
        if let Some(value) = read_env("MENUWISE_ENGINE_PAIRING_TTL_SECS") {
            self.engine.pairing_ttl_secs = parse_u64("MENUWISE_ENGINE_PAIRING_TTL_SECS", &value)?;
        }
        if let Some(value) = read_env("MENUWISE_ENGINE_MIN_SUPPORT") {
            self.engine.min_support = parse_f64("MENUWISE_ENGINE_MIN_SUPPORT", &value)?;
        }
        if let Some(value) = read_env("MENUWISE_ENGINE_MIN_CONFIDENCE") {
            self.engine.min_confidence = parse_f64("MENUWISE_ENGINE_MIN_CONFIDENCE", &value)?;
        }

        let log_level =
            read_env("MENUWISE_LOGGING_LEVEL").or_else(|| read_env("MENUWISE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("MENUWISE_LOGGING_FORMAT").or_else(|| read_env("MENUWISE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_engine(&self.engine)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("menuwise.toml"), PathBuf::from("config/menuwise.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_engine(engine: &EngineConfig) -> Result<(), ConfigError> {
    if engine.affinity_ttl_secs == 0 {
        return Err(ConfigError::Validation(
            "engine.affinity_ttl_secs must be greater than zero".to_string(),
        ));
    }

    if engine.pairing_ttl_secs == 0 {
        return Err(ConfigError::Validation(
            "engine.pairing_ttl_secs must be greater than zero".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&engine.min_support) {
        return Err(ConfigError::Validation(
            "engine.min_support must be in range 0.0..=1.0".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&engine.min_confidence) {
        return Err(ConfigError::Validation(
            "engine.min_confidence must be in range 0.0..=1.0".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    engine: Option<EnginePatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct EnginePatch {
    affinity_ttl_secs: Option<u64>,
    pairing_ttl_secs: Option<u64>,
    min_support: Option<f64>,
    min_confidence: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
