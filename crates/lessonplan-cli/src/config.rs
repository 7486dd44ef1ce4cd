//! Configuration file management for lessonplan.
//!
//! Provides a TOML-based config file at `~/.config/lessonplan/config.toml`
//! and a resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use lessonplan_core::generator::GeminiConfig;
use lessonplan_core::pipeline::Environment;
use lessonplan_core::store::SupabaseConfig;
use lessonplan_db::config::DbConfig;

pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const GEMINI_MODEL_ENV: &str = "GEMINI_MODEL";
pub const GEMINI_BASE_URL_ENV: &str = "GEMINI_BASE_URL";
pub const STORE_BACKEND_ENV: &str = "LESSONPLAN_STORE";
pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";
pub const PORT_ENV: &str = "PORT";
pub const ENVIRONMENT_ENV: &str = "ENVIRONMENT";

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

/// On-disk config. Every key is optional; absent keys fall through to
/// defaults.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub gemini: GeminiSection,
    pub store: StoreSection,
    pub server: ServerSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// `rpc` or `postgres`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supabase_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supabase_anon_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

impl ConfigFile {
    /// Skeleton written by `lessonplan init`: defaults filled in, secrets
    /// left for the operator.
    pub fn skeleton() -> Self {
        Self {
            gemini: GeminiSection {
                api_key: None,
                model: Some(GeminiConfig::DEFAULT_MODEL.to_string()),
                base_url: Some(GeminiConfig::DEFAULT_BASE_URL.to_string()),
                timeout_secs: Some(GeminiConfig::DEFAULT_TIMEOUT.as_secs()),
            },
            store: StoreSection {
                backend: Some(StoreBackend::Rpc.as_str().to_string()),
                supabase_url: None,
                supabase_anon_key: None,
                database_url: Some(DbConfig::DEFAULT_URL.to_string()),
            },
            server: ServerSection {
                bind: Some(DEFAULT_BIND.to_string()),
                port: Some(DEFAULT_PORT),
                environment: Some(Environment::Production.as_str().to_string()),
            },
        }
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the lessonplan config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/lessonplan` or
/// `~/.config/lessonplan`, also on macOS.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("lessonplan");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("lessonplan")
}

/// Return the default path to the lessonplan config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse a config file. Returns an error if it does not exist.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(config)
}

/// Serialize and write a config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix since the file holds API keys.
pub fn save_config(path: &Path, config: &ConfigFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Where generated lesson plans are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Supabase PostgREST RPC, called with the caller's credential.
    Rpc,
    /// Direct Postgres connection.
    Postgres,
}

impl StoreBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rpc => "rpc",
            Self::Postgres => "postgres",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rpc" | "supabase" => Ok(Self::Rpc),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            other => bail!("unknown store backend {other:?} (expected \"rpc\" or \"postgres\")"),
        }
    }
}

/// HTTP surface settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub environment: Environment,
}

/// Values supplied on the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct CliOverrides<'a> {
    pub bind: Option<&'a str>,
    pub port: Option<u16>,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct LessonplanConfig {
    /// `None` when no API key is configured anywhere.
    pub gemini: Option<GeminiConfig>,
    pub backend: StoreBackend,
    /// `None` unless both the URL and the anon key are configured.
    pub supabase: Option<SupabaseConfig>,
    pub db_config: DbConfig,
    pub server: ServerConfig,
}

impl LessonplanConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// With `config_file` set, the file must exist. Otherwise the default
    /// path is read if present.
    pub fn resolve(config_file: Option<&Path>, cli: CliOverrides<'_>) -> Result<Self> {
        let file = match config_file {
            Some(path) => load_config(path)?,
            None => {
                let path = config_path();
                if path.exists() {
                    load_config(&path)?
                } else {
                    ConfigFile::default()
                }
            }
        };

        // Gemini.
        let gemini = env_var(GEMINI_API_KEY_ENV)
            .or(file.gemini.api_key.filter(|k| !k.is_empty()))
            .map(|api_key| GeminiConfig {
                model: env_var(GEMINI_MODEL_ENV)
                    .or(file.gemini.model.clone())
                    .unwrap_or_else(|| GeminiConfig::DEFAULT_MODEL.to_string()),
                base_url: env_var(GEMINI_BASE_URL_ENV)
                    .or(file.gemini.base_url.clone())
                    .unwrap_or_else(|| GeminiConfig::DEFAULT_BASE_URL.to_string()),
                timeout: file
                    .gemini
                    .timeout_secs
                    .map(Duration::from_secs)
                    .unwrap_or(GeminiConfig::DEFAULT_TIMEOUT),
                ..GeminiConfig::new(api_key)
            });

        // Store.
        let backend = match env_var(STORE_BACKEND_ENV).or(file.store.backend) {
            Some(name) => name.parse()?,
            None => StoreBackend::Rpc,
        };
        let supabase = match (
            env_var(SUPABASE_URL_ENV).or(file.store.supabase_url),
            env_var(SUPABASE_ANON_KEY_ENV).or(file.store.supabase_anon_key),
        ) {
            (Some(url), Some(anon_key)) if !url.is_empty() && !anon_key.is_empty() => {
                Some(SupabaseConfig { url, anon_key })
            }
            _ => None,
        };
        let db_url = env_var(DbConfig::ENV_VAR)
            .or(file.store.database_url)
            .unwrap_or_else(|| DbConfig::DEFAULT_URL.to_string());
        let db_config = DbConfig::new(db_url);

        // Server.
        let bind = cli
            .bind
            .map(str::to_string)
            .or(file.server.bind)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let port = match (cli.port, env_var(PORT_ENV)) {
            (Some(port), _) => port,
            (None, Some(raw)) => raw
                .parse()
                .with_context(|| format!("{PORT_ENV} env var is not a valid port: {raw:?}"))?,
            (None, None) => file.server.port.unwrap_or(DEFAULT_PORT),
        };
        let environment = env_var(ENVIRONMENT_ENV)
            .or(file.server.environment)
            .map(|name| Environment::from_name(&name))
            .unwrap_or_default();

        Ok(Self {
            gemini,
            backend,
            supabase,
            db_config,
            server: ServerConfig {
                bind,
                port,
                environment,
            },
        })
    }

    /// Supabase settings, required for the rpc backend.
    pub fn require_supabase(&self) -> Result<&SupabaseConfig> {
        match &self.supabase {
            Some(cfg) => Ok(cfg),
            None => bail!("SUPABASE_URL and SUPABASE_ANON_KEY variables not set."),
        }
    }
}

/// Read an env var, treating empty values as unset.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
