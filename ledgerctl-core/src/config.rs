use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{LedgerError, Result};

/// Default cap for a single uploaded file (20 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Default pool size. Kept low for a single-office deployment.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Configuration for the ledgerctl server and CLI
///
/// Every section is optional in the file; missing keys fall back to
/// defaults, then environment variables override whatever was loaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub storage: StorageSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: SocketAddr,
    /// Allow any CORS origin instead of localhost only
    pub cors_permissive: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3030)),
            cors_permissive: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Root directory for uploaded documents
    pub uploads_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            uploads_dir: LedgerConfig::config_dir().join("uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl LedgerConfig {
    /// Load config from ~/.ledgerctl/config.toml, then apply environment overrides.
    ///
    /// A missing file is not an error; defaults are used.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from an explicit path, then apply environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content).map_err(|source| LedgerError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
            debug!("Loaded config from {}", path.display());
            config
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env(|key| env::var(key).ok())?;
        config.expand_paths();
        Ok(config)
    }

    /// Config directory: ~/.ledgerctl
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".ledgerctl")
    }

    /// Config file path: ~/.ledgerctl/config.toml
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Override values from the environment.
    ///
    /// Recognized: `DATABASE_URL`, `LEDGERCTL_BIND`, `LEDGERCTL_UPLOADS_DIR`,
    /// `LEDGERCTL_MAX_UPLOAD_BYTES`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.database.url = Some(url);
        }

        if let Some(bind) = lookup("LEDGERCTL_BIND") {
            self.server.bind = bind
                .parse()
                .map_err(|_| LedgerError::config(format!("LEDGERCTL_BIND is not a socket address: {}", bind)))?;
        }

        if let Some(dir) = lookup("LEDGERCTL_UPLOADS_DIR") {
            self.storage.uploads_dir = PathBuf::from(dir);
        }

        if let Some(bytes) = lookup("LEDGERCTL_MAX_UPLOAD_BYTES") {
            self.storage.max_upload_bytes = bytes.parse().map_err(|_| {
                LedgerError::config(format!("LEDGERCTL_MAX_UPLOAD_BYTES is not a number: {}", bytes))
            })?;
        }

        Ok(())
    }

    /// Expand `${HOME}` and a leading `~/` in configured paths
    fn expand_paths(&mut self) {
        let home = dirs::home_dir()
            .map(|h| h.display().to_string())
            .unwrap_or_default();
        self.storage.uploads_dir = expand_home(&self.storage.uploads_dir, &home);
    }

    /// Database URL, or an actionable error when none is configured
    pub fn database_url(&self) -> Result<&str> {
        self.database.url.as_deref().ok_or_else(|| {
            LedgerError::config(
                "database url not set. Set DATABASE_URL, pass --database-url, or add [database] url to ~/.ledgerctl/config.toml",
            )
        })
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn expand_home(path: &Path, home: &str) -> PathBuf {
    let raw = path.display().to_string();
    let expanded = if let Some(rest) = raw.strip_prefix("~/") {
        format!("{}/{}", home, rest)
    } else {
        raw.replace("${HOME}", home)
    };
    PathBuf::from(expanded)
}

/// Which .env files were read, kept until logging is available
#[derive(Debug, Default)]
pub struct DotenvReport {
    pub loaded: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl DotenvReport {
    /// Emit what happened. Call after the subscriber is installed.
    pub fn log(&self) {
        for (path, error) in &self.failed {
            debug!("Failed to load {}: {}", path.display(), error);
        }
        if self.loaded.is_empty() {
            debug!("No .env files found (current dir or ~/.ledgerctl)");
        } else {
            let paths: Vec<String> = self.loaded.iter().map(|p| p.display().to_string()).collect();
            info!("Loaded environment from: {}", paths.join(", "));
        }
    }

    fn load_file(&mut self, path: &Path) {
        if !path.exists() {
            return;
        }
        match dotenvy::from_path(path) {
            Ok(()) => self.loaded.push(path.to_path_buf()),
            Err(e) => self.failed.push((path.to_path_buf(), e.to_string())),
        }
    }
}

/// Load environment variables from .env files
///
/// Priority order (highest to lowest):
/// 1. Variables already set in the environment
/// 2. Current directory .env
/// 3. ~/.ledgerctl/.env
///
/// dotenvy never overwrites a variable that is already set. This runs before
/// tracing is configured (RUST_LOG may come from a .env file), so the outcome
/// is returned for [`DotenvReport::log`] rather than logged here.
pub fn load_dotenv() -> DotenvReport {
    let mut report = DotenvReport::default();

    if let Ok(path) = dotenvy::dotenv() {
        report.loaded.push(path);
    }
    report.load_file(&LedgerConfig::config_dir().join(".env"));

    report
}
