//! Application configuration types.
//!
//! The top-level [`Config`] is deserialized from an optional TOML file and
//! then overridden from the environment (see [`Config::apply_env`]). Every
//! section defaults sensibly so an empty file, or no file at all, is valid.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "vidstore.toml";

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Deserialize a `Config` from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| Error::Config(format!("config parse error: {e}")))
    }

    /// Load configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] when
    /// it exists, or fall back to defaults.
    ///
    /// An explicitly given path that cannot be read is an error; a missing
    /// default file is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    tracing::debug!("No {DEFAULT_CONFIG_FILE} found; using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let contents = std::fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        let config = Self::from_toml(&contents)?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides using a custom variable lookup.
    ///
    /// Unparsable values are rejected rather than ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get("VIDSTORE_HOST") {
            self.server.host = v;
        }
        // The bare PORT variable is what most hosting platforms inject.
        if let Some(v) = get("VIDSTORE_PORT").or_else(|| get("PORT")) {
            self.server.port = parse_var("PORT", &v)?;
        }
        // Set but empty, or `none`, selects the built-in player page.
        if let Some(v) = lookup("VIDSTORE_STATIC_DIR") {
            let v = v.trim();
            self.server.static_dir = if v.is_empty() || v.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(PathBuf::from(v))
            };
        }
        if let Some(v) = get("VIDSTORE_PUBLIC_URL") {
            self.server.public_url = v;
        }
        if let Some(v) = get("VIDSTORE_ENABLE_LISTING") {
            self.server.enable_listing = parse_bool("VIDSTORE_ENABLE_LISTING", &v)?;
        }
        if let Some(v) = get("VIDSTORE_MAX_BODY_BYTES") {
            self.server.max_body_bytes = parse_var("VIDSTORE_MAX_BODY_BYTES", &v)?;
        }

        if let Some(v) = get("VIDSTORE_BACKEND") {
            self.storage.backend = parse_var("VIDSTORE_BACKEND", &v)?;
        }
        if let Some(v) = get("VIDSTORE_DATA_FILE") {
            self.storage.data_file = PathBuf::from(v);
        }
        if let Some(v) = get("VIDSTORE_SQLITE_PATH") {
            self.storage.sqlite_path = PathBuf::from(v);
        }
        if let Some(v) = get("VIDSTORE_DATABASE_URI").or_else(|| get("MONGODB_URI")) {
            self.storage.uri = v;
        }
        if let Some(v) = get("VIDSTORE_DATABASE_NAME") {
            self.storage.database = v;
        }
        if let Some(v) = get("VIDSTORE_COLLECTION") {
            self.storage.collection = v;
        }
        if let Some(v) = get("VIDSTORE_STORAGE_TIMEOUT_SECS") {
            self.storage.timeout_secs = parse_var("VIDSTORE_STORAGE_TIMEOUT_SECS", &v)?;
        }

        Ok(())
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if let Some(ref dir) = self.server.static_dir {
            if !dir.exists() {
                warnings.push(format!(
                    "server.static_dir {} does not exist; the built-in player page will be served",
                    dir.display()
                ));
            }
        }

        if !self.server.public_url.is_empty()
            && !self.server.public_url.starts_with("http://")
            && !self.server.public_url.starts_with("https://")
        {
            warnings.push(format!(
                "server.public_url {:?} is not an absolute http(s) URL",
                self.server.public_url
            ));
        }

        if self.storage.timeout_secs == 0 {
            warnings.push("storage.timeout_secs is 0; using 1 second".into());
        }

        if self.storage.collection.is_empty() {
            warnings.push("storage.collection is empty".into());
        }

        warnings
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("{key}={raw:?} is invalid: {e}")))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!("{key}={raw:?} is not a boolean"))),
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory with the player page (`index.html`) and other assets.
    pub static_dir: Option<PathBuf>,
    /// Prefix for URLs returned from create, e.g. `https://videos.example.com`.
    /// Empty means server-relative URLs.
    pub public_url: String,
    /// Whether `GET /api/videos` enumerates all records.
    pub enable_listing: bool,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            static_dir: Some(PathBuf::from("public")),
            public_url: String::new(),
            enable_listing: true,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Which persistence medium backs the record store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// A single JSON document on the local filesystem.
    #[default]
    Json,
    /// An SQLite database file.
    Sqlite,
    /// A MongoDB collection.
    Mongodb,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Json => write!(f, "json"),
            Backend::Sqlite => write!(f, "sqlite"),
            Backend::Mongodb => write!(f, "mongodb"),
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" | "file" => Ok(Backend::Json),
            "sqlite" | "sql" => Ok(Backend::Sqlite),
            "mongodb" | "mongo" => Ok(Backend::Mongodb),
            other => Err(format!(
                "unknown backend '{other}' (valid: json, sqlite, mongodb)"
            )),
        }
    }
}

/// Record store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: Backend,
    /// Path of the JSON document used by the `json` backend.
    pub data_file: PathBuf,
    /// Path of the database file used by the `sqlite` backend.
    pub sqlite_path: PathBuf,
    /// Connection string for the `mongodb` backend.
    pub uri: String,
    /// Logical database name for the `mongodb` backend.
    pub database: String,
    /// Collection (MongoDB) or table (SQLite) holding the records.
    pub collection: String,
    /// Upper bound on any single storage call.
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Json,
            data_file: PathBuf::from("videos_db.json"),
            sqlite_path: PathBuf::from("vidstore.db"),
            uri: "mongodb://localhost:27017".into(),
            database: "vidstore".into(),
            collection: "videos".into(),
            timeout_secs: 5,
        }
    }
}

impl StorageConfig {
    /// The storage call bound as a [`Duration`] (never zero).
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert!(config.server.enable_listing);
        assert_eq!(config.server.max_body_bytes, 1_048_576);
        assert_eq!(config.storage.backend, Backend::Json);
        assert_eq!(config.storage.data_file, PathBuf::from("videos_db.json"));
        assert_eq!(config.storage.collection, "videos");
        assert_eq!(config.storage.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn empty_toml_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.database, "vidstore");
    }

    #[test]
    fn partial_toml() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 8081
            enable_listing = false

            [storage]
            backend = "sqlite"
            sqlite_path = "/data/videos.db"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8081);
        assert!(!config.server.enable_listing);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.backend, Backend::Sqlite);
        assert_eq!(config.storage.sqlite_path, PathBuf::from("/data/videos.db"));
        assert_eq!(config.storage.collection, "videos");
    }

    #[test]
    fn bad_toml_is_config_error() {
        let err = Config::from_toml("[server]\nport = \"abc\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[storage]\ncollection = \"clips\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.storage.collection, "clips");

        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(Some(&missing)), Err(Error::Config(_))));
    }

    #[test]
    fn env_overrides() {
        let mut config = Config::default();
        config
            .apply_env_with(env(&[
                ("PORT", "4000"),
                ("VIDSTORE_BACKEND", "mongo"),
                ("MONGODB_URI", "mongodb://db:27017"),
                ("VIDSTORE_DATABASE_NAME", "media"),
                ("VIDSTORE_COLLECTION", "clips"),
                ("VIDSTORE_ENABLE_LISTING", "no"),
                ("VIDSTORE_STORAGE_TIMEOUT_SECS", "2"),
                ("VIDSTORE_PUBLIC_URL", "https://v.example.com"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 4000);
        assert_eq!(config.storage.backend, Backend::Mongodb);
        assert_eq!(config.storage.uri, "mongodb://db:27017");
        assert_eq!(config.storage.database, "media");
        assert_eq!(config.storage.collection, "clips");
        assert!(!config.server.enable_listing);
        assert_eq!(config.storage.timeout_secs, 2);
        assert_eq!(config.server.public_url, "https://v.example.com");
    }

    #[test]
    fn prefixed_port_wins_over_bare_port() {
        let mut config = Config::default();
        config
            .apply_env_with(env(&[("PORT", "4000"), ("VIDSTORE_PORT", "5000")]))
            .unwrap();
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn static_dir_can_be_cleared() {
        for value in ["", "none", "NONE"] {
            let mut config = Config::default();
            config
                .apply_env_with(env(&[("VIDSTORE_STATIC_DIR", value)]))
                .unwrap();
            assert_eq!(config.server.static_dir, None, "{value:?}");
        }

        let mut config = Config::default();
        config.server.static_dir = None;
        config
            .apply_env_with(env(&[("VIDSTORE_STATIC_DIR", "/srv/www")]))
            .unwrap();
        assert_eq!(config.server.static_dir, Some(PathBuf::from("/srv/www")));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut config = Config::default();
        config.apply_env_with(env(&[("PORT", "")])).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn invalid_env_values_fail() {
        let mut config = Config::default();
        assert!(config.apply_env_with(env(&[("PORT", "eighty")])).is_err());
        assert!(config
            .apply_env_with(env(&[("VIDSTORE_BACKEND", "postgres")]))
            .is_err());
        assert!(config
            .apply_env_with(env(&[("VIDSTORE_ENABLE_LISTING", "maybe")]))
            .is_err());
    }

    #[test]
    fn backend_parsing() {
        assert_eq!("json".parse::<Backend>().unwrap(), Backend::Json);
        assert_eq!("FILE".parse::<Backend>().unwrap(), Backend::Json);
        assert_eq!("sqlite".parse::<Backend>().unwrap(), Backend::Sqlite);
        assert_eq!("mongodb".parse::<Backend>().unwrap(), Backend::Mongodb);
        assert!("redis".parse::<Backend>().is_err());
        assert_eq!(Backend::Mongodb.to_string(), "mongodb");
    }

    #[test]
    fn validate_warnings() {
        let mut config = Config::default();
        config.server.port = 0;
        config.server.static_dir = Some(PathBuf::from("/definitely/not/here"));
        config.storage.timeout_secs = 0;

        let warnings = config.validate();
        assert!(warnings.iter().any(|w| w.contains("server.port")));
        assert!(warnings.iter().any(|w| w.contains("static_dir")));
        assert!(warnings.iter().any(|w| w.contains("timeout_secs")));
        assert_eq!(config.storage.timeout(), Duration::from_secs(1));
    }
}
