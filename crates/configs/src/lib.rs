use std::path::Path;

use anyhow::anyhow;
use anyhow::Result;
use serde::de::value::{Error as ValueError, StrDeserializer};
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub wall: WallConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".into(), port: 3000, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Redis,
    Memory,
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Full connection URL; wins over `redis_host`/`redis_port` when set.
    #[serde(default)]
    pub redis_url: Option<String>,
    #[serde(default = "default_redis_host")]
    pub redis_host: String,
    #[serde(default = "default_redis_port")]
    pub redis_port: u16,
    #[serde(default)]
    pub key_prefix: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_file_path")]
    pub file_path: String,
}

fn default_redis_host() -> String { "redis".into() }
fn default_redis_port() -> u16 { 6379 }
fn default_connect_timeout_ms() -> u64 { 2000 }
fn default_file_path() -> String { "data/wall.json".into() }

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            redis_url: None,
            redis_host: default_redis_host(),
            redis_port: default_redis_port(),
            key_prefix: String::new(),
            connect_timeout_ms: default_connect_timeout_ms(),
            file_path: default_file_path(),
        }
    }
}

/// Which endpoint family a deployment serves.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WallMode {
    #[default]
    Words,
    Messages,
    Both,
}

impl WallMode {
    pub fn serves_words(self) -> bool {
        matches!(self, WallMode::Words | WallMode::Both)
    }

    pub fn serves_messages(self) -> bool {
        matches!(self, WallMode::Messages | WallMode::Both)
    }
}

/// Validation rules applied to posted words.
///
/// `Strict` accepts one word of at least two characters; `Lenient` accepts any
/// non-empty trimmed text as a single key.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WordPolicy {
    #[default]
    Strict,
    Lenient,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct WallConfig {
    #[serde(default)]
    pub mode: WallMode,
    #[serde(default)]
    pub word_policy: WordPolicy,
    /// Serve `{}` instead of a 500 when the snapshot read fails.
    #[serde(default)]
    pub empty_snapshot_on_store_error: bool,
}

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if Path::new(&path).exists() {
        load_from_file(&path)
    } else {
        Ok(AppConfig::default())
    }
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// TOML file (if any), then environment overrides, then validation.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay values from a variable lookup (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| anyhow!("PORT 无效 ({port}): {e}"))?;
        }
        if let Some(threads) = lookup("TOKIO_WORKER_THREADS") {
            self.server.worker_threads = threads.trim().parse().ok();
        }
        if let Some(backend) = lookup("STORE_BACKEND") {
            self.store.backend = parse_enum("STORE_BACKEND", &backend)?;
        }
        if let Some(url) = lookup("REDIS_URL") {
            self.store.redis_url = Some(url).filter(|u| !u.trim().is_empty());
        }
        if let Some(host) = lookup("REDIS_HOST") {
            self.store.redis_host = host;
        }
        if let Some(port) = lookup("REDIS_PORT") {
            self.store.redis_port = port
                .trim()
                .parse()
                .map_err(|e| anyhow!("REDIS_PORT 无效 ({port}): {e}"))?;
        }
        if let Some(path) = lookup("STORE_FILE") {
            self.store.file_path = path;
        }
        if let Some(mode) = lookup("WALL_MODE") {
            self.wall.mode = parse_enum("WALL_MODE", &mode)?;
        }
        if let Some(policy) = lookup("WORD_POLICY") {
            self.wall.word_policy = parse_enum("WORD_POLICY", &policy)?;
        }
        if let Some(flag) = lookup("EMPTY_SNAPSHOT_ON_STORE_ERROR") {
            self.wall.empty_snapshot_on_store_error =
                matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.store.validate()?;
        Ok(())
    }
}

/// Parses a lowercase enum name the same way the TOML file would.
fn parse_enum<T: DeserializeOwned>(var: &str, raw: &str) -> Result<T> {
    let value = raw.trim().to_ascii_lowercase();
    let de: StrDeserializer<'_, ValueError> = value.as_str().into_deserializer();
    T::deserialize(de).map_err(|e| anyhow!("{var} 无效 ({raw}): {e}"))
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "0.0.0.0".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port 必须在 1..=65535 范围内"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout_ms == 0 {
            return Err(anyhow!("store.connect_timeout_ms 必须为正整数"));
        }
        match self.backend {
            StoreBackend::Redis => {
                if let Some(url) = &self.redis_url {
                    let lower = url.to_lowercase();
                    if !(lower.starts_with("redis://") || lower.starts_with("rediss://")) {
                        return Err(anyhow!("store.redis_url 必须以 redis:// 或 rediss:// 开头"));
                    }
                } else if self.redis_host.trim().is_empty() {
                    return Err(anyhow!("store.redis_host 为空；请在 config.toml 或环境变量 REDIS_HOST 中提供"));
                }
                if self.redis_port == 0 {
                    return Err(anyhow!("store.redis_port 必须在 1..=65535 范围内"));
                }
            }
            StoreBackend::File => {
                if self.file_path.trim().is_empty() {
                    return Err(anyhow!("store.file_path 为空"));
                }
            }
            StoreBackend::Memory => {}
        }
        Ok(())
    }

    /// Connection URL for the redis backend.
    pub fn redis_url(&self) -> String {
        match &self.redis_url {
            Some(url) => url.clone(),
            None => format!("redis://{}:{}", self.redis_host, self.redis_port),
        }
    }
}
