//! 应用运行配置加载。

use std::env;
use std::time::Duration;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 批量目标数上限。
pub const MAX_BATCH_TARGETS: usize = 50;
/// 扇出并发上限。
pub const MAX_CONCURRENCY: usize = 16;

/// 备份文档存储后端。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupBackend {
    File,
    Postgres,
    Memory,
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub snmp_host: String,
    pub snmp_port: u16,
    pub snmp_community: String,
    pub snmp_timeout_ms: u64,
    pub snmp_retries: u32,
    /// 未设置时使用进程内缓存。
    pub redis_url: Option<String>,
    pub cache_pon_ttl_seconds: u64,
    pub cache_empty_onu_ttl_seconds: u64,
    pub cache_onu_ttl_seconds: u64,
    pub cache_config_ttl_seconds: u64,
    pub backup_backend: BackupBackend,
    pub backup_dir: String,
    pub database_url: Option<String>,
    pub batch_max_targets: usize,
    pub batch_concurrency: usize,
    pub request_timeout_ms: u64,
    pub device_version: String,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr = env::var("OLT_HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8081".to_string());
        let snmp_host = read_optional("OLT_SNMP_HOST")
            .ok_or_else(|| ConfigError::Missing("OLT_SNMP_HOST".to_string()))?;
        let snmp_port = read_u16_with_default("OLT_SNMP_PORT", 161)?;
        let snmp_community =
            env::var("OLT_SNMP_COMMUNITY").unwrap_or_else(|_| "public".to_string());
        let snmp_timeout_ms = read_u64_with_default("OLT_SNMP_TIMEOUT_MS", 5000)?;
        let snmp_retries = read_u64_with_default("OLT_SNMP_RETRIES", 1)?;
        let snmp_retries = u32::try_from(snmp_retries).map_err(|_| {
            ConfigError::Invalid("OLT_SNMP_RETRIES".to_string(), snmp_retries.to_string())
        })?;
        let redis_url = read_optional("OLT_REDIS_URL");
        let cache_pon_ttl_seconds = read_u64_with_default("OLT_CACHE_PON_TTL_SECONDS", 600)?;
        let cache_empty_onu_ttl_seconds =
            read_u64_with_default("OLT_CACHE_EMPTY_ONU_TTL_SECONDS", 300)?;
        let cache_onu_ttl_seconds = read_u64_with_default("OLT_CACHE_ONU_TTL_SECONDS", 60)?;
        let cache_config_ttl_seconds = read_u64_with_default("OLT_CACHE_CONFIG_TTL_SECONDS", 300)?;
        let backup_backend = read_backup_backend("OLT_BACKUP_BACKEND")?;
        let backup_dir = env::var("OLT_BACKUP_DIR")
            .unwrap_or_else(|_| "/var/lib/olt-control/backups".to_string());
        let database_url = read_optional("OLT_DATABASE_URL");
        if backup_backend == BackupBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("OLT_DATABASE_URL".to_string()));
        }
        let batch_max_targets = read_bounded(
            "OLT_BATCH_MAX_TARGETS",
            MAX_BATCH_TARGETS as u64,
            MAX_BATCH_TARGETS as u64,
        )?;
        let batch_concurrency = read_bounded("OLT_BATCH_CONCURRENCY", 8, MAX_CONCURRENCY as u64)?;
        let request_timeout_ms = read_u64_with_default("OLT_REQUEST_TIMEOUT_MS", 60_000)?;
        let device_version =
            env::var("OLT_DEVICE_VERSION").unwrap_or_else(|_| "C320-V2.1".to_string());

        Ok(Self {
            http_addr,
            snmp_host,
            snmp_port,
            snmp_community,
            snmp_timeout_ms,
            snmp_retries,
            redis_url,
            cache_pon_ttl_seconds,
            cache_empty_onu_ttl_seconds,
            cache_onu_ttl_seconds,
            cache_config_ttl_seconds,
            backup_backend,
            backup_dir,
            database_url,
            batch_max_targets,
            batch_concurrency,
            request_timeout_ms,
            device_version,
        })
    }

    pub fn snmp_timeout(&self) -> Duration {
        Duration::from_millis(self.snmp_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn read_u16_with_default(key: &str, default: u16) -> Result<u16, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

/// 读取 `[1, max]` 范围内的整数。
fn read_bounded(key: &str, default: u64, max: u64) -> Result<usize, ConfigError> {
    let value = read_u64_with_default(key, default)?;
    if value == 0 || value > max {
        return Err(ConfigError::Invalid(key.to_string(), value.to_string()));
    }
    Ok(value as usize)
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn read_backup_backend(key: &str) -> Result<BackupBackend, ConfigError> {
    let Some(value) = read_optional(key) else {
        return Ok(BackupBackend::File);
    };
    match value.to_ascii_lowercase().as_str() {
        "file" => Ok(BackupBackend::File),
        "postgres" | "postgresql" => Ok(BackupBackend::Postgres),
        "memory" => Ok(BackupBackend::Memory),
        _ => Err(ConfigError::Invalid(key.to_string(), value)),
    }
}
