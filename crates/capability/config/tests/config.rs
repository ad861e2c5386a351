use olt_config::{AppConfig, BackupBackend, ConfigError};

// 环境变量是进程级状态，所有断言放在同一个测试里顺序执行。
#[test]
fn load_config_from_env() {
    // Rust 2024 中 set_var 需要显式标注 unsafe（测试进程内可控）。
    unsafe {
        std::env::remove_var("OLT_SNMP_HOST");
    }
    assert!(matches!(
        AppConfig::from_env(),
        Err(ConfigError::Missing(key)) if key == "OLT_SNMP_HOST"
    ));

    unsafe {
        std::env::set_var("OLT_SNMP_HOST", "10.0.0.2");
        std::env::set_var("OLT_HTTP_ADDR", "127.0.0.1:8082");
        std::env::set_var("OLT_CACHE_ONU_TTL_SECONDS", "30");
        std::env::set_var("OLT_BACKUP_BACKEND", "memory");
    }
    let config = AppConfig::from_env().expect("config");
    assert_eq!(config.http_addr, "127.0.0.1:8082");
    assert_eq!(config.snmp_host, "10.0.0.2");
    assert_eq!(config.snmp_port, 161);
    assert_eq!(config.cache_pon_ttl_seconds, 600);
    assert_eq!(config.cache_onu_ttl_seconds, 30);
    assert_eq!(config.backup_backend, BackupBackend::Memory);
    assert_eq!(config.batch_max_targets, 50);
    assert_eq!(config.batch_concurrency, 8);
    assert!(config.redis_url.is_none());

    unsafe {
        std::env::set_var("OLT_BATCH_MAX_TARGETS", "51");
    }
    assert!(matches!(
        AppConfig::from_env(),
        Err(ConfigError::Invalid(key, _)) if key == "OLT_BATCH_MAX_TARGETS"
    ));

    unsafe {
        std::env::remove_var("OLT_BATCH_MAX_TARGETS");
        std::env::set_var("OLT_BACKUP_BACKEND", "postgres");
        std::env::remove_var("OLT_DATABASE_URL");
    }
    assert!(matches!(
        AppConfig::from_env(),
        Err(ConfigError::Missing(key)) if key == "OLT_DATABASE_URL"
    ));
}
