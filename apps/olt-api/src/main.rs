//! OLT 控制面 HTTP 服务入口。

use olt_api::{AppState, ServiceSettings, build_app};
use olt_config::{AppConfig, BackupBackend};
use olt_protocol::{DeviceGateway, UdpSnmpTransport};
use olt_storage::{
    BackupStore, CacheStore, FileBackupStore, InMemoryBackupStore, InMemoryCacheStore,
    PgBackupStore, RedisCacheStore,
};
use olt_telemetry::init_tracing;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    // 读穿缓存：配置 Redis 时多实例共享，否则进程内
    let cache: Arc<dyn CacheStore> = match &config.redis_url {
        Some(url) => Arc::new(RedisCacheStore::connect(url)?),
        None => {
            warn!(target: "olt.api", "redis_not_configured_using_memory_cache");
            Arc::new(InMemoryCacheStore::new())
        }
    };

    // 备份文档存储
    let backup_store: Arc<dyn BackupStore> = match config.backup_backend {
        BackupBackend::File => Arc::new(FileBackupStore::open(config.backup_dir.clone()).await?),
        BackupBackend::Postgres => {
            let url = config.database_url.as_deref().unwrap_or_default();
            let store = PgBackupStore::connect(url).await?;
            store.ensure_schema().await?;
            Arc::new(store)
        }
        BackupBackend::Memory => Arc::new(InMemoryBackupStore::new()),
    };

    // SNMP 传输与设备网关
    let transport = UdpSnmpTransport::connect(
        &config.snmp_host,
        config.snmp_port,
        &config.snmp_community,
        config.snmp_timeout(),
        config.snmp_retries,
    )
    .await?;
    let endpoint = transport.endpoint().to_string();
    let gateway = DeviceGateway::new(Arc::new(transport), config.snmp_timeout(), endpoint);

    let shutdown = CancellationToken::new();
    let state = AppState::new(
        gateway,
        cache,
        backup_store,
        ServiceSettings::from_config(&config),
        shutdown.clone(),
    );
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(target: "olt.api", addr = %config.http_addr, "http_listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;
    info!(target: "olt.api", "http_stopped");
    Ok(())
}

/// 收到 Ctrl-C 后取消根令牌，进行中的批量与恢复把剩余目标标为取消。
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(target: "olt.api", error = %err, "shutdown_signal_failed");
        std::future::pending::<()>().await;
    }
    info!(target: "olt.api", "shutdown_requested");
    shutdown.cancel();
}
