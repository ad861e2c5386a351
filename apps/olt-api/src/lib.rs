//! OLT 控制面 HTTP API：路由、处理器与请求上下文。

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod utils;

use axum::{Router, routing::get};
use olt_backup::{BackupEngine, BackupEngineConfig};
use olt_config::AppConfig;
use olt_control::{
    BatchConfig, BatchExecutor, InventoryService, MonitoringConfig, MonitoringService,
    OnuService, OnuServiceConfig, ProvisioningService, ProvisioningServiceConfig,
};
use olt_protocol::DeviceGateway;
use olt_storage::{BackupStore, CacheStore};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

/// 服务装配参数，来自 `AppConfig`；测试使用默认值。
#[derive(Debug, Clone, Default)]
pub struct ServiceSettings {
    pub onu: OnuServiceConfig,
    pub provisioning: ProvisioningServiceConfig,
    pub batch: BatchConfig,
    pub backup: BackupEngineConfig,
    pub monitoring: MonitoringConfig,
    /// 单个请求的截止时间。
    pub request_timeout: Option<Duration>,
}

impl ServiceSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        let backup = BackupEngineConfig {
            device_version: config.device_version.clone(),
            concurrency: config.batch_concurrency,
            ..BackupEngineConfig::default()
        };
        Self {
            onu: OnuServiceConfig {
                pon_ttl_seconds: config.cache_pon_ttl_seconds,
                onu_ttl_seconds: config.cache_onu_ttl_seconds,
                empty_onu_ttl_seconds: config.cache_empty_onu_ttl_seconds,
            },
            provisioning: ProvisioningServiceConfig {
                config_ttl_seconds: config.cache_config_ttl_seconds,
            },
            batch: BatchConfig {
                max_targets: config.batch_max_targets,
                concurrency: config.batch_concurrency,
            },
            backup,
            monitoring: MonitoringConfig {
                concurrency: config.batch_concurrency,
            },
            request_timeout: Some(config.request_timeout()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub onus: Arc<OnuService>,
    pub inventory: Arc<InventoryService>,
    pub provisioning: Arc<ProvisioningService>,
    pub batch: Arc<BatchExecutor>,
    pub backups: Arc<BackupEngine>,
    pub monitoring: Arc<MonitoringService>,
    /// 根取消令牌；停机时取消，所有请求作用域由它派生。
    pub shutdown: CancellationToken,
    pub request_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(
        gateway: DeviceGateway,
        cache: Arc<dyn CacheStore>,
        backup_store: Arc<dyn BackupStore>,
        settings: ServiceSettings,
        shutdown: CancellationToken,
    ) -> Self {
        let onus = Arc::new(OnuService::new_with_config(
            gateway.clone(),
            cache.clone(),
            settings.onu,
        ));
        let provisioning = Arc::new(ProvisioningService::new_with_config(
            gateway.clone(),
            cache,
            settings.provisioning,
        ));
        let monitoring = Arc::new(MonitoringService::new_with_config(
            gateway.clone(),
            settings.monitoring,
        ));
        let inventory = Arc::new(InventoryService::new(gateway));
        let batch = Arc::new(BatchExecutor::new_with_config(onus.clone(), settings.batch));
        let backups = Arc::new(BackupEngine::new_with_config(
            backup_store,
            onus.clone(),
            provisioning.clone(),
            settings.backup,
        ));
        Self {
            onus,
            inventory,
            provisioning,
            batch,
            backups,
            monitoring,
            shutdown,
            request_timeout: settings.request_timeout,
        }
    }
}

/// 完整应用路由：`/health` 与 `/api/v1/*`，外层注入请求上下文。
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", routes::create_api_router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::request_context,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
