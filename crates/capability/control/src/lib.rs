//! # 控制能力模块
//!
//! 面向 HTTP 层的服务：
//! - [`OnuService`]：ONU 列表 / 详情 / 空闲编号 / PON 口信息（读穿缓存）与单个 ONU 管理
//! - [`InventoryService`]：板卡、流量 / VLAN 模板、DBA 模板
//! - [`ProvisioningService`]：ONU 业务配置树的读取与幂等写入
//! - [`BatchExecutor`]：≤50 个目标的批量操作，逐目标独立结果
//! - [`MonitoringService`]：ONU / PON 口 / 整机实时监控
//!
//! 所有入口接收 [`RequestScope`]，读操作可被取消，写操作在发送前检查。

mod batch;
mod error;
mod inventory;
mod monitoring;
mod onu;
mod provisioning;
mod read;
mod scope;

pub use batch::{
    BatchConfig, BatchExecutor, BatchItemResult, BatchItemStatus, BatchOperation, BatchResult,
    BatchTarget, MAX_BATCH_CONCURRENCY, MAX_BATCH_TARGETS,
};
pub use error::ControlError;
pub use inventory::InventoryService;
pub use monitoring::{MonitoringConfig, MonitoringService};
pub use onu::{validate_description, OnuService, OnuServiceConfig};
pub use provisioning::{
    ElementOutcome, ElementStatus, OnuIdentity, ProvisioningService, ProvisioningServiceConfig,
};
pub use scope::RequestScope;
