//! # 配置快照能力模块
//!
//! 单个 ONU 或整机的业务配置树快照：
//! - 采集（身份 + VLAN / T-CONT / GEM / 业务端口），整机采集逐实体记录失败
//! - 存储、列表、读取、删除（后端见 `olt-storage`）
//! - 导出为 JSON 文档、导入为新快照
//! - 按依赖顺序恢复，支持目标覆盖、类别过滤与演练

mod engine;
mod error;
mod restore;

pub use engine::{BackupEngine, BackupEngineConfig};
pub use error::BackupError;
pub use restore::{RestoreItemResult, RestoreRequest, RestoreResult};
