//! # OLT Storage 模块
//!
//! 缓存与配置快照的存储抽象层，支持多种后端实现。
//!
//! ## 模块说明
//!
//! - [`traits`]：存储接口（`CacheStore`、`BackupStore`）
//! - [`error`]：存储错误类型
//! - [`connection`]：PostgreSQL 连接池管理
//!
//! ### 存储实现
//!
//! - `in_memory`：`RwLock<HashMap>` 内存实现，用于测试与单实例部署
//! - `redis`：Redis 缓存（`SETEX` 过期，多实例共享）
//! - `file`：每个备份一个 JSON 文档
//! - `postgres`：`config_backups` 表，每个备份一行
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use olt_storage::{BackupStore, FileBackupStore};
//!
//! let store = FileBackupStore::open("/var/lib/olt-control/backups").await?;
//! let items = store.list(None, 20).await?;
//! ```

pub mod connection;
pub mod error;
pub mod file;
pub mod in_memory;
pub mod postgres;
pub mod redis;
pub mod traits;

pub use connection::connect_pool;
pub use error::StorageError;
pub use file::FileBackupStore;
pub use in_memory::{InMemoryBackupStore, InMemoryCacheStore};
pub use postgres::PgBackupStore;
pub use redis::RedisCacheStore;
pub use traits::{BackupStore, CacheStore};
