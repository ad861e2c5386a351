//! 内存存储实现
//!
//! 用于测试与单实例部署，进程退出后数据丢失。

mod backup;
mod cache;

pub use backup::InMemoryBackupStore;
pub use cache::InMemoryCacheStore;
