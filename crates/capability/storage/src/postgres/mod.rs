//! PostgreSQL 存储实现
//!
//! 通过 sqlx 访问 PostgreSQL，所有查询使用参数化 SQL。

mod backup;

pub use backup::PgBackupStore;
