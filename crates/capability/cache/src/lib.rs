//! # 读穿缓存能力模块
//!
//! 以 `(board, pon[, onu])` 作用域为键，缓存最近一次解码后的实体：
//! - [`ScopeKey`]：作用域键（PON 列表、ONU 详情、配置树、空闲编号）
//! - [`ReadThroughCache`]：命中返回 / 未命中获取并写回，按键 single-flight
//! - [`ScopeInvalidator`]：变更后按作用域失效
//!
//! 存储后端见 `olt-storage`（Redis / 内存）。

mod error;
mod read_through;
mod scope;
mod single_flight;

pub use error::CacheError;
pub use read_through::{ReadThroughCache, ScopeInvalidator};
pub use scope::ScopeKey;
pub use single_flight::SingleFlight;
