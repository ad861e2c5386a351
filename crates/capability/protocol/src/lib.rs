//! # 设备协议能力模块
//!
//! OLT 厂商 SNMP 代理的编解码与访问：
//! - **codec**：`(实体, 地址, 子索引) → OID`，原始值 → 领域值
//! - **transport**：单次 SNMP 交互的接缝（async-snmp v2c UDP）
//! - **gateway**：带超时、失败分类与设备级串行化的 GET / WALK / SET
//! - **memory**：内存代理（测试 / 离线）
//!
//! ## 架构
//!
//! ```text
//! Service 层
//!     │
//!     ▼
//! DeviceGateway ── 超时 / 串行化 / 错误分类
//!     │
//!     ▼
//! SnmpTransport ── UdpSnmpTransport (async-snmp)
//!     │
//!     ▼
//! OLT 代理
//! ```

pub mod codec;
mod error;
mod gateway;
mod memory;
mod transport;
mod types;

pub use error::{DecodeError, GatewayError, TransportError};
pub use gateway::{DeviceGateway, GatewayReadSession, GatewaySession, Walk};
pub use memory::MemoryTransport;
pub use transport::{SnmpTransport, UdpSnmpTransport};
pub use types::{Oid, SnmpValue, VarBind};
