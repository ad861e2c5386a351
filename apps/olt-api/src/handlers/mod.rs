//! Handlers 模块

pub mod backup;
pub mod batch;
pub mod management;
pub mod metrics;
pub mod monitoring;
pub mod onu;
pub mod provisioning;
pub mod system;

pub use backup::*;
pub use batch::*;
pub use management::*;
pub use metrics::*;
pub use monitoring::*;
pub use onu::*;
pub use provisioning::*;
pub use system::*;
