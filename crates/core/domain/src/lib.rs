//! OLT 控制面共享领域模型。

pub mod address;
pub mod backup;
pub mod failure;
pub mod monitoring;
pub mod olt;
pub mod onu;
pub mod provisioning;

pub use address::{AddressError, DeviceAddress, MAX_BOARD, MAX_ONU, MAX_PON};
pub use backup::{
    BackupFailure, BackupMetadata, BackupPayload, BackupSummary, BackupType, ConfigBackup,
    OnuConfigBackup,
};
pub use failure::{FailureKind, ItemError};
pub use monitoring::{OltMonitoring, OnuMonitoring, PonMonitoring, TrafficCounters};
pub use olt::{CardRecord, PonPortRecord, TrafficProfile, VlanProfile};
pub use onu::{OfflineReason, OnuDetail, OnuIdRecord, OnuRecord, OnuSerialRecord, OnuStatus};
pub use provisioning::{
    ConfigItem, DanglingReference, DbaProfile, GemPortConfig, InvalidConfig, OnuConfigTree, ServicePortConfig,
    TcontConfig, VlanConfig, VlanMode,
};
