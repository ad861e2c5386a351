//! 实时监控视图：ONU、PON 口与整机汇总。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 接收方向流量计数。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficCounters {
    pub rx_packets: u64,
    pub rx_bytes: u64,
    /// 可读形式，如 `"1.50 MB"`。
    pub rx_volume: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnuMonitoring {
    pub board: u32,
    pub pon: u32,
    pub onu_id: u32,
    pub serial_number: String,
    pub model: String,
    pub firmware_version: String,
    pub online: bool,
    /// 计数读取失败时缺省。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<TrafficCounters>,
    pub last_update: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PonMonitoring {
    pub board: u32,
    pub pon: u32,
    pub onu_count: u32,
    pub online_count: u32,
    pub offline_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<TrafficCounters>,
    /// 按 ONU 编号升序；单个 ONU 读取失败时不出现在列表中。
    #[serde(default)]
    pub onus: Vec<OnuMonitoring>,
    pub last_update: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OltMonitoring {
    pub total_onus: u32,
    pub online_onus: u32,
    pub offline_onus: u32,
    pub pon_ports: Vec<PonMonitoring>,
    pub last_update: DateTime<Utc>,
}
