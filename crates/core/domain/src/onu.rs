//! ONU 记录与状态枚举。

use serde::{Deserialize, Serialize};

/// ONU 运行状态。
///
/// 设备固件可能返回未登记的编码，统一落入 `Unknown`，不视为错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OnuStatus {
    Logging,
    #[serde(rename = "LOS")]
    Los,
    Synchronization,
    Online,
    DyingGasp,
    AuthFailed,
    Offline,
    Unknown,
}

impl OnuStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => OnuStatus::Logging,
            2 => OnuStatus::Los,
            3 => OnuStatus::Synchronization,
            4 => OnuStatus::Online,
            5 => OnuStatus::DyingGasp,
            6 => OnuStatus::AuthFailed,
            7 => OnuStatus::Offline,
            _ => OnuStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OnuStatus::Logging => "Logging",
            OnuStatus::Los => "LOS",
            OnuStatus::Synchronization => "Synchronization",
            OnuStatus::Online => "Online",
            OnuStatus::DyingGasp => "DyingGasp",
            OnuStatus::AuthFailed => "AuthFailed",
            OnuStatus::Offline => "Offline",
            OnuStatus::Unknown => "Unknown",
        }
    }
}

/// 最近一次离线原因（13 种）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OfflineReason {
    Unknown,
    #[serde(rename = "LOS")]
    Los,
    #[serde(rename = "LOSi")]
    LosI,
    #[serde(rename = "LOFi")]
    LofI,
    #[serde(rename = "sfi")]
    Sfi,
    #[serde(rename = "loai")]
    Loai,
    #[serde(rename = "loami")]
    Loami,
    AuthFail,
    PowerOff,
    #[serde(rename = "deactiveSucc")]
    DeactiveSucc,
    #[serde(rename = "deactiveFail")]
    DeactiveFail,
    Reboot,
    Shutdown,
}

impl OfflineReason {
    pub fn from_code(code: i64) -> Self {
        match code {
            2 => OfflineReason::Los,
            3 => OfflineReason::LosI,
            4 => OfflineReason::LofI,
            5 => OfflineReason::Sfi,
            6 => OfflineReason::Loai,
            7 => OfflineReason::Loami,
            8 => OfflineReason::AuthFail,
            9 => OfflineReason::PowerOff,
            10 => OfflineReason::DeactiveSucc,
            11 => OfflineReason::DeactiveFail,
            12 => OfflineReason::Reboot,
            13 => OfflineReason::Shutdown,
            _ => OfflineReason::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OfflineReason::Unknown => "Unknown",
            OfflineReason::Los => "LOS",
            OfflineReason::LosI => "LOSi",
            OfflineReason::LofI => "LOFi",
            OfflineReason::Sfi => "sfi",
            OfflineReason::Loai => "loai",
            OfflineReason::Loami => "loami",
            OfflineReason::AuthFail => "AuthFail",
            OfflineReason::PowerOff => "PowerOff",
            OfflineReason::DeactiveSucc => "deactiveSucc",
            OfflineReason::DeactiveFail => "deactiveFail",
            OfflineReason::Reboot => "Reboot",
            OfflineReason::Shutdown => "Shutdown",
        }
    }
}

/// PON 口列表中的 ONU 条目。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnuRecord {
    pub board: u32,
    pub pon: u32,
    pub onu_id: u32,
    pub name: String,
    pub onu_type: String,
    pub serial_number: String,
    pub rx_power: String,
    pub status: OnuStatus,
}

impl OnuRecord {
    /// 关键字段全为空的记录视为不存在。
    pub fn is_blank(&self) -> bool {
        self.onu_id == 0 && self.serial_number.is_empty() && self.name.is_empty()
    }
}

/// 单个 ONU 的详细信息。
///
/// 各属性逐项读取，读取失败的属性保持为空。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnuDetail {
    pub board: u32,
    pub pon: u32,
    pub onu_id: u32,
    pub name: String,
    pub description: String,
    pub onu_type: String,
    pub serial_number: String,
    pub rx_power: String,
    pub tx_power: String,
    pub status: OnuStatus,
    pub ip_address: String,
    pub last_online: Option<String>,
    pub last_offline: Option<String>,
    pub uptime: Option<String>,
    pub last_down_duration: Option<String>,
    pub offline_reason: Option<OfflineReason>,
    pub optical_distance: String,
}

impl OnuDetail {
    pub fn is_blank(&self) -> bool {
        self.onu_id == 0 && self.serial_number.is_empty() && self.name.is_empty()
    }
}

/// ONU 编号（空闲编号列表使用）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnuIdRecord {
    pub board: u32,
    pub pon: u32,
    pub onu_id: u32,
}

/// ONU 编号与序列号。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnuSerialRecord {
    pub board: u32,
    pub pon: u32,
    pub onu_id: u32,
    pub serial_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_one_to_one() {
        let names: Vec<_> = (1..=7).map(|code| OnuStatus::from_code(code).as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Logging",
                "LOS",
                "Synchronization",
                "Online",
                "DyingGasp",
                "AuthFailed",
                "Offline"
            ]
        );
        assert_eq!(OnuStatus::from_code(0), OnuStatus::Unknown);
        assert_eq!(OnuStatus::from_code(8), OnuStatus::Unknown);
        assert_eq!(OnuStatus::from_code(-1), OnuStatus::Unknown);
    }

    #[test]
    fn offline_reason_has_thirteen_values() {
        assert_eq!(OfflineReason::from_code(1), OfflineReason::Unknown);
        assert_eq!(OfflineReason::from_code(9).as_str(), "PowerOff");
        assert_eq!(OfflineReason::from_code(13).as_str(), "Shutdown");
        assert_eq!(OfflineReason::from_code(14), OfflineReason::Unknown);
    }

    #[test]
    fn status_serializes_with_device_names() {
        let json = serde_json::to_string(&OnuStatus::Los).expect("json");
        assert_eq!(json, "\"LOS\"");
    }
}
