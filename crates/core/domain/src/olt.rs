//! OLT 机框、PON 口与模板记录。

use serde::{Deserialize, Serialize};

/// 机框槽位上的板卡。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    pub rack: u32,
    pub shelf: u32,
    pub slot: u32,
    pub card_type: String,
    pub status: String,
    pub serial_number: String,
    pub hardware_version: String,
    pub software_version: String,
}

/// PON 口状态与已注册 ONU 数量。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PonPortRecord {
    pub board: u32,
    pub pon: u32,
    pub admin_status: String,
    pub oper_status: String,
    pub distance: i64,
    pub onu_count: u32,
}

/// 流量模板（按编号引用）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficProfile {
    pub profile_id: u32,
    pub name: String,
    pub cir: i64,
    pub pir: i64,
    pub max_bw: i64,
}

/// VLAN 模板（按名称引用）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanProfile {
    pub name: String,
    pub vlan_id: u32,
    pub priority: u32,
    pub mode: String,
    pub description: String,
}
