//! 厂商 OID 布局。
//!
//! 所有 OID 由 `(实体类别, 地址, 子索引)` 纯函数生成，不依赖运行时状态。

use crate::types::Oid;
use domain::DeviceAddress;

/// ONU 身份 / 状态表、PON 口表、业务配置表。
pub const BASE: [u32; 8] = [1, 3, 6, 1, 4, 1, 3902, 1082];
/// ONU 类型、发光功率、IP 表与监控表。
pub const BASE_EXT: [u32; 8] = [1, 3, 6, 1, 4, 1, 3902, 1012];
/// 机框板卡表：`CARD_TABLE.{col}.{rack}.{shelf}.{slot}`。
pub const CARD_TABLE: [u32; 13] = [1, 3, 6, 1, 4, 1, 3902, 1015, 2, 1, 1, 3, 1];

const BOARD1_ONU_INDEX: u32 = 285_278_464;
const BOARD2_ONU_INDEX: u32 = 285_278_720;
const BOARD1_TYPE_INDEX: u32 = 268_500_992;
const BOARD2_TYPE_INDEX: u32 = 268_566_528;
const MONITOR_INDEX_BASE: u32 = 268_500_992;

/// RowStatus 取值。
pub mod row_status {
    pub const ACTIVE: i64 = 1;
    pub const CREATE_AND_GO: i64 = 4;
    pub const DESTROY: i64 = 6;
}

/// ONU 表中的 PON 口索引。
pub fn onu_index(address: &DeviceAddress) -> u32 {
    let base = if address.board() == 1 {
        BOARD1_ONU_INDEX
    } else {
        BOARD2_ONU_INDEX
    };
    base + address.pon_id()
}

/// 类型表与 PON 口表中的 PON 口索引。
pub fn type_index(address: &DeviceAddress) -> u32 {
    let base = if address.board() == 1 {
        BOARD1_TYPE_INDEX
    } else {
        BOARD2_TYPE_INDEX
    };
    base + 256 * address.pon_id()
}

enum IndexStyle {
    Onu,
    Type,
}

/// ONU 级属性。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OnuAttribute {
    Name,
    Type,
    SerialNumber,
    Description,
    RxPower,
    TxPower,
    Status,
    IpAddress,
    LastOnline,
    LastOffline,
    OfflineReason,
    Distance,
    AdminState,
    Reset,
    RowStatus,
}

impl OnuAttribute {
    fn layout(&self) -> (&'static [u32], &'static [u32], IndexStyle, bool) {
        use IndexStyle::{Onu, Type};
        match self {
            OnuAttribute::Name => (&BASE, &[500, 10, 2, 3, 3, 1, 2], Onu, false),
            OnuAttribute::Description => (&BASE, &[500, 10, 2, 3, 3, 1, 3], Onu, false),
            OnuAttribute::AdminState => (&BASE, &[500, 10, 2, 3, 3, 1, 10], Onu, false),
            OnuAttribute::SerialNumber => (&BASE, &[500, 10, 2, 3, 3, 1, 18], Onu, false),
            OnuAttribute::RowStatus => (&BASE, &[500, 10, 2, 3, 3, 1, 19], Onu, false),
            OnuAttribute::Status => (&BASE, &[500, 10, 2, 3, 8, 1, 4], Onu, false),
            OnuAttribute::LastOnline => (&BASE, &[500, 10, 2, 3, 8, 1, 5], Onu, false),
            OnuAttribute::LastOffline => (&BASE, &[500, 10, 2, 3, 8, 1, 6], Onu, false),
            OnuAttribute::OfflineReason => (&BASE, &[500, 10, 2, 3, 8, 1, 7], Onu, false),
            OnuAttribute::Reset => (&BASE, &[500, 10, 2, 3, 9, 1, 1], Onu, false),
            OnuAttribute::Distance => (&BASE, &[500, 10, 2, 3, 10, 1, 2], Onu, false),
            OnuAttribute::RxPower => (&BASE, &[500, 20, 2, 2, 2, 1, 10], Onu, true),
            OnuAttribute::Type => (&BASE_EXT, &[3, 50, 11, 2, 1, 17], Type, false),
            OnuAttribute::TxPower => (&BASE_EXT, &[3, 50, 12, 1, 1, 14], Type, true),
            OnuAttribute::IpAddress => (&BASE_EXT, &[3, 50, 16, 1, 1, 10], Type, true),
        }
    }
}

/// PON 口级属性。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PonAttribute {
    AdminStatus,
    Distance,
    OperStatus,
    /// 已注册 ONU 表，按前缀遍历计数。
    RegisteredOnus,
}

impl PonAttribute {
    fn column(&self) -> &'static [u32] {
        match self {
            PonAttribute::AdminStatus => &[3, 11, 3, 1, 1],
            PonAttribute::Distance => &[3, 11, 5, 1, 3],
            PonAttribute::OperStatus => &[3, 11, 5, 1, 4],
            PonAttribute::RegisteredOnus => &[3, 13, 3, 1, 5],
        }
    }
}

/// ONU 业务配置表，索引 `{onu_index}.{onu}.{sub}`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigTable {
    Tcont,
    GemPort,
    /// 子索引为 user_vlan。
    Vlan,
    ServicePort,
}

impl ConfigTable {
    pub const ROW_STATUS: u32 = 9;

    fn table(&self) -> &'static [u32] {
        match self {
            ConfigTable::Tcont => &[3, 50, 2, 1, 1],
            ConfigTable::GemPort => &[3, 50, 2, 2, 1],
            ConfigTable::Vlan => &[3, 50, 3, 1, 1],
            ConfigTable::ServicePort => &[3, 50, 4, 1, 1],
        }
    }
}

/// T-CONT 表列。
pub mod tcont_column {
    pub const NAME: u32 = 2;
    pub const PROFILE: u32 = 3;
}

/// GEM 端口表列。
pub mod gemport_column {
    pub const NAME: u32 = 2;
    pub const TCONT: u32 = 3;
}

/// ONU VLAN 表列。
pub mod vlan_column {
    pub const SERVICE_VLAN: u32 = 2;
    pub const MODE: u32 = 3;
    pub const PRIORITY: u32 = 4;
}

/// 业务端口表列。
pub mod service_port_column {
    pub const VPORT: u32 = 2;
    pub const USER_VLAN: u32 = 3;
    pub const SERVICE_VLAN: u32 = 4;
    pub const GEMPORT: u32 = 5;
}

/// DBA 模板表列，索引为名称的字符串索引。
pub mod dba_column {
    pub const TYPE: u32 = 2;
    pub const FIXED: u32 = 3;
    pub const ASSURED: u32 = 4;
    pub const MAX: u32 = 5;
    pub const ROW_STATUS: u32 = 9;
}

/// 板卡表列。
pub mod card_column {
    pub const TYPE: u32 = 2;
    pub const SERIAL: u32 = 4;
    pub const HARDWARE: u32 = 5;
    pub const SOFTWARE: u32 = 6;
    pub const STATUS: u32 = 7;
}

/// 流量模板表列。
pub mod traffic_column {
    pub const NAME: u32 = 2;
    pub const CIR: u32 = 3;
    pub const PIR: u32 = 4;
    pub const MAX_BW: u32 = 5;
}

/// VLAN 模板表列。
pub mod vlan_profile_column {
    pub const VLAN_ID: u32 = 2;
    pub const PRIORITY: u32 = 3;
    pub const MODE: u32 = 4;
    pub const DESCRIPTION: u32 = 5;
}

/// 监控表的 PON 口索引：`268500992 + 8192 × board + 256 × pon`。
pub fn monitor_index(address: &DeviceAddress) -> u32 {
    MONITOR_INDEX_BASE + 8192 * address.board() + 256 * address.pon_id()
}

/// ONU 监控属性（`BASE_EXT`，索引 `{monitor_index}.{onu}`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitorAttribute {
    SerialNumber,
    Model,
    Firmware,
    OnlineStatus,
    RxPackets,
    RxBytes,
}

impl MonitorAttribute {
    fn column(&self) -> &'static [u32] {
        match self {
            MonitorAttribute::SerialNumber => &[3, 13, 3, 1, 5],
            MonitorAttribute::Model => &[3, 13, 3, 1, 10],
            MonitorAttribute::Firmware => &[3, 13, 3, 1, 11],
            MonitorAttribute::OnlineStatus => &[3, 31, 4, 1, 100],
            MonitorAttribute::RxPackets => &[3, 31, 4, 1, 3],
            MonitorAttribute::RxBytes => &[3, 31, 4, 1, 6],
        }
    }
}

/// PON 口流量计数（索引 `{monitor_index}.1`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PonCounter {
    RxPackets,
    RxBytes,
}

impl PonCounter {
    fn column(&self) -> &'static [u32] {
        match self {
            PonCounter::RxPackets => &[3, 31, 5, 1, 3],
            PonCounter::RxBytes => &[3, 31, 5, 1, 6],
        }
    }
}

/// 与地址绑定的实体类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Onu(OnuAttribute),
    Pon(PonAttribute),
    /// 配置表 + 列号。
    Config(ConfigTable, u32),
    Monitor(MonitorAttribute),
    PonCounter(PonCounter),
}

/// 生成实体 OID。
///
/// 地址带 ONU 时返回单个对象；PON 级地址返回该列的遍历前缀（不含 `.1` 尾缀）。
/// `index` 追加在 ONU 编号之后。
pub fn encode(kind: EntityKind, address: &DeviceAddress, index: &[u32]) -> Oid {
    match kind {
        EntityKind::Onu(attribute) => {
            let (base, column, style, trailing) = attribute.layout();
            let pon_index = match style {
                IndexStyle::Onu => onu_index(address),
                IndexStyle::Type => type_index(address),
            };
            let mut oid = Oid::from_slice(base).extend(column).child(pon_index);
            if let Some(onu) = address.onu_id() {
                oid = oid.child(onu).extend(index);
                if trailing {
                    oid = oid.child(1);
                }
            }
            oid
        }
        EntityKind::Pon(attribute) => Oid::from_slice(&BASE)
            .extend(attribute.column())
            .child(type_index(address))
            .extend(index),
        EntityKind::Config(table, column) => {
            let mut oid = Oid::from_slice(&BASE)
                .extend(table.table())
                .child(column)
                .child(onu_index(address));
            if let Some(onu) = address.onu_id() {
                oid = oid.child(onu).extend(index);
            }
            oid
        }
        EntityKind::Monitor(attribute) => {
            let mut oid = Oid::from_slice(&BASE_EXT)
                .extend(attribute.column())
                .child(monitor_index(address));
            if let Some(onu) = address.onu_id() {
                oid = oid.child(onu).extend(index);
            }
            oid
        }
        EntityKind::PonCounter(counter) => Oid::from_slice(&BASE_EXT)
            .extend(counter.column())
            .child(monitor_index(address))
            .child(1),
    }
}

/// DBA 模板列 OID；名称为 `None` 时返回遍历前缀。
pub fn dba_profile(column: u32, name: Option<&str>) -> Oid {
    let prefix = Oid::from_slice(&BASE).extend(&[3, 26, 2, 1, column]);
    match name {
        Some(name) => prefix.extend(&encode_string_index(name)),
        None => prefix,
    }
}

pub fn traffic_profile(column: u32, profile_id: Option<u32>) -> Oid {
    let prefix = Oid::from_slice(&BASE).extend(&[3, 26, 1, 1, column]);
    match profile_id {
        Some(id) => prefix.child(id),
        None => prefix,
    }
}

pub fn vlan_profile(column: u32, name: Option<&str>) -> Oid {
    let prefix = Oid::from_slice(&BASE).extend(&[3, 50, 20, 15, 1, column]);
    match name {
        Some(name) => prefix.extend(&encode_string_index(name)),
        None => prefix,
    }
}

pub fn card(column: u32, slot: Option<(u32, u32, u32)>) -> Oid {
    let prefix = Oid::from_slice(&CARD_TABLE).child(column);
    match slot {
        Some((rack, shelf, slot)) => prefix.extend(&[rack, shelf, slot]),
        None => prefix,
    }
}

/// 字符串索引：`len.c1.c2…`。
pub fn encode_string_index(value: &str) -> Vec<u32> {
    let bytes = value.as_bytes();
    let mut arcs = Vec::with_capacity(bytes.len() + 1);
    arcs.push(bytes.len() as u32);
    arcs.extend(bytes.iter().map(|b| u32::from(*b)));
    arcs
}

/// 解析字符串索引；长度不符或含非 ASCII 分量时返回 `None`。
pub fn decode_string_index(arcs: &[u32]) -> Option<String> {
    let (len, rest) = arcs.split_first()?;
    if *len as usize != rest.len() {
        return None;
    }
    rest.iter()
        .map(|arc| u8::try_from(*arc).ok().filter(u8::is_ascii).map(char::from))
        .collect()
}
