//! ONU 业务配置树：VLAN、T-CONT、GEM 端口、业务端口，以及 DBA 模板。

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 配置项字段校验错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {reason}")]
pub struct InvalidConfig {
    pub field: &'static str,
    pub reason: String,
}

fn invalid(field: &'static str, reason: impl Into<String>) -> InvalidConfig {
    InvalidConfig {
        field,
        reason: reason.into(),
    }
}

fn check_vlan(field: &'static str, vlan: u32) -> Result<(), InvalidConfig> {
    if !(1..=4094).contains(&vlan) {
        return Err(invalid(field, format!("{vlan} outside 1-4094")));
    }
    Ok(())
}

fn check_name(field: &'static str, name: &str) -> Result<(), InvalidConfig> {
    if name.is_empty() || name.len() > 32 {
        return Err(invalid(field, "length must be 1-32"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(invalid(field, "only ascii letters, digits, '-' and '_' allowed"));
    }
    Ok(())
}

/// ONU 侧 VLAN 处理模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VlanMode {
    Tag,
    Untag,
    Translate,
}

impl VlanMode {
    pub fn code(&self) -> i64 {
        match self {
            VlanMode::Tag => 1,
            VlanMode::Untag => 2,
            VlanMode::Translate => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(VlanMode::Tag),
            2 => Some(VlanMode::Untag),
            3 => Some(VlanMode::Translate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanConfig {
    /// CVLAN，同时作为表索引。
    pub user_vlan: u32,
    /// SVLAN。
    pub service_vlan: u32,
    pub mode: VlanMode,
    #[serde(default)]
    pub priority: u32,
}

impl VlanConfig {
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        check_vlan("user_vlan", self.user_vlan)?;
        check_vlan("service_vlan", self.service_vlan)?;
        if self.priority > 7 {
            return Err(invalid("priority", "must be 0-7"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcontConfig {
    pub tcont_id: u32,
    #[serde(default)]
    pub name: String,
    /// 引用的 DBA 模板名称。
    pub profile_name: String,
}

impl TcontConfig {
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if !(1..=8).contains(&self.tcont_id) {
            return Err(invalid("tcont_id", "must be 1-8"));
        }
        if !self.name.is_empty() {
            check_name("name", &self.name)?;
        }
        check_name("profile_name", &self.profile_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GemPortConfig {
    pub gemport_id: u32,
    #[serde(default)]
    pub name: String,
    /// 承载该 GEM 端口的 T-CONT。
    pub tcont_id: u32,
}

impl GemPortConfig {
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if !(1..=32).contains(&self.gemport_id) {
            return Err(invalid("gemport_id", "must be 1-32"));
        }
        if !(1..=8).contains(&self.tcont_id) {
            return Err(invalid("tcont_id", "must be 1-8"));
        }
        if !self.name.is_empty() {
            check_name("name", &self.name)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePortConfig {
    pub port_id: u32,
    #[serde(default = "default_vport")]
    pub vport: u32,
    pub user_vlan: u32,
    pub service_vlan: u32,
    pub gemport_id: u32,
}

fn default_vport() -> u32 {
    1
}

impl ServicePortConfig {
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if !(1..=128).contains(&self.port_id) {
            return Err(invalid("port_id", "must be 1-128"));
        }
        if !(1..=8).contains(&self.vport) {
            return Err(invalid("vport", "must be 1-8"));
        }
        check_vlan("user_vlan", self.user_vlan)?;
        check_vlan("service_vlan", self.service_vlan)?;
        if !(1..=32).contains(&self.gemport_id) {
            return Err(invalid("gemport_id", "must be 1-32"));
        }
        Ok(())
    }
}

/// DBA 模板。
///
/// 类型 1 固定带宽，2 保证带宽，3 保证 + 最大，4 最大，5 固定 + 保证 + 最大（kbps）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbaProfile {
    pub name: String,
    pub profile_type: u32,
    #[serde(default)]
    pub fixed_kbps: u32,
    #[serde(default)]
    pub assured_kbps: u32,
    #[serde(default)]
    pub max_kbps: u32,
}

impl DbaProfile {
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        check_name("name", &self.name)?;
        if !(1..=5).contains(&self.profile_type) {
            return Err(invalid("profile_type", "must be 1-5"));
        }
        let uses_fixed = matches!(self.profile_type, 1 | 5);
        let uses_assured = matches!(self.profile_type, 2 | 3 | 5);
        let uses_max = matches!(self.profile_type, 3 | 4 | 5);
        if uses_fixed && self.fixed_kbps == 0 {
            return Err(invalid("fixed_kbps", "required for this profile type"));
        }
        if uses_assured && self.assured_kbps == 0 {
            return Err(invalid("assured_kbps", "required for this profile type"));
        }
        if uses_max {
            if self.max_kbps < 64 {
                return Err(invalid("max_kbps", "must be at least 64"));
            }
            let floor = self.fixed_kbps.saturating_add(self.assured_kbps);
            if self.max_kbps < floor {
                return Err(invalid("max_kbps", "must cover fixed and assured bandwidth"));
            }
        }
        Ok(())
    }
}

/// 单个 ONU 的完整业务配置。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnuConfigTree {
    #[serde(default)]
    pub vlans: Vec<VlanConfig>,
    #[serde(default)]
    pub tconts: Vec<TcontConfig>,
    #[serde(default)]
    pub gemports: Vec<GemPortConfig>,
    #[serde(default)]
    pub service_ports: Vec<ServicePortConfig>,
}

impl OnuConfigTree {
    pub fn is_empty(&self) -> bool {
        self.vlans.is_empty()
            && self.tconts.is_empty()
            && self.gemports.is_empty()
            && self.service_ports.is_empty()
    }

    pub fn element_count(&self) -> usize {
        self.vlans.len() + self.tconts.len() + self.gemports.len() + self.service_ports.len()
    }

    /// 第一个指向树外元素的引用：GEM 端口 → T-CONT，业务端口 → GEM 端口。
    pub fn dangling_reference(&self) -> Option<DanglingReference> {
        let tconts: HashSet<u32> = self.tconts.iter().map(|t| t.tcont_id).collect();
        let gemports: HashSet<u32> = self.gemports.iter().map(|g| g.gemport_id).collect();
        self.gemports
            .iter()
            .find(|gemport| !tconts.contains(&gemport.tcont_id))
            .map(|gemport| DanglingReference::GemPort {
                gemport_id: gemport.gemport_id,
                tcont_id: gemport.tcont_id,
            })
            .or_else(|| {
                self.service_ports
                    .iter()
                    .find(|port| !gemports.contains(&port.gemport_id))
                    .map(|port| DanglingReference::ServicePort {
                        port_id: port.port_id,
                        gemport_id: port.gemport_id,
                    })
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DanglingReference {
    #[error("gemport {gemport_id} references missing tcont {tcont_id}")]
    GemPort { gemport_id: u32, tcont_id: u32 },
    #[error("service port {port_id} references missing gemport {gemport_id}")]
    ServicePort { port_id: u32, gemport_id: u32 },
}

/// 配置树中的条目类别，按依赖顺序排列。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigItem {
    Vlan,
    Tcont,
    #[serde(rename = "gemport")]
    GemPort,
    ServicePort,
}

impl ConfigItem {
    pub const ALL: [ConfigItem; 4] = [
        ConfigItem::Vlan,
        ConfigItem::Tcont,
        ConfigItem::GemPort,
        ConfigItem::ServicePort,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigItem::Vlan => "vlan",
            ConfigItem::Tcont => "tcont",
            ConfigItem::GemPort => "gemport",
            ConfigItem::ServicePort => "service_port",
        }
    }
}
