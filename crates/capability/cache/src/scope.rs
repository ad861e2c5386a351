//! 缓存作用域键。

use domain::DeviceAddress;
use std::fmt;

/// 缓存条目所属作用域；条目只在填充时的键下可见。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKey {
    /// PON 口 ONU 列表
    Pon(DeviceAddress),
    /// 单个 ONU 详情
    Onu(DeviceAddress),
    /// 单个 ONU 业务配置树
    OnuConfig(DeviceAddress),
    /// PON 口空闲 ONU 编号
    EmptyOnuIds(DeviceAddress),
}

impl ScopeKey {
    /// 与 ONU 相关的全部作用域（详情、列表、空闲编号、配置树）。
    pub fn all_for_onu(address: DeviceAddress) -> [ScopeKey; 4] {
        [
            ScopeKey::Onu(address),
            ScopeKey::Pon(address.pon_scope()),
            ScopeKey::EmptyOnuIds(address.pon_scope()),
            ScopeKey::OnuConfig(address),
        ]
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKey::Pon(address) => {
                write!(f, "board_{}_pon_{}", address.board(), address.pon_id())
            }
            ScopeKey::EmptyOnuIds(address) => write!(
                f,
                "board_{}_pon_{}_empty_onu_id",
                address.board(),
                address.pon_id()
            ),
            ScopeKey::Onu(address) => write!(
                f,
                "board_{}_pon_{}_onu_{}",
                address.board(),
                address.pon_id(),
                address.onu_id().unwrap_or(0)
            ),
            ScopeKey::OnuConfig(address) => write!(
                f,
                "board_{}_pon_{}_onu_{}_config",
                address.board(),
                address.pon_id(),
                address.onu_id().unwrap_or(0)
            ),
        }
    }
}
