//! 设备寻址：板卡 / PON 口 / ONU。

use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_BOARD: u32 = 2;
pub const MAX_PON: u32 = 16;
pub const MAX_ONU: u32 = 128;

/// 地址校验错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("board must be 1 or 2, got {0}")]
    Board(u32),
    #[error("pon must be within 1-16, got {0}")]
    Pon(u32),
    #[error("onu must be within 1-128, got {0}")]
    Onu(u32),
    #[error("onu id required")]
    MissingOnu,
}

/// 板卡、PON 口或单个 ONU 的地址。
///
/// 按值比较，排序顺序为 `(board, pon, onu)`；PON 级地址排在该口所有 ONU 之前。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceAddress {
    board: u8,
    pon: u8,
    #[serde(rename = "onu_id", default, skip_serializing_if = "Option::is_none")]
    onu: Option<u8>,
}

impl DeviceAddress {
    /// PON 口地址。
    pub fn pon(board: u32, pon: u32) -> Result<Self, AddressError> {
        if !(1..=MAX_BOARD).contains(&board) {
            return Err(AddressError::Board(board));
        }
        if !(1..=MAX_PON).contains(&pon) {
            return Err(AddressError::Pon(pon));
        }
        Ok(Self {
            board: board as u8,
            pon: pon as u8,
            onu: None,
        })
    }

    /// 单个 ONU 地址。
    pub fn onu(board: u32, pon: u32, onu: u32) -> Result<Self, AddressError> {
        let address = Self::pon(board, pon)?;
        address.with_onu(onu)
    }

    /// 在当前 PON 口下定位某个 ONU。
    pub fn with_onu(self, onu: u32) -> Result<Self, AddressError> {
        if !(1..=MAX_ONU).contains(&onu) {
            return Err(AddressError::Onu(onu));
        }
        Ok(Self {
            onu: Some(onu as u8),
            ..self
        })
    }

    /// 重新校验（反序列化得到的地址需要调用）。
    pub fn validate(&self) -> Result<(), AddressError> {
        match self.onu {
            Some(onu) => Self::onu(self.board.into(), self.pon.into(), onu.into()).map(|_| ()),
            None => Self::pon(self.board.into(), self.pon.into()).map(|_| ()),
        }
    }

    pub fn board(&self) -> u32 {
        self.board.into()
    }

    pub fn pon_id(&self) -> u32 {
        self.pon.into()
    }

    pub fn onu_id(&self) -> Option<u32> {
        self.onu.map(u32::from)
    }

    /// ONU 编号，PON 级地址返回 `MissingOnu`。
    pub fn require_onu(&self) -> Result<u32, AddressError> {
        self.onu_id().ok_or(AddressError::MissingOnu)
    }

    /// 去掉 ONU 部分，得到所属 PON 口地址。
    pub fn pon_scope(&self) -> Self {
        Self { onu: None, ..*self }
    }

    pub fn is_onu(&self) -> bool {
        self.onu.is_some()
    }

    /// 遍历全部板卡与 PON 口（2 × 16）。
    pub fn all_pons() -> impl Iterator<Item = DeviceAddress> {
        (1..=MAX_BOARD).flat_map(|board| {
            (1..=MAX_PON).map(move |pon| Self {
                board: board as u8,
                pon: pon as u8,
                onu: None,
            })
        })
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.onu {
            Some(onu) => write!(f, "gpon-onu_1/{}/{}:{}", self.board, self.pon, onu),
            None => write!(f, "gpon-olt_1/{}/{}", self.board, self.pon),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_parts() {
        assert_eq!(DeviceAddress::pon(0, 1), Err(AddressError::Board(0)));
        assert_eq!(DeviceAddress::pon(3, 1), Err(AddressError::Board(3)));
        assert_eq!(DeviceAddress::pon(1, 17), Err(AddressError::Pon(17)));
        assert_eq!(DeviceAddress::onu(1, 1, 0), Err(AddressError::Onu(0)));
        assert_eq!(DeviceAddress::onu(1, 1, 129), Err(AddressError::Onu(129)));
    }

    #[test]
    fn orders_by_board_pon_onu() {
        let a = DeviceAddress::onu(1, 2, 9).expect("addr");
        let b = DeviceAddress::onu(1, 10, 1).expect("addr");
        let c = DeviceAddress::onu(2, 1, 1).expect("addr");
        let pon = DeviceAddress::pon(1, 2).expect("addr");
        let mut items = vec![c, b, a, pon];
        items.sort();
        assert_eq!(items, vec![pon, a, b, c]);
    }

    #[test]
    fn display_uses_interface_names() {
        let onu = DeviceAddress::onu(1, 3, 12).expect("addr");
        assert_eq!(onu.to_string(), "gpon-onu_1/1/3:12");
        assert_eq!(onu.pon_scope().to_string(), "gpon-olt_1/1/3");
    }

    #[test]
    fn all_pons_covers_both_boards() {
        let pons: Vec<_> = DeviceAddress::all_pons().collect();
        assert_eq!(pons.len(), 32);
        assert_eq!(pons[0], DeviceAddress::pon(1, 1).expect("addr"));
        assert_eq!(pons[31], DeviceAddress::pon(2, 16).expect("addr"));
    }
}
