//! 协议层基础类型：OID 与 SNMP 值。

use crate::error::DecodeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 对象标识符。
///
/// 按分量逐一比较，与 SNMP 的字典序一致（GET-NEXT 遍历顺序）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Oid(Vec<u32>);

impl Oid {
    pub fn new(arcs: Vec<u32>) -> Self {
        Self(arcs)
    }

    pub fn from_slice(arcs: &[u32]) -> Self {
        Self(arcs.to_vec())
    }

    /// 解析点分格式，允许前导 `.`。
    pub fn parse(value: &str) -> Result<Self, DecodeError> {
        let trimmed = value.trim().trim_start_matches('.');
        if trimmed.is_empty() {
            return Err(DecodeError::Oid(value.to_string()));
        }
        trimmed
            .split('.')
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|_| DecodeError::Oid(value.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn arcs(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, arc: u32) -> Self {
        let mut arcs = self.0.clone();
        arcs.push(arc);
        Self(arcs)
    }

    pub fn extend(&self, tail: &[u32]) -> Self {
        let mut arcs = self.0.clone();
        arcs.extend_from_slice(tail);
        Self(arcs)
    }

    pub fn starts_with(&self, prefix: &Oid) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// 前缀之后的分量；不在前缀下时返回 `None`。
    pub fn suffix_after(&self, prefix: &Oid) -> Option<&[u32]> {
        if self.starts_with(prefix) {
            Some(&self.0[prefix.0.len()..])
        } else {
            None
        }
    }

    pub fn last_arc(&self) -> Option<u32> {
        self.0.last().copied()
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arc in &self.0 {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{arc}")?;
            first = false;
        }
        Ok(())
    }
}

/// SNMP 值的显式标签变体。
///
/// 只在传输边界构造一次，之后由 codec 解码为领域类型。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnmpValue {
    Integer(i64),
    Counter32(u32),
    Counter64(u64),
    Gauge32(u32),
    TimeTicks(u32),
    OctetString(Vec<u8>),
    ObjectId(Oid),
    IpAddress([u8; 4]),
    Null,
    NoSuchObject,
    NoSuchInstance,
    EndOfMibView,
}

impl SnmpValue {
    pub fn text(value: &str) -> Self {
        SnmpValue::OctetString(value.as_bytes().to_vec())
    }

    /// 整数类值（Integer / Counter / Gauge / TimeTicks）。
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SnmpValue::Integer(v) => Some(*v),
            SnmpValue::Counter32(v) | SnmpValue::Gauge32(v) | SnmpValue::TimeTicks(v) => {
                Some(i64::from(*v))
            }
            SnmpValue::Counter64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            SnmpValue::OctetString(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// 代理表示对象不存在（noSuchObject / noSuchInstance / endOfMibView）。
    pub fn is_absent(&self) -> bool {
        matches!(
            self,
            SnmpValue::NoSuchObject | SnmpValue::NoSuchInstance | SnmpValue::EndOfMibView
        )
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            SnmpValue::Integer(_) => "integer",
            SnmpValue::Counter32(_) => "counter32",
            SnmpValue::Counter64(_) => "counter64",
            SnmpValue::Gauge32(_) => "gauge32",
            SnmpValue::TimeTicks(_) => "timeticks",
            SnmpValue::OctetString(_) => "octet-string",
            SnmpValue::ObjectId(_) => "object-identifier",
            SnmpValue::IpAddress(_) => "ip-address",
            SnmpValue::Null => "null",
            SnmpValue::NoSuchObject => "no-such-object",
            SnmpValue::NoSuchInstance => "no-such-instance",
            SnmpValue::EndOfMibView => "end-of-mib-view",
        }
    }
}

/// 一次遍历返回的 (OID, 值)。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBind {
    pub oid: Oid,
    pub value: SnmpValue,
}

impl VarBind {
    pub fn new(oid: Oid, value: SnmpValue) -> Self {
        Self { oid, value }
    }
}
