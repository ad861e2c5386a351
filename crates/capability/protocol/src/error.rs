//! 协议错误类型定义

use domain::FailureKind;

/// 值解码错误（交互成功但数据不符合预期）。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// 值类型不符
    #[error("expected {expected}, got {actual}")]
    UnexpectedType {
        expected: &'static str,
        actual: &'static str,
    },

    /// 日期时间长度错误
    #[error("date-time must be 8 bytes, got {0}")]
    DateLength(usize),

    /// 日期时间字段越界
    #[error("date-time field {field} out of range: {value}")]
    DateField { field: &'static str, value: u32 },

    /// OID 无法解析
    #[error("invalid oid: {0}")]
    Oid(String),

    /// 协议库报告的解码失败
    #[error("protocol decode: {0}")]
    Protocol(String),
}

/// 传输层错误（由 `SnmpTransport` 实现返回）。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// 未在时限内收到响应
    #[error("no response")]
    Timeout,

    /// 套接字 / 连接错误
    #[error("io error: {0}")]
    Io(String),

    /// 代理返回错误状态
    #[error("agent error status: {0}")]
    Status(String),

    /// 响应报文无法解码
    #[error("decode error: {0}")]
    Decode(String),
}

/// 设备网关错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// 超时未响应或传输失败
    #[error("device unreachable ({oid}): {detail}")]
    Unreachable { oid: String, detail: String },

    /// 代理拒绝（只读对象、取值非法等）
    #[error("device rejected {oid}: {status}")]
    Rejected { oid: String, status: String },

    /// 交互成功但值无法解码
    #[error("malformed value at {oid}: {source}")]
    Malformed {
        oid: String,
        #[source]
        source: DecodeError,
    },
}

impl GatewayError {
    pub fn malformed(oid: impl ToString, source: DecodeError) -> Self {
        GatewayError::Malformed {
            oid: oid.to_string(),
            source,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            GatewayError::Unreachable { .. } => FailureKind::Unreachable,
            GatewayError::Rejected { .. } => FailureKind::Rejected,
            GatewayError::Malformed { .. } => FailureKind::Malformed,
        }
    }

    pub(crate) fn from_transport(oid: impl ToString, err: TransportError) -> Self {
        let oid = oid.to_string();
        match err {
            TransportError::Timeout => GatewayError::Unreachable {
                oid,
                detail: "timeout".to_string(),
            },
            TransportError::Io(detail) => GatewayError::Unreachable { oid, detail },
            TransportError::Status(status) => GatewayError::Rejected { oid, status },
            TransportError::Decode(detail) => GatewayError::Malformed {
                oid,
                source: DecodeError::Protocol(detail),
            },
        }
    }
}
