//! SNMP 传输接缝。
//!
//! `SnmpTransport` 只负责单次交互；超时、串行化与错误分类由网关处理。
//! 生产实现基于 async-snmp 的 v2c UDP 客户端，测试使用内存实现。

use crate::error::TransportError;
use crate::types::{Oid, SnmpValue, VarBind};
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

#[async_trait]
pub trait SnmpTransport: Send + Sync {
    async fn get(&self, oid: &Oid) -> Result<SnmpValue, TransportError>;

    /// 返回字典序下一个对象；视图结束时值为 `EndOfMibView`。
    async fn get_next(&self, oid: &Oid) -> Result<VarBind, TransportError>;

    async fn set(&self, oid: &Oid, value: SnmpValue) -> Result<(), TransportError>;
}

/// async-snmp v2c UDP 传输。
pub struct UdpSnmpTransport {
    client: async_snmp::UdpClient,
    endpoint: String,
}

impl UdpSnmpTransport {
    pub async fn connect(
        host: &str,
        port: u16,
        community: &str,
        timeout: Duration,
        retries: u32,
    ) -> Result<Self, TransportError> {
        let endpoint = format!("{host}:{port}");
        let client = async_snmp::Client::builder(
            endpoint.clone(),
            async_snmp::Auth::v2c(community.to_string()),
        )
        .timeout(timeout)
        .retry(async_snmp::Retry::fixed(retries, Duration::ZERO))
        .connect()
        .await
        .map_err(map_error)?;
        info!(target: "olt.snmp", endpoint = %endpoint, "snmp_transport_connected");
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SnmpTransport for UdpSnmpTransport {
    async fn get(&self, oid: &Oid) -> Result<SnmpValue, TransportError> {
        let varbind = self.client.get(&to_wire_oid(oid)).await.map_err(map_error)?;
        Ok(from_wire_value(varbind.value))
    }

    async fn get_next(&self, oid: &Oid) -> Result<VarBind, TransportError> {
        let varbind = self
            .client
            .get_next(&to_wire_oid(oid))
            .await
            .map_err(map_error)?;
        Ok(VarBind::new(
            Oid::from_slice(varbind.oid.arcs()),
            from_wire_value(varbind.value),
        ))
    }

    async fn set(&self, oid: &Oid, value: SnmpValue) -> Result<(), TransportError> {
        let value = to_wire_value(value)?;
        self.client
            .set(&to_wire_oid(oid), value)
            .await
            .map(|_| ())
            .map_err(map_error)
    }
}

fn to_wire_oid(oid: &Oid) -> async_snmp::Oid {
    async_snmp::Oid::from_slice(oid.arcs())
}

fn from_wire_value(value: async_snmp::Value) -> SnmpValue {
    use async_snmp::Value;
    match value {
        Value::Integer(v) => SnmpValue::Integer(i64::from(v)),
        Value::OctetString(bytes) => SnmpValue::OctetString(bytes.to_vec()),
        Value::Null => SnmpValue::Null,
        Value::ObjectIdentifier(oid) => SnmpValue::ObjectId(Oid::from_slice(oid.arcs())),
        Value::IpAddress(octets) => SnmpValue::IpAddress(octets),
        Value::Counter32(v) => SnmpValue::Counter32(v),
        Value::Gauge32(v) => SnmpValue::Gauge32(v),
        Value::TimeTicks(v) => SnmpValue::TimeTicks(v),
        Value::Counter64(v) => SnmpValue::Counter64(v),
        Value::NoSuchObject => SnmpValue::NoSuchObject,
        Value::NoSuchInstance => SnmpValue::NoSuchInstance,
        Value::EndOfMibView => SnmpValue::EndOfMibView,
        other => SnmpValue::OctetString(other.to_string().into_bytes()),
    }
}

fn to_wire_value(value: SnmpValue) -> Result<async_snmp::Value, TransportError> {
    use async_snmp::Value;
    let wire = match value {
        SnmpValue::Integer(v) => Value::Integer(
            i32::try_from(v).map_err(|_| TransportError::Decode(format!("integer {v} overflows")))?,
        ),
        SnmpValue::OctetString(bytes) => Value::OctetString(bytes::Bytes::from(bytes)),
        SnmpValue::Gauge32(v) => Value::Gauge32(v),
        SnmpValue::Counter32(v) => Value::Counter32(v),
        SnmpValue::TimeTicks(v) => Value::TimeTicks(v),
        SnmpValue::IpAddress(octets) => Value::IpAddress(octets),
        SnmpValue::Null => Value::Null,
        other => {
            return Err(TransportError::Decode(format!(
                "{} cannot be written",
                other.type_name()
            )));
        }
    };
    Ok(wire)
}

fn map_error(err: Box<async_snmp::Error>) -> TransportError {
    match &*err {
        async_snmp::Error::Timeout { .. } => TransportError::Timeout,
        async_snmp::Error::Snmp { status, .. } => TransportError::Status(format!("{status:?}")),
        _ => TransportError::Io(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_transport_errors() {
        let target = "192.0.2.1:161".parse().expect("addr");
        let timeout = async_snmp::Error::Timeout {
            target,
            elapsed: Duration::from_secs(2),
            retries: 1,
        }
        .boxed();
        assert!(matches!(map_error(timeout), TransportError::Timeout));

        let status = async_snmp::Error::Snmp {
            target,
            status: async_snmp::ErrorStatus::NoAccess,
            index: 1,
            oid: None,
        }
        .boxed();
        assert!(matches!(map_error(status), TransportError::Status(s) if s == "NoAccess"));

        let config = async_snmp::Error::Config("bad community".into()).boxed();
        assert!(matches!(map_error(config), TransportError::Io(_)));
    }

    #[test]
    fn wide_integers_are_not_written() {
        assert!(to_wire_value(SnmpValue::Integer(1 << 40)).is_err());
        assert!(matches!(
            to_wire_value(SnmpValue::Integer(6)),
            Ok(async_snmp::Value::Integer(6))
        ));
    }
}
