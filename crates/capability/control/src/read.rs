use olt_protocol::codec::oid::row_status;
use olt_protocol::{DeviceGateway, GatewayError, Oid, SnmpValue};
use tracing::debug;

/// 读取单个对象；对象不存在返回 `None`。
pub(crate) async fn read_optional(
    gateway: &DeviceGateway,
    oid: &Oid,
) -> Result<Option<SnmpValue>, GatewayError> {
    let value = gateway.get(oid).await?;
    Ok((!value.is_absent()).then_some(value))
}

/// 逐属性尽力读取：失败只记录日志。
pub(crate) async fn read_best_effort(gateway: &DeviceGateway, oid: &Oid) -> Option<SnmpValue> {
    match read_optional(gateway, oid).await {
        Ok(value) => value,
        Err(err) => {
            debug!(target: "olt.control", oid = %oid, error = %err, "attribute_read_skipped");
            None
        }
    }
}

/// RowStatus 行存在且未被销毁。
pub(crate) fn row_present(status: &SnmpValue) -> bool {
    !status.is_absent() && *status != SnmpValue::Integer(row_status::DESTROY)
}
