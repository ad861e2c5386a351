//! ONU 查询与管理。

use crate::error::ControlError;
use crate::read::{read_best_effort, read_optional};
use crate::scope::RequestScope;
use chrono::Utc;
use domain::{
    DeviceAddress, MAX_ONU, OnuDetail, OnuIdRecord, OnuRecord, OnuSerialRecord, OnuStatus,
    PonPortRecord,
};
use olt_cache::{ReadThroughCache, ScopeInvalidator, ScopeKey};
use olt_protocol::codec::{
    decode_datetime, decode_distance, decode_ip, decode_name, decode_offline_reason,
    decode_optical_power, decode_serial, decode_status, decode_text, encode, format_duration,
    EntityKind, OnuAttribute, PonAttribute,
};
use olt_protocol::codec::oid::row_status;
use olt_protocol::{DeviceGateway, Oid, SnmpValue, VarBind};
use olt_storage::CacheStore;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

const MAX_DESCRIPTION_LEN: usize = 64;

/// ONU 服务缓存配置（秒）。
#[derive(Debug, Clone)]
pub struct OnuServiceConfig {
    pub pon_ttl_seconds: u64,
    pub onu_ttl_seconds: u64,
    pub empty_onu_ttl_seconds: u64,
}

impl Default for OnuServiceConfig {
    fn default() -> Self {
        Self {
            pon_ttl_seconds: 600,
            onu_ttl_seconds: 60,
            empty_onu_ttl_seconds: 300,
        }
    }
}

pub struct OnuService {
    gateway: DeviceGateway,
    pon_cache: ReadThroughCache<Vec<OnuRecord>, ControlError>,
    detail_cache: ReadThroughCache<OnuDetail, ControlError>,
    empty_cache: ReadThroughCache<Vec<OnuIdRecord>, ControlError>,
    invalidator: ScopeInvalidator,
}

impl OnuService {
    pub fn new(gateway: DeviceGateway, store: Arc<dyn CacheStore>) -> Self {
        Self::new_with_config(gateway, store, OnuServiceConfig::default())
    }

    pub fn new_with_config(
        gateway: DeviceGateway,
        store: Arc<dyn CacheStore>,
        config: OnuServiceConfig,
    ) -> Self {
        Self {
            gateway,
            pon_cache: ReadThroughCache::new(store.clone(), config.pon_ttl_seconds),
            detail_cache: ReadThroughCache::new(store.clone(), config.onu_ttl_seconds),
            empty_cache: ReadThroughCache::new(store.clone(), config.empty_onu_ttl_seconds),
            invalidator: ScopeInvalidator::new(store),
        }
    }

    pub fn gateway(&self) -> &DeviceGateway {
        &self.gateway
    }

    /// PON 口下已注册 ONU，按编号排序；为空视为不存在。
    pub async fn list_pon(
        &self,
        scope: &RequestScope,
        pon: DeviceAddress,
    ) -> Result<Vec<OnuRecord>, ControlError> {
        let pon = pon.pon_scope();
        let key = ScopeKey::Pon(pon);
        scope
            .run(self.pon_cache.get_or_fetch(&key, || self.fetch_pon(pon)))
            .await
    }

    pub async fn onu_detail(
        &self,
        scope: &RequestScope,
        address: DeviceAddress,
    ) -> Result<OnuDetail, ControlError> {
        address.require_onu()?;
        let key = ScopeKey::Onu(address);
        scope
            .run(self.detail_cache.get_or_fetch(&key, || self.fetch_detail(address)))
            .await
    }

    pub async fn empty_onu_ids(
        &self,
        scope: &RequestScope,
        pon: DeviceAddress,
    ) -> Result<Vec<OnuIdRecord>, ControlError> {
        let pon = pon.pon_scope();
        let key = ScopeKey::EmptyOnuIds(pon);
        scope
            .run(self.empty_cache.get_or_fetch(&key, || self.fetch_empty_ids(pon)))
            .await
    }

    /// 绕过缓存重新计算空闲编号并写回。
    pub async fn update_empty_onu_ids(
        &self,
        scope: &RequestScope,
        pon: DeviceAddress,
    ) -> Result<Vec<OnuIdRecord>, ControlError> {
        let pon = pon.pon_scope();
        let ids = scope.run(self.fetch_empty_ids(pon)).await?;
        if let Err(err) = self.empty_cache.put(&ScopeKey::EmptyOnuIds(pon), &ids).await {
            warn!(target: "olt.control", pon = %pon, error = %err, "empty_onu_ids_cache_write_failed");
        }
        info!(
            target: "olt.control",
            request_id = %scope.request_id(),
            pon = %pon,
            free = ids.len(),
            "empty_onu_ids_refreshed"
        );
        Ok(ids)
    }

    pub async fn onu_serials(
        &self,
        scope: &RequestScope,
        pon: DeviceAddress,
    ) -> Result<Vec<OnuSerialRecord>, ControlError> {
        let pon = pon.pon_scope();
        scope
            .run(async {
                let prefix = encode(EntityKind::Onu(OnuAttribute::SerialNumber), &pon, &[]);
                let rows = self.walk(pon, prefix.clone(), "list_serials").await?;
                let mut records: Vec<_> = rows
                    .iter()
                    .filter_map(|row| {
                        let onu_id = onu_id_of(row, &prefix)?;
                        Some(OnuSerialRecord {
                            board: pon.board(),
                            pon: pon.pon_id(),
                            onu_id,
                            serial_number: decode_serial(&row.value),
                        })
                    })
                    .collect();
                records.sort_by_key(|record| record.onu_id);
                Ok(records)
            })
            .await
    }

    pub async fn pon_info(
        &self,
        scope: &RequestScope,
        pon: DeviceAddress,
    ) -> Result<PonPortRecord, ControlError> {
        let pon = pon.pon_scope();
        scope
            .run(async {
                let admin = self.read_pon(pon, PonAttribute::AdminStatus).await?;
                let distance = self.read_pon(pon, PonAttribute::Distance).await?;
                let oper = self.read_pon(pon, PonAttribute::OperStatus).await?;
                let prefix = encode(EntityKind::Pon(PonAttribute::RegisteredOnus), &pon, &[]);
                let registered = self.walk(pon, prefix, "pon_info").await?;
                let admin_status = match admin.and_then(|v| v.as_integer()) {
                    Some(1) => "enabled",
                    _ => "disabled",
                };
                let oper_status = match oper.and_then(|v| v.as_integer()) {
                    Some(2) => "up",
                    _ => "down",
                };
                Ok(PonPortRecord {
                    board: pon.board(),
                    pon: pon.pon_id(),
                    admin_status: admin_status.to_string(),
                    oper_status: oper_status.to_string(),
                    distance: distance.and_then(|v| v.as_integer()).unwrap_or(0),
                    onu_count: registered.len() as u32,
                })
            })
            .await
    }

    /// 清除 PON 口列表缓存；键不存在同样成功。
    pub async fn clear_pon_cache(&self, pon: DeviceAddress) {
        self.invalidator
            .invalidate(&[ScopeKey::Pon(pon.pon_scope())])
            .await;
    }

    pub async fn reboot(
        &self,
        scope: &RequestScope,
        address: DeviceAddress,
    ) -> Result<(), ControlError> {
        self.write_onu(scope, address, OnuAttribute::Reset, SnmpValue::Integer(1), "reboot")
            .await?;
        self.invalidator.invalidate(&status_scopes(address)).await;
        Ok(())
    }

    pub async fn block(
        &self,
        scope: &RequestScope,
        address: DeviceAddress,
    ) -> Result<(), ControlError> {
        self.write_onu(scope, address, OnuAttribute::AdminState, SnmpValue::Integer(2), "block")
            .await?;
        self.invalidator.invalidate(&status_scopes(address)).await;
        Ok(())
    }

    pub async fn unblock(
        &self,
        scope: &RequestScope,
        address: DeviceAddress,
    ) -> Result<(), ControlError> {
        self.write_onu(scope, address, OnuAttribute::AdminState, SnmpValue::Integer(1), "unblock")
            .await?;
        self.invalidator.invalidate(&status_scopes(address)).await;
        Ok(())
    }

    pub async fn update_description(
        &self,
        scope: &RequestScope,
        address: DeviceAddress,
        description: &str,
    ) -> Result<(), ControlError> {
        let description = validate_description(description)?;
        self.write_onu(
            scope,
            address,
            OnuAttribute::Description,
            SnmpValue::text(&description),
            "update_description",
        )
        .await?;
        self.invalidator.invalidate(&status_scopes(address)).await;
        Ok(())
    }

    /// 删除 ONU 注册；同时失效该 ONU 的全部缓存作用域。
    pub async fn delete(
        &self,
        scope: &RequestScope,
        address: DeviceAddress,
    ) -> Result<(), ControlError> {
        self.write_onu(
            scope,
            address,
            OnuAttribute::RowStatus,
            SnmpValue::Integer(row_status::DESTROY),
            "delete",
        )
        .await?;
        self.invalidator.invalidate(&ScopeKey::all_for_onu(address)).await;
        Ok(())
    }

    async fn write_onu(
        &self,
        scope: &RequestScope,
        address: DeviceAddress,
        attribute: OnuAttribute,
        value: SnmpValue,
        operation: &'static str,
    ) -> Result<(), ControlError> {
        address.require_onu()?;
        let oid = encode(EntityKind::Onu(attribute), &address, &[]);
        let session = scope.exclusive(&self.gateway).await?;
        session
            .set(&oid, value)
            .await
            .map_err(|err| ControlError::device(Some(address), operation, err))?;
        drop(session);
        info!(
            target: "olt.control",
            request_id = %scope.request_id(),
            address = %address,
            operation,
            "onu_action_applied"
        );
        Ok(())
    }

    async fn walk(
        &self,
        address: DeviceAddress,
        prefix: Oid,
        operation: &'static str,
    ) -> Result<Vec<VarBind>, ControlError> {
        self.gateway
            .walk_all(prefix)
            .await
            .map_err(|err| ControlError::device(Some(address), operation, err))
    }

    async fn read_pon(
        &self,
        pon: DeviceAddress,
        attribute: PonAttribute,
    ) -> Result<Option<SnmpValue>, ControlError> {
        let oid = encode(EntityKind::Pon(attribute), &pon, &[]);
        read_optional(&self.gateway, &oid)
            .await
            .map_err(|err| ControlError::device(Some(pon), "pon_info", err))
    }

    async fn attribute(
        &self,
        address: &DeviceAddress,
        attribute: OnuAttribute,
    ) -> Option<SnmpValue> {
        let oid = encode(EntityKind::Onu(attribute), address, &[]);
        read_best_effort(&self.gateway, &oid).await
    }

    async fn registered_ids(&self, pon: DeviceAddress) -> Result<BTreeSet<u32>, ControlError> {
        let prefix = encode(EntityKind::Onu(OnuAttribute::Name), &pon, &[]);
        let rows = self.walk(pon, prefix.clone(), "list_onus").await?;
        Ok(rows.iter().filter_map(|row| onu_id_of(row, &prefix)).collect())
    }

    async fn fetch_pon(&self, pon: DeviceAddress) -> Result<Vec<OnuRecord>, ControlError> {
        let prefix = encode(EntityKind::Onu(OnuAttribute::Name), &pon, &[]);
        let rows = self.walk(pon, prefix.clone(), "list_onus").await?;
        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let Some(onu_id) = onu_id_of(row, &prefix) else {
                continue;
            };
            let address = pon.with_onu(onu_id)?;
            let onu_type = self.attribute(&address, OnuAttribute::Type).await;
            let serial = self.attribute(&address, OnuAttribute::SerialNumber).await;
            let rx_power = self.attribute(&address, OnuAttribute::RxPower).await;
            let status = self.attribute(&address, OnuAttribute::Status).await;
            let record = OnuRecord {
                board: pon.board(),
                pon: pon.pon_id(),
                onu_id,
                name: decode_name(&row.value),
                onu_type: onu_type.map(|v| decode_text(&v)).unwrap_or_default(),
                serial_number: serial.map(|v| decode_serial(&v)).unwrap_or_default(),
                rx_power: rx_power
                    .and_then(|v| decode_optical_power(&v).ok())
                    .unwrap_or_default(),
                status: status.map(|v| decode_status(&v)).unwrap_or(OnuStatus::Unknown),
            };
            if !record.is_blank() {
                records.push(record);
            }
        }
        if records.is_empty() {
            return Err(ControlError::NotFound(format!("no onu registered on {pon}")));
        }
        records.sort_by_key(|record| record.onu_id);
        info!(target: "olt.control", pon = %pon, count = records.len(), "pon_listing_fetched");
        Ok(records)
    }

    async fn fetch_detail(&self, address: DeviceAddress) -> Result<OnuDetail, ControlError> {
        // 名称读取失败说明设备不可用，不能当作未注册。
        let name_oid = encode(EntityKind::Onu(OnuAttribute::Name), &address, &[]);
        let name = read_optional(&self.gateway, &name_oid)
            .await
            .map_err(|err| ControlError::device(Some(address), "onu_detail", err))?;
        let serial = self.attribute(&address, OnuAttribute::SerialNumber).await;
        if name.is_none() && serial.is_none() {
            return Err(ControlError::NotFound(format!("{address} is not registered")));
        }
        let status = self
            .attribute(&address, OnuAttribute::Status)
            .await
            .map(|v| decode_status(&v))
            .unwrap_or(OnuStatus::Unknown);
        let last_online = self
            .attribute(&address, OnuAttribute::LastOnline)
            .await
            .and_then(|v| decode_datetime(&v).ok());
        let last_offline = self
            .attribute(&address, OnuAttribute::LastOffline)
            .await
            .and_then(|v| decode_datetime(&v).ok());
        let uptime = match (status, last_online.and_then(|t| t.to_utc())) {
            (OnuStatus::Online, Some(since)) => {
                let seconds = (Utc::now() - since).num_seconds();
                u64::try_from(seconds).ok().map(format_duration)
            }
            _ => None,
        };
        let last_down_duration = match (
            last_offline.and_then(|t| t.to_utc()),
            last_online.and_then(|t| t.to_utc()),
        ) {
            (Some(down), Some(up)) => u64::try_from((up - down).num_seconds())
                .ok()
                .map(format_duration),
            _ => None,
        };
        let text = |value: Option<SnmpValue>| value.map(|v| decode_text(&v)).unwrap_or_default();
        let power = |value: Option<SnmpValue>| {
            value
                .and_then(|v| decode_optical_power(&v).ok())
                .unwrap_or_default()
        };
        Ok(OnuDetail {
            board: address.board(),
            pon: address.pon_id(),
            onu_id: address.onu_id().unwrap_or(0),
            name: name.map(|v| decode_name(&v)).unwrap_or_default(),
            description: text(self.attribute(&address, OnuAttribute::Description).await),
            onu_type: text(self.attribute(&address, OnuAttribute::Type).await),
            serial_number: serial.map(|v| decode_serial(&v)).unwrap_or_default(),
            rx_power: power(self.attribute(&address, OnuAttribute::RxPower).await),
            tx_power: power(self.attribute(&address, OnuAttribute::TxPower).await),
            status,
            ip_address: self
                .attribute(&address, OnuAttribute::IpAddress)
                .await
                .map(|v| decode_ip(&v))
                .unwrap_or_default(),
            last_online: last_online.map(|t| t.to_string()),
            last_offline: last_offline.map(|t| t.to_string()),
            uptime,
            last_down_duration,
            offline_reason: self
                .attribute(&address, OnuAttribute::OfflineReason)
                .await
                .map(|v| decode_offline_reason(&v)),
            optical_distance: self
                .attribute(&address, OnuAttribute::Distance)
                .await
                .map(|v| decode_distance(&v))
                .unwrap_or_else(|| "Unknown".to_string()),
        })
    }

    async fn fetch_empty_ids(&self, pon: DeviceAddress) -> Result<Vec<OnuIdRecord>, ControlError> {
        let used = self.registered_ids(pon).await?;
        Ok((1..=MAX_ONU)
            .filter(|id| !used.contains(id))
            .map(|onu_id| OnuIdRecord {
                board: pon.board(),
                pon: pon.pon_id(),
                onu_id,
            })
            .collect())
    }
}

/// 描述：非空，最长 64 字符，仅字母、数字、空格与 `-_.`。
pub fn validate_description(description: &str) -> Result<String, ControlError> {
    let description = description.trim();
    if description.is_empty() {
        return Err(ControlError::Validation("description must not be empty".to_string()));
    }
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ControlError::Validation(format!(
            "description longer than {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    if !description
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.'))
    {
        return Err(ControlError::Validation(
            "description contains unsupported characters".to_string(),
        ));
    }
    Ok(description.to_string())
}

fn status_scopes(address: DeviceAddress) -> [ScopeKey; 2] {
    [ScopeKey::Onu(address), ScopeKey::Pon(address.pon_scope())]
}

/// 列前缀后恰好一个分量，且在 ONU 编号范围内。
fn onu_id_of(row: &VarBind, prefix: &Oid) -> Option<u32> {
    match row.oid.suffix_after(prefix)? {
        [onu_id] if (1..=MAX_ONU).contains(onu_id) => Some(*onu_id),
        _ => None,
    }
}
