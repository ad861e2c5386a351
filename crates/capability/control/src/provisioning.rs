//! ONU 业务配置：VLAN、T-CONT、GEM 端口与业务端口。
//!
//! 所有写入在设备独占会话中完成，按行幂等：
//! 行不存在时先 createAndGo，再逐列写入。

use crate::error::ControlError;
use crate::read::{read_optional, row_present};
use crate::scope::RequestScope;
use domain::{
    ConfigItem, DanglingReference, DeviceAddress, FailureKind, GemPortConfig, InvalidConfig, ItemError,
    OnuConfigTree, ServicePortConfig, TcontConfig, VlanConfig, VlanMode,
};
use olt_cache::{ReadThroughCache, ScopeInvalidator, ScopeKey};
use olt_protocol::codec::oid::{
    gemport_column, row_status, service_port_column, tcont_column, vlan_column,
};
use olt_protocol::codec::{
    decode_integer, decode_serial, decode_text, encode, ConfigTable, EntityKind, OnuAttribute,
};
use olt_protocol::{
    DecodeError, DeviceGateway, GatewayError, GatewayReadSession, GatewaySession, SnmpValue,
};
use olt_storage::CacheStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ProvisioningServiceConfig {
    pub config_ttl_seconds: u64,
}

impl Default for ProvisioningServiceConfig {
    fn default() -> Self {
        Self {
            config_ttl_seconds: 300,
        }
    }
}

/// 快照所需的 ONU 身份信息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnuIdentity {
    pub name: String,
    pub serial_number: String,
    pub onu_type: String,
    pub admin_state: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementStatus {
    Applied,
    /// 演练模式下计划写入。
    Planned,
    Failed,
    /// 依赖的 T-CONT / GEM 端口失败。
    Skipped,
    Cancelled,
}

/// 配置树中单个元素的应用结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementOutcome {
    pub item: ConfigItem,
    pub element_id: u32,
    pub status: ElementStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ItemError>,
}

pub struct ProvisioningService {
    gateway: DeviceGateway,
    config_cache: ReadThroughCache<OnuConfigTree, ControlError>,
    invalidator: ScopeInvalidator,
}

impl ProvisioningService {
    pub fn new(gateway: DeviceGateway, store: Arc<dyn CacheStore>) -> Self {
        Self::new_with_config(gateway, store, ProvisioningServiceConfig::default())
    }

    pub fn new_with_config(
        gateway: DeviceGateway,
        store: Arc<dyn CacheStore>,
        config: ProvisioningServiceConfig,
    ) -> Self {
        Self {
            gateway,
            config_cache: ReadThroughCache::new(store.clone(), config.config_ttl_seconds),
            invalidator: ScopeInvalidator::new(store),
        }
    }

    /// 读取配置树；任一子读取失败即整体失败。
    pub async fn read_config(
        &self,
        scope: &RequestScope,
        address: DeviceAddress,
    ) -> Result<OnuConfigTree, ControlError> {
        address.require_onu()?;
        let key = ScopeKey::OnuConfig(address);
        scope
            .run(self.config_cache.get_or_fetch(&key, || async move {
                self.fetch_config(address)
                    .await
                    .map_err(|err| ControlError::device(Some(address), "read_config", err))
            }))
            .await
    }

    /// 名称不存在视为 ONU 未注册。
    pub async fn read_identity(
        &self,
        scope: &RequestScope,
        address: DeviceAddress,
    ) -> Result<OnuIdentity, ControlError> {
        address.require_onu()?;
        scope
            .run(async {
                let read = |attribute| {
                    let oid = encode(EntityKind::Onu(attribute), &address, &[]);
                    async move {
                        read_optional(&self.gateway, &oid)
                            .await
                            .map_err(|err| ControlError::device(Some(address), "read_identity", err))
                    }
                };
                let name = read(OnuAttribute::Name)
                    .await?
                    .ok_or_else(|| ControlError::NotFound(format!("{address} is not registered")))?;
                let serial = read(OnuAttribute::SerialNumber).await?;
                let onu_type = read(OnuAttribute::Type).await?;
                let admin = read(OnuAttribute::AdminState).await?;
                Ok(OnuIdentity {
                    name: decode_text(&name),
                    serial_number: serial.map(|v| decode_serial(&v)).unwrap_or_default(),
                    onu_type: onu_type.map(|v| decode_text(&v)).unwrap_or_default(),
                    admin_state: match admin.and_then(|v| v.as_integer()) {
                        Some(1) => "enabled",
                        Some(2) => "disabled",
                        _ => "unknown",
                    }
                    .to_string(),
                })
            })
            .await
    }

    pub async fn set_vlan(
        &self,
        scope: &RequestScope,
        address: DeviceAddress,
        vlan: VlanConfig,
    ) -> Result<VlanConfig, ControlError> {
        self.write(scope, address, Element::Vlan(&vlan)).await?;
        Ok(vlan)
    }

    pub async fn remove_vlan(
        &self,
        scope: &RequestScope,
        address: DeviceAddress,
        user_vlan: u32,
    ) -> Result<(), ControlError> {
        self.remove(scope, address, ConfigItem::Vlan, user_vlan).await
    }

    pub async fn set_tcont(
        &self,
        scope: &RequestScope,
        address: DeviceAddress,
        tcont: TcontConfig,
    ) -> Result<TcontConfig, ControlError> {
        self.write(scope, address, Element::Tcont(&tcont)).await?;
        Ok(tcont)
    }

    pub async fn remove_tcont(
        &self,
        scope: &RequestScope,
        address: DeviceAddress,
        tcont_id: u32,
    ) -> Result<(), ControlError> {
        self.remove(scope, address, ConfigItem::Tcont, tcont_id).await
    }

    pub async fn set_gemport(
        &self,
        scope: &RequestScope,
        address: DeviceAddress,
        gemport: GemPortConfig,
    ) -> Result<GemPortConfig, ControlError> {
        self.write(scope, address, Element::GemPort(&gemport)).await?;
        Ok(gemport)
    }

    pub async fn remove_gemport(
        &self,
        scope: &RequestScope,
        address: DeviceAddress,
        gemport_id: u32,
    ) -> Result<(), ControlError> {
        self.remove(scope, address, ConfigItem::GemPort, gemport_id).await
    }

    pub async fn set_service_port(
        &self,
        scope: &RequestScope,
        address: DeviceAddress,
        port: ServicePortConfig,
    ) -> Result<ServicePortConfig, ControlError> {
        self.write(scope, address, Element::ServicePort(&port)).await?;
        Ok(port)
    }

    pub async fn remove_service_port(
        &self,
        scope: &RequestScope,
        address: DeviceAddress,
        port_id: u32,
    ) -> Result<(), ControlError> {
        self.remove(scope, address, ConfigItem::ServicePort, port_id).await
    }

    /// 按 VLAN → T-CONT → GEM → 业务端口顺序应用配置树。
    ///
    /// `items` 为空表示全部类别。依赖失败 T-CONT 的 GEM 端口、依赖失败 GEM 端口的业务端口
    /// 标记为 `Skipped`；取消或超时后剩余元素标记为 `Cancelled`。非演练模式结束后失效
    /// 该 ONU 的全部缓存作用域。
    pub async fn apply_tree(
        &self,
        scope: &RequestScope,
        address: DeviceAddress,
        tree: &OnuConfigTree,
        items: &[ConfigItem],
        dry_run: bool,
    ) -> Result<Vec<ElementOutcome>, ControlError> {
        address.require_onu()?;
        let elements: Vec<Element<'_>> = Element::ordered(tree)
            .into_iter()
            .filter(|element| items.is_empty() || items.contains(&element.item()))
            .collect();
        let session = if dry_run {
            None
        } else {
            match scope.exclusive(&self.gateway).await {
                Ok(session) => Some(session),
                Err(err) => {
                    let error = err.to_item_error();
                    return Ok(elements
                        .iter()
                        .map(|element| ElementOutcome {
                            item: element.item(),
                            element_id: element.id(),
                            status: ElementStatus::Cancelled,
                            error: Some(error.clone()),
                        })
                        .collect());
                }
            }
        };
        let mut failed_tconts: HashMap<u32, FailureKind> = HashMap::new();
        let mut failed_gemports: HashMap<u32, FailureKind> = HashMap::new();
        let mut outcomes = Vec::with_capacity(elements.len());
        for element in &elements {
            let outcome = |status, error| ElementOutcome {
                item: element.item(),
                element_id: element.id(),
                status,
                error,
            };
            if let Err(err) = scope.check() {
                outcomes.push(outcome(ElementStatus::Cancelled, Some(err.to_item_error())));
                continue;
            }
            let parent = element.failed_parent(&failed_tconts, &failed_gemports);
            if let Some((parent, kind)) = parent {
                element.mark_failed(kind, &mut failed_tconts, &mut failed_gemports);
                let error = ItemError::new(kind, format!("depends on failed {parent}"));
                outcomes.push(outcome(ElementStatus::Skipped, Some(error)));
                continue;
            }
            if let Err(err) = element.validate() {
                let err = ControlError::from(err);
                element.mark_failed(err.kind(), &mut failed_tconts, &mut failed_gemports);
                outcomes.push(outcome(ElementStatus::Failed, Some(err.to_item_error())));
                continue;
            }
            let Some(session) = session.as_ref() else {
                outcomes.push(outcome(ElementStatus::Planned, None));
                continue;
            };
            match apply_row(session, &address, element).await {
                Ok(()) => outcomes.push(outcome(ElementStatus::Applied, None)),
                Err(err) => {
                    let err = ControlError::device(Some(address), "apply_config", err);
                    warn!(
                        target: "olt.control",
                        request_id = %scope.request_id(),
                        address = %address,
                        item = element.item().as_str(),
                        element_id = element.id(),
                        error = %err,
                        "config_element_failed"
                    );
                    element.mark_failed(err.kind(), &mut failed_tconts, &mut failed_gemports);
                    outcomes.push(outcome(ElementStatus::Failed, Some(err.to_item_error())));
                }
            }
        }
        drop(session);
        if !dry_run {
            self.invalidator
                .invalidate(&ScopeKey::all_for_onu(address))
                .await;
        }
        info!(
            target: "olt.control",
            request_id = %scope.request_id(),
            address = %address,
            elements = outcomes.len(),
            dry_run,
            "config_tree_applied"
        );
        Ok(outcomes)
    }

    async fn write(
        &self,
        scope: &RequestScope,
        address: DeviceAddress,
        element: Element<'_>,
    ) -> Result<(), ControlError> {
        address.require_onu()?;
        element.validate()?;
        {
            let session = scope.exclusive(&self.gateway).await?;
            apply_row(&session, &address, &element)
                .await
                .map_err(|err| ControlError::device(Some(address), "apply_config", err))?;
        }
        self.invalidator
            .invalidate(&[ScopeKey::OnuConfig(address)])
            .await;
        info!(
            target: "olt.control",
            request_id = %scope.request_id(),
            address = %address,
            item = element.item().as_str(),
            element_id = element.id(),
            "config_element_applied"
        );
        Ok(())
    }

    async fn remove(
        &self,
        scope: &RequestScope,
        address: DeviceAddress,
        item: ConfigItem,
        element_id: u32,
    ) -> Result<(), ControlError> {
        address.require_onu()?;
        let status_oid = encode(
            EntityKind::Config(table_of(item), ConfigTable::ROW_STATUS),
            &address,
            &[element_id],
        );
        {
            let session = scope.exclusive(&self.gateway).await?;
            let device = |err| ControlError::device(Some(address), "remove_config", err);
            let status = session.get(&status_oid).await.map_err(device)?;
            if !row_present(&status) {
                return Err(ControlError::NotFound(format!(
                    "{} {element_id} on {address}",
                    item.as_str()
                )));
            }
            session
                .set(&status_oid, SnmpValue::Integer(row_status::DESTROY))
                .await
                .map_err(device)?;
        }
        self.invalidator
            .invalidate(&[ScopeKey::OnuConfig(address)])
            .await;
        info!(
            target: "olt.control",
            request_id = %scope.request_id(),
            address = %address,
            item = item.as_str(),
            element_id,
            "config_element_removed"
        );
        Ok(())
    }

    /// 在共享读会话中读取整棵树，采集期间没有写入穿插；树内引用必须闭合。
    async fn fetch_config(&self, address: DeviceAddress) -> Result<OnuConfigTree, GatewayError> {
        let session = self.gateway.read_session().await;
        let tree = read_tree(&session, &address).await?;
        drop(session);
        match tree.dangling_reference() {
            None => Ok(tree),
            Some(reference) => {
                let oid = match reference {
                    DanglingReference::GemPort { gemport_id, .. } => encode(
                        EntityKind::Config(ConfigTable::GemPort, gemport_column::TCONT),
                        &address,
                        &[gemport_id],
                    ),
                    DanglingReference::ServicePort { port_id, .. } => encode(
                        EntityKind::Config(ConfigTable::ServicePort, service_port_column::GEMPORT),
                        &address,
                        &[port_id],
                    ),
                };
                Err(GatewayError::malformed(
                    &oid,
                    DecodeError::Protocol(reference.to_string()),
                ))
            }
        }
    }
}

async fn read_tree(
    session: &GatewayReadSession,
    address: &DeviceAddress,
) -> Result<OnuConfigTree, GatewayError> {
    let mut tree = OnuConfigTree::default();
    for user_vlan in present_rows(session, address, ConfigTable::Vlan).await? {
        let column = |c| (ConfigTable::Vlan, c, user_vlan);
        let mode_code = integer(session, address, column(vlan_column::MODE)).await?;
        let mode = VlanMode::from_code(mode_code).ok_or_else(|| {
            let mode_oid = encode(
                EntityKind::Config(ConfigTable::Vlan, vlan_column::MODE),
                address,
                &[user_vlan],
            );
            GatewayError::malformed(
                &mode_oid,
                DecodeError::Protocol(format!("unknown vlan mode {mode_code}")),
            )
        })?;
        tree.vlans.push(VlanConfig {
            user_vlan,
            service_vlan: unsigned(session, address, column(vlan_column::SERVICE_VLAN)).await?,
            mode,
            priority: unsigned(session, address, column(vlan_column::PRIORITY)).await?,
        });
    }
    for tcont_id in present_rows(session, address, ConfigTable::Tcont).await? {
        let column = |c| (ConfigTable::Tcont, c, tcont_id);
        tree.tconts.push(TcontConfig {
            tcont_id,
            name: text(session, address, column(tcont_column::NAME)).await?,
            profile_name: text(session, address, column(tcont_column::PROFILE)).await?,
        });
    }
    for gemport_id in present_rows(session, address, ConfigTable::GemPort).await? {
        let column = |c| (ConfigTable::GemPort, c, gemport_id);
        tree.gemports.push(GemPortConfig {
            gemport_id,
            name: text(session, address, column(gemport_column::NAME)).await?,
            tcont_id: unsigned(session, address, column(gemport_column::TCONT)).await?,
        });
    }
    for port_id in present_rows(session, address, ConfigTable::ServicePort).await? {
        let column = |c| (ConfigTable::ServicePort, c, port_id);
        tree.service_ports.push(ServicePortConfig {
            port_id,
            vport: unsigned(session, address, column(service_port_column::VPORT)).await?,
            user_vlan: unsigned(session, address, column(service_port_column::USER_VLAN)).await?,
            service_vlan: unsigned(session, address, column(service_port_column::SERVICE_VLAN))
                .await?,
            gemport_id: unsigned(session, address, column(service_port_column::GEMPORT)).await?,
        });
    }
    Ok(tree)
}

/// 遍历 RowStatus 列，返回未销毁行的子索引。
async fn present_rows(
    session: &GatewayReadSession,
    address: &DeviceAddress,
    table: ConfigTable,
) -> Result<Vec<u32>, GatewayError> {
    let prefix = encode(EntityKind::Config(table, ConfigTable::ROW_STATUS), address, &[]);
    let rows = session.walk_all(prefix.clone()).await?;
    Ok(rows
        .iter()
        .filter(|row| row_present(&row.value))
        .filter_map(|row| match row.oid.suffix_after(&prefix)? {
            [index] => Some(*index),
            _ => None,
        })
        .collect())
}

async fn integer(
    session: &GatewayReadSession,
    address: &DeviceAddress,
    (table, column, index): (ConfigTable, u32, u32),
) -> Result<i64, GatewayError> {
    let oid = encode(EntityKind::Config(table, column), address, &[index]);
    let value = session.get(&oid).await?;
    decode_integer(&value).map_err(|err| GatewayError::malformed(&oid, err))
}

async fn unsigned(
    session: &GatewayReadSession,
    address: &DeviceAddress,
    field: (ConfigTable, u32, u32),
) -> Result<u32, GatewayError> {
    let (table, column, index) = field;
    let value = integer(session, address, field).await?;
    u32::try_from(value).map_err(|_| {
        let oid = encode(EntityKind::Config(table, column), address, &[index]);
        GatewayError::malformed(
            &oid,
            DecodeError::UnexpectedType {
                expected: "unsigned integer",
                actual: "negative integer",
            },
        )
    })
}

async fn text(
    session: &GatewayReadSession,
    address: &DeviceAddress,
    (table, column, index): (ConfigTable, u32, u32),
) -> Result<String, GatewayError> {
    let oid = encode(EntityKind::Config(table, column), address, &[index]);
    let value = session.get(&oid).await?;
    Ok(if value.is_absent() {
        String::new()
    } else {
        decode_text(&value)
    })
}

/// 配置树中的单个元素。
enum Element<'a> {
    Vlan(&'a VlanConfig),
    Tcont(&'a TcontConfig),
    GemPort(&'a GemPortConfig),
    ServicePort(&'a ServicePortConfig),
}

impl<'a> Element<'a> {
    /// 依赖顺序：VLAN、T-CONT、GEM 端口、业务端口。
    fn ordered(tree: &'a OnuConfigTree) -> Vec<Element<'a>> {
        tree.vlans
            .iter()
            .map(Element::Vlan)
            .chain(tree.tconts.iter().map(Element::Tcont))
            .chain(tree.gemports.iter().map(Element::GemPort))
            .chain(tree.service_ports.iter().map(Element::ServicePort))
            .collect()
    }

    fn item(&self) -> ConfigItem {
        match self {
            Element::Vlan(_) => ConfigItem::Vlan,
            Element::Tcont(_) => ConfigItem::Tcont,
            Element::GemPort(_) => ConfigItem::GemPort,
            Element::ServicePort(_) => ConfigItem::ServicePort,
        }
    }

    fn id(&self) -> u32 {
        match self {
            Element::Vlan(vlan) => vlan.user_vlan,
            Element::Tcont(tcont) => tcont.tcont_id,
            Element::GemPort(gemport) => gemport.gemport_id,
            Element::ServicePort(port) => port.port_id,
        }
    }

    fn validate(&self) -> Result<(), InvalidConfig> {
        match self {
            Element::Vlan(vlan) => vlan.validate(),
            Element::Tcont(tcont) => tcont.validate(),
            Element::GemPort(gemport) => gemport.validate(),
            Element::ServicePort(port) => port.validate(),
        }
    }

    fn columns(&self) -> Vec<(u32, SnmpValue)> {
        let int = |v: u32| SnmpValue::Integer(i64::from(v));
        match self {
            Element::Vlan(vlan) => vec![
                (vlan_column::SERVICE_VLAN, int(vlan.service_vlan)),
                (vlan_column::MODE, SnmpValue::Integer(vlan.mode.code())),
                (vlan_column::PRIORITY, int(vlan.priority)),
            ],
            Element::Tcont(tcont) => vec![
                (tcont_column::NAME, SnmpValue::text(&tcont.name)),
                (tcont_column::PROFILE, SnmpValue::text(&tcont.profile_name)),
            ],
            Element::GemPort(gemport) => vec![
                (gemport_column::NAME, SnmpValue::text(&gemport.name)),
                (gemport_column::TCONT, int(gemport.tcont_id)),
            ],
            Element::ServicePort(port) => vec![
                (service_port_column::VPORT, int(port.vport)),
                (service_port_column::USER_VLAN, int(port.user_vlan)),
                (service_port_column::SERVICE_VLAN, int(port.service_vlan)),
                (service_port_column::GEMPORT, int(port.gemport_id)),
            ],
        }
    }

    fn failed_parent(
        &self,
        failed_tconts: &HashMap<u32, FailureKind>,
        failed_gemports: &HashMap<u32, FailureKind>,
    ) -> Option<(String, FailureKind)> {
        match self {
            Element::GemPort(gemport) => failed_tconts
                .get(&gemport.tcont_id)
                .map(|kind| (format!("tcont {}", gemport.tcont_id), *kind)),
            Element::ServicePort(port) => failed_gemports
                .get(&port.gemport_id)
                .map(|kind| (format!("gemport {}", port.gemport_id), *kind)),
            _ => None,
        }
    }

    fn mark_failed(
        &self,
        kind: FailureKind,
        failed_tconts: &mut HashMap<u32, FailureKind>,
        failed_gemports: &mut HashMap<u32, FailureKind>,
    ) {
        match self {
            Element::Tcont(tcont) => {
                failed_tconts.insert(tcont.tcont_id, kind);
            }
            Element::GemPort(gemport) => {
                failed_gemports.insert(gemport.gemport_id, kind);
            }
            _ => {}
        }
    }
}

fn table_of(item: ConfigItem) -> ConfigTable {
    match item {
        ConfigItem::Vlan => ConfigTable::Vlan,
        ConfigItem::Tcont => ConfigTable::Tcont,
        ConfigItem::GemPort => ConfigTable::GemPort,
        ConfigItem::ServicePort => ConfigTable::ServicePort,
    }
}

/// 幂等写入一行：行不存在（或已销毁）时先 createAndGo。
async fn apply_row(
    session: &GatewaySession,
    address: &DeviceAddress,
    element: &Element<'_>,
) -> Result<(), GatewayError> {
    let table = table_of(element.item());
    let index = [element.id()];
    let status_oid = encode(EntityKind::Config(table, ConfigTable::ROW_STATUS), address, &index);
    let status = session.get(&status_oid).await?;
    if !row_present(&status) {
        session
            .set(&status_oid, SnmpValue::Integer(row_status::CREATE_AND_GO))
            .await?;
    }
    for (column, value) in element.columns() {
        let oid = encode(EntityKind::Config(table, column), address, &index);
        session.set(&oid, value).await?;
    }
    Ok(())
}
