//! OLT 级资源：板卡、流量 / VLAN 模板与 DBA 模板。

use crate::error::ControlError;
use crate::read::{read_best_effort, read_optional, row_present};
use crate::scope::RequestScope;
use domain::{CardRecord, DbaProfile, TrafficProfile, VlanProfile};
use olt_protocol::codec::oid::{
    self, card_column, dba_column, row_status, traffic_column, vlan_profile_column,
};
use olt_protocol::codec::{decode_string_index, decode_text};
use olt_protocol::{DeviceGateway, GatewayError, Oid, SnmpValue, VarBind};
use tracing::info;

pub struct InventoryService {
    gateway: DeviceGateway,
}

impl InventoryService {
    pub fn new(gateway: DeviceGateway) -> Self {
        Self { gateway }
    }

    pub async fn cards(&self, scope: &RequestScope) -> Result<Vec<CardRecord>, ControlError> {
        scope
            .run(async {
                let prefix = oid::card(card_column::TYPE, None);
                let rows = self.walk(prefix.clone(), "list_cards").await?;
                let mut cards = Vec::with_capacity(rows.len());
                for row in rows {
                    let Some(&[rack, shelf, slot]) = row.oid.suffix_after(&prefix) else {
                        continue;
                    };
                    cards.push(self.read_card(rack, shelf, slot, Some(row.value)).await);
                }
                cards.sort_by_key(|card| (card.rack, card.shelf, card.slot));
                info!(target: "olt.control", count = cards.len(), "cards_listed");
                Ok(cards)
            })
            .await
    }

    pub async fn card(
        &self,
        scope: &RequestScope,
        rack: u32,
        shelf: u32,
        slot: u32,
    ) -> Result<CardRecord, ControlError> {
        scope
            .run(async {
                let card_type = self
                    .get(&oid::card(card_column::TYPE, Some((rack, shelf, slot))), "get_card")
                    .await?
                    .ok_or_else(|| {
                        ControlError::NotFound(format!("no card at {rack}/{shelf}/{slot}"))
                    })?;
                Ok(self.read_card(rack, shelf, slot, Some(card_type)).await)
            })
            .await
    }

    pub async fn traffic_profiles(
        &self,
        scope: &RequestScope,
    ) -> Result<Vec<TrafficProfile>, ControlError> {
        scope
            .run(async {
                let prefix = oid::traffic_profile(traffic_column::NAME, None);
                let rows = self.walk(prefix.clone(), "list_traffic_profiles").await?;
                let mut profiles = Vec::with_capacity(rows.len());
                for row in rows {
                    let Some(&[profile_id]) = row.oid.suffix_after(&prefix) else {
                        continue;
                    };
                    profiles.push(self.read_traffic(profile_id, &row.value).await);
                }
                profiles.sort_by_key(|profile| profile.profile_id);
                Ok(profiles)
            })
            .await
    }

    pub async fn traffic_profile(
        &self,
        scope: &RequestScope,
        profile_id: u32,
    ) -> Result<TrafficProfile, ControlError> {
        scope
            .run(async {
                let name = self
                    .get(
                        &oid::traffic_profile(traffic_column::NAME, Some(profile_id)),
                        "get_traffic_profile",
                    )
                    .await?
                    .ok_or_else(|| {
                        ControlError::NotFound(format!("traffic profile {profile_id}"))
                    })?;
                Ok(self.read_traffic(profile_id, &name).await)
            })
            .await
    }

    pub async fn vlan_profiles(
        &self,
        scope: &RequestScope,
    ) -> Result<Vec<VlanProfile>, ControlError> {
        scope
            .run(async {
                let prefix = oid::vlan_profile(vlan_profile_column::VLAN_ID, None);
                let rows = self.walk(prefix.clone(), "list_vlan_profiles").await?;
                let mut profiles = Vec::with_capacity(rows.len());
                for row in rows {
                    let Some(name) = row.oid.suffix_after(&prefix).and_then(decode_string_index)
                    else {
                        continue;
                    };
                    let field = |column| oid::vlan_profile(column, Some(&name));
                    let priority = self.best_effort(&field(vlan_profile_column::PRIORITY)).await;
                    let mode = self.best_effort(&field(vlan_profile_column::MODE)).await;
                    let description =
                        self.best_effort(&field(vlan_profile_column::DESCRIPTION)).await;
                    profiles.push(VlanProfile {
                        vlan_id: unsigned(Some(row.value)),
                        priority: unsigned(priority),
                        mode: mode.map(|v| vlan_mode_label(&v)).unwrap_or_default(),
                        description: description.map(|v| decode_text(&v)).unwrap_or_default(),
                        name,
                    });
                }
                profiles.sort_by(|a, b| a.name.cmp(&b.name));
                Ok(profiles)
            })
            .await
    }

    pub async fn dba_profiles(
        &self,
        scope: &RequestScope,
    ) -> Result<Vec<DbaProfile>, ControlError> {
        scope
            .run(async {
                let prefix = oid::dba_profile(dba_column::ROW_STATUS, None);
                let rows = self.walk(prefix.clone(), "list_dba_profiles").await?;
                let mut profiles = Vec::with_capacity(rows.len());
                for row in rows.iter().filter(|row| row_present(&row.value)) {
                    let Some(name) = row.oid.suffix_after(&prefix).and_then(decode_string_index)
                    else {
                        continue;
                    };
                    profiles.push(self.read_dba(name).await?);
                }
                profiles.sort_by(|a, b| a.name.cmp(&b.name));
                Ok(profiles)
            })
            .await
    }

    pub async fn dba_profile(
        &self,
        scope: &RequestScope,
        name: &str,
    ) -> Result<DbaProfile, ControlError> {
        scope
            .run(async {
                let status = self
                    .get(&oid::dba_profile(dba_column::ROW_STATUS, Some(name)), "get_dba_profile")
                    .await?;
                if !status.as_ref().is_some_and(row_present) {
                    return Err(ControlError::NotFound(format!("dba profile {name}")));
                }
                self.read_dba(name.to_string()).await
            })
            .await
    }

    pub async fn create_dba_profile(
        &self,
        scope: &RequestScope,
        profile: DbaProfile,
    ) -> Result<DbaProfile, ControlError> {
        profile.validate()?;
        let operation = "create_dba_profile";
        let session = scope.exclusive(&self.gateway).await?;
        let status_oid = oid::dba_profile(dba_column::ROW_STATUS, Some(&profile.name));
        let status = session
            .get(&status_oid)
            .await
            .map_err(|err| device(operation, err))?;
        if row_present(&status) {
            return Err(ControlError::Validation(format!(
                "dba profile {} already exists",
                profile.name
            )));
        }
        session
            .set(&status_oid, SnmpValue::Integer(row_status::CREATE_AND_GO))
            .await
            .map_err(|err| device(operation, err))?;
        for (oid, value) in dba_values(&profile) {
            session
                .set(&oid, value)
                .await
                .map_err(|err| device(operation, err))?;
        }
        info!(
            target: "olt.control",
            request_id = %scope.request_id(),
            name = %profile.name,
            "dba_profile_created"
        );
        Ok(profile)
    }

    /// 名称取自路径，请求体中的名称被忽略。
    pub async fn update_dba_profile(
        &self,
        scope: &RequestScope,
        name: &str,
        mut profile: DbaProfile,
    ) -> Result<DbaProfile, ControlError> {
        profile.name = name.to_string();
        profile.validate()?;
        let operation = "update_dba_profile";
        let session = scope.exclusive(&self.gateway).await?;
        let status = session
            .get(&oid::dba_profile(dba_column::ROW_STATUS, Some(name)))
            .await
            .map_err(|err| device(operation, err))?;
        if !row_present(&status) {
            return Err(ControlError::NotFound(format!("dba profile {name}")));
        }
        for (oid, value) in dba_values(&profile) {
            session
                .set(&oid, value)
                .await
                .map_err(|err| device(operation, err))?;
        }
        info!(target: "olt.control", request_id = %scope.request_id(), name = %name, "dba_profile_updated");
        Ok(profile)
    }

    pub async fn delete_dba_profile(
        &self,
        scope: &RequestScope,
        name: &str,
    ) -> Result<(), ControlError> {
        let operation = "delete_dba_profile";
        let session = scope.exclusive(&self.gateway).await?;
        let status_oid = oid::dba_profile(dba_column::ROW_STATUS, Some(name));
        let status = session
            .get(&status_oid)
            .await
            .map_err(|err| device(operation, err))?;
        if !row_present(&status) {
            return Err(ControlError::NotFound(format!("dba profile {name}")));
        }
        session
            .set(&status_oid, SnmpValue::Integer(row_status::DESTROY))
            .await
            .map_err(|err| device(operation, err))?;
        info!(target: "olt.control", request_id = %scope.request_id(), name = %name, "dba_profile_deleted");
        Ok(())
    }

    async fn walk(
        &self,
        prefix: Oid,
        operation: &'static str,
    ) -> Result<Vec<VarBind>, ControlError> {
        self.gateway
            .walk_all(prefix)
            .await
            .map_err(|err| device(operation, err))
    }

    async fn get(
        &self,
        oid: &Oid,
        operation: &'static str,
    ) -> Result<Option<SnmpValue>, ControlError> {
        read_optional(&self.gateway, oid)
            .await
            .map_err(|err| device(operation, err))
    }

    async fn best_effort(&self, oid: &Oid) -> Option<SnmpValue> {
        read_best_effort(&self.gateway, oid).await
    }

    async fn read_card(
        &self,
        rack: u32,
        shelf: u32,
        slot: u32,
        card_type: Option<SnmpValue>,
    ) -> CardRecord {
        let field = |column| oid::card(column, Some((rack, shelf, slot)));
        let serial = self.best_effort(&field(card_column::SERIAL)).await;
        let hardware = self.best_effort(&field(card_column::HARDWARE)).await;
        let software = self.best_effort(&field(card_column::SOFTWARE)).await;
        let status = self.best_effort(&field(card_column::STATUS)).await;
        CardRecord {
            rack,
            shelf,
            slot,
            card_type: card_type
                .map(|v| labelled(&v, "type_"))
                .unwrap_or_default(),
            status: status.map(|v| card_status_label(&v)).unwrap_or_default(),
            serial_number: serial.map(|v| decode_text(&v)).unwrap_or_default(),
            hardware_version: hardware.map(|v| version_label(&v)).unwrap_or_default(),
            software_version: software.map(|v| version_label(&v)).unwrap_or_default(),
        }
    }

    async fn read_traffic(&self, profile_id: u32, name: &SnmpValue) -> TrafficProfile {
        let field = |column| oid::traffic_profile(column, Some(profile_id));
        let cir = self.best_effort(&field(traffic_column::CIR)).await;
        let pir = self.best_effort(&field(traffic_column::PIR)).await;
        let max_bw = self.best_effort(&field(traffic_column::MAX_BW)).await;
        TrafficProfile {
            profile_id,
            name: decode_text(name),
            cir: cir.and_then(|v| v.as_integer()).unwrap_or(0),
            pir: pir.and_then(|v| v.as_integer()).unwrap_or(0),
            max_bw: max_bw.and_then(|v| v.as_integer()).unwrap_or(0),
        }
    }

    async fn read_dba(&self, name: String) -> Result<DbaProfile, ControlError> {
        let field = |column| oid::dba_profile(column, Some(&name));
        let operation = "get_dba_profile";
        let profile_type = self.get(&field(dba_column::TYPE), operation).await?;
        let fixed = self.get(&field(dba_column::FIXED), operation).await?;
        let assured = self.get(&field(dba_column::ASSURED), operation).await?;
        let max = self.get(&field(dba_column::MAX), operation).await?;
        Ok(DbaProfile {
            profile_type: unsigned(profile_type),
            fixed_kbps: unsigned(fixed),
            assured_kbps: unsigned(assured),
            max_kbps: unsigned(max),
            name,
        })
    }
}

fn device(operation: &'static str, source: GatewayError) -> ControlError {
    ControlError::device(None, operation, source)
}

fn dba_values(profile: &DbaProfile) -> [(Oid, SnmpValue); 4] {
    let name = Some(profile.name.as_str());
    [
        (
            oid::dba_profile(dba_column::TYPE, name),
            SnmpValue::Integer(i64::from(profile.profile_type)),
        ),
        (
            oid::dba_profile(dba_column::FIXED, name),
            SnmpValue::Integer(i64::from(profile.fixed_kbps)),
        ),
        (
            oid::dba_profile(dba_column::ASSURED, name),
            SnmpValue::Integer(i64::from(profile.assured_kbps)),
        ),
        (
            oid::dba_profile(dba_column::MAX, name),
            SnmpValue::Integer(i64::from(profile.max_kbps)),
        ),
    ]
}

fn unsigned(value: Option<SnmpValue>) -> u32 {
    value
        .and_then(|v| v.as_integer())
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

/// 整数编码加前缀，文本原样返回。
fn labelled(value: &SnmpValue, prefix: &str) -> String {
    match value.as_integer() {
        Some(code) => format!("{prefix}{code}"),
        None => decode_text(value),
    }
}

fn version_label(value: &SnmpValue) -> String {
    labelled(value, "v")
}

fn card_status_label(value: &SnmpValue) -> String {
    match value.as_integer() {
        Some(0) => "inactive".to_string(),
        Some(3) => "active".to_string(),
        Some(16) => "online".to_string(),
        _ => labelled(value, "status_"),
    }
}

fn vlan_mode_label(value: &SnmpValue) -> String {
    match value.as_integer() {
        Some(1) => "tag".to_string(),
        Some(2) => "untag".to_string(),
        _ => labelled(value, "mode_"),
    }
}
