//! 实时监控：ONU 身份与在线状态、接收流量计数，按 PON 口与整机汇总。
//!
//! 监控读数按需直读设备，不经缓存。

use crate::error::ControlError;
use crate::read::{read_best_effort, read_optional};
use crate::scope::RequestScope;
use chrono::Utc;
use domain::{DeviceAddress, OltMonitoring, OnuMonitoring, PonMonitoring, TrafficCounters};
use futures::stream::{self, StreamExt};
use olt_protocol::codec::{
    decode_counter, decode_serial, decode_text, encode, format_bytes, EntityKind,
    MonitorAttribute, PonCounter,
};
use olt_protocol::DeviceGateway;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct MonitoringConfig {
    /// 单个 PON 口内、整机汇总时各自的并发读取数。
    pub concurrency: usize,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self { concurrency: 8 }
    }
}

pub struct MonitoringService {
    gateway: DeviceGateway,
    config: MonitoringConfig,
}

impl MonitoringService {
    pub fn new(gateway: DeviceGateway) -> Self {
        Self::new_with_config(gateway, MonitoringConfig::default())
    }

    pub fn new_with_config(gateway: DeviceGateway, config: MonitoringConfig) -> Self {
        let config = MonitoringConfig {
            concurrency: config.concurrency.max(1),
        };
        Self { gateway, config }
    }

    /// 序列号、型号与在线状态都不存在时视为未注册；流量计数尽力读取。
    pub async fn onu(
        &self,
        scope: &RequestScope,
        address: DeviceAddress,
    ) -> Result<OnuMonitoring, ControlError> {
        address.require_onu()?;
        scope.run(self.fetch_onu(address)).await
    }

    /// 单个 ONU 读取失败只记录日志，`onu_count` 仍计入该 ONU。
    pub async fn pon(
        &self,
        scope: &RequestScope,
        pon: DeviceAddress,
    ) -> Result<PonMonitoring, ControlError> {
        let pon = pon.pon_scope();
        scope.run(self.fetch_pon(pon)).await
    }

    /// 全部 PON 口汇总。失败的 PON 口被跳过；全部失败时返回第一个错误。
    pub async fn olt(&self, scope: &RequestScope) -> Result<OltMonitoring, ControlError> {
        let readings: Vec<_> = stream::iter(DeviceAddress::all_pons())
            .map(|pon| async move { (pon, self.pon(scope, pon).await) })
            .buffered(self.config.concurrency)
            .collect()
            .await;
        let mut pon_ports = Vec::with_capacity(readings.len());
        let mut first_error = None;
        for (pon, reading) in readings {
            match reading {
                Ok(monitoring) => pon_ports.push(monitoring),
                Err(err @ (ControlError::Cancelled | ControlError::Timeout)) => return Err(err),
                Err(err) => {
                    warn!(target: "olt.control", pon = %pon, error = %err, "pon_monitoring_skipped");
                    first_error.get_or_insert(err);
                }
            }
        }
        if pon_ports.is_empty() {
            if let Some(err) = first_error {
                return Err(err);
            }
        }
        let summary = OltMonitoring {
            total_onus: pon_ports.iter().map(|p| p.onu_count).sum(),
            online_onus: pon_ports.iter().map(|p| p.online_count).sum(),
            offline_onus: pon_ports.iter().map(|p| p.offline_count).sum(),
            pon_ports,
            last_update: Utc::now(),
        };
        info!(
            target: "olt.control",
            request_id = %scope.request_id(),
            total = summary.total_onus,
            online = summary.online_onus,
            offline = summary.offline_onus,
            "olt_monitoring_read"
        );
        Ok(summary)
    }

    async fn fetch_onu(&self, address: DeviceAddress) -> Result<OnuMonitoring, ControlError> {
        let read = |attribute| {
            let oid = encode(EntityKind::Monitor(attribute), &address, &[]);
            async move {
                read_optional(&self.gateway, &oid)
                    .await
                    .map_err(|err| ControlError::device(Some(address), "onu_monitoring", err))
            }
        };
        let serial = read(MonitorAttribute::SerialNumber).await?;
        let model = read(MonitorAttribute::Model).await?;
        let firmware = read(MonitorAttribute::Firmware).await?;
        let status = read(MonitorAttribute::OnlineStatus).await?;
        if serial.is_none() && model.is_none() && status.is_none() {
            return Err(ControlError::NotFound(format!("{address} is not registered")));
        }
        let statistics = self
            .counters(
                &address,
                EntityKind::Monitor(MonitorAttribute::RxPackets),
                EntityKind::Monitor(MonitorAttribute::RxBytes),
            )
            .await;
        Ok(OnuMonitoring {
            board: address.board(),
            pon: address.pon_id(),
            onu_id: address.onu_id().unwrap_or(0),
            serial_number: serial.map(|v| decode_serial(&v)).unwrap_or_default(),
            model: model.map(|v| decode_text(&v)).unwrap_or_default(),
            firmware_version: firmware.map(|v| decode_text(&v)).unwrap_or_default(),
            online: status.and_then(|v| v.as_integer()) == Some(1),
            statistics,
            last_update: Utc::now(),
        })
    }

    async fn fetch_pon(&self, pon: DeviceAddress) -> Result<PonMonitoring, ControlError> {
        let prefix = encode(EntityKind::Monitor(MonitorAttribute::SerialNumber), &pon, &[]);
        let rows = self
            .gateway
            .walk_all(prefix.clone())
            .await
            .map_err(|err| ControlError::device(Some(pon), "pon_monitoring", err))?;
        let addresses: BTreeSet<DeviceAddress> = rows
            .iter()
            .filter_map(|row| match row.oid.suffix_after(&prefix)? {
                [onu] => pon.with_onu(*onu).ok(),
                _ => None,
            })
            .collect();
        let readings: Vec<_> = stream::iter(addresses.iter().copied())
            .map(|address| async move { (address, self.fetch_onu(address).await) })
            .buffered(self.config.concurrency)
            .collect()
            .await;
        let mut onus = Vec::with_capacity(readings.len());
        for (address, reading) in readings {
            match reading {
                Ok(monitoring) => onus.push(monitoring),
                Err(err) => {
                    warn!(target: "olt.control", address = %address, error = %err, "onu_monitoring_skipped");
                }
            }
        }
        let online_count = onus.iter().filter(|onu| onu.online).count() as u32;
        let statistics = self
            .counters(
                &pon,
                EntityKind::PonCounter(PonCounter::RxPackets),
                EntityKind::PonCounter(PonCounter::RxBytes),
            )
            .await;
        Ok(PonMonitoring {
            board: pon.board(),
            pon: pon.pon_id(),
            onu_count: addresses.len() as u32,
            online_count,
            offline_count: onus.len() as u32 - online_count,
            statistics,
            onus,
            last_update: Utc::now(),
        })
    }

    /// 两个计数都读到才返回。
    async fn counters(
        &self,
        address: &DeviceAddress,
        packets: EntityKind,
        bytes: EntityKind,
    ) -> Option<TrafficCounters> {
        let read = |kind| async move {
            let oid = encode(kind, address, &[]);
            let value = read_best_effort(&self.gateway, &oid).await?;
            match decode_counter(&value) {
                Ok(count) => Some(count),
                Err(err) => {
                    debug!(target: "olt.control", oid = %oid, error = %err, "counter_decode_skipped");
                    None
                }
            }
        };
        let rx_packets = read(packets).await?;
        let rx_bytes = read(bytes).await?;
        Some(TrafficCounters {
            rx_packets,
            rx_bytes,
            rx_volume: format_bytes(rx_bytes),
        })
    }
}
