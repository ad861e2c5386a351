//! 内存 SNMP 代理，用于测试与离线演示。
//!
//! 对象按 OID 字典序保存，GET-NEXT 与真实代理一致；可注入拒绝、无响应与延迟。

use crate::codec::{encode, EntityKind, OnuAttribute};
use crate::error::TransportError;
use crate::transport::SnmpTransport;
use crate::types::{Oid, SnmpValue, VarBind};
use async_trait::async_trait;
use domain::DeviceAddress;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

#[derive(Default)]
pub struct MemoryTransport {
    objects: RwLock<BTreeMap<Oid, SnmpValue>>,
    writes: Mutex<Vec<(Oid, SnmpValue)>>,
    rejected: RwLock<Vec<Oid>>,
    silent: RwLock<Vec<Oid>>,
    delay: RwLock<Option<Duration>>,
    requests: AtomicU64,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, oid: Oid, value: SnmpValue) {
        if let Ok(mut objects) = self.objects.write() {
            objects.insert(oid, value);
        }
    }

    pub fn value(&self, oid: &Oid) -> Option<SnmpValue> {
        self.objects
            .read()
            .ok()
            .and_then(|objects| objects.get(oid).cloned())
    }

    /// 登记一个在线 ONU：名称、类型、序列号、状态、管理状态与收光功率。
    pub fn register_onu(&self, address: &DeviceAddress, name: &str, serial: &str) {
        let attributes = [
            (OnuAttribute::Name, SnmpValue::text(name)),
            (OnuAttribute::Type, SnmpValue::text("ZTE-F660")),
            (OnuAttribute::SerialNumber, SnmpValue::text(serial)),
            (OnuAttribute::Status, SnmpValue::Integer(4)),
            (OnuAttribute::AdminState, SnmpValue::Integer(1)),
            (OnuAttribute::RxPower, SnmpValue::Integer(10_000)),
        ];
        for (attribute, value) in attributes {
            self.insert(encode(EntityKind::Onu(attribute), address, &[]), value);
        }
    }

    /// 已执行的 SET，按发送顺序。
    pub fn writes(&self) -> Vec<(Oid, SnmpValue)> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    pub fn clear_writes(&self) {
        if let Ok(mut writes) = self.writes.lock() {
            writes.clear();
        }
    }

    /// 前缀下的 GET / SET 返回错误状态。
    pub fn reject_prefix(&self, prefix: Oid) {
        if let Ok(mut rejected) = self.rejected.write() {
            rejected.push(prefix);
        }
    }

    /// 前缀下的所有请求都不响应。
    pub fn silence_prefix(&self, prefix: Oid) {
        if let Ok(mut silent) = self.silent.write() {
            silent.push(prefix);
        }
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        if let Ok(mut slot) = self.delay.write() {
            *slot = delay;
        }
    }

    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    async fn admit(&self, oid: &Oid) -> Result<(), TransportError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let delay = self.delay.read().ok().and_then(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if matches_any(&self.silent, oid) {
            return Err(TransportError::Timeout);
        }
        if matches_any(&self.rejected, oid) {
            return Err(TransportError::Status("NoAccess".to_string()));
        }
        Ok(())
    }
}

fn matches_any(prefixes: &RwLock<Vec<Oid>>, oid: &Oid) -> bool {
    prefixes
        .read()
        .map(|list| list.iter().any(|prefix| oid.starts_with(prefix)))
        .unwrap_or(false)
}

fn lock_failed() -> TransportError {
    TransportError::Io("memory agent lock failed".to_string())
}

#[async_trait]
impl SnmpTransport for MemoryTransport {
    async fn get(&self, oid: &Oid) -> Result<SnmpValue, TransportError> {
        self.admit(oid).await?;
        let objects = self.objects.read().map_err(|_| lock_failed())?;
        Ok(objects.get(oid).cloned().unwrap_or(SnmpValue::NoSuchInstance))
    }

    async fn get_next(&self, oid: &Oid) -> Result<VarBind, TransportError> {
        self.admit(oid).await?;
        let objects = self.objects.read().map_err(|_| lock_failed())?;
        let next = objects
            .range((Bound::Excluded(oid.clone()), Bound::Unbounded))
            .next()
            .map(|(oid, value)| VarBind::new(oid.clone(), value.clone()));
        Ok(next.unwrap_or_else(|| VarBind::new(oid.clone(), SnmpValue::EndOfMibView)))
    }

    async fn set(&self, oid: &Oid, value: SnmpValue) -> Result<(), TransportError> {
        self.admit(oid).await?;
        self.objects
            .write()
            .map_err(|_| lock_failed())?
            .insert(oid.clone(), value.clone());
        self.writes
            .lock()
            .map_err(|_| lock_failed())?
            .push((oid.clone(), value));
        Ok(())
    }
}
