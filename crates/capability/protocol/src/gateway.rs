//! 设备网关：单个 OLT 端点的 GET / WALK / SET。
//!
//! 同一设备上读操作共享、写操作与多步会话独占；每次交互都有超时上限，
//! 超时即 `Unreachable`，网关内部不做重试。

use crate::error::{GatewayError, TransportError};
use crate::transport::SnmpTransport;
use crate::types::{Oid, SnmpValue, VarBind};
use olt_telemetry::{record_snmp_failure, record_snmp_request};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};
use tracing::{debug, warn};

#[derive(Clone)]
pub struct DeviceGateway {
    transport: Arc<dyn SnmpTransport>,
    lock: Arc<RwLock<()>>,
    timeout: Duration,
    endpoint: String,
}

impl DeviceGateway {
    pub fn new(transport: Arc<dyn SnmpTransport>, timeout: Duration, endpoint: String) -> Self {
        Self {
            transport,
            lock: Arc::new(RwLock::new(())),
            timeout,
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn get(&self, oid: &Oid) -> Result<SnmpValue, GatewayError> {
        let _guard = self.lock.read().await;
        exchange(self.timeout, oid, self.transport.get(oid)).await
    }

    pub async fn set(&self, oid: &Oid, value: SnmpValue) -> Result<(), GatewayError> {
        let _guard = self.lock.write().await;
        debug!(target: "olt.snmp", endpoint = %self.endpoint, oid = %oid, "snmp_set");
        exchange(self.timeout, oid, self.transport.set(oid, value)).await
    }

    /// 惰性遍历；首次 `next` 时获取共享锁，遍历结束或被丢弃时释放。
    pub fn walk(&self, prefix: Oid) -> Walk {
        Walk::new(
            self.transport.clone(),
            self.timeout,
            prefix,
            WalkGuard::Pending(self.lock.clone()),
        )
    }

    pub async fn walk_all(&self, prefix: Oid) -> Result<Vec<VarBind>, GatewayError> {
        self.walk(prefix).collect().await
    }

    /// 共享读会话：期间写操作等待，多步读取看到同一份设备状态。
    pub async fn read_session(&self) -> GatewayReadSession {
        let guard = self.lock.clone().read_owned().await;
        GatewayReadSession {
            transport: self.transport.clone(),
            timeout: self.timeout,
            _guard: guard,
        }
    }

    /// 独占会话：期间同一设备上的其他请求全部等待。
    pub async fn session(&self) -> GatewaySession {
        let guard = self.lock.clone().write_owned().await;
        GatewaySession {
            transport: self.transport.clone(),
            timeout: self.timeout,
            _guard: guard,
        }
    }
}

/// 持有设备写锁的多步会话。
pub struct GatewaySession {
    transport: Arc<dyn SnmpTransport>,
    timeout: Duration,
    _guard: OwnedRwLockWriteGuard<()>,
}

impl GatewaySession {
    pub async fn get(&self, oid: &Oid) -> Result<SnmpValue, GatewayError> {
        exchange(self.timeout, oid, self.transport.get(oid)).await
    }

    pub async fn set(&self, oid: &Oid, value: SnmpValue) -> Result<(), GatewayError> {
        debug!(target: "olt.snmp", oid = %oid, "snmp_session_set");
        exchange(self.timeout, oid, self.transport.set(oid, value)).await
    }

    pub fn walk(&self, prefix: Oid) -> Walk {
        Walk::new(
            self.transport.clone(),
            self.timeout,
            prefix,
            WalkGuard::Session,
        )
    }

    pub async fn walk_all(&self, prefix: Oid) -> Result<Vec<VarBind>, GatewayError> {
        self.walk(prefix).collect().await
    }
}

/// 持有设备读锁的多步读取。
pub struct GatewayReadSession {
    transport: Arc<dyn SnmpTransport>,
    timeout: Duration,
    _guard: OwnedRwLockReadGuard<()>,
}

impl GatewayReadSession {
    pub async fn get(&self, oid: &Oid) -> Result<SnmpValue, GatewayError> {
        exchange(self.timeout, oid, self.transport.get(oid)).await
    }

    pub async fn walk_all(&self, prefix: Oid) -> Result<Vec<VarBind>, GatewayError> {
        Walk::new(self.transport.clone(), self.timeout, prefix, WalkGuard::Session)
            .collect()
            .await
    }
}

enum WalkGuard {
    Pending(Arc<RwLock<()>>),
    Held(#[allow(dead_code)] OwnedRwLockReadGuard<()>),
    Session,
    Released,
}

/// 基于 GET-NEXT 的有限、严格递增遍历。
///
/// 遇到视图结束、离开前缀或 OID 未递增时终止；出错后不再产出。
pub struct Walk {
    transport: Arc<dyn SnmpTransport>,
    timeout: Duration,
    prefix: Oid,
    cursor: Oid,
    guard: WalkGuard,
    done: bool,
}

impl Walk {
    fn new(
        transport: Arc<dyn SnmpTransport>,
        timeout: Duration,
        prefix: Oid,
        guard: WalkGuard,
    ) -> Self {
        Self {
            transport,
            timeout,
            cursor: prefix.clone(),
            prefix,
            guard,
            done: false,
        }
    }

    pub fn prefix(&self) -> &Oid {
        &self.prefix
    }

    pub async fn next(&mut self) -> Option<Result<VarBind, GatewayError>> {
        if self.done {
            return None;
        }
        if let WalkGuard::Pending(lock) = &self.guard {
            let lock = lock.clone();
            self.guard = WalkGuard::Held(lock.read_owned().await);
        }
        let call = self.transport.get_next(&self.cursor);
        let varbind = match exchange(self.timeout, &self.cursor, call).await {
            Ok(varbind) => varbind,
            Err(err) => {
                self.finish();
                return Some(Err(err));
            }
        };
        if varbind.value.is_absent() || !varbind.oid.starts_with(&self.prefix) {
            self.finish();
            return None;
        }
        if varbind.oid <= self.cursor {
            warn!(
                target: "olt.snmp",
                prefix = %self.prefix,
                cursor = %self.cursor,
                returned = %varbind.oid,
                "snmp_walk_not_increasing"
            );
            self.finish();
            return None;
        }
        self.cursor = varbind.oid.clone();
        Some(Ok(varbind))
    }

    pub async fn collect(mut self) -> Result<Vec<VarBind>, GatewayError> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await {
            items.push(item?);
        }
        Ok(items)
    }

    fn finish(&mut self) {
        self.done = true;
        if matches!(self.guard, WalkGuard::Held(_)) {
            self.guard = WalkGuard::Released;
        }
    }
}

async fn exchange<T, F>(timeout: Duration, oid: &Oid, call: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    record_snmp_request();
    let result = match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(GatewayError::from_transport(oid, err)),
        Err(_) => Err(GatewayError::Unreachable {
            oid: oid.to_string(),
            detail: format!("no response within {}ms", timeout.as_millis()),
        }),
    };
    if let Err(err) = &result {
        record_snmp_failure();
        debug!(target: "olt.snmp", oid = %oid, error = %err, "snmp_exchange_failed");
    }
    result
}
