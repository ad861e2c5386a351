//! 追踪、请求 ID 与进程级计数器。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 计数器快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub snmp_requests: u64,
    pub snmp_failures: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_bypasses: u64,
    pub single_flight_joins: u64,
    pub batch_item_success: u64,
    pub batch_item_failure: u64,
    pub batch_item_cancelled: u64,
    pub backups_created: u64,
    pub backup_failures: u64,
    pub restores_run: u64,
    pub restore_items_failed: u64,
    pub batch_latency_ms_total: u64,
    pub batch_latency_ms_count: u64,
}

pub struct TelemetryMetrics {
    snmp_requests: AtomicU64,
    snmp_failures: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    cache_bypasses: AtomicU64,
    single_flight_joins: AtomicU64,
    batch_item_success: AtomicU64,
    batch_item_failure: AtomicU64,
    batch_item_cancelled: AtomicU64,
    backups_created: AtomicU64,
    backup_failures: AtomicU64,
    restores_run: AtomicU64,
    restore_items_failed: AtomicU64,
    batch_latency_ms_total: AtomicU64,
    batch_latency_ms_count: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            snmp_requests: AtomicU64::new(0),
            snmp_failures: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            cache_bypasses: AtomicU64::new(0),
            single_flight_joins: AtomicU64::new(0),
            batch_item_success: AtomicU64::new(0),
            batch_item_failure: AtomicU64::new(0),
            batch_item_cancelled: AtomicU64::new(0),
            backups_created: AtomicU64::new(0),
            backup_failures: AtomicU64::new(0),
            restores_run: AtomicU64::new(0),
            restore_items_failed: AtomicU64::new(0),
            batch_latency_ms_total: AtomicU64::new(0),
            batch_latency_ms_count: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            snmp_requests: self.snmp_requests.load(Ordering::Relaxed),
            snmp_failures: self.snmp_failures.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            cache_bypasses: self.cache_bypasses.load(Ordering::Relaxed),
            single_flight_joins: self.single_flight_joins.load(Ordering::Relaxed),
            batch_item_success: self.batch_item_success.load(Ordering::Relaxed),
            batch_item_failure: self.batch_item_failure.load(Ordering::Relaxed),
            batch_item_cancelled: self.batch_item_cancelled.load(Ordering::Relaxed),
            backups_created: self.backups_created.load(Ordering::Relaxed),
            backup_failures: self.backup_failures.load(Ordering::Relaxed),
            restores_run: self.restores_run.load(Ordering::Relaxed),
            restore_items_failed: self.restore_items_failed.load(Ordering::Relaxed),
            batch_latency_ms_total: self.batch_latency_ms_total.load(Ordering::Relaxed),
            batch_latency_ms_count: self.batch_latency_ms_count.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录 SNMP 交互次数（含遍历中的每次 GET-NEXT）。
pub fn record_snmp_request() {
    metrics().snmp_requests.fetch_add(1, Ordering::Relaxed);
}

pub fn record_snmp_failure() {
    metrics().snmp_failures.fetch_add(1, Ordering::Relaxed);
}

pub fn record_cache_hit() {
    metrics().cache_hits.fetch_add(1, Ordering::Relaxed);
}

pub fn record_cache_miss() {
    metrics().cache_misses.fetch_add(1, Ordering::Relaxed);
}

/// 记录缓存存储不可用、直接读取设备的次数。
pub fn record_cache_bypass() {
    metrics().cache_bypasses.fetch_add(1, Ordering::Relaxed);
}

/// 记录并发未命中合并到已有请求的次数。
pub fn record_single_flight_join() {
    metrics()
        .single_flight_joins
        .fetch_add(1, Ordering::Relaxed);
}

pub fn record_batch_item_success() {
    metrics().batch_item_success.fetch_add(1, Ordering::Relaxed);
}

pub fn record_batch_item_failure() {
    metrics().batch_item_failure.fetch_add(1, Ordering::Relaxed);
}

pub fn record_batch_item_cancelled() {
    metrics()
        .batch_item_cancelled
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录批量操作耗时（毫秒）。
pub fn record_batch_latency_ms(latency_ms: u64) {
    let metrics = metrics();
    metrics
        .batch_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .batch_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}

pub fn record_backup_created() {
    metrics().backups_created.fetch_add(1, Ordering::Relaxed);
}

pub fn record_backup_failure() {
    metrics().backup_failures.fetch_add(1, Ordering::Relaxed);
}

pub fn record_restore_run() {
    metrics().restores_run.fetch_add(1, Ordering::Relaxed);
}

pub fn record_restore_item_failed() {
    metrics()
        .restore_items_failed
        .fetch_add(1, Ordering::Relaxed);
}
