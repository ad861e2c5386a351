//! 批量 ONU 操作。
//!
//! 校验全部通过后才访问设备；每个目标独立执行与分类，结果顺序与输入一致。

use crate::error::ControlError;
use crate::onu::{validate_description, OnuService};
use crate::scope::RequestScope;
use domain::{DeviceAddress, ItemError};
use futures::stream::{self, StreamExt};
use olt_telemetry::{
    record_batch_item_cancelled, record_batch_item_failure, record_batch_item_success,
    record_batch_latency_ms,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

pub const MAX_BATCH_TARGETS: usize = 50;
pub const MAX_BATCH_CONCURRENCY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOperation {
    Reboot,
    Block,
    Unblock,
    Delete,
    UpdateDescription,
}

impl BatchOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchOperation::Reboot => "reboot",
            BatchOperation::Block => "block",
            BatchOperation::Unblock => "unblock",
            BatchOperation::Delete => "delete",
            BatchOperation::UpdateDescription => "update_description",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTarget {
    pub board: u32,
    pub pon: u32,
    pub onu_id: u32,
    /// 仅 `UpdateDescription` 使用。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchItemStatus {
    Success,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItemResult {
    pub board: u32,
    pub pon: u32,
    pub onu_id: u32,
    pub status: BatchItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ItemError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub operation: BatchOperation,
    pub total: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub cancelled_count: usize,
    pub results: Vec<BatchItemResult>,
    pub execution_time_ms: u64,
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_targets: usize,
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_targets: MAX_BATCH_TARGETS,
            concurrency: 8,
        }
    }
}

pub struct BatchExecutor {
    onus: Arc<OnuService>,
    config: BatchConfig,
}

impl BatchExecutor {
    pub fn new(onus: Arc<OnuService>) -> Self {
        Self::new_with_config(onus, BatchConfig::default())
    }

    /// 上限超出硬限制时按硬限制处理。
    pub fn new_with_config(onus: Arc<OnuService>, config: BatchConfig) -> Self {
        let config = BatchConfig {
            max_targets: config.max_targets.clamp(1, MAX_BATCH_TARGETS),
            concurrency: config.concurrency.clamp(1, MAX_BATCH_CONCURRENCY),
        };
        Self { onus, config }
    }

    pub fn max_targets(&self) -> usize {
        self.config.max_targets
    }

    pub async fn execute(
        &self,
        scope: &RequestScope,
        operation: BatchOperation,
        targets: Vec<BatchTarget>,
    ) -> Result<BatchResult, ControlError> {
        let started = Instant::now();
        let jobs = self.validate(operation, targets)?;
        info!(
            target: "olt.control",
            request_id = %scope.request_id(),
            operation = operation.as_str(),
            total = jobs.len(),
            "batch_started"
        );
        let results: Vec<BatchItemResult> = stream::iter(jobs)
            .map(|(address, description)| self.run_one(scope, operation, address, description))
            .buffered(self.config.concurrency)
            .collect()
            .await;
        let count = |status| results.iter().filter(|item| item.status == status).count();
        let execution_time_ms = started.elapsed().as_millis() as u64;
        record_batch_latency_ms(execution_time_ms);
        let result = BatchResult {
            operation,
            total: results.len(),
            success_count: count(BatchItemStatus::Success),
            failure_count: count(BatchItemStatus::Failed),
            cancelled_count: count(BatchItemStatus::Cancelled),
            execution_time_ms,
            results,
        };
        info!(
            target: "olt.control",
            request_id = %scope.request_id(),
            operation = operation.as_str(),
            success = result.success_count,
            failed = result.failure_count,
            cancelled = result.cancelled_count,
            execution_time_ms,
            "batch_finished"
        );
        Ok(result)
    }

    fn validate(
        &self,
        operation: BatchOperation,
        targets: Vec<BatchTarget>,
    ) -> Result<Vec<(DeviceAddress, Option<String>)>, ControlError> {
        if targets.is_empty() || targets.len() > self.config.max_targets {
            return Err(ControlError::Validation(format!(
                "batch must contain 1-{} targets, got {}",
                self.config.max_targets,
                targets.len()
            )));
        }
        targets
            .into_iter()
            .enumerate()
            .map(|(position, target)| {
                let address = DeviceAddress::onu(target.board, target.pon, target.onu_id)
                    .map_err(|err| ControlError::Validation(format!("targets[{position}]: {err}")))?;
                let description = match operation {
                    BatchOperation::UpdateDescription => {
                        let text = target.description.as_deref().unwrap_or_default();
                        let text = validate_description(text).map_err(|err| {
                            ControlError::Validation(format!("targets[{position}]: {err}"))
                        })?;
                        Some(text)
                    }
                    _ => None,
                };
                Ok((address, description))
            })
            .collect()
    }

    async fn run_one(
        &self,
        scope: &RequestScope,
        operation: BatchOperation,
        address: DeviceAddress,
        description: Option<String>,
    ) -> BatchItemResult {
        let outcome = if let Err(err) = scope.check() {
            Err(err)
        } else {
            match operation {
                BatchOperation::Reboot => self.onus.reboot(scope, address).await,
                BatchOperation::Block => self.onus.block(scope, address).await,
                BatchOperation::Unblock => self.onus.unblock(scope, address).await,
                BatchOperation::Delete => self.onus.delete(scope, address).await,
                BatchOperation::UpdateDescription => {
                    let text = description.unwrap_or_default();
                    self.onus.update_description(scope, address, &text).await
                }
            }
        };
        let (status, error) = match outcome {
            Ok(()) => {
                record_batch_item_success();
                (BatchItemStatus::Success, None)
            }
            // 截止时间到达与取消一样跳过剩余目标。
            Err(err @ (ControlError::Cancelled | ControlError::Timeout)) => {
                record_batch_item_cancelled();
                (BatchItemStatus::Cancelled, Some(err.to_item_error()))
            }
            Err(err) => {
                record_batch_item_failure();
                (BatchItemStatus::Failed, Some(err.to_item_error()))
            }
        };
        BatchItemResult {
            board: address.board(),
            pon: address.pon_id(),
            onu_id: address.onu_id().unwrap_or(0),
            status,
            error,
        }
    }
}
