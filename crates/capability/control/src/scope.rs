//! 请求作用域：请求 ID、取消令牌与截止时间。

use crate::error::ControlError;
use olt_protocol::{DeviceGateway, GatewaySession};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// 每个入口操作都接收一个作用域。
///
/// 读操作在取消或超时时被放弃；写操作只在发送前检查，已发出的 SET 允许完成。
#[derive(Debug, Clone)]
pub struct RequestScope {
    request_id: String,
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestScope {
    pub fn new(
        request_id: impl Into<String>,
        cancel: CancellationToken,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            cancel,
            deadline: timeout.map(|timeout| Instant::now() + timeout),
        }
    }

    /// 无截止时间、独立令牌的作用域（后台任务与测试）。
    pub fn detached(request_id: impl Into<String>) -> Self {
        Self::new(request_id, CancellationToken::new(), None)
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// 发送写操作前调用。
    pub fn check(&self) -> Result<(), ControlError> {
        if self.cancel.is_cancelled() {
            return Err(ControlError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(ControlError::Timeout);
            }
        }
        Ok(())
    }

    /// 获取设备独占会话后再发送写操作。
    ///
    /// 排队等待可被取消或超时打断；拿到会话后再检查一次，取消之后不会再有新的 SET 发出。
    pub async fn exclusive(&self, gateway: &DeviceGateway) -> Result<GatewaySession, ControlError> {
        let session = self.run(async { Ok(gateway.session().await) }).await?;
        self.check()?;
        Ok(session)
    }

    /// 以取消与截止时间为界运行读操作。
    pub async fn run<T, F>(&self, future: F) -> Result<T, ControlError>
    where
        F: Future<Output = Result<T, ControlError>>,
    {
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ControlError::Cancelled),
            _ = deadline => Err(ControlError::Timeout),
            result = future => result,
        }
    }
}
