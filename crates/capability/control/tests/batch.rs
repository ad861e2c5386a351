use domain::FailureKind;
use olt_control::{
    BatchExecutor, BatchItemStatus, BatchOperation, BatchTarget, ControlError, OnuService,
    RequestScope,
};
use olt_protocol::codec::{encode, EntityKind, OnuAttribute};
use olt_protocol::{DeviceGateway, MemoryTransport, SnmpValue};
use olt_storage::InMemoryCacheStore;
use std::sync::Arc;
use std::time::Duration;

fn executor(agent: &Arc<MemoryTransport>) -> BatchExecutor {
    let gateway = DeviceGateway::new(agent.clone(), Duration::from_millis(500), "memory".to_string());
    let onus = Arc::new(OnuService::new(gateway, Arc::new(InMemoryCacheStore::new())));
    BatchExecutor::new(onus)
}

fn target(onu_id: u32) -> BatchTarget {
    BatchTarget {
        board: 1,
        pon: 1,
        onu_id,
        description: None,
    }
}

#[tokio::test]
async fn size_limits_are_checked_before_device_calls() {
    let agent = Arc::new(MemoryTransport::new());
    let executor = executor(&agent);
    let scope = RequestScope::detached("test");

    let empty = executor.execute(&scope, BatchOperation::Reboot, vec![]).await;
    assert!(matches!(empty, Err(ControlError::Validation(_))));

    let too_many: Vec<_> = (1..=51).map(target).collect();
    let err = executor.execute(&scope, BatchOperation::Reboot, too_many).await;
    assert!(matches!(err, Err(ControlError::Validation(_))));

    let mut bad_address: Vec<_> = (1..=3).map(target).collect();
    bad_address[2].board = 3;
    let err = executor.execute(&scope, BatchOperation::Block, bad_address).await;
    assert!(matches!(err, Err(ControlError::Validation(_))));

    let missing_description = vec![target(1)];
    let err = executor
        .execute(&scope, BatchOperation::UpdateDescription, missing_description)
        .await;
    assert!(matches!(err, Err(ControlError::Validation(_))));

    assert_eq!(agent.request_count(), 0);
}

#[tokio::test]
async fn every_target_is_attempted_in_input_order() {
    let agent = Arc::new(MemoryTransport::new());
    let failing = domain::DeviceAddress::onu(1, 1, 2).expect("address");
    agent.reject_prefix(encode(EntityKind::Onu(OnuAttribute::Reset), &failing, &[]));
    let executor = executor(&agent);

    let targets: Vec<_> = [3, 2, 1, 50].into_iter().map(target).collect();
    let result = executor
        .execute(&RequestScope::detached("test"), BatchOperation::Reboot, targets)
        .await
        .expect("batch");

    assert_eq!(result.total, 4);
    let ids: Vec<u32> = result.results.iter().map(|item| item.onu_id).collect();
    assert_eq!(ids, vec![3, 2, 1, 50]);
    assert_eq!(result.success_count, 3);
    assert_eq!(result.failure_count, 1);
    assert_eq!(result.results[1].status, BatchItemStatus::Failed);
    let error = result.results[1].error.as_ref().expect("error");
    assert_eq!(error.kind, FailureKind::Rejected);
    assert_eq!(agent.writes().len(), 3);
}

#[tokio::test]
async fn descriptions_are_written_per_target() {
    let agent = Arc::new(MemoryTransport::new());
    let executor = executor(&agent);
    let targets = vec![BatchTarget {
        description: Some("Room 12".to_string()),
        ..target(12)
    }];

    let result = executor
        .execute(&RequestScope::detached("test"), BatchOperation::UpdateDescription, targets)
        .await
        .expect("batch");
    assert_eq!(result.success_count, 1);
    let address = domain::DeviceAddress::onu(1, 1, 12).expect("address");
    let oid = encode(EntityKind::Onu(OnuAttribute::Description), &address, &[]);
    assert_eq!(agent.value(&oid), Some(SnmpValue::text("Room 12")));
}

#[tokio::test]
async fn cancellation_reports_remaining_targets() {
    let agent = Arc::new(MemoryTransport::new());
    let executor = executor(&agent);
    let scope = RequestScope::detached("test");
    scope.cancel();

    let targets: Vec<_> = (1..=5).map(target).collect();
    let result = executor
        .execute(&scope, BatchOperation::Unblock, targets)
        .await
        .expect("batch");
    assert_eq!(result.total, 5);
    assert_eq!(result.cancelled_count, 5);
    assert!(result
        .results
        .iter()
        .all(|item| item.status == BatchItemStatus::Cancelled));
    assert!(agent.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancel_mid_batch_stops_queued_writes() {
    let agent = Arc::new(MemoryTransport::new());
    agent.set_delay(Some(Duration::from_millis(50)));
    let executor = executor(&agent);
    let scope = RequestScope::detached("test");
    let canceller = scope.clone();

    let targets: Vec<_> = (1..=20).map(target).collect();
    let (result, ()) = tokio::join!(
        executor.execute(&scope, BatchOperation::Reboot, targets),
        async move {
            tokio::time::sleep(Duration::from_millis(70)).await;
            canceller.cancel();
        }
    );
    let result = result.expect("batch");

    // 第一个 SET 在取消前完成，第二个在取消时已发出。
    assert_eq!(agent.writes().len(), 2);
    assert_eq!(result.total, 20);
    assert_eq!(result.success_count, 2);
    assert_eq!(result.cancelled_count, 18);
    let ids: Vec<u32> = result.results.iter().map(|item| item.onu_id).collect();
    assert_eq!(ids, (1..=20).collect::<Vec<_>>());
    assert!(result.results[2..]
        .iter()
        .all(|item| item.status == BatchItemStatus::Cancelled));
}

#[tokio::test(start_paused = true)]
async fn deadline_mid_batch_skips_remaining_targets() {
    let agent = Arc::new(MemoryTransport::new());
    agent.set_delay(Some(Duration::from_millis(50)));
    let executor = executor(&agent);
    let scope = RequestScope::new(
        "test",
        tokio_util::sync::CancellationToken::new(),
        Some(Duration::from_millis(70)),
    );

    let targets: Vec<_> = (1..=10).map(target).collect();
    let result = executor
        .execute(&scope, BatchOperation::Block, targets)
        .await
        .expect("batch");

    assert_eq!(agent.writes().len(), 2);
    assert_eq!(result.success_count, 2);
    assert_eq!(result.failure_count, 0);
    assert_eq!(result.cancelled_count, 8);
    let error = result.results[9].error.as_ref().expect("error");
    assert_eq!(error.kind, FailureKind::Timeout);
}
