use domain::{DbaProfile, DeviceAddress, FailureKind, OnuStatus};
use olt_control::{ControlError, InventoryService, OnuService, RequestScope};
use olt_protocol::codec::{encode, EntityKind, OnuAttribute, PonAttribute};
use olt_protocol::{DeviceGateway, MemoryTransport, Oid, SnmpValue};
use olt_storage::{CacheStore, InMemoryCacheStore};
use std::sync::Arc;
use std::time::Duration;

fn gateway(agent: &Arc<MemoryTransport>) -> DeviceGateway {
    DeviceGateway::new(agent.clone(), Duration::from_millis(500), "memory".to_string())
}

fn onu(board: u32, pon: u32, onu: u32) -> DeviceAddress {
    DeviceAddress::onu(board, pon, onu).expect("address")
}

fn pon(board: u32, pon: u32) -> DeviceAddress {
    DeviceAddress::pon(board, pon).expect("address")
}

fn scope() -> RequestScope {
    RequestScope::detached("test")
}

#[tokio::test]
async fn pon_listing_is_sorted_and_served_from_cache() {
    let agent = Arc::new(MemoryTransport::new());
    agent.register_onu(&onu(1, 1, 3), "lobby", "ZTEG00000003");
    agent.register_onu(&onu(1, 1, 1), "office", "ZTEG00000001");
    agent.register_onu(&onu(1, 2, 1), "other-pon", "ZTEG00000099");
    let store = Arc::new(InMemoryCacheStore::new());
    let service = OnuService::new(gateway(&agent), store.clone());

    let first = service.list_pon(&scope(), pon(1, 1)).await.expect("list");
    let ids: Vec<u32> = first.iter().map(|record| record.onu_id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(first[0].name, "office");
    assert_eq!(first[0].serial_number, "ZTEG00000001");
    assert_eq!(first[0].rx_power, "-10.00");
    assert_eq!(first[0].status, OnuStatus::Online);

    let requests = agent.request_count();
    let second = service.list_pon(&scope(), pon(1, 1)).await.expect("cached");
    assert_eq!(second, first);
    assert_eq!(agent.request_count(), requests);
    assert!(store.get("board_1_pon_1").await.expect("store").is_some());
}

#[tokio::test]
async fn empty_pon_is_not_found_and_not_cached() {
    let agent = Arc::new(MemoryTransport::new());
    let store = Arc::new(InMemoryCacheStore::new());
    let service = OnuService::new(gateway(&agent), store.clone());

    let err = service.list_pon(&scope(), pon(2, 16)).await.unwrap_err();
    assert!(matches!(err, ControlError::NotFound(_)));
    assert!(store.get("board_2_pon_16").await.expect("store").is_none());
}

#[tokio::test]
async fn reboot_invalidates_detail_and_listing() {
    let agent = Arc::new(MemoryTransport::new());
    let target = onu(1, 4, 7);
    agent.register_onu(&target, "cabinet", "ZTEG0000AA07");
    let store = Arc::new(InMemoryCacheStore::new());
    let service = OnuService::new(gateway(&agent), store.clone());

    service.list_pon(&scope(), target.pon_scope()).await.expect("list");
    service.onu_detail(&scope(), target).await.expect("detail");
    assert!(store.get("board_1_pon_4").await.expect("store").is_some());
    assert!(store.get("board_1_pon_4_onu_7").await.expect("store").is_some());

    service.reboot(&scope(), target).await.expect("reboot");

    assert!(store.get("board_1_pon_4").await.expect("store").is_none());
    assert!(store.get("board_1_pon_4_onu_7").await.expect("store").is_none());
    let reset = encode(EntityKind::Onu(OnuAttribute::Reset), &target, &[]);
    assert_eq!(agent.writes(), vec![(reset, SnmpValue::Integer(1))]);
}

#[tokio::test]
async fn detail_reads_attributes_best_effort() {
    let agent = Arc::new(MemoryTransport::new());
    let target = onu(2, 3, 9);
    agent.register_onu(&target, "1,shop", "ZTEG0000BB09");
    agent.insert(
        encode(EntityKind::Onu(OnuAttribute::LastOffline), &target, &[]),
        SnmpValue::OctetString(vec![0x07, 0xE8, 3, 1, 10, 0, 0, 0]),
    );
    agent.insert(
        encode(EntityKind::Onu(OnuAttribute::LastOnline), &target, &[]),
        SnmpValue::OctetString(vec![0x07, 0xE8, 3, 1, 10, 5, 30, 0]),
    );
    agent.reject_prefix(encode(EntityKind::Onu(OnuAttribute::TxPower), &target, &[]));
    let service = OnuService::new(gateway(&agent), Arc::new(InMemoryCacheStore::new()));

    let detail = service.onu_detail(&scope(), target).await.expect("detail");
    assert_eq!(detail.name, "shop");
    assert_eq!(detail.tx_power, "");
    assert_eq!(detail.optical_distance, "Unknown");
    assert_eq!(detail.last_online.as_deref(), Some("2024-03-01 10:05:30"));
    assert_eq!(
        detail.last_down_duration.as_deref(),
        Some("0 days 0 hours 5 minutes 30 seconds")
    );
    assert!(detail.uptime.is_some());

    let missing = service.onu_detail(&scope(), onu(2, 3, 10)).await.unwrap_err();
    assert!(matches!(missing, ControlError::NotFound(_)));
}

#[tokio::test]
async fn free_ids_exclude_registered_onus() {
    let agent = Arc::new(MemoryTransport::new());
    agent.register_onu(&onu(1, 5, 1), "a", "ZTEG00000001");
    agent.register_onu(&onu(1, 5, 2), "b", "ZTEG00000002");
    let store = Arc::new(InMemoryCacheStore::new());
    let service = OnuService::new(gateway(&agent), store.clone());

    let free = service.empty_onu_ids(&scope(), pon(1, 5)).await.expect("free");
    assert_eq!(free.len(), 126);
    assert_eq!(free[0].onu_id, 3);
    assert!(store.get("board_1_pon_5_empty_onu_id").await.expect("store").is_some());

    agent.register_onu(&onu(1, 5, 3), "c", "ZTEG00000003");
    let cached = service.empty_onu_ids(&scope(), pon(1, 5)).await.expect("cached");
    assert_eq!(cached.len(), 126);
    let refreshed = service
        .update_empty_onu_ids(&scope(), pon(1, 5))
        .await
        .expect("refresh");
    assert_eq!(refreshed.len(), 125);
    assert_eq!(refreshed[0].onu_id, 4);
}

#[tokio::test]
async fn pon_info_counts_registered_onus() {
    let agent = Arc::new(MemoryTransport::new());
    let port = pon(1, 2);
    agent.insert(
        encode(EntityKind::Pon(PonAttribute::AdminStatus), &port, &[]),
        SnmpValue::Integer(1),
    );
    agent.insert(
        encode(EntityKind::Pon(PonAttribute::OperStatus), &port, &[]),
        SnmpValue::Integer(2),
    );
    agent.insert(
        encode(EntityKind::Pon(PonAttribute::Distance), &port, &[]),
        SnmpValue::Integer(20),
    );
    for id in [1, 2, 5] {
        agent.insert(
            encode(EntityKind::Pon(PonAttribute::RegisteredOnus), &port, &[id]),
            SnmpValue::Integer(1),
        );
    }
    let service = OnuService::new(gateway(&agent), Arc::new(InMemoryCacheStore::new()));

    let info = service.pon_info(&scope(), port).await.expect("info");
    assert_eq!(info.admin_status, "enabled");
    assert_eq!(info.oper_status, "up");
    assert_eq!(info.distance, 20);
    assert_eq!(info.onu_count, 3);
}

#[tokio::test]
async fn clearing_an_absent_pon_cache_succeeds() {
    let agent = Arc::new(MemoryTransport::new());
    let service = OnuService::new(gateway(&agent), Arc::new(InMemoryCacheStore::new()));
    service.clear_pon_cache(pon(2, 9)).await;
    assert_eq!(agent.request_count(), 0);
}

#[tokio::test]
async fn unreachable_device_surfaces_its_kind() {
    let agent = Arc::new(MemoryTransport::new());
    agent.set_delay(Some(Duration::from_millis(200)));
    let gateway = DeviceGateway::new(agent.clone(), Duration::from_millis(20), "memory".to_string());
    let service = OnuService::new(gateway, Arc::new(InMemoryCacheStore::new()));

    let err = service.list_pon(&scope(), pon(1, 1)).await.unwrap_err();
    assert_eq!(err.kind(), domain::FailureKind::Unreachable);
}

#[tokio::test]
async fn dba_profile_lifecycle() {
    let agent = Arc::new(MemoryTransport::new());
    let service = InventoryService::new(gateway(&agent));
    let profile = DbaProfile {
        name: "fiber-100m".to_string(),
        profile_type: 4,
        fixed_kbps: 0,
        assured_kbps: 0,
        max_kbps: 102_400,
    };

    service
        .create_dba_profile(&scope(), profile.clone())
        .await
        .expect("create");
    let duplicate = service.create_dba_profile(&scope(), profile.clone()).await;
    assert!(matches!(duplicate, Err(ControlError::Validation(_))));
    assert_eq!(
        service.dba_profile(&scope(), "fiber-100m").await.expect("get"),
        profile
    );

    let mut bigger = profile.clone();
    bigger.max_kbps = 204_800;
    service
        .update_dba_profile(&scope(), "fiber-100m", bigger.clone())
        .await
        .expect("update");
    let listed = service.dba_profiles(&scope()).await.expect("list");
    assert_eq!(listed, vec![bigger]);

    service
        .delete_dba_profile(&scope(), "fiber-100m")
        .await
        .expect("delete");
    assert!(service.dba_profiles(&scope()).await.expect("list").is_empty());
    let missing = service.dba_profile(&scope(), "fiber-100m").await;
    assert!(matches!(missing, Err(ControlError::NotFound(_))));

    let invalid = DbaProfile {
        max_kbps: 10,
        ..profile
    };
    let writes = agent.writes().len();
    let err = service.create_dba_profile(&scope(), invalid).await;
    assert!(matches!(err, Err(ControlError::Validation(_))));
    assert_eq!(agent.writes().len(), writes);
}

#[tokio::test]
async fn silent_device_detail_is_unreachable() {
    let agent = Arc::new(MemoryTransport::new());
    agent.silence_prefix(Oid::new(vec![1]));
    let service = OnuService::new(gateway(&agent), Arc::new(InMemoryCacheStore::new()));

    let err = service.onu_detail(&scope(), onu(1, 1, 1)).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Unreachable);
}
