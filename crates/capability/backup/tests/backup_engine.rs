use domain::{
    BackupPayload, BackupType, ConfigBackup, ConfigItem, DeviceAddress, FailureKind,
    GemPortConfig, OnuConfigTree, ServicePortConfig, TcontConfig, VlanConfig, VlanMode,
};
use olt_backup::{BackupEngine, BackupError, RestoreRequest};
use olt_control::{ElementStatus, OnuService, ProvisioningService, RequestScope};
use olt_protocol::codec::{encode, ConfigTable, EntityKind};
use olt_protocol::codec::oid::row_status as status_code;
use olt_protocol::{DeviceGateway, MemoryTransport, Oid, SnmpValue};
use olt_storage::{BackupStore, CacheStore, InMemoryBackupStore, InMemoryCacheStore};
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    agent: Arc<MemoryTransport>,
    cache: Arc<InMemoryCacheStore>,
    store: Arc<InMemoryBackupStore>,
    provisioning: Arc<ProvisioningService>,
    engine: BackupEngine,
}

fn harness() -> Harness {
    let agent = Arc::new(MemoryTransport::new());
    let gateway = DeviceGateway::new(agent.clone(), Duration::from_millis(500), "memory".to_string());
    let cache = Arc::new(InMemoryCacheStore::new());
    let onus = Arc::new(OnuService::new(gateway.clone(), cache.clone()));
    let provisioning = Arc::new(ProvisioningService::new(gateway, cache.clone()));
    let store = Arc::new(InMemoryBackupStore::new());
    let engine = BackupEngine::new(store.clone(), onus, provisioning.clone());
    Harness {
        agent,
        cache,
        store,
        provisioning,
        engine,
    }
}

fn scope() -> RequestScope {
    RequestScope::detached("test")
}

fn onu(board: u32, pon: u32, onu: u32) -> DeviceAddress {
    DeviceAddress::onu(board, pon, onu).expect("address")
}

fn tree(vlan: u32) -> OnuConfigTree {
    OnuConfigTree {
        vlans: vec![VlanConfig {
            user_vlan: vlan,
            service_vlan: vlan + 1000,
            mode: VlanMode::Tag,
            priority: 3,
        }],
        tconts: vec![TcontConfig {
            tcont_id: 1,
            name: "internet".to_string(),
            profile_name: "fiber-100m".to_string(),
        }],
        gemports: vec![GemPortConfig {
            gemport_id: 1,
            name: "gem-1".to_string(),
            tcont_id: 1,
        }],
        service_ports: vec![ServicePortConfig {
            port_id: 1,
            vport: 1,
            user_vlan: vlan,
            service_vlan: vlan + 1000,
            gemport_id: 1,
        }],
    }
}

impl Harness {
    async fn provision(&self, address: DeviceAddress, vlan: u32) {
        self.agent.register_onu(&address, "subscriber", "ZTEG0000C0DE");
        self.provisioning
            .apply_tree(&scope(), address, &tree(vlan), &[], false)
            .await
            .expect("provision");
    }
}

fn row_status(table: ConfigTable, address: &DeviceAddress, index: &[u32]) -> Oid {
    encode(EntityKind::Config(table, ConfigTable::ROW_STATUS), address, index)
}

#[tokio::test]
async fn onu_backup_captures_identity_and_tree() {
    let h = harness();
    let address = onu(1, 3, 7);
    h.provision(address, 100).await;

    let backup = h
        .engine
        .backup_onu(&scope(), address, "nightly".to_string(), vec!["cron".to_string()])
        .await
        .expect("backup");

    assert_eq!(backup.backup_type, BackupType::Onu);
    assert_eq!(backup.metadata.total_onus, 1);
    assert_eq!(backup.metadata.source, "gpon-onu_1/1/3:7");
    let BackupPayload::Onu(entry) = &backup.payload else {
        panic!("expected onu payload");
    };
    assert_eq!(entry.address, address);
    assert_eq!(entry.serial_number, "ZTEG0000C0DE");
    assert_eq!(entry.admin_state, "enabled");
    assert_eq!(entry.config, tree(100));
    assert_eq!(h.engine.get(backup.id).await.expect("get"), backup);
}

#[tokio::test]
async fn failed_sub_read_stores_nothing() {
    let h = harness();
    let address = onu(1, 3, 8);
    h.provision(address, 100).await;
    h.agent
        .reject_prefix(row_status(ConfigTable::GemPort, &address, &[]));

    let err = h
        .engine
        .backup_onu(&scope(), address, String::new(), vec![])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Rejected);
    assert!(h.store.is_empty());

    let missing = h
        .engine
        .backup_onu(&scope(), onu(1, 3, 9), String::new(), vec![])
        .await
        .unwrap_err();
    assert_eq!(missing.kind(), FailureKind::NotFound);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn olt_backup_records_per_entity_failures() {
    let h = harness();
    let late = onu(2, 16, 128);
    let early = onu(1, 1, 1);
    let broken = onu(1, 9, 4);
    h.provision(late, 300).await;
    h.provision(early, 100).await;
    h.provision(broken, 200).await;
    h.agent
        .reject_prefix(row_status(ConfigTable::Tcont, &broken, &[]));

    let backup = h
        .engine
        .backup_olt(&scope(), "full".to_string(), vec![])
        .await
        .expect("backup");

    let BackupPayload::Olt { onus, failures } = &backup.payload else {
        panic!("expected olt payload");
    };
    let addresses: Vec<DeviceAddress> = onus.iter().map(|entry| entry.address).collect();
    assert_eq!(addresses, vec![early, late]);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].address, broken);
    assert_eq!(failures[0].kind, FailureKind::Rejected);
    assert_eq!(backup.metadata.total_onus, 2);
}

#[tokio::test]
async fn listing_filters_by_type_and_limit() {
    let h = harness();
    let address = onu(1, 2, 3);
    h.provision(address, 100).await;
    for _ in 0..2 {
        h.engine
            .backup_onu(&scope(), address, String::new(), vec![])
            .await
            .expect("onu backup");
    }
    h.engine
        .backup_olt(&scope(), String::new(), vec![])
        .await
        .expect("olt backup");

    assert_eq!(h.engine.list(None, 0).await.expect("all").len(), 3);
    assert_eq!(h.engine.list(Some(BackupType::Onu), 0).await.expect("onu").len(), 2);
    assert_eq!(h.engine.list(Some(BackupType::Olt), 0).await.expect("olt").len(), 1);
    assert_eq!(h.engine.list(None, 1).await.expect("limited").len(), 1);
}

#[tokio::test]
async fn export_then_import_is_a_new_equal_backup() {
    let h = harness();
    let address = onu(1, 2, 3);
    h.provision(address, 100).await;
    let original = h
        .engine
        .backup_onu(&scope(), address, "before upgrade".to_string(), vec!["v1".to_string()])
        .await
        .expect("backup");

    let document = h.engine.export(original.id).await.expect("export");
    let parsed: ConfigBackup = serde_json::from_slice(&document).expect("json");
    assert_eq!(parsed, original);

    let imported = h.engine.import(&scope(), &document).await.expect("import");
    assert_ne!(imported.id, original.id);
    assert_eq!(imported.payload, original.payload);
    assert_eq!(imported.metadata, original.metadata);
    assert_eq!(imported.description, original.description);
    assert_eq!(imported.tags, original.tags);
    assert_eq!(h.store.len(), 2);

    let garbage = h.engine.import(&scope(), b"{not json").await.unwrap_err();
    assert!(matches!(garbage, BackupError::Validation(_)));

    let mut inconsistent = serde_json::to_value(&original).expect("value");
    inconsistent["backup_type"] = serde_json::json!("olt");
    let bytes = serde_json::to_vec(&inconsistent).expect("bytes");
    let err = h.engine.import(&scope(), &bytes).await.unwrap_err();
    assert!(matches!(err, BackupError::Validation(_)));
}

#[tokio::test]
async fn restore_replays_tcont_before_gemport_on_the_override_target() {
    let h = harness();
    let source = onu(1, 2, 3);
    let target = onu(1, 2, 9);
    h.provision(source, 100).await;
    let backup = h
        .engine
        .backup_onu(&scope(), source, String::new(), vec![])
        .await
        .expect("backup");
    h.cache
        .set("board_1_pon_2_onu_9_config", "{}", 300)
        .await
        .expect("seed cache");
    h.agent.clear_writes();

    let request = RestoreRequest {
        target_onu: Some(9),
        ..RestoreRequest::default()
    };
    let result = h
        .engine
        .restore(&scope(), backup.id, request)
        .await
        .expect("restore");

    assert!(result.success);
    assert_eq!(result.restored_onus, 1);
    assert_eq!(result.items.len(), 4);
    assert!(result.items.iter().all(|item| item.address == target));
    let writes: Vec<Oid> = h.agent.writes().into_iter().map(|(oid, _)| oid).collect();
    let position = |oid: Oid| writes.iter().position(|w| *w == oid).expect("written");
    let tcont = position(row_status(ConfigTable::Tcont, &target, &[1]));
    let gem = position(row_status(ConfigTable::GemPort, &target, &[1]));
    let port = position(row_status(ConfigTable::ServicePort, &target, &[1]));
    assert!(tcont < gem && gem < port);
    assert!(
        h.cache
            .get("board_1_pon_2_onu_9_config")
            .await
            .expect("cache")
            .is_none()
    );

    let restored = h.provisioning.read_config(&scope(), target).await.expect("config");
    assert_eq!(restored, tree(100));
}

#[tokio::test]
async fn dry_run_restore_only_plans() {
    let h = harness();
    let address = onu(1, 2, 3);
    h.provision(address, 100).await;
    let backup = h
        .engine
        .backup_onu(&scope(), address, String::new(), vec![])
        .await
        .expect("backup");
    h.agent.clear_writes();

    let request = RestoreRequest {
        dry_run: true,
        items: Some(vec![ConfigItem::Vlan, ConfigItem::ServicePort]),
        ..RestoreRequest::default()
    };
    let result = h
        .engine
        .restore(&scope(), backup.id, request)
        .await
        .expect("restore");
    assert!(result.dry_run);
    let items: Vec<ConfigItem> = result.items.iter().map(|item| item.item).collect();
    assert_eq!(items, vec![ConfigItem::Vlan, ConfigItem::ServicePort]);
    assert!(result.items.iter().all(|item| item.status == ElementStatus::Planned));
    assert!(h.agent.writes().is_empty());
}

#[tokio::test]
async fn olt_backup_rejects_target_override() {
    let h = harness();
    h.provision(onu(1, 1, 1), 100).await;
    let backup = h
        .engine
        .backup_olt(&scope(), String::new(), vec![])
        .await
        .expect("backup");
    let request = RestoreRequest {
        target_board: Some(2),
        ..RestoreRequest::default()
    };
    let err = h
        .engine
        .restore(&scope(), backup.id, request)
        .await
        .unwrap_err();
    assert!(matches!(err, BackupError::Validation(_)));
}

#[tokio::test]
async fn deleted_backup_is_gone() {
    let h = harness();
    let address = onu(1, 1, 1);
    h.provision(address, 100).await;
    let backup = h
        .engine
        .backup_onu(&scope(), address, String::new(), vec![])
        .await
        .expect("backup");

    h.engine.delete(backup.id).await.expect("delete");
    assert!(matches!(h.engine.get(backup.id).await, Err(BackupError::NotFound(_))));
    assert!(matches!(h.engine.delete(backup.id).await, Err(BackupError::NotFound(_))));
    assert!(h.store.get(backup.id).await.expect("store").is_none());
}

#[tokio::test]
async fn tree_with_dangling_reference_is_never_stored() {
    let h = harness();
    let address = onu(1, 4, 2);
    h.provision(address, 200).await;
    // T-CONT 行被销毁，GEM 端口仍引用它。
    h.agent.insert(
        row_status(ConfigTable::Tcont, &address, &[1]),
        SnmpValue::Integer(status_code::DESTROY),
    );

    let err = h
        .engine
        .backup_onu(&scope(), address, String::new(), vec![])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Malformed);
    assert!(h.store.is_empty());

    h.agent.insert(
        row_status(ConfigTable::Tcont, &address, &[1]),
        SnmpValue::Integer(status_code::ACTIVE),
    );
    let healthy = h
        .engine
        .backup_onu(&scope(), address, String::new(), vec![])
        .await
        .expect("backup");
    let mut exported: serde_json::Value =
        serde_json::from_slice(&h.engine.export(healthy.id).await.expect("export")).expect("json");
    exported["payload"]["config"]["tconts"] = serde_json::json!([]);
    let imported = h
        .engine
        .import(&scope(), &serde_json::to_vec(&exported).expect("encode"))
        .await;
    assert!(matches!(imported, Err(BackupError::Validation(reason)) if reason.contains("tcont 1")));
    assert_eq!(h.store.len(), 1);
}
