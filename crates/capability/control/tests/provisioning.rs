use domain::{
    ConfigItem, DeviceAddress, FailureKind, GemPortConfig, OnuConfigTree, ServicePortConfig,
    TcontConfig, VlanConfig, VlanMode,
};
use olt_control::{ControlError, ElementStatus, ProvisioningService, RequestScope};
use olt_protocol::codec::{encode, ConfigTable, EntityKind};
use olt_protocol::{DeviceGateway, MemoryTransport, Oid};
use olt_storage::{CacheStore, InMemoryCacheStore};
use std::sync::Arc;
use std::time::Duration;

fn target() -> DeviceAddress {
    DeviceAddress::onu(1, 2, 5).expect("address")
}

fn service(agent: &Arc<MemoryTransport>, store: Arc<InMemoryCacheStore>) -> ProvisioningService {
    let gateway = DeviceGateway::new(agent.clone(), Duration::from_millis(500), "memory".to_string());
    ProvisioningService::new(gateway, store)
}

fn scope() -> RequestScope {
    RequestScope::detached("test")
}

fn tree() -> OnuConfigTree {
    OnuConfigTree {
        vlans: vec![VlanConfig {
            user_vlan: 100,
            service_vlan: 1100,
            mode: VlanMode::Tag,
            priority: 0,
        }],
        tconts: vec![TcontConfig {
            tcont_id: 1,
            name: "internet".to_string(),
            profile_name: "fiber-100m".to_string(),
        }],
        gemports: vec![GemPortConfig {
            gemport_id: 1,
            name: "gem-internet".to_string(),
            tcont_id: 1,
        }],
        service_ports: vec![ServicePortConfig {
            port_id: 1,
            vport: 1,
            user_vlan: 100,
            service_vlan: 1100,
            gemport_id: 1,
        }],
    }
}

fn row_status(table: ConfigTable, index: u32) -> Oid {
    encode(EntityKind::Config(table, ConfigTable::ROW_STATUS), &target(), &[index])
}

#[tokio::test]
async fn element_writes_are_read_back_and_invalidate_the_tree() {
    let agent = Arc::new(MemoryTransport::new());
    let store = Arc::new(InMemoryCacheStore::new());
    let service = service(&agent, store.clone());
    let expected = tree();

    service
        .set_tcont(&scope(), target(), expected.tconts[0].clone())
        .await
        .expect("tcont");
    service
        .set_gemport(&scope(), target(), expected.gemports[0].clone())
        .await
        .expect("gemport");

    let config = service.read_config(&scope(), target()).await.expect("config");
    assert_eq!(config.tconts, expected.tconts);
    assert_eq!(config.gemports, expected.gemports);
    assert!(config.vlans.is_empty());
    assert!(
        store
            .get("board_1_pon_2_onu_5_config")
            .await
            .expect("store")
            .is_some()
    );

    service
        .remove_gemport(&scope(), target(), 1)
        .await
        .expect("remove");
    let config = service.read_config(&scope(), target()).await.expect("config");
    assert!(config.gemports.is_empty());
    assert_eq!(config.tconts.len(), 1);

    let missing = service.remove_gemport(&scope(), target(), 1).await;
    assert!(matches!(missing, Err(ControlError::NotFound(_))));
}

#[tokio::test]
async fn invalid_element_is_rejected_before_any_request() {
    let agent = Arc::new(MemoryTransport::new());
    let service = service(&agent, Arc::new(InMemoryCacheStore::new()));
    let vlan = VlanConfig {
        user_vlan: 0,
        service_vlan: 100,
        mode: VlanMode::Untag,
        priority: 0,
    };
    let err = service.set_vlan(&scope(), target(), vlan).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Validation);
    assert_eq!(agent.request_count(), 0);
}

#[tokio::test]
async fn tree_is_applied_in_dependency_order() {
    let agent = Arc::new(MemoryTransport::new());
    let service = service(&agent, Arc::new(InMemoryCacheStore::new()));

    let outcomes = service
        .apply_tree(&scope(), target(), &tree(), &[], false)
        .await
        .expect("apply");
    assert!(outcomes.iter().all(|o| o.status == ElementStatus::Applied));
    let items: Vec<ConfigItem> = outcomes.iter().map(|o| o.item).collect();
    assert_eq!(items, ConfigItem::ALL.to_vec());

    let writes: Vec<Oid> = agent.writes().into_iter().map(|(oid, _)| oid).collect();
    let position = |oid: &Oid| writes.iter().position(|w| w == oid).expect("written");
    let vlan = position(&row_status(ConfigTable::Vlan, 100));
    let tcont = position(&row_status(ConfigTable::Tcont, 1));
    let gem = position(&row_status(ConfigTable::GemPort, 1));
    let port = position(&row_status(ConfigTable::ServicePort, 1));
    assert!(vlan < tcont && tcont < gem && gem < port);

    let config = service.read_config(&scope(), target()).await.expect("config");
    assert_eq!(config, tree());
}

#[tokio::test]
async fn reapplying_a_tree_does_not_recreate_rows() {
    let agent = Arc::new(MemoryTransport::new());
    let service = service(&agent, Arc::new(InMemoryCacheStore::new()));
    service
        .apply_tree(&scope(), target(), &tree(), &[], false)
        .await
        .expect("first");
    agent.clear_writes();
    service
        .apply_tree(&scope(), target(), &tree(), &[], false)
        .await
        .expect("second");
    let status_writes = agent
        .writes()
        .into_iter()
        .filter(|(oid, _)| *oid == row_status(ConfigTable::Tcont, 1))
        .count();
    assert_eq!(status_writes, 0);
}

#[tokio::test]
async fn dependants_of_a_failed_tcont_are_skipped() {
    let agent = Arc::new(MemoryTransport::new());
    agent.reject_prefix(row_status(ConfigTable::Tcont, 1));
    let service = service(&agent, Arc::new(InMemoryCacheStore::new()));

    let outcomes = service
        .apply_tree(&scope(), target(), &tree(), &[], false)
        .await
        .expect("apply");
    let statuses: Vec<ElementStatus> = outcomes.iter().map(|o| o.status).collect();
    assert_eq!(
        statuses,
        vec![
            ElementStatus::Applied,
            ElementStatus::Failed,
            ElementStatus::Skipped,
            ElementStatus::Skipped,
        ]
    );
    let tcont_error = outcomes[1].error.as_ref().expect("error");
    assert_eq!(tcont_error.kind, FailureKind::Rejected);
    let skipped = outcomes[2].error.as_ref().expect("reason");
    assert!(skipped.message.contains("tcont 1"));
}

#[tokio::test]
async fn dry_run_plans_without_writes() {
    let agent = Arc::new(MemoryTransport::new());
    let service = service(&agent, Arc::new(InMemoryCacheStore::new()));

    let outcomes = service
        .apply_tree(&scope(), target(), &tree(), &[ConfigItem::Tcont, ConfigItem::GemPort], true)
        .await
        .expect("plan");
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.status == ElementStatus::Planned));
    assert!(agent.writes().is_empty());
}

#[tokio::test]
async fn cancelled_scope_marks_every_element() {
    let agent = Arc::new(MemoryTransport::new());
    let service = service(&agent, Arc::new(InMemoryCacheStore::new()));
    let scope = scope();
    scope.cancel();

    let outcomes = service
        .apply_tree(&scope, target(), &tree(), &[], false)
        .await
        .expect("apply");
    assert!(outcomes.iter().all(|o| o.status == ElementStatus::Cancelled));
    assert!(agent.writes().is_empty());
}
