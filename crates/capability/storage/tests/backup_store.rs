use chrono::{Duration, TimeZone, Utc};
use domain::{
    BackupMetadata, BackupPayload, BackupType, ConfigBackup, DeviceAddress, OnuConfigBackup,
    OnuConfigTree,
};
use olt_storage::{BackupStore, FileBackupStore, InMemoryBackupStore};
use uuid::Uuid;

fn backup(backup_type: BackupType, minutes: i64) -> ConfigBackup {
    let address = DeviceAddress::onu(1, 2, 3).expect("addr");
    let entry = OnuConfigBackup {
        address,
        serial_number: "ZTEGC8A1B2C3".to_string(),
        onu_type: "F660".to_string(),
        name: "customer".to_string(),
        admin_state: "enabled".to_string(),
        config: OnuConfigTree::default(),
    };
    let payload = match backup_type {
        BackupType::Onu => BackupPayload::Onu(entry),
        BackupType::Olt => BackupPayload::Olt {
            onus: vec![entry],
            failures: Vec::new(),
        },
    };
    ConfigBackup {
        id: Uuid::new_v4(),
        backup_type,
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap() + Duration::minutes(minutes),
        description: format!("backup-{minutes}"),
        tags: vec!["nightly".to_string()],
        metadata: BackupMetadata {
            created_by: "test".to_string(),
            source: address.to_string(),
            version: "1".to_string(),
            total_onus: 1,
        },
        payload,
    }
}

async fn exercise(store: &dyn BackupStore) {
    let first = backup(BackupType::Onu, 0);
    let second = backup(BackupType::Olt, 10);
    let third = backup(BackupType::Onu, 20);
    for item in [&first, &second, &third] {
        store.save(item).await.expect("save");
    }
    assert!(store.save(&first).await.is_err());

    let all = store.list(None, 0).await.expect("list");
    let ids: Vec<Uuid> = all.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);

    let onus = store.list(Some(BackupType::Onu), 1).await.expect("list");
    assert_eq!(onus.len(), 1);
    assert_eq!(onus[0].id, third.id);

    let loaded = store.get(second.id).await.expect("get").expect("exists");
    assert_eq!(loaded, second);

    assert!(store.delete(first.id).await.expect("delete"));
    assert!(!store.delete(first.id).await.expect("delete"));
    assert!(store.get(first.id).await.expect("get").is_none());
}

#[tokio::test]
async fn in_memory_backup_store_lifecycle() {
    let store = InMemoryBackupStore::new();
    exercise(&store).await;
}

#[tokio::test]
async fn file_backup_store_lifecycle() {
    let dir = std::env::temp_dir().join(format!("olt-backups-{}", Uuid::new_v4()));
    let store = FileBackupStore::open(&dir).await.expect("open");
    exercise(&store).await;
    let _ = tokio::fs::remove_dir_all(&dir).await;
}
