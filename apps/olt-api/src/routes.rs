//! 路由定义
//!
//! 集中管理 `/api/v1` 下的所有路由：
//! - PON / ONU 查询：/board/{b}/pon/{p}/*
//! - 机框与模板：/system/cards/*, /profiles/*, /traffic/dba-profile/*
//! - 业务配置：/onu/{b}/{p}/{o}/*
//! - ONU 管理与批量：/onu-management/*, /batch/{operation}
//! - 配置快照：/backup/*, /backups/*
//! - 实时监控：/monitoring/*
//! - 计数器：/metrics

use crate::AppState;
use crate::handlers::*;
use axum::{
    Router,
    routing::{delete, get, post},
};

pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/metrics", get(get_metrics))
        .route(
            "/board/:board/pon/:pon",
            get(list_pon_onus).delete(clear_pon_cache),
        )
        .route("/board/:board/pon/:pon/info", get(get_pon_info))
        .route("/board/:board/pon/:pon/onu/:onu", get(get_onu_detail))
        .route("/board/:board/pon/:pon/onu_id/empty", get(get_empty_onu_ids))
        .route(
            "/board/:board/pon/:pon/onu_id/update",
            post(update_empty_onu_ids),
        )
        .route("/board/:board/pon/:pon/onu_id_sn", get(get_onu_serials))
        .route("/system/cards", get(list_cards))
        .route("/system/cards/:rack/:shelf/:slot", get(get_card))
        .route("/profiles/traffic", get(list_traffic_profiles))
        .route("/profiles/traffic/:id", get(get_traffic_profile))
        .route("/profiles/vlan", get(list_vlan_profiles))
        .route(
            "/traffic/dba-profile",
            get(list_dba_profiles).post(create_dba_profile),
        )
        .route(
            "/traffic/dba-profile/:name",
            get(get_dba_profile)
                .put(update_dba_profile)
                .delete(delete_dba_profile),
        )
        .route("/onu/:board/:pon/:onu/config", get(get_onu_config))
        .route("/onu/:board/:pon/:onu/vlan", post(set_onu_vlan))
        .route("/onu/:board/:pon/:onu/vlan/:id", delete(remove_onu_vlan))
        .route("/onu/:board/:pon/:onu/tcont", post(set_onu_tcont))
        .route("/onu/:board/:pon/:onu/tcont/:id", delete(remove_onu_tcont))
        .route("/onu/:board/:pon/:onu/gemport", post(set_onu_gemport))
        .route("/onu/:board/:pon/:onu/gemport/:id", delete(remove_onu_gemport))
        .route("/onu/:board/:pon/:onu/service-port", post(set_onu_service_port))
        .route(
            "/onu/:board/:pon/:onu/service-port/:id",
            delete(remove_onu_service_port),
        )
        .route("/onu-management/reboot", post(reboot_onu))
        .route("/onu-management/block", post(block_onu))
        .route("/onu-management/unblock", post(unblock_onu))
        .route("/onu-management/description", post(update_onu_description))
        .route("/onu-management/delete", delete(delete_onu))
        .route("/batch/:operation", post(run_batch))
        .route("/backup/onu", post(backup_onu))
        .route("/backup/olt", post(backup_olt))
        .route("/backups", get(list_backups))
        .route("/backups/import", post(import_backup))
        .route("/backups/:id", get(get_backup).delete(delete_backup))
        .route("/backups/:id/export", get(export_backup))
        .route("/backups/:id/restore", post(restore_backup))
        .route("/monitoring/onu/:board/:pon/:onu", get(get_onu_monitoring))
        .route("/monitoring/pon/:board/:pon", get(get_pon_monitoring))
        .route("/monitoring/olt", get(get_olt_monitoring))
}
