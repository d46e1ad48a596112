// ==========================================
// 项目标识绑定集成测试
// ==========================================
// 测试目标: 验证手工录入规则、池分配镜像与释放留痕
// ==========================================

mod test_helpers;

use gtin_pool::api::{ApiError, IdentifierApi, ManualIdentifierInput};
use gtin_pool::domain::types::{GtinType, PoolStatus};
use gtin_pool::logging;
use gtin_pool::repository::{IdentifierRepository, PoolStore, SqlitePoolStore};
use std::sync::Arc;

fn setup() -> (
    tempfile::NamedTempFile,
    Arc<SqlitePoolStore>,
    IdentifierApi<SqlitePoolStore>,
) {
    let (temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let store = Arc::new(SqlitePoolStore::new(&db_path).expect("Failed to create store"));
    let repo = Arc::new(IdentifierRepository::new(&db_path).expect("Failed to create repo"));
    let api = IdentifierApi::new(store.clone(), repo);
    (temp_file, store, api)
}

#[tokio::test]
async fn test_save_manual_ean() {
    logging::init_test();
    let (_temp, _store, api) = setup();

    let record = api
        .save_manual(
            "PRJ-001",
            ManualIdentifierInput {
                gtin_type: GtinType::Ean,
                gtin_code: Some("8437012345678".to_string()),
                exemption_reason: None,
                asin: Some("B000TEST01".to_string()),
                fnsku: None,
            },
            "tester",
        )
        .await
        .expect("save_manual failed");

    assert_eq!(record.gtin_type, Some(GtinType::Ean));
    assert_eq!(record.gtin_code.as_deref(), Some("8437012345678"));
    assert!(record.exemption_reason.is_none());
    assert!(record.source_entry_id.is_none());
    assert_eq!(record.asin.as_deref(), Some("B000TEST01"));
}

#[tokio::test]
async fn test_save_manual_exempt_requires_reason() {
    logging::init_test();
    let (_temp, _store, api) = setup();

    // 理由缺失
    let err = api
        .save_manual(
            "PRJ-001",
            ManualIdentifierInput {
                gtin_type: GtinType::GtinExempt,
                gtin_code: None,
                exemption_reason: None,
                asin: None,
                fnsku: None,
            },
            "tester",
        )
        .await
        .expect_err("missing reason should fail");
    assert!(matches!(err, ApiError::ValidationError(_)));

    // 理由全空白同样拒绝
    let err = api
        .save_manual(
            "PRJ-001",
            ManualIdentifierInput {
                gtin_type: GtinType::GtinExempt,
                gtin_code: None,
                exemption_reason: Some("   ".to_string()),
                asin: None,
                fnsku: None,
            },
            "tester",
        )
        .await
        .expect_err("blank reason should fail");
    assert!(matches!(err, ApiError::ValidationError(_)));

    // 拒绝发生在持久化之前
    let binding = api.load_binding("PRJ-001").await.expect("load failed");
    assert!(binding.record.is_none());
}

#[tokio::test]
async fn test_save_manual_exempt_clears_code() {
    logging::init_test();
    let (_temp, _store, api) = setup();

    // 豁免保存时携带的码值被强制清空
    let record = api
        .save_manual(
            "PRJ-001",
            ManualIdentifierInput {
                gtin_type: GtinType::GtinExempt,
                gtin_code: Some("8437012345678".to_string()),
                exemption_reason: Some("品牌豁免备案".to_string()),
                asin: None,
                fnsku: None,
            },
            "tester",
        )
        .await
        .expect("save_manual failed");

    assert!(record.gtin_code.is_none());
    assert_eq!(record.exemption_reason.as_deref(), Some("品牌豁免备案"));
}

#[tokio::test]
async fn test_save_manual_rejects_bad_code_syntax() {
    logging::init_test();
    let (_temp, _store, api) = setup();

    let err = api
        .save_manual(
            "PRJ-001",
            ManualIdentifierInput {
                gtin_type: GtinType::Ean,
                gtin_code: Some("12345".to_string()),
                exemption_reason: None,
                asin: None,
                fnsku: None,
            },
            "tester",
        )
        .await
        .expect_err("short code should fail");
    assert!(matches!(err, ApiError::ValidationError(_)));
}

#[tokio::test]
async fn test_assign_from_pool_mirrors_code_and_type() {
    logging::init_test();
    let (_temp, store, api) = setup();

    let entry = store
        .insert_entry(test_helpers::new_upc_entry("012345678905"), "tester")
        .await
        .expect("insert failed");

    let assigned = api
        .assign_from_pool("PRJ-001", &entry.id, "tester")
        .await
        .expect("assign failed");
    assert_eq!(assigned.status, PoolStatus::Assigned);

    let binding = api.load_binding("PRJ-001").await.expect("load failed");
    let record = binding.record.expect("record missing");
    assert_eq!(record.gtin_code.as_deref(), Some("012345678905"));
    assert_eq!(record.gtin_type, Some(GtinType::Upc));
    assert_eq!(record.source_entry_id.as_deref(), Some(entry.id.as_str()));
    assert!(binding.sourced_from_pool);
    assert_eq!(binding.pool_entry_id.as_deref(), Some(entry.id.as_str()));
}

#[tokio::test]
async fn test_assign_preserves_marketplace_fields() {
    logging::init_test();
    let (_temp, store, api) = setup();

    // 先手工保存 asin/fnsku，再从池分配，市场字段保留
    api.save_manual(
        "PRJ-001",
        ManualIdentifierInput {
            gtin_type: GtinType::Ean,
            gtin_code: Some("8437012345678".to_string()),
            exemption_reason: None,
            asin: Some("B000TEST01".to_string()),
            fnsku: Some("X000TEST01".to_string()),
        },
        "tester",
    )
    .await
    .expect("save_manual failed");

    let entry = store
        .insert_entry(test_helpers::new_ean_entry("8437012345679"), "tester")
        .await
        .expect("insert failed");
    api.assign_from_pool("PRJ-001", &entry.id, "tester")
        .await
        .expect("assign failed");

    let binding = api.load_binding("PRJ-001").await.expect("load failed");
    let record = binding.record.expect("record missing");
    assert_eq!(record.gtin_code.as_deref(), Some("8437012345679"));
    assert_eq!(record.asin.as_deref(), Some("B000TEST01"));
    assert_eq!(record.fnsku.as_deref(), Some("X000TEST01"));
}

#[tokio::test]
async fn test_release_keeps_record_but_binding_degrades() {
    logging::init_test();
    let (_temp, store, api) = setup();

    let entry = store
        .insert_entry(test_helpers::new_ean_entry("8437012345678"), "tester")
        .await
        .expect("insert failed");
    api.assign_from_pool("PRJ-001", &entry.id, "tester")
        .await
        .expect("assign failed");

    let released = api.release(&entry.id, "tester").await.expect("release failed");
    assert_eq!(released.status, PoolStatus::Available);

    // 记录保留旧码值（历史留痕），但不再视为池分配来源
    let binding = api.load_binding("PRJ-001").await.expect("load failed");
    let record = binding.record.expect("record missing");
    assert_eq!(record.gtin_code.as_deref(), Some("8437012345678"));
    assert!(!binding.sourced_from_pool);
    assert!(binding.pool_entry_id.is_none());
}

#[tokio::test]
async fn test_manual_code_matching_other_projects_entry_not_pool_sourced() {
    logging::init_test();
    let (_temp, store, api) = setup();

    // 池条目分配给 PRJ-A；PRJ-B 手工录入相同码值不算池来源
    let entry = store
        .insert_entry(test_helpers::new_ean_entry("8437012345678"), "tester")
        .await
        .expect("insert failed");
    api.assign_from_pool("PRJ-A", &entry.id, "tester")
        .await
        .expect("assign failed");

    api.save_manual(
        "PRJ-B",
        ManualIdentifierInput {
            gtin_type: GtinType::Ean,
            gtin_code: Some("8437012345678".to_string()),
            exemption_reason: None,
            asin: None,
            fnsku: None,
        },
        "tester",
    )
    .await
    .expect("save_manual failed");

    let binding = api.load_binding("PRJ-B").await.expect("load failed");
    assert!(!binding.sourced_from_pool);
    assert!(binding.pool_entry_id.is_none());
}

#[tokio::test]
async fn test_clear_identifier_keeps_marketplace_fields() {
    logging::init_test();
    let (_temp, _store, api) = setup();

    api.save_manual(
        "PRJ-001",
        ManualIdentifierInput {
            gtin_type: GtinType::Ean,
            gtin_code: Some("8437012345678".to_string()),
            exemption_reason: None,
            asin: Some("B000TEST01".to_string()),
            fnsku: Some("X000TEST01".to_string()),
        },
        "tester",
    )
    .await
    .expect("save_manual failed");

    api.clear_identifier("PRJ-001", "tester")
        .await
        .expect("clear failed");

    let binding = api.load_binding("PRJ-001").await.expect("load failed");
    let record = binding.record.expect("record missing");
    assert!(record.gtin_code.is_none());
    assert!(record.gtin_type.is_none());
    assert!(record.exemption_reason.is_none());
    assert_eq!(record.asin.as_deref(), Some("B000TEST01"));
    assert_eq!(record.fnsku.as_deref(), Some("X000TEST01"));
}

#[tokio::test]
async fn test_load_binding_unknown_project() {
    logging::init_test();
    let (_temp, _store, api) = setup();

    let binding = api.load_binding("PRJ-404").await.expect("load failed");
    assert!(binding.record.is_none());
    assert!(!binding.sourced_from_pool);
    assert!(binding.pool_entry_id.is_none());
}
