// ==========================================
// 条码池仓储集成测试
// ==========================================
// 测试目标: 验证条目查询（含状态过滤）与统计
// ==========================================

mod test_helpers;

use gtin_pool::domain::types::PoolStatus;
use gtin_pool::logging;
use gtin_pool::repository::{PoolStore, SqlitePoolStore};
use std::sync::Arc;

#[tokio::test]
async fn test_list_entries_with_and_without_filter() {
    logging::init_test();
    let (_temp, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let store = Arc::new(SqlitePoolStore::new(&db_path).expect("Failed to create store"));

    let first = store
        .insert_entry(test_helpers::new_ean_entry("8437012345678"), "tester")
        .await
        .expect("insert failed");
    store
        .insert_entry(test_helpers::new_upc_entry("012345678905"), "tester")
        .await
        .expect("insert failed");
    store
        .archive_entry(&first.id, "tester")
        .await
        .expect("archive failed");

    // 无过滤：全量返回
    let all = store.list_entries(None).await.expect("list failed");
    assert_eq!(all.len(), 2);

    // 按状态过滤
    let available = store
        .list_entries(Some(PoolStatus::Available))
        .await
        .expect("list failed");
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].code.as_deref(), Some("012345678905"));

    let archived = store
        .list_entries(Some(PoolStatus::Archived))
        .await
        .expect("list failed");
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].id, first.id);

    let assigned = store
        .list_entries(Some(PoolStatus::Assigned))
        .await
        .expect("list failed");
    assert!(assigned.is_empty());

    let summary = store.summarize().await.expect("summarize failed");
    assert_eq!(summary.available, 1);
    assert_eq!(summary.archived, 1);
    assert_eq!(summary.total, 2);
}
