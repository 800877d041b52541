// ABOUTME: Integration tests for scan ingestion and monthly stats recomputation
// ABOUTME: Covers score validation, month windows, deltas, and empty-month cleanup

mod common;

use chrono::{TimeZone, Utc};
use common::*;
use lumora_core::ChangeEvent;
use lumora_insights::{MonthlyStatsEngine, ScanInput, ScanStorage, StatStorage};
use lumora_storage::StorageError;

fn scan_input(overall: f64, captured: chrono::DateTime<Utc>) -> ScanInput {
    ScanInput {
        captured_at: Some(captured),
        hydration_score: 50.0,
        clarity_score: 55.0,
        texture_score: 60.0,
        overall_score: overall,
        image_key: None,
    }
}

fn march(day: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, 10, 0, 0).unwrap()
}

#[tokio::test]
async fn test_record_scan_emits_event_with_capture_time() {
    let pool = setup_test_db().await;
    let user = create_user(&pool, "usr-scan").await;

    let scans = ScanStorage::new(pool.clone());
    let captured = march(5);
    let (scan, event) = scans.record_scan(&user, scan_input(72.0, captured)).await.unwrap();

    assert_eq!(scan.user_id, user);
    assert_eq!(scan.overall_score, 72.0);
    match event {
        ChangeEvent::ScanRecorded {
            scan_id,
            user_id,
            captured_at,
        } => {
            assert_eq!(scan_id, scan.id);
            assert_eq!(user_id, user);
            assert_eq!(captured_at, captured);
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_scores_outside_range_rejected() {
    let pool = setup_test_db().await;
    let user = create_user(&pool, "usr-range").await;

    let scans = ScanStorage::new(pool.clone());
    let err = scans
        .record_scan(
            &user,
            ScanInput {
                captured_at: None,
                hydration_score: 110.0,
                clarity_score: 55.0,
                texture_score: 60.0,
                overall_score: 70.0,
                image_key: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Validation(_)));
}

#[tokio::test]
async fn test_recompute_aggregates_one_month() {
    let pool = setup_test_db().await;
    let user = create_user(&pool, "usr-agg").await;

    let scans = ScanStorage::new(pool.clone());
    scans.record_scan(&user, scan_input(70.0, march(3))).await.unwrap();
    scans.record_scan(&user, scan_input(90.0, march(20))).await.unwrap();
    // Outside the window
    scans
        .record_scan(
            &user,
            scan_input(10.0, Utc.with_ymd_and_hms(2026, 2, 27, 9, 0, 0).unwrap()),
        )
        .await
        .unwrap();

    let engine = MonthlyStatsEngine::new(pool.clone());
    let stat = engine.recompute(&user, 2026, 3).await.unwrap().unwrap();

    assert_eq!(stat.month, "2026-03");
    assert_eq!(stat.scan_count, 2);
    assert_eq!(stat.avg_overall, Some(80.0));
    assert_eq!(stat.best_overall, Some(90.0));
    assert_eq!(stat.delta_overall, None);
}

#[tokio::test]
async fn test_delta_compares_to_previous_month() {
    let pool = setup_test_db().await;
    let user = create_user(&pool, "usr-delta").await;

    let scans = ScanStorage::new(pool.clone());
    scans
        .record_scan(
            &user,
            scan_input(50.0, Utc.with_ymd_and_hms(2026, 2, 10, 8, 0, 0).unwrap()),
        )
        .await
        .unwrap();
    scans.record_scan(&user, scan_input(70.0, march(12))).await.unwrap();

    let engine = MonthlyStatsEngine::new(pool.clone());
    engine.recompute(&user, 2026, 2).await.unwrap();
    let stat = engine.recompute(&user, 2026, 3).await.unwrap().unwrap();

    assert_eq!(stat.delta_overall, Some(20.0));
}

#[tokio::test]
async fn test_recompute_removes_row_when_month_empties() {
    let pool = setup_test_db().await;
    let user = create_user(&pool, "usr-empty").await;

    let scans = ScanStorage::new(pool.clone());
    let (scan, _event) = scans.record_scan(&user, scan_input(64.0, march(8))).await.unwrap();

    let engine = MonthlyStatsEngine::new(pool.clone());
    assert!(engine.recompute(&user, 2026, 3).await.unwrap().is_some());

    let event = scans.delete_scan(&scan.id).await.unwrap();
    assert!(matches!(event, ChangeEvent::ScanDeleted { .. }));

    assert!(engine.recompute(&user, 2026, 3).await.unwrap().is_none());

    let stats = StatStorage::new(pool.clone());
    assert!(stats.get_for_month(&user, "2026-03").await.unwrap().is_none());
}

#[tokio::test]
async fn test_recompute_is_idempotent() {
    let pool = setup_test_db().await;
    let user = create_user(&pool, "usr-idem").await;

    let scans = ScanStorage::new(pool.clone());
    scans.record_scan(&user, scan_input(75.0, march(1))).await.unwrap();

    let engine = MonthlyStatsEngine::new(pool.clone());
    let first = engine.recompute(&user, 2026, 3).await.unwrap().unwrap();
    let second = engine.recompute(&user, 2026, 3).await.unwrap().unwrap();

    assert_eq!(first.scan_count, second.scan_count);
    assert_eq!(first.avg_overall, second.avg_overall);
    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn test_recompute_unknown_user_errors() {
    let pool = setup_test_db().await;

    let engine = MonthlyStatsEngine::new(pool.clone());
    let err = engine.recompute("usr-ghost", 2026, 3).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

#[tokio::test]
async fn test_recompute_invalid_month_errors() {
    let pool = setup_test_db().await;
    let user = create_user(&pool, "usr-badmonth").await;

    let engine = MonthlyStatsEngine::new(pool.clone());
    let err = engine.recompute(&user, 2026, 13).await.unwrap_err();
    assert!(matches!(err, StorageError::Validation(_)));
}

#[tokio::test]
async fn test_scans_cascade_with_user_deletion() {
    let pool = setup_test_db().await;
    let user = create_user(&pool, "usr-cascade").await;

    let scans = ScanStorage::new(pool.clone());
    let (scan, _event) = scans.record_scan(&user, scan_input(80.0, march(9))).await.unwrap();

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(&user)
        .execute(&pool)
        .await
        .unwrap();

    let err = scans.get_scan(&scan.id).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}
