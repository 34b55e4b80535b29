//! Repository tests for the exclusive item markdown ladder.
//!
//! Exercises the sweep, the week-regression guard and the transactional
//! bulk update against a real database.

use chrono::{Duration, Utc};
use redtag_core::markdown::{
    alert_thresholds, PROMOTE_TO_COLOR_CYCLE_AFTER_DAYS, PROMOTION_SOURCE_WEEK,
};
use redtag_db::models::exclusive_item::{
    BulkUpdateOutcome, CreateExclusiveItem, ExclusiveItem, UpdateExclusiveItem,
};
use redtag_db::repositories::ExclusiveItemRepo;
use rust_decimal::Decimal;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn today() -> chrono::NaiveDate {
    Utc::now().date_naive()
}

async fn seed(pool: &PgPool, category: &str, age_days: i64, week: i32) -> ExclusiveItem {
    let item = ExclusiveItemRepo::create(
        pool,
        &CreateExclusiveItem {
            category: category.to_string(),
            price: Decimal::new(2500, 2),
            date_arrived: today() - Duration::days(age_days),
            notes: None,
            image_path: None,
            created_by: None,
        },
    )
    .await
    .unwrap();

    sqlx::query("UPDATE exclusive_items SET week = $2 WHERE id = $1")
        .bind(item.id)
        .bind(week)
        .execute(pool)
        .await
        .unwrap();

    ExclusiveItemRepo::find_by_id(pool, item.id)
        .await
        .unwrap()
        .unwrap()
}

async fn stored_week(pool: &PgPool, id: i64) -> i32 {
    ExclusiveItemRepo::find_by_id(pool, id)
        .await
        .unwrap()
        .unwrap()
        .week
}

fn full_update(item: &ExclusiveItem, week: i32) -> UpdateExclusiveItem {
    UpdateExclusiveItem {
        category: item.category.clone(),
        price: item.price,
        week,
        notes: item.notes.clone(),
        image_path: None,
        clear_image: false,
    }
}

// ---------------------------------------------------------------------------
// Test: new items start at week 1
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_starts_at_week_one(pool: PgPool) {
    let item = ExclusiveItemRepo::create(
        &pool,
        &CreateExclusiveItem {
            category: "Clothing".to_string(),
            price: Decimal::new(1999, 2),
            date_arrived: today(),
            notes: Some("Wool coat".to_string()),
            image_path: None,
            created_by: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(item.week, 1);
    assert_eq!(item.price, Decimal::new(1999, 2));
    assert!(item.deleted_at.is_none());
}

// ---------------------------------------------------------------------------
// Test: the sweep promotes only week 4 items past the threshold
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_promote_due_only_touches_aged_week_four(pool: PgPool) {
    let due = seed(&pool, "Furniture", 28, 4).await;
    let young = seed(&pool, "Furniture", 27, 4).await;
    let old_week_three = seed(&pool, "Furniture", 60, 3).await;

    let promoted = ExclusiveItemRepo::promote_due(&pool, today(), 28).await.unwrap();
    assert_eq!(promoted, 1);

    assert_eq!(stored_week(&pool, due.id).await, 5);
    assert_eq!(stored_week(&pool, young.id).await, 4);
    assert_eq!(stored_week(&pool, old_week_three.id).await, 3);

    // A second sweep finds nothing left to do.
    let again = ExclusiveItemRepo::promote_due(&pool, today(), 28).await.unwrap();
    assert_eq!(again, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_promote_due_skips_deleted_items(pool: PgPool) {
    let item = seed(&pool, "Clothing", 40, 4).await;
    assert!(ExclusiveItemRepo::soft_delete(&pool, item.id).await.unwrap());

    let promoted = ExclusiveItemRepo::promote_due(&pool, today(), 28).await.unwrap();
    assert_eq!(promoted, 0);
}

// ---------------------------------------------------------------------------
// Test: update refuses to move an item backwards
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_rejects_week_regression(pool: PgPool) {
    let item = seed(&pool, "Bric-a-Brac", 10, 3).await;

    let regressed = ExclusiveItemRepo::update(&pool, item.id, &full_update(&item, 2))
        .await
        .unwrap();
    assert!(regressed.is_none());

    let same = ExclusiveItemRepo::update(&pool, item.id, &full_update(&item, 3))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(same.week, 3);

    let forward = ExclusiveItemRepo::update(&pool, item.id, &full_update(&item, 5))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(forward.week, 5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_image_keep_replace_clear(pool: PgPool) {
    let item = seed(&pool, "Furniture", 0, 1).await;

    let mut input = full_update(&item, 1);
    input.image_path = Some("/uploads/a.png".to_string());
    let replaced = ExclusiveItemRepo::update(&pool, item.id, &input)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(replaced.image_path.as_deref(), Some("/uploads/a.png"));

    let kept = ExclusiveItemRepo::update(&pool, item.id, &full_update(&item, 1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.image_path.as_deref(), Some("/uploads/a.png"));

    let mut input = full_update(&item, 1);
    input.clear_image = true;
    let cleared = ExclusiveItemRepo::update(&pool, item.id, &input)
        .await
        .unwrap()
        .unwrap();
    assert!(cleared.image_path.is_none());
}

// ---------------------------------------------------------------------------
// Test: bulk update is all-or-nothing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bulk_update_commits_every_entry(pool: PgPool) {
    let a = seed(&pool, "Clothing", 5, 1).await;
    let b = seed(&pool, "Clothing", 5, 2).await;

    let outcome = ExclusiveItemRepo::bulk_update(
        &pool,
        &[(a.id, Decimal::new(900, 2), 2), (b.id, Decimal::new(500, 2), 3)],
    )
    .await
    .unwrap();

    match outcome {
        BulkUpdateOutcome::Updated(items) => {
            assert_eq!(items.len(), 2);
            assert_eq!(items[0].week, 2);
            assert_eq!(items[1].price, Decimal::new(500, 2));
        }
        other => panic!("expected Updated, got {other:?}"),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bulk_update_rolls_back_on_regression(pool: PgPool) {
    let a = seed(&pool, "Clothing", 5, 1).await;
    let b = seed(&pool, "Clothing", 5, 4).await;

    let outcome = ExclusiveItemRepo::bulk_update(
        &pool,
        &[(a.id, Decimal::new(900, 2), 2), (b.id, Decimal::new(500, 2), 2)],
    )
    .await
    .unwrap();

    assert!(matches!(
        outcome,
        BulkUpdateOutcome::Regressed { id, current_week: 4 } if id == b.id
    ));

    let a_after = ExclusiveItemRepo::find_by_id(&pool, a.id).await.unwrap().unwrap();
    assert_eq!(a_after.week, 1, "first entry must be rolled back");
    assert_eq!(a_after.price, a.price);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bulk_update_reports_missing_id(pool: PgPool) {
    let a = seed(&pool, "Clothing", 5, 1).await;

    let outcome = ExclusiveItemRepo::bulk_update(
        &pool,
        &[(a.id, Decimal::new(900, 2), 2), (999_999, Decimal::new(500, 2), 2)],
    )
    .await
    .unwrap();

    assert!(matches!(outcome, BulkUpdateOutcome::Missing(999_999)));
    let a_after = ExclusiveItemRepo::find_by_id(&pool, a.id).await.unwrap().unwrap();
    assert_eq!(a_after.week, 1);
}

// ---------------------------------------------------------------------------
// Test: alerts and color cycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_alerts_applies_per_week_thresholds(pool: PgPool) {
    let week1_due = seed(&pool, "Furniture", 7, 1).await;
    let _week1_fresh = seed(&pool, "Furniture", 6, 1).await;
    let week2_due = seed(&pool, "Furniture", 14, 2).await;
    let _week3_fresh = seed(&pool, "Furniture", 20, 3).await;
    let week5 = seed(&pool, "Furniture", 0, 5).await;
    let _other_category = seed(&pool, "Clothing", 30, 1).await;

    let alerts = ExclusiveItemRepo::list_alerts(&pool, &["Furniture"], today())
        .await
        .unwrap();
    let ids: Vec<_> = alerts.iter().map(|a| a.item.id).collect();
    assert_eq!(ids, vec![week5.id, week2_due.id, week1_due.id]);
    assert_eq!(alerts[2].days_elapsed, 7);

    let none = ExclusiveItemRepo::list_alerts(&pool, &[], today()).await.unwrap();
    assert!(none.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_alerts_boundaries_follow_threshold_table(pool: PgPool) {
    let mut expected = Vec::new();
    for (week, min_days) in alert_thresholds() {
        if min_days > 0 {
            seed(&pool, "Clothing", min_days - 1, week).await;
        }
        expected.push(seed(&pool, "Clothing", min_days, week).await.id);
    }
    // Week 4 items are left to the sweep, however old.
    seed(&pool, "Clothing", 200, PROMOTION_SOURCE_WEEK).await;

    let alerts = ExclusiveItemRepo::list_alerts(&pool, &["Clothing"], today())
        .await
        .unwrap();
    let mut ids: Vec<_> = alerts.iter().map(|a| a.item.id).collect();
    ids.sort_unstable();
    expected.sort_unstable();
    assert_eq!(ids, expected);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_promote_due_never_moves_other_weeks(pool: PgPool) {
    let mut items = Vec::new();
    for week in [1, 2, 3, 5] {
        items.push(seed(&pool, "Furniture", 365, week).await);
    }

    ExclusiveItemRepo::promote_due(&pool, today(), PROMOTE_TO_COLOR_CYCLE_AFTER_DAYS)
        .await
        .unwrap();

    for item in items {
        assert_eq!(stored_week(&pool, item.id).await, item.week);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_move_to_color_cycle_requires_week_five(pool: PgPool) {
    let week4 = seed(&pool, "Furniture", 3, 4).await;
    let week5 = seed(&pool, "Furniture", 3, 5).await;

    assert!(ExclusiveItemRepo::move_to_color_cycle(&pool, week4.id)
        .await
        .unwrap()
        .is_none());

    let removed = ExclusiveItemRepo::move_to_color_cycle(&pool, week5.id)
        .await
        .unwrap()
        .unwrap();
    assert!(removed.deleted_at.is_some());
    assert!(ExclusiveItemRepo::find_by_id(&pool, week5.id)
        .await
        .unwrap()
        .is_none());
}
