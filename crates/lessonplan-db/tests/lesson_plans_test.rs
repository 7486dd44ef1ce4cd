//! Integration tests for the `lesson_plans` schema and queries.
//!
//! These need a PostgreSQL server: either `LESSONPLAN_TEST_PG_URL` or a
//! Docker daemon for testcontainers. Each test gets its own database.

use sqlx::Row;

use lessonplan_db::models::NewLessonPlan;
use lessonplan_db::queries::lesson_plans;
use lessonplan_test_utils::{create_test_db, drop_test_db};

fn sample_record<'a>(content: &'a str) -> NewLessonPlan<'a> {
    NewLessonPlan {
        topic: "Fotossíntese",
        grade_level: "7º ano",
        subject: "Ciências",
        learning_context: None,
        duration_minutes: Some("45"),
        generated_content: content,
        prompt_debug: "prompt text",
    }
}

#[tokio::test]
async fn migrations_create_table_and_function() {
    let (pool, db_name) = create_test_db().await;

    let row = sqlx::query(
        "SELECT EXISTS(SELECT 1 FROM pg_proc WHERE proname = 'insert_lesson_plan') AS has_fn, \
                EXISTS(SELECT 1 FROM pg_tables WHERE tablename = 'lesson_plans') AS has_table",
    )
    .fetch_one(&pool)
    .await
    .expect("catalog query should succeed");

    assert!(row.get::<bool, _>("has_fn"));
    assert!(row.get::<bool, _>("has_table"));

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn insert_returns_id_and_stores_raw_content() {
    let (pool, db_name) = create_test_db().await;

    let raw = "```json\n{\"not\": \"validated\"}\n```";
    let id = lesson_plans::insert_lesson_plan(&pool, &sample_record(raw))
        .await
        .expect("insert should succeed");

    let stored = lesson_plans::get_lesson_plan(&pool, id)
        .await
        .expect("fetch should succeed")
        .expect("row should exist");

    assert_eq!(stored.id, id);
    assert_eq!(stored.generated_content, raw);
    assert_eq!(stored.topic, "Fotossíntese");
    assert_eq!(stored.duration_minutes.as_deref(), Some("45"));
    assert!(stored.learning_context.is_none());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn each_insert_gets_a_distinct_id() {
    let (pool, db_name) = create_test_db().await;

    let a = lesson_plans::insert_lesson_plan(&pool, &sample_record("{}"))
        .await
        .unwrap();
    let b = lesson_plans::insert_lesson_plan(&pool, &sample_record("{}"))
        .await
        .unwrap();
    assert_ne!(a, b);

    let count = lesson_plans::count_lesson_plans(&pool).await.unwrap();
    assert_eq!(count, 2);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn get_missing_lesson_plan_returns_none() {
    let (pool, db_name) = create_test_db().await;

    let found = lesson_plans::get_lesson_plan(&pool, uuid::Uuid::new_v4())
        .await
        .unwrap();
    assert!(found.is_none());

    pool.close().await;
    drop_test_db(&db_name).await;
}
