#![cfg(feature = "db-tests")]
//! Postgres-backed analytical sink tests.
//!
//! These need a reachable analytical database with the migrations applied;
//! configure it with the STOCKROOM_ANALYTICS_* environment variables and
//! run with `--features db-tests`. Each test writes under its own sentinel
//! project id so runs stay independent.

use chrono::Utc;
use deadpool_postgres::Pool;
use std::time::{SystemTime, UNIX_EPOCH};
use stockroom_api::config::AnalyticsConfig;
use stockroom_api::error::ApiResult;
use stockroom_api::events::{EventSink, PgEventSink};
use stockroom_core::event::{ChangeEvent, CHANGE_EVENT_VERSION};
use stockroom_core::EventError;

fn test_pool() -> ApiResult<Pool> {
    AnalyticsConfig::from_env().create_pool()
}

fn sentinel_project_id() -> i32 {
    (SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .subsec_nanos()
        & 0x3fff_ffff) as i32
}

fn event(id: i32, project_id: i32, priority: i32) -> ChangeEvent {
    ChangeEvent {
        version: CHANGE_EVENT_VERSION,
        id,
        project_id,
        name: format!("good-{id}"),
        description: String::new(),
        priority,
        removed: false,
        event_time: Utc::now(),
    }
}

async fn count_events(pool: &Pool, project_id: i32) -> i64 {
    let conn = pool.get().await.unwrap();
    conn.query_one(
        "SELECT count(*) FROM good_events WHERE project_id = $1",
        &[&project_id],
    )
    .await
    .unwrap()
    .get(0)
}

#[tokio::test]
async fn batch_insert_lands_every_event() -> ApiResult<()> {
    let pool = test_pool()?;
    let sink = PgEventSink::new(pool.clone());
    let project_id = sentinel_project_id();

    let batch: Vec<ChangeEvent> = (1..=3).map(|id| event(id, project_id, id)).collect();
    sink.insert_batch(&batch).await.unwrap();

    assert_eq!(count_events(&pool, project_id).await, 3);
    Ok(())
}

#[tokio::test]
async fn failing_batch_writes_no_rows() -> ApiResult<()> {
    let pool = test_pool()?;
    let sink = PgEventSink::new(pool.clone());
    let project_id = sentinel_project_id();

    // NOT VALID skips existing rows; new inserts are still checked.
    let conn = pool.get().await.unwrap();
    conn.batch_execute(
        "ALTER TABLE good_events \
             DROP CONSTRAINT IF EXISTS good_events_priority_nonneg;\n\
         ALTER TABLE good_events \
             ADD CONSTRAINT good_events_priority_nonneg \
             CHECK (priority >= 0) NOT VALID",
    )
    .await
    .unwrap();
    drop(conn);

    let batch = vec![
        event(1, project_id, 1),
        event(2, project_id, 2),
        event(3, project_id, -1),
    ];
    let err = sink.insert_batch(&batch).await.unwrap_err();
    assert!(matches!(err, EventError::FlushFailed { .. }));

    // All-or-nothing: the two valid events must not have landed either.
    assert_eq!(count_events(&pool, project_id).await, 0);

    let conn = pool.get().await.unwrap();
    conn.batch_execute(
        "ALTER TABLE good_events DROP CONSTRAINT IF EXISTS good_events_priority_nonneg",
    )
    .await
    .unwrap();
    Ok(())
}
