#![cfg(feature = "db-tests")]
//! Postgres-backed repository tests.
//!
//! These need a reachable database with the migrations applied; configure
//! it with the STOCKROOM_DB_* environment variables and run with
//! `--features db-tests`. Each test works in its own project row so runs
//! stay independent.

use deadpool_postgres::Pool;
use stockroom_api::config::DbConfig;
use stockroom_api::error::ApiResult;
use stockroom_api::repo::{GoodsRepository, PgGoodsRepository};
use stockroom_core::{ProjectId, RepoError};

fn test_pool() -> ApiResult<Pool> {
    DbConfig::from_env().create_pool()
}

async fn create_project(pool: &Pool, name: &str) -> ProjectId {
    let conn = pool.get().await.unwrap();
    let row = conn
        .query_one(
            "INSERT INTO projects (name) VALUES ($1) RETURNING id",
            &[&name],
        )
        .await
        .unwrap();
    row.get(0)
}

#[tokio::test]
async fn create_assigns_next_priority_and_defaults() -> ApiResult<()> {
    let pool = test_pool()?;
    let repo = PgGoodsRepository::new(pool.clone());
    let project_id = create_project(&pool, "priority-test").await;

    let first = repo.create(project_id, "first").await?;
    let second = repo.create(project_id, "second").await?;

    assert!(second.priority > first.priority);
    assert_eq!(second.description, "");
    assert!(!second.removed);
    Ok(())
}

#[tokio::test]
async fn create_rejects_unknown_project() -> ApiResult<()> {
    let pool = test_pool()?;
    let repo = PgGoodsRepository::new(pool);

    let err = repo.create(-1, "orphan").await.unwrap_err();
    assert!(matches!(err, RepoError::ProjectNotFound { project_id: -1 }));
    Ok(())
}

#[tokio::test]
async fn update_treats_empty_description_as_untouched() -> ApiResult<()> {
    let pool = test_pool()?;
    let repo = PgGoodsRepository::new(pool.clone());
    let project_id = create_project(&pool, "update-test").await;

    let good = repo.create(project_id, "original").await?;
    let described = repo
        .update(good.id, project_id, "original", "keep me")
        .await?;
    assert_eq!(described.description, "keep me");

    let renamed = repo.update(good.id, project_id, "renamed", "").await?;
    assert_eq!(renamed.name, "renamed");
    assert_eq!(renamed.description, "keep me");
    Ok(())
}

#[tokio::test]
async fn update_on_wrong_project_is_not_found() -> ApiResult<()> {
    let pool = test_pool()?;
    let repo = PgGoodsRepository::new(pool.clone());
    let project_id = create_project(&pool, "pair-test").await;
    let other_project = create_project(&pool, "pair-test-other").await;

    let good = repo.create(project_id, "paired").await?;
    let err = repo
        .update(good.id, other_project, "renamed", "")
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::GoodNotFound { .. }));
    Ok(())
}

#[tokio::test]
async fn remove_is_a_soft_delete() -> ApiResult<()> {
    let pool = test_pool()?;
    let repo = PgGoodsRepository::new(pool.clone());
    let project_id = create_project(&pool, "remove-test").await;

    let good = repo.create(project_id, "doomed").await?;
    let removed = repo.remove(good.id, project_id, true).await?;
    assert!(removed.removed);
    assert_eq!(removed.id, good.id);

    // The row still exists and stays mutable.
    let renamed = repo.update(good.id, project_id, "still here", "").await?;
    assert!(renamed.removed);
    assert_eq!(renamed.name, "still here");
    Ok(())
}

#[tokio::test]
async fn list_defaults_limit_zero_to_ten() -> ApiResult<()> {
    let pool = test_pool()?;
    let repo = PgGoodsRepository::new(pool.clone());
    let project_id = create_project(&pool, "list-test").await;

    for i in 0..12 {
        repo.create(project_id, &format!("good-{i}")).await?;
    }

    let page = repo.get_list(0, 0).await?;
    assert!(page.goods.len() <= 10);
    assert_eq!(page.meta.limit, 0);

    // Ordered by id ascending.
    let ids: Vec<_> = page.goods.iter().map(|g| g.id).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
    Ok(())
}
