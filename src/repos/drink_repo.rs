/*
 * Responsibility
 * - SQLx operations on the drink table
 * - Receives a SqlitePool and provides CRUD
 * - Writes run in an explicit transaction: commit, or roll back when dropped
 */
use sqlx::{FromRow, SqlitePool};

use crate::repos::error::{RepoError, RepoResult};

/// `recipe` holds the serialized ingredient list exactly as stored.
#[derive(Debug, Clone, FromRow)]
pub struct DrinkRow {
    pub id: i64,
    pub title: String,
    pub recipe: String,
}

/// Idempotent bootstrap for a fresh database file.
pub async fn ensure_schema(db: &SqlitePool) -> RepoResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS drink (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL UNIQUE,
            recipe TEXT NOT NULL
        )
        "#,
    )
    .execute(db)
    .await?;

    Ok(())
}

pub async fn list(db: &SqlitePool) -> RepoResult<Vec<DrinkRow>> {
    let rows = sqlx::query_as::<_, DrinkRow>(
        r#"
        SELECT id, title, recipe
        FROM drink
        ORDER BY id ASC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn create(db: &SqlitePool, title: &str, recipe: &str) -> RepoResult<DrinkRow> {
    let mut tx = db.begin().await?;

    let row = sqlx::query_as::<_, DrinkRow>(
        r#"
        INSERT INTO drink (title, recipe)
        VALUES (?1, ?2)
        RETURNING id, title, recipe
        "#,
    )
    .bind(title)
    .bind(recipe)
    .fetch_one(&mut *tx)
    .await
    .map_err(RepoError::from_sqlx)?;

    tx.commit().await?;

    Ok(row)
}

pub async fn update(
    db: &SqlitePool,
    id: i64,
    title: &str,
    recipe: Option<&str>,
) -> RepoResult<Option<DrinkRow>> {
    // recipe: None -> keep the stored recipe
    let mut tx = db.begin().await?;

    let row = sqlx::query_as::<_, DrinkRow>(
        r#"
        UPDATE drink
        SET
            title = ?2,
            recipe = COALESCE(?3, recipe)
        WHERE id = ?1
        RETURNING id, title, recipe
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(recipe)
    .fetch_optional(&mut *tx)
    .await
    .map_err(RepoError::from_sqlx)?;

    tx.commit().await?;

    Ok(row)
}

pub async fn delete(db: &SqlitePool, id: i64) -> RepoResult<bool> {
    let mut tx = db.begin().await?;

    let result = sqlx::query(
        r#"
        DELETE FROM drink
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(result.rows_affected() > 0)
}
