use crate::common::errors::{map_constraint_violation, Result, StoreError};
use crate::common::model::{Article, Channel};
use crate::common::Pool;

pub const CHANNEL_NOT_FOUND: &str = "Channel not found";
pub const CHANNEL_NAME_EXISTS: &str = "Channel name already exists";
const CHANNEL_NAME_EMPTY: &str = "Channel name must not be empty";
const CHANNEL_HAS_ARTICLES: &str = "Channel still has articles";

/// Create a new channel, its name must not be used yet.
#[tracing::instrument(skip(db))]
pub async fn create_channel(db: &Pool, name: &str) -> Result<Channel> {
    check_name(name)?;

    sqlx::query_as::<_, Channel>(
        r#"
        INSERT INTO channels (name) VALUES (?) RETURNING id, name
        "#,
    )
    .bind(name)
    .fetch_one(db)
    .await
    .map_err(|err| {
        map_constraint_violation(
            err,
            StoreError::Conflict(CHANNEL_NAME_EXISTS),
            StoreError::NotFound(CHANNEL_NOT_FOUND),
        )
    })
}

/// Return the channel with the given id.
#[tracing::instrument(skip(db))]
pub async fn select_by_id(db: &Pool, channel_id: i64) -> Result<Channel> {
    sqlx::query_as::<_, Channel>(
        r#"
        SELECT id, name FROM channels WHERE id = ?
        "#,
    )
    .bind(channel_id)
    .fetch_optional(db)
    .await?
    .ok_or(StoreError::NotFound(CHANNEL_NOT_FOUND))
}

/// Return an optional channel by its name.
#[tracing::instrument(skip(db), level = "debug")]
pub async fn select_by_name(db: &Pool, name: &str) -> Result<Option<Channel>> {
    let channel = sqlx::query_as::<_, Channel>(
        r#"
        SELECT id, name FROM channels WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(db)
    .await?;

    Ok(channel)
}

/// Return all the channels.
#[tracing::instrument(skip(db))]
pub async fn select_all(db: &Pool) -> Result<Vec<Channel>> {
    let channels = sqlx::query_as::<_, Channel>(
        r#"
        SELECT id, name FROM channels ORDER BY id
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(channels)
}

/// Rename a channel. The new name must not belong to another channel.
#[tracing::instrument(skip(db))]
pub async fn update_channel_name(db: &Pool, channel_id: i64, new_name: &str) -> Result<Channel> {
    check_name(new_name)?;

    sqlx::query_as::<_, Channel>(
        r#"
        UPDATE channels SET name = ? WHERE id = ? RETURNING id, name
        "#,
    )
    .bind(new_name)
    .bind(channel_id)
    .fetch_optional(db)
    .await
    .map_err(|err| {
        map_constraint_violation(
            err,
            StoreError::Conflict(CHANNEL_NAME_EXISTS),
            StoreError::NotFound(CHANNEL_NOT_FOUND),
        )
    })?
    .ok_or(StoreError::NotFound(CHANNEL_NOT_FOUND))
}

/// Delete a channel. Channels still owning articles are kept.
#[tracing::instrument(skip(db))]
pub async fn delete_channel(db: &Pool, channel_id: i64) -> Result<()> {
    let mut transaction = db.begin().await?;

    let articles_count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM articles WHERE channel_id = ?
        "#,
    )
    .bind(channel_id)
    .fetch_one(&mut *transaction)
    .await?;

    if articles_count > 0 {
        return Err(StoreError::Conflict(CHANNEL_HAS_ARTICLES));
    }

    let deleted = sqlx::query(
        r#"
        DELETE FROM channels WHERE id = ?
        "#,
    )
    .bind(channel_id)
    .execute(&mut *transaction)
    .await
    .map_err(|err| {
        map_constraint_violation(
            err,
            StoreError::Conflict(CHANNEL_HAS_ARTICLES),
            StoreError::Conflict(CHANNEL_HAS_ARTICLES),
        )
    })?;

    if deleted.rows_affected() == 0 {
        return Err(StoreError::NotFound(CHANNEL_NOT_FOUND));
    }

    transaction.commit().await?;
    tracing::debug!("Deleted channel {}", channel_id);

    Ok(())
}

/// Return the articles of a channel.
#[tracing::instrument(skip(db))]
pub async fn select_articles_of_channel(db: &Pool, channel_id: i64) -> Result<Vec<Article>> {
    select_by_id(db, channel_id).await?;

    let articles = sqlx::query_as::<_, Article>(
        r#"
        SELECT id, url, channel_id, word_count FROM articles WHERE channel_id = ? ORDER BY id
        "#,
    )
    .bind(channel_id)
    .fetch_all(db)
    .await?;

    Ok(articles)
}

fn check_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(StoreError::UnprocessableInput(CHANNEL_NAME_EMPTY));
    }

    Ok(())
}
