use sqlx::{QueryBuilder, Sqlite};

use crate::common::channels::{self, CHANNEL_NOT_FOUND};
use crate::common::errors::{map_constraint_violation, Result, StoreError};
use crate::common::model::{Article, WordCountFilter};
use crate::common::word_count::WordCounter;
use crate::common::Pool;

pub const ARTICLE_NOT_FOUND: &str = "Article not found";
pub const ARTICLE_URL_EXISTS: &str = "Article URL already exists";
pub const NOT_AN_HTML_PAGE: &str = "Article must be an HTML page";
pub const CHANNEL_OR_ARTICLE_NOT_FOUND: &str = "Channel name or article not found";

const HTML_SUFFIXES: [&str; 2] = [".html", ".htm"];

/// Check that the URL points to an HTML page, judging by its suffix only.
pub fn check_html_suffix(url: &str) -> Result<()> {
    let url = url.to_ascii_lowercase();
    if HTML_SUFFIXES.iter().any(|suffix| url.ends_with(suffix)) {
        Ok(())
    } else {
        Err(StoreError::UnprocessableInput(NOT_AN_HTML_PAGE))
    }
}

/// Checks run before accepting an article for creation, without fetching anything:
/// HTML suffix, existing channel and unused URL, in that order.
#[tracing::instrument(skip(db))]
pub async fn validate_new_article(db: &Pool, url: &str, channel_id: i64) -> Result<()> {
    check_html_suffix(url)?;
    channels::select_by_id(db, channel_id).await?;
    check_url_unused(db, url).await
}

/// Fetch the page at `url`, count its words and record it in the given channel.
///
/// Nothing is written when the page can't be fetched.
#[tracing::instrument(skip(db, word_counter))]
pub async fn create_article(
    db: &Pool,
    word_counter: &WordCounter,
    url: &str,
    channel_id: i64,
) -> Result<Article> {
    channels::select_by_id(db, channel_id).await?;
    check_url_unused(db, url).await?;

    let word_count = word_counter.count_words(url).await.map_err(|err| {
        tracing::info!("Could not count the words of {}: {}", url, err);
        StoreError::from(err)
    })?;

    insert_article(db, url, channel_id, word_count).await
}

/// Same as [`create_article`], the channel being designated by its name.
#[tracing::instrument(skip(db, word_counter))]
pub async fn create_article_by_channel_name(
    db: &Pool,
    word_counter: &WordCounter,
    url: &str,
    channel_name: &str,
) -> Result<Article> {
    let channel = channels::select_by_name(db, channel_name)
        .await?
        .ok_or(StoreError::NotFound(CHANNEL_NOT_FOUND))?;

    create_article(db, word_counter, url, channel.id).await
}

/// Return the article with the given id.
#[tracing::instrument(skip(db))]
pub async fn select_by_id(db: &Pool, article_id: i64) -> Result<Article> {
    sqlx::query_as::<_, Article>(
        r#"
        SELECT id, url, channel_id, word_count FROM articles WHERE id = ?
        "#,
    )
    .bind(article_id)
    .fetch_optional(db)
    .await?
    .ok_or(StoreError::NotFound(ARTICLE_NOT_FOUND))
}

/// Return all the articles whose word count is within the filter bounds.
#[tracing::instrument(skip(db))]
pub async fn select_all(db: &Pool, filter: WordCountFilter) -> Result<Vec<Article>> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"
        SELECT id, url, channel_id, word_count FROM articles WHERE 1 = 1
        "#,
    );

    if let Some(min_words) = filter.min_words {
        query.push(" AND word_count >= ");
        query.push_bind(min_words);
    }

    if let Some(max_words) = filter.max_words {
        query.push(" AND word_count <= ");
        query.push_bind(max_words);
    }

    query.push(" ORDER BY id");

    let articles = query.build_query_as::<Article>().fetch_all(db).await?;

    Ok(articles)
}

/// Move an article to the channel with the given name. Nothing else changes.
#[tracing::instrument(skip(db))]
pub async fn update_article_channel(
    db: &Pool,
    article_id: i64,
    channel_name: &str,
) -> Result<Article> {
    let mut transaction = db.begin().await?;

    let channel_id = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT id FROM channels WHERE name = ?
        "#,
    )
    .bind(channel_name)
    .fetch_optional(&mut *transaction)
    .await?
    .ok_or(StoreError::NotFound(CHANNEL_OR_ARTICLE_NOT_FOUND))?;

    let article = sqlx::query_as::<_, Article>(
        r#"
        UPDATE articles SET channel_id = ? WHERE id = ? RETURNING id, url, channel_id, word_count
        "#,
    )
    .bind(channel_id)
    .bind(article_id)
    .fetch_optional(&mut *transaction)
    .await?
    .ok_or(StoreError::NotFound(CHANNEL_OR_ARTICLE_NOT_FOUND))?;

    transaction.commit().await?;

    Ok(article)
}

/// Delete an article.
#[tracing::instrument(skip(db))]
pub async fn delete_article(db: &Pool, article_id: i64) -> Result<()> {
    let deleted = sqlx::query(
        r#"
        DELETE FROM articles WHERE id = ?
        "#,
    )
    .bind(article_id)
    .execute(db)
    .await?;

    if deleted.rows_affected() == 0 {
        return Err(StoreError::NotFound(ARTICLE_NOT_FOUND));
    }

    Ok(())
}

async fn check_url_unused(db: &Pool, url: &str) -> Result<()> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM articles WHERE url = ?
        "#,
    )
    .bind(url)
    .fetch_one(db)
    .await?;

    if count > 0 {
        return Err(StoreError::Conflict(ARTICLE_URL_EXISTS));
    }

    Ok(())
}

#[tracing::instrument(skip(db), level = "debug")]
async fn insert_article(db: &Pool, url: &str, channel_id: i64, word_count: i64) -> Result<Article> {
    sqlx::query_as::<_, Article>(
        r#"
        INSERT INTO articles (url, channel_id, word_count) VALUES (?, ?, ?)
        RETURNING id, url, channel_id, word_count
        "#,
    )
    .bind(url)
    .bind(channel_id)
    .bind(word_count)
    .fetch_one(db)
    .await
    .map_err(|err| {
        map_constraint_violation(
            err,
            StoreError::Conflict(ARTICLE_URL_EXISTS),
            StoreError::NotFound(CHANNEL_NOT_FOUND),
        )
    })
}
