use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;

use crate::common::articles;
use crate::common::model::{NewArticle, WordCountFilter};
use crate::routes::ApiError;
use crate::startup::AppState;

#[derive(Debug, Deserialize)]
pub struct ArticleChannelUpdate {
    id: i64,
    channel_name: String,
}

#[get("/articles")]
#[tracing::instrument(skip(app_state))]
pub async fn get_articles(
    filter: web::Query<WordCountFilter>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let articles = articles::select_all(&app_state.db, filter.into_inner()).await?;
    Ok(HttpResponse::Ok().json(articles))
}

#[get("/articles/{id}")]
#[tracing::instrument(skip(app_state))]
pub async fn get_article(
    id: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let article = articles::select_by_id(&app_state.db, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(article))
}

/// Validate the article right away, the page itself is fetched in the background.
#[post("/articles")]
#[tracing::instrument(skip(app_state))]
pub async fn new_article(
    new_article: web::Json<NewArticle>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let new_article = new_article.into_inner();
    articles::validate_new_article(&app_state.db, &new_article.url, new_article.channel_id)
        .await?;

    app_state.jobs.submit(new_article);

    Ok(HttpResponse::Ok().json("Article will be fetched and created in the background"))
}

#[put("/articles")]
#[tracing::instrument(skip(app_state))]
pub async fn update_article_channel(
    update: web::Json<ArticleChannelUpdate>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let article =
        articles::update_article_channel(&app_state.db, update.id, &update.channel_name).await?;
    Ok(HttpResponse::Ok().json(article))
}

#[delete("/articles/{id}")]
#[tracing::instrument(skip(app_state))]
pub async fn delete_article(
    id: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    articles::delete_article(&app_state.db, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json("Article deleted successfully"))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_articles)
        .service(new_article)
        .service(update_article_channel)
        .service(get_article)
        .service(delete_article);
}
