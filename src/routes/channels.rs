use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;

use crate::common::{articles, channels};
use crate::routes::ApiError;
use crate::startup::AppState;

#[derive(Debug, Deserialize)]
pub struct NewChannel {
    name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatedChannel {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
pub struct ArticleUrlParameter {
    article_url: String,
}

#[get("/channels")]
#[tracing::instrument(skip(app_state))]
pub async fn get_channels(app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let channels = channels::select_all(&app_state.db).await?;
    Ok(HttpResponse::Ok().json(channels))
}

#[get("/channels/{id}")]
#[tracing::instrument(skip(app_state))]
pub async fn get_channel(
    id: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let channel = channels::select_by_id(&app_state.db, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(channel))
}

#[post("/channels")]
#[tracing::instrument(skip(app_state))]
pub async fn new_channel(
    new_channel: web::Json<NewChannel>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let channel = channels::create_channel(&app_state.db, &new_channel.name).await?;
    Ok(HttpResponse::Ok().json(channel))
}

#[put("/channels")]
#[tracing::instrument(skip(app_state))]
pub async fn update_channel(
    updated_channel: web::Json<UpdatedChannel>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let channel = channels::update_channel_name(
        &app_state.db,
        updated_channel.id,
        &updated_channel.name,
    )
    .await?;
    Ok(HttpResponse::Ok().json(channel))
}

#[delete("/channels/{id}")]
#[tracing::instrument(skip(app_state))]
pub async fn delete_channel(
    id: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    channels::delete_channel(&app_state.db, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json("Channel deleted successfully"))
}

#[get("/channels/{id}/articles")]
#[tracing::instrument(skip(app_state))]
pub async fn get_articles_of_channel(
    id: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let articles = channels::select_articles_of_channel(&app_state.db, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(articles))
}

/// Create an article and wait for its page to be fetched.
#[post("/channels/{id}/articles")]
#[tracing::instrument(skip(app_state))]
pub async fn new_article_in_channel(
    id: web::Path<i64>,
    parameter: web::Query<ArticleUrlParameter>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let article = articles::create_article(
        &app_state.db,
        &app_state.word_counter,
        &parameter.article_url,
        id.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(article))
}

#[post("/channels/name/{channel_name}/articles")]
#[tracing::instrument(skip(app_state))]
pub async fn new_article_in_named_channel(
    channel_name: web::Path<String>,
    parameter: web::Query<ArticleUrlParameter>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let article = articles::create_article_by_channel_name(
        &app_state.db,
        &app_state.word_counter,
        &parameter.article_url,
        &channel_name,
    )
    .await?;
    Ok(HttpResponse::Ok().json(article))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_channels)
        .service(new_channel)
        .service(update_channel)
        .service(new_article_in_named_channel)
        .service(get_articles_of_channel)
        .service(new_article_in_channel)
        .service(get_channel)
        .service(delete_channel);
}
