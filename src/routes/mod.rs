use actix_web::http::StatusCode;
use actix_web::{get, web, HttpRequest, HttpResponse, ResponseError};
use serde_json::json;

use crate::common::errors::{ErrorKind, StoreError};

pub mod articles;
pub mod channels;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    StoreError(#[from] StoreError),
    #[error("{0}")]
    InvalidInput(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::StoreError(error) => match error.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Conflict | ErrorKind::UnprocessableInput => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ErrorKind::Database => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let (problem, title, detail) = match self {
            ApiError::StoreError(error) => match error.kind() {
                ErrorKind::NotFound => ("/problem/not-found", "Object not found", error.to_string()),
                ErrorKind::Conflict => ("/problem/conflict", "Object already exists", error.to_string()),
                ErrorKind::UnprocessableInput => {
                    ("/problem/invalid-input", "Invalid input", error.to_string())
                }
                ErrorKind::Database => {
                    tracing::error!("{}", error);
                    (
                        "/problem/database",
                        "Error with the database",
                        String::from("Unexpected error with the database"),
                    )
                }
            },
            ApiError::InvalidInput(detail) => {
                ("/problem/invalid-input", "Invalid input", detail.clone())
            }
        };

        HttpResponse::build(status).json(json!({
            "type": problem,
            "title": title,
            "status": status.as_u16(),
            "detail": detail,
        }))
    }
}

#[get("/")]
#[tracing::instrument]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({"message": "Nothing to see here :eyes:"}))
}

fn invalid_input<E: std::fmt::Display>(error: E, _: &HttpRequest) -> actix_web::Error {
    ApiError::InvalidInput(error.to_string()).into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PathConfig::default().error_handler(invalid_input))
        .app_data(web::QueryConfig::default().error_handler(invalid_input))
        .app_data(web::JsonConfig::default().error_handler(invalid_input))
        .service(index)
        .configure(channels::configure)
        .configure(articles::configure);
}
