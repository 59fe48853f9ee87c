use std::net::TcpListener;

use actix_governor::Governor;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::{NormalizePath, TrailingSlash};
use actix_web::web::Data;
use actix_web::{web, App, HttpServer};

use crate::common::word_count::WordCounter;
use crate::common::Pool;
use crate::configuration::ApplicationConfiguration;
use crate::rate_limiting::{build_rate_limiting_conf, RateLimitingConf};
use crate::routes;
use crate::services::jobs::ArticleJobs;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool,
    pub word_counter: WordCounter,
    pub jobs: ArticleJobs,
}

impl AppState {
    pub fn new(db: Pool, word_counter: WordCounter) -> Self {
        let jobs = ArticleJobs::new(db.clone(), word_counter.clone());
        AppState {
            db,
            word_counter,
            jobs,
        }
    }
}

/// Register the state and every route of the API, without any middleware.
pub fn configure_app(state: Data<AppState>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(state).configure(routes::configure);
    }
}

/// The application as served, middlewares included.
pub fn build_app(
    state: Data<AppState>,
    governor_conf: &RateLimitingConf,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(Governor::new(governor_conf))
        .wrap(tracing_actix_web::TracingLogger::default())
        .wrap(NormalizePath::new(TrailingSlash::Trim))
        .configure(configure_app(state))
}

pub async fn startup(
    state: AppState,
    configuration: &ApplicationConfiguration,
    listener: TcpListener,
) -> anyhow::Result<()> {
    let governor_conf = build_rate_limiting_conf(&configuration.rate_limiting)?;
    let state = Data::new(state);

    HttpServer::new(move || build_app(state.clone(), &governor_conf))
        .listen(listener)?
        .run()
        .await?;

    Ok(())
}
