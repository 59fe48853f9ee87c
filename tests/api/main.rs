use actix_web::http::StatusCode;
use actix_web::{test, App};
use serde_json::{json, Value};
use speculoos::prelude::*;
use wiremock::MockServer;

use article_counter::common::model::{Article, Channel};
use article_counter::startup::{build_app, configure_app};
use helpers::{build_state, client, mount_page, rate_limiting_conf, wait_for_article};


#[actix_web::test]
async fn index_says_nothing() {
    let app = test::init_service(App::new().configure(configure_app(build_state().await))).await;

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert_that(&body).is_equal_to(json!({"message": "Nothing to see here :eyes:"}));
}

#[actix_web::test]
async fn channel_lifecycle() {
    let app = test::init_service(App::new().configure(configure_app(build_state().await))).await;

    let created: Channel = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/channels")
            .set_json(json!({"name": "DummyChannel"}))
            .to_request(),
    )
    .await;
    assert_that(&created.id).is_equal_to(1_i64);
    assert_that(&created.name.as_str()).is_equal_to("DummyChannel");

    let renamed: Channel = test::call_and_read_body_json(
        &app,
        test::TestRequest::put()
            .uri("/channels")
            .set_json(json!({"id": 1, "name": "DummyChannel2"}))
            .to_request(),
    )
    .await;
    assert_that(&renamed.name.as_str()).is_equal_to("DummyChannel2");

    let all: Vec<Channel> =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/channels").to_request())
            .await;
    assert_that(&all).has_length(1);

    let deleted: String = test::call_and_read_body_json(
        &app,
        test::TestRequest::delete().uri("/channels/1").to_request(),
    )
    .await;
    assert_that(&deleted.as_str()).is_equal_to("Channel deleted successfully");

    let response =
        test::call_service(&app, test::TestRequest::get().uri("/channels/1").to_request()).await;
    assert_that(&response.status()).is_equal_to(StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(response).await;
    assert_that(&body["detail"]).is_equal_to(json!("Channel not found"));
    assert_that(&body["status"]).is_equal_to(json!(404));
}

#[actix_web::test]
async fn duplicate_channel_name_is_unprocessable() {
    let app = test::init_service(App::new().configure(configure_app(build_state().await))).await;
    let new_channel = || {
        test::TestRequest::post()
            .uri("/channels")
            .set_json(json!({"name": "DummyChannel"}))
            .to_request()
    };

    let first = test::call_service(&app, new_channel()).await;
    assert_that(&first.status()).is_equal_to(StatusCode::OK);

    let second = test::call_service(&app, new_channel()).await;
    assert_that(&second.status()).is_equal_to(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(second).await;
    assert_that(&body["detail"]).is_equal_to(json!("Channel name already exists"));
}

#[actix_web::test]
async fn malformed_requests_are_unprocessable() {
    let app = test::init_service(App::new().configure(configure_app(build_state().await))).await;

    let bad_json = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/channels")
            .set_json(json!({"title": "DummyChannel"}))
            .to_request(),
    )
    .await;
    assert_that(&bad_json.status()).is_equal_to(StatusCode::UNPROCESSABLE_ENTITY);

    let bad_path = test::call_service(
        &app,
        test::TestRequest::get().uri("/articles/not-a-number").to_request(),
    )
    .await;
    assert_that(&bad_path.status()).is_equal_to(StatusCode::UNPROCESSABLE_ENTITY);

    let bad_query = test::call_service(
        &app,
        test::TestRequest::get().uri("/articles?min_words=many").to_request(),
    )
    .await;
    assert_that(&bad_query.status()).is_equal_to(StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn article_is_created_in_the_background() {
    let mock = MockServer::start().await;
    let url = mount_page(&mock, "/article.html", 473).await;
    let state = build_state().await;
    let app = test::init_service(App::new().configure(configure_app(state.clone()))).await;

    test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/channels")
            .set_json(json!({"name": "DummyChannel"}))
            .to_request(),
    )
    .await;

    let acknowledgement: String = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/articles")
            .set_json(json!({"url": url, "channel_id": 1}))
            .to_request(),
    )
    .await;
    assert_that(&acknowledgement.as_str())
        .is_equal_to("Article will be fetched and created in the background");

    wait_for_article(&state.db, 1).await;

    let article: Article =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/articles/1").to_request())
            .await;
    assert_that(&article).is_equal_to(Article {
        id: 1,
        url: url.clone(),
        channel_id: 1,
        word_count: 473,
    });

    let of_channel: Vec<Article> = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/channels/1/articles").to_request(),
    )
    .await;
    assert_that(&of_channel).is_equal_to(vec![article]);

    // Already known URL, refused before anything is fetched again
    let duplicate = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/articles")
            .set_json(json!({"url": url, "channel_id": 1}))
            .to_request(),
    )
    .await;
    assert_that(&duplicate.status()).is_equal_to(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(duplicate).await;
    assert_that(&body["detail"]).is_equal_to(json!("Article URL already exists"));
}

#[actix_web::test]
async fn article_submission_is_validated_upfront() {
    let app = test::init_service(App::new().configure(configure_app(build_state().await))).await;

    let not_html = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/articles")
            .set_json(json!({"url": "https://example.com/feed.xml", "channel_id": 1}))
            .to_request(),
    )
    .await;
    assert_that(&not_html.status()).is_equal_to(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(not_html).await;
    assert_that(&body["detail"]).is_equal_to(json!("Article must be an HTML page"));

    let unknown_channel = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/articles")
            .set_json(json!({"url": "https://example.com/article.html", "channel_id": 42}))
            .to_request(),
    )
    .await;
    assert_that(&unknown_channel.status()).is_equal_to(StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(unknown_channel).await;
    assert_that(&body["detail"]).is_equal_to(json!("Channel not found"));
}

#[actix_web::test]
async fn synchronous_creation_with_unreachable_url() {
    let app = test::init_service(App::new().configure(configure_app(build_state().await))).await;
    test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/channels")
            .set_json(json!({"name": "DummyChannel"}))
            .to_request(),
    )
    .await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/channels/1/articles?article_url=random.com.url")
            .to_request(),
    )
    .await;

    assert_that(&response.status()).is_equal_to(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(response).await;
    assert_that(&body["detail"]).is_equal_to(json!("Invalid article URL"));

    let articles: Vec<Article> =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/articles").to_request())
            .await;
    assert_that(&articles).is_empty();
}

#[actix_web::test]
async fn articles_filtered_moved_and_deleted() {
    let mock = MockServer::start().await;
    let short = mount_page(&mock, "/short.html", 10).await;
    let long = mount_page(&mock, "/long.html", 500).await;
    let app = test::init_service(App::new().configure(configure_app(build_state().await))).await;

    for name in ["First", "Second"] {
        test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/channels")
                .set_json(json!({ "name": name }))
                .to_request(),
        )
        .await;
    }

    let created: Article = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri(&format!("/channels/1/articles?article_url={short}"))
            .to_request(),
    )
    .await;
    assert_that(&created.word_count).is_equal_to(10_i64);

    let created: Article = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri(&format!("/channels/name/First/articles?article_url={long}"))
            .to_request(),
    )
    .await;
    assert_that(&created.word_count).is_equal_to(500_i64);
    assert_that(&created.channel_id).is_equal_to(1_i64);

    let long_ones: Vec<Article> = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/articles?min_words=100").to_request(),
    )
    .await;
    assert_that(&long_ones).has_length(1);
    assert_that(&long_ones[0].url.as_str()).is_equal_to(long.as_str());

    let short_ones: Vec<Article> = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/articles?min_words=10&max_words=10")
            .to_request(),
    )
    .await;
    assert_that(&short_ones).has_length(1);
    assert_that(&short_ones[0].url.as_str()).is_equal_to(short.as_str());

    let moved: Article = test::call_and_read_body_json(
        &app,
        test::TestRequest::put()
            .uri("/articles")
            .set_json(json!({"id": 2, "channel_name": "Second"}))
            .to_request(),
    )
    .await;
    assert_that(&moved.channel_id).is_equal_to(2_i64);

    let missing_channel = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/articles")
            .set_json(json!({"id": 2, "channel_name": "Third"}))
            .to_request(),
    )
    .await;
    assert_that(&missing_channel.status()).is_equal_to(StatusCode::NOT_FOUND);

    let deleted: String = test::call_and_read_body_json(
        &app,
        test::TestRequest::delete().uri("/articles/2").to_request(),
    )
    .await;
    assert_that(&deleted.as_str()).is_equal_to("Article deleted successfully");

    let gone =
        test::call_service(&app, test::TestRequest::get().uri("/articles/2").to_request()).await;
    assert_that(&gone.status()).is_equal_to(StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(gone).await;
    assert_that(&body["detail"]).is_equal_to(json!("Article not found"));
}

#[actix_web::test]
async fn channel_with_articles_is_not_deleted() {
    let mock = MockServer::start().await;
    let url = mount_page(&mock, "/kept.html", 12).await;
    let app = test::init_service(App::new().configure(configure_app(build_state().await))).await;
    test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/channels")
            .set_json(json!({"name": "DummyChannel"}))
            .to_request(),
    )
    .await;
    test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/channels/1/articles?article_url={url}"))
            .to_request(),
    )
    .await;

    let response =
        test::call_service(&app, test::TestRequest::delete().uri("/channels/1").to_request()).await;

    assert_that(&response.status()).is_equal_to(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(response).await;
    assert_that(&body["detail"]).is_equal_to(json!("Channel still has articles"));

    let kept =
        test::call_service(&app, test::TestRequest::get().uri("/channels/1").to_request()).await;
    assert_that(&kept.status()).is_equal_to(StatusCode::OK);
    let articles: Vec<Article> = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/channels/1/articles").to_request(),
    )
    .await;
    assert_that(&articles).has_length(1);
}

#[actix_web::test]
async fn trailing_slashes_are_trimmed() {
    let conf = rate_limiting_conf(100);
    let app = test::init_service(build_app(build_state().await, &conf)).await;

    let created: Channel = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/channels/")
            .peer_addr(client(1))
            .set_json(json!({"name": "DummyChannel"}))
            .to_request(),
    )
    .await;
    assert_that(&created.name.as_str()).is_equal_to("DummyChannel");

    let all: Vec<Channel> = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/channels/")
            .peer_addr(client(1))
            .to_request(),
    )
    .await;
    assert_that(&all).is_equal_to(vec![created.clone()]);

    let one: Channel = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/channels/1/")
            .peer_addr(client(1))
            .to_request(),
    )
    .await;
    assert_that(&one).is_equal_to(created);
}

#[actix_web::test]
async fn clients_are_rate_limited_by_address() {
    let conf = rate_limiting_conf(2);
    let app = test::init_service(build_app(build_state().await, &conf)).await;
    let index = |host: u8, forwarded_for: &str| {
        test::TestRequest::get()
            .uri("/")
            .peer_addr(client(host))
            .insert_header(("X-Forwarded-For", forwarded_for))
            .to_request()
    };

    for _ in 0..2 {
        let response = test::call_service(&app, index(1, "203.0.113.1")).await;
        assert_that(&response.status()).is_equal_to(StatusCode::OK);
    }

    // Another forwarded address does not open a new quota
    let limited = test::call_service(&app, index(1, "203.0.113.2")).await;
    assert_that(&limited.status()).is_equal_to(StatusCode::TOO_MANY_REQUESTS);

    let other_client = test::call_service(&app, index(2, "203.0.113.1")).await;
    assert_that(&other_client.status()).is_equal_to(StatusCode::OK);
}
