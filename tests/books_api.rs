mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use bookshelf_server::library::Book;
use common::TestApp;

async fn server() -> (TestServer, TestApp) {
    let app = TestApp::new().await;
    let server = TestServer::new(app.router.clone()).unwrap();
    (server, app)
}

async fn add(server: &TestServer, body: Value) -> Book {
    let response = server.post("/addbook").json(&body).await;
    response.assert_status_ok();
    response.json::<Book>()
}

#[tokio::test]
async fn test_health() {
    let (server, _app) = server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

#[tokio::test]
async fn test_add_then_list() {
    let (server, _app) = server().await;

    // Warm the listing cache first
    let empty = server.get("/getall").await.json::<Vec<Book>>();
    assert!(empty.is_empty());

    let book = add(
        &server,
        json!({
            "title": "Dune",
            "author": "Frank Herbert",
            "category": "FICTION",
            "epubFileName": "abc_dune.epub"
        }),
    )
    .await;

    assert!(book.id > 0);
    assert_eq!(book.cover_image_path.as_deref(), Some("default-cover.jpg"));
    assert!(book.upload_time.is_some());

    let listed = server.get("/getall").await.json::<Vec<Book>>();
    assert_eq!(listed, vec![book.clone()]);

    let fetched = server
        .get("/getbook")
        .add_query_param("id", book.id)
        .await
        .json::<Book>();
    assert_eq!(fetched, book);
}

#[tokio::test]
async fn test_cover_url_sets_cover_path() {
    let (server, _app) = server().await;
    let book = add(
        &server,
        json!({ "title": "Emma", "coverUrl": "/covers/cover_123.png" }),
    )
    .await;

    assert_eq!(book.cover_image_path.as_deref(), Some("cover_123.png"));
    assert_eq!(book.cover_url(), "/covers/cover_123.png");
}

#[tokio::test]
async fn test_filtering() {
    let (server, _app) = server().await;
    add(&server, json!({ "title": "Dune", "author": "Frank Herbert", "category": "FICTION" })).await;
    add(&server, json!({ "title": "A Study in Scarlet", "author": "Arthur Conan Doyle", "category": "DETECTIVE" })).await;
    add(&server, json!({ "title": "Sapiens", "author": "Yuval Noah Harari", "category": "HISTORY" })).await;

    let by_title = server
        .get("/getall")
        .add_query_param("title", "SCARLET")
        .await
        .json::<Vec<Book>>();
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].title, "A Study in Scarlet");

    let by_category = server
        .get("/getall")
        .add_query_param("category", "history")
        .await
        .json::<Vec<Book>>();
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].title, "Sapiens");

    let blank = server
        .get("/getall")
        .add_query_param("title", "  ")
        .await
        .json::<Vec<Book>>();
    assert_eq!(blank.len(), 3);

    let response = server
        .get("/getall")
        .add_query_param("category", "POETRY")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "bad_request");
}

#[tokio::test]
async fn test_filtering_non_ascii_titles_and_authors() {
    let (server, _app) = server().await;
    add(&server, json!({ "title": "Émile", "author": "Jean-Jacques Rousseau" })).await;
    add(&server, json!({ "title": "Анна Каренина", "author": "Лев Толстой" })).await;

    let exact = server
        .get("/getall")
        .add_query_param("title", "Émile")
        .await
        .json::<Vec<Book>>();
    assert_eq!(exact.len(), 1);

    let upper = server
        .get("/getall")
        .add_query_param("title", "ÉMILE")
        .await
        .json::<Vec<Book>>();
    assert_eq!(upper.len(), 1);

    let by_author = server
        .get("/getall")
        .add_query_param("author", "ТОЛСТОЙ")
        .await
        .json::<Vec<Book>>();
    assert_eq!(by_author.len(), 1);
    assert_eq!(by_author[0].title, "Анна Каренина");
}

#[tokio::test]
async fn test_update() {
    let (server, _app) = server().await;
    let book = add(&server, json!({ "title": "Dune", "author": "Frank Herbert" })).await;

    // Populate the per-book cache so the update must invalidate it
    server.get("/getbook").add_query_param("id", book.id).await.assert_status_ok();

    let response = server
        .put("/upbook")
        .json(&json!({
            "id": book.id,
            "title": "Dune Messiah",
            "author": "Frank Herbert",
            "category": "FICTION",
            "coverImagePath": "cover_x.jpg"
        }))
        .await;
    response.assert_status_ok();
    let updated = response.json::<Book>();
    assert_eq!(updated.title, "Dune Messiah");
    assert_eq!(updated.upload_time, book.upload_time);

    let fetched = server
        .get("/getbook")
        .add_query_param("id", book.id)
        .await
        .json::<Book>();
    assert_eq!(fetched, updated);

    let missing = server
        .put("/upbook")
        .json(&json!({ "id": 999, "title": "Ghost" }))
        .await;
    missing.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete() {
    let (server, _app) = server().await;
    let book = add(&server, json!({ "title": "Dune" })).await;
    server.get("/getall").await.assert_status_ok();
    server.get("/getbook").add_query_param("id", book.id).await.assert_status_ok();

    server
        .delete("/delebook")
        .add_query_param("id", book.id)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert!(server.get("/getall").await.json::<Vec<Book>>().is_empty());
    server
        .get("/getbook")
        .add_query_param("id", book.id)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete("/delebook")
        .add_query_param("id", book.id)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_ids() {
    let (server, _app) = server().await;
    server.get("/getbook").await.assert_status(StatusCode::BAD_REQUEST);
    server
        .get("/getbook")
        .add_query_param("id", "abc")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .get("/getbook")
        .add_query_param("id", 41)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_title_rejected() {
    let (server, _app) = server().await;
    server
        .post("/addbook")
        .json(&json!({ "title": "   " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_statistics() {
    let (server, _app) = server().await;
    add(&server, json!({ "title": "A", "category": "FICTION" })).await;
    add(&server, json!({ "title": "B", "category": "FICTION" })).await;
    add(&server, json!({ "title": "C", "category": "BIOGRAPHY" })).await;
    add(&server, json!({ "title": "D" })).await;

    let first = server.get("/statistics").await.json::<Value>();
    assert_eq!(
        first,
        json!({
            "total": 4,
            "categories": [
                { "name": "Fiction", "count": 2 },
                { "name": "Biography", "count": 1 },
                { "name": "Other", "count": 1 }
            ]
        })
    );

    // Snapshot stays until it expires
    add(&server, json!({ "title": "E", "category": "HISTORY" })).await;
    let second = server.get("/statistics").await.json::<Value>();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_statistics_invalidated_when_enabled() {
    let mut config = bookshelf_server::Config::default();
    config.cache.invalidate_stats_on_write = true;
    let app = TestApp::with_config(config).await;
    let server = TestServer::new(app.router.clone()).unwrap();

    add(&server, json!({ "title": "A" })).await;
    assert_eq!(server.get("/statistics").await.json::<Value>()["total"], 1);

    add(&server, json!({ "title": "B" })).await;
    assert_eq!(server.get("/statistics").await.json::<Value>()["total"], 2);
}
