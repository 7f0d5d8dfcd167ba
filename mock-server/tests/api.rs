use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Item, ItemQuery, User};
use serde_json::Value;
use tower::{Service, ServiceExt};

const BOUNDARY: &str = "test-boundary";
const ALICE: &str = "sessionid=1";
const BOB: &str = "sessionid=2";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str, session: Option<&str>) -> Request<String> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = session {
        builder = builder.header(http::header::COOKIE, cookie);
    }
    builder.body(String::new()).unwrap()
}

fn multipart(method: &str, uri: &str, session: Option<&str>, fields: &[(&str, &str)]) -> Request<String> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(cookie) = session {
        builder = builder.header(http::header::COOKIE, cookie);
    }
    builder.body(body).unwrap()
}

fn item_fields<'a>(title: &'a str, price: &'a str, end_date: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("title", title),
        ("desc", "A fine thing"),
        ("starting_price", price),
        ("end_date", end_date),
    ]
}

async fn call(app: &mut axum::routing::RouterIntoService<String>, req: Request<String>) -> axum::response::Response {
    ServiceExt::ready(app).await.unwrap().call(req).await.unwrap()
}

// --- session ---

#[tokio::test]
async fn profile_is_null_when_logged_out() {
    let resp = app().oneshot(get("/api/profile/", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "OK");
    assert!(json["value"].is_null());
}

#[tokio::test]
async fn profile_returns_session_user() {
    let resp = app().oneshot(get("/api/profile/", Some(ALICE))).await.unwrap();
    let json = body_json(resp).await;
    let user: User = serde_json::from_value(json["value"].clone()).unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert!(user.avatar_path.is_none());
}

#[tokio::test]
async fn login_sets_session_cookie() {
    let req = Request::builder()
        .method("POST")
        .uri("/auth/login/")
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body("email=bob%40example.com&password=password".to_string())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp.headers()[http::header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("sessionid=2"), "{cookie}");
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let req = Request::builder()
        .method("POST")
        .uri("/auth/login/")
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body("email=bob%40example.com&password=nope".to_string())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["status"], "FAILED");
}

#[tokio::test]
async fn api_requires_login() {
    let resp = app().oneshot(get("/api/items/", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "FAILED");
    assert_eq!(json["message"], "You must be authenticated to perform this action.");
}

// --- items ---

#[tokio::test]
async fn list_items_empty() {
    let resp = app().oneshot(get("/api/items/", Some(ALICE))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["value"], serde_json::json!([]));
}

#[tokio::test]
async fn create_item_missing_fields_returns_form_errors() {
    let resp = app()
        .oneshot(multipart("POST", "/api/items/", Some(ALICE), &[("desc", "no title")]))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["message"], "Failed to create the item");
    assert!(json["errors"]["title"].is_array());
    assert!(json["errors"]["starting_price"].is_array());
    assert!(json["errors"]["end_date"].is_array());
}

#[tokio::test]
async fn get_missing_item_returns_404() {
    let resp = app().oneshot(get("/api/items/999/", Some(ALICE))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["status"], "FAILED");
}

#[tokio::test]
async fn auction_lifecycle() {
    let mut app = app().into_service();

    // alice lists an item
    let resp = call(
        &mut app,
        multipart("POST", "/api/items/", Some(ALICE), &item_fields("Brass Lamp", "10", "2099-01-01T12:00")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let item: Item = serde_json::from_value(body_json(resp).await["value"].clone()).unwrap();
    assert_eq!(item.starting_price, "10.00");
    assert_eq!(item.current_price, "10.00");
    assert_eq!(item.end_date, "2099-01-01T12:00:00Z");
    assert!(!item.has_bids);
    assert!(!item.has_ended);
    let id = item.id;

    // search is case-insensitive, misses filter out
    let resp = call(&mut app, get("/api/items/?q=lamp", Some(BOB))).await;
    assert_eq!(body_json(resp).await["value"].as_array().unwrap().len(), 1);
    let resp = call(&mut app, get("/api/items/?q=chair", Some(BOB))).await;
    assert_eq!(body_json(resp).await["value"].as_array().unwrap().len(), 0);

    // owner cannot bid
    let resp = call(
        &mut app,
        multipart("PUT", &format!("/api/items/{id}/bid/"), Some(ALICE), &[("bid_price", "20")]),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["message"], "You cannot bid on your own items.");

    // below starting price
    let resp = call(
        &mut app,
        multipart("PUT", &format!("/api/items/{id}/bid/"), Some(BOB), &[("bid_price", "5")]),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "Failed to place bid on the item");

    // valid bid
    let resp = call(
        &mut app,
        multipart("PUT", &format!("/api/items/{id}/bid/"), Some(BOB), &[("bid_price", "12.5")]),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let item: Item = serde_json::from_value(body_json(resp).await["value"].clone()).unwrap();
    assert_eq!(item.bid_price.as_deref(), Some("12.50"));
    assert_eq!(item.current_price, "12.50");
    assert_eq!(item.bid_user.unwrap().id, 2);
    assert!(item.has_bids);

    // equal bid is rejected
    let resp = call(
        &mut app,
        multipart("PUT", &format!("/api/items/{id}/bid/"), Some(BOB), &[("bid_price", "12.50")]),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // only the owner may edit
    let resp = call(
        &mut app,
        multipart("PUT", &format!("/api/items/{id}/"), Some(BOB), &item_fields("Mine now", "1", "2099-01-01T12:00")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = call(
        &mut app,
        multipart("PUT", &format!("/api/items/{id}/"), Some(ALICE), &item_fields("Brass Lamp II", "10", "2099-01-01T12:00")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let item: Item = serde_json::from_value(body_json(resp).await["value"].clone()).unwrap();
    assert_eq!(item.title, "Brass Lamp II");
    assert_eq!(item.bid_price.as_deref(), Some("12.50"));
}

#[tokio::test]
async fn ended_auction_rejects_bids() {
    let mut app = app().into_service();
    let resp = call(
        &mut app,
        multipart("POST", "/api/items/", Some(ALICE), &item_fields("Old vase", "3", "2000-01-01T00:00")),
    )
    .await;
    let item: Item = serde_json::from_value(body_json(resp).await["value"].clone()).unwrap();
    assert!(item.has_ended);

    let resp = call(
        &mut app,
        multipart("PUT", &format!("/api/items/{}/bid/", item.id), Some(BOB), &[("bid_price", "4")]),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["message"], "Item auction has ended.");
}

// --- queries ---

#[tokio::test]
async fn query_lifecycle() {
    let mut app = app().into_service();
    let resp = call(
        &mut app,
        multipart("POST", "/api/items/", Some(ALICE), &item_fields("Clock", "30", "2099-06-01T00:00")),
    )
    .await;
    let item: Item = serde_json::from_value(body_json(resp).await["value"].clone()).unwrap();
    let base = format!("/api/items/{}/queries/", item.id);

    let resp = call(&mut app, multipart("POST", &base, Some(BOB), &[("question", "Does it tick?")])).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let query: ItemQuery = serde_json::from_value(body_json(resp).await["value"].clone()).unwrap();
    assert_eq!(query.asked_by.id, 2);
    assert!(query.answer.is_none());
    let query_url = format!("{base}{}/", query.id);

    // only the asker may edit the question
    let resp = call(&mut app, multipart("PUT", &query_url, Some(ALICE), &[("question", "Hijacked")])).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let resp = call(&mut app, multipart("PUT", &query_url, Some(BOB), &[("question", "Does it tock?")])).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // only the owner may answer
    let answer_url = format!("{query_url}answer/");
    let resp = call(&mut app, multipart("PUT", &answer_url, Some(BOB), &[("answer", "Sure")])).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let resp = call(&mut app, multipart("PUT", &answer_url, Some(ALICE), &[("answer", "Loudly")])).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = call(&mut app, get(&base, Some(BOB))).await;
    let queries: Vec<ItemQuery> = serde_json::from_value(body_json(resp).await["value"].clone()).unwrap();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].question, "Does it tock?");
    assert_eq!(queries[0].answer.as_deref(), Some("Loudly"));
}

// --- users ---

#[tokio::test]
async fn users_can_only_edit_themselves() {
    let mut app = app().into_service();
    let fields = [("email", "alice@new.example.com"), ("password", "pw"), ("dob", "1990-02-02")];

    let resp = call(&mut app, multipart("PUT", "/api/users/1/", Some(BOB), &fields)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = call(&mut app, multipart("PUT", "/api/users/1/", Some(ALICE), &fields)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "OK");
    assert!(json.get("value").is_none());

    let resp = call(&mut app, get("/api/users/1/", Some(BOB))).await;
    let user: User = serde_json::from_value(body_json(resp).await["value"].clone()).unwrap();
    assert_eq!(user.email, "alice@new.example.com");
    assert_eq!(user.dob, "1990-02-02");
}

#[tokio::test]
async fn profile_update_rejects_taken_email() {
    let fields = [("email", "bob@example.com"), ("password", "pw"), ("dob", "1990-02-02")];
    let resp = app()
        .oneshot(multipart("PUT", "/api/profile/", Some(ALICE), &fields))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["message"], "Failed to save changes to user");
    assert!(json["errors"]["email"].is_array());
}

#[tokio::test]
async fn health_is_ok() {
    let resp = app().oneshot(get("/health/", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
