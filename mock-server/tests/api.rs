use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- list ---

#[tokio::test]
async fn list_users_empty() {
    let resp = app().oneshot(empty_request("GET", "/users")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["users"], json!([]));
    assert_eq!(body["count"], 0);
    assert!(body["next_page"].is_null());
}

#[tokio::test]
async fn list_users_page_past_the_end_is_empty() {
    let app = app();
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/users", r#"{"user":{"name":"Bob"}}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let uri = format!("/users?page={}&per_page=2", usize::MAX);
    let resp = app.oneshot(empty_request("GET", &uri)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["users"], json!([]));
    assert_eq!(body["count"], 1);
    assert!(body["next_page"].is_null());
}

// --- create ---

#[tokio::test]
async fn create_user_returns_201() {
    let resp = app()
        .oneshot(json_request("POST", "/users", r#"{"user":{"name":"Mr. Miyagi"}}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["user"]["id"], 1);
    assert_eq!(body["user"]["name"], "Mr. Miyagi");
    assert_eq!(body["user"]["role"], "end_user");
}

#[tokio::test]
async fn create_user_without_name_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/users", r#"{"user":{"email":"x@example.com"}}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "RecordInvalid");
}

#[tokio::test]
async fn create_user_without_envelope_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/users", r#"{"name":"Bob"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- get ---

#[tokio::test]
async fn get_user_not_found() {
    let resp = app().oneshot(empty_request("GET", "/users/42")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_user_bad_id_returns_400() {
    let resp = app().oneshot(empty_request("GET", "/users/bob")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn current_user_on_empty_store_is_404() {
    let resp = app().oneshot(empty_request("GET", "/users/current")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- identities ---

#[tokio::test]
async fn identities_of_missing_user_is_404() {
    let resp = app()
        .oneshot(empty_request("GET", "/users/7/user_identities"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- update ---

#[tokio::test]
async fn update_user_not_found() {
    let resp = app()
        .oneshot(json_request("PUT", "/users/42", r#"{"user":{"name":"Nope"}}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- delete ---

#[tokio::test]
async fn delete_user_not_found() {
    let resp = app().oneshot(empty_request("DELETE", "/users/42")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full lifecycle ---

#[tokio::test]
async fn users_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    macro_rules! send {
        ($req:expr) => {
            ServiceExt::ready(&mut app).await.unwrap().call($req).await.unwrap()
        };
    }

    // create two users
    let resp = send!(json_request(
        "POST",
        "/users",
        r#"{"user":{"name":"Bob Smith","email":"bob@example.com"}}"#
    ));
    assert_eq!(resp.status(), StatusCode::CREATED);
    let bob = body_json(resp).await["user"].clone();
    let bob_id = bob["id"].as_u64().unwrap();

    let resp = send!(json_request(
        "POST",
        "/users",
        r#"{"user":{"name":"Alice","role":"agent"}}"#
    ));
    assert_eq!(resp.status(), StatusCode::CREATED);
    let alice_id = body_json(resp).await["user"]["id"].as_u64().unwrap();

    // search matches name or email, case-insensitive
    let resp = send!(empty_request("GET", "/users?query=BOB"));
    let body = body_json(resp).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["users"][0]["id"], bob_id);

    // paging
    let resp = send!(empty_request("GET", "/users?per_page=1"));
    let body = body_json(resp).await;
    assert_eq!(body["users"].as_array().unwrap().len(), 1);
    assert_eq!(body["count"], 2);
    assert_eq!(body["next_page"], "/users?page=2");

    // current is the lowest id
    let resp = send!(empty_request("GET", "/users/current"));
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["user"]["id"], bob_id);

    // identities come from the email
    let resp = send!(empty_request("GET", &format!("/users/{bob_id}/user_identities")));
    let body = body_json(resp).await;
    assert_eq!(body["identities"][0]["type"], "email");
    assert_eq!(body["identities"][0]["value"], "bob@example.com");

    let resp = send!(empty_request("GET", &format!("/users/{alice_id}/user_identities")));
    assert_eq!(body_json(resp).await["identities"], json!([]));

    // partial update
    let resp = send!(json_request(
        "PUT",
        &format!("/users/{bob_id}"),
        r#"{"user":{"email":"hongkong@phooey.com"}}"#
    ));
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body_json(resp).await;
    assert_eq!(updated["user"]["email"], "hongkong@phooey.com");
    assert_eq!(updated["user"]["name"], "Bob Smith");

    // delete
    let resp = send!(empty_request("DELETE", &format!("/users/{bob_id}")));
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // get after delete
    let resp = send!(empty_request("GET", &format!("/users/{bob_id}")));
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // current moves on
    let resp = send!(empty_request("GET", "/users/current"));
    assert_eq!(body_json(resp).await["user"]["id"], alice_id);
}
