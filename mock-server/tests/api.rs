use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, basic_auth, MOCK_TOKEN};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn authed(method: &str, uri: &str) -> http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, basic_auth(MOCK_TOKEN))
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    authed(method, uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    authed(method, uri).body(String::new()).unwrap()
}

const BOUNDARY: &str = "X-MOCK-BOUNDARY";

fn multipart_body(fields: &[(&str, &str)], file: Option<&str>) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    if let Some(contents) = file {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.txt\"\r\n\r\n{contents}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

fn upload(body: String) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(body)
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn missing_auth_returns_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/v2/users/me")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_token_returns_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/v2/devices")
                .header(http::header::AUTHORIZATION, basic_auth("nope"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- user ---

#[tokio::test]
async fn get_me_returns_seeded_user() {
    let resp = app().oneshot(empty_request("GET", "/v2/users/me")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let user = body_json(resp).await;
    assert_eq!(user["name"], "Elon Musk");
    assert_eq!(user["preferences"]["social"], false);
}

// --- collections ---

#[tokio::test]
async fn list_devices_empty_envelope() {
    let resp = app().oneshot(empty_request("GET", "/v2/devices")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body, serde_json::json!({"devices": []}));
}

#[tokio::test]
async fn create_contact_missing_email_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/v2/contacts", r#"{"name":"foo"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_link_push_without_link_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/v2/pushes", r#"{"type":"link"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_unknown_device_returns_404() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/v2/devices/missing"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- channels ---

#[tokio::test]
async fn channel_info_by_tag() {
    let resp = app()
        .oneshot(empty_request("GET", "/v2/channel-info?tag=jblow"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let channel = body_json(resp).await;
    assert_eq!(channel["name"], "Jonathan Blow");
}

#[tokio::test]
async fn channel_info_unknown_tag_returns_404() {
    let resp = app()
        .oneshot(empty_request("GET", "/v2/channel-info?tag=nobody"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn subscribe_unknown_channel_returns_400() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/v2/subscriptions",
            r#"{"channel_tag":"nobody"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- uploads ---

#[tokio::test]
async fn upload_request_points_at_host() {
    let req = authed("POST", "/v2/upload-request")
        .header(http::header::HOST, "127.0.0.1:4000")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(r#"{"file_name":"a.txt","file_type":"text/plain"}"#.to_string())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let ticket = body_json(resp).await;
    assert_eq!(ticket["upload_url"], "http://127.0.0.1:4000/upload");
    assert_eq!(ticket["data"]["content-type"], "text/plain");
    assert!(ticket["file_url"]
        .as_str()
        .unwrap()
        .starts_with("http://127.0.0.1:4000/files/"));
}

#[tokio::test]
async fn upload_without_signing_fields_returns_400() {
    let resp = app()
        .oneshot(upload(multipart_body(&[("key", "k")], Some("hello"))))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- full lifecycle ---

#[tokio::test]
async fn contact_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/v2/contacts",
            r#"{"name":"Ryan","email":"Ryan@Example.com"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let created = body_json(resp).await;
    assert_eq!(created["email_normalized"], "ryan@example.com");
    assert_eq!(created["active"], true);
    let iden = created["iden"].as_str().unwrap().to_string();

    // update: iden in the body is ignored
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            &format!("/v2/contacts/{iden}"),
            r#"{"name":"Ryan O"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body_json(resp).await;
    assert_eq!(updated["name"], "Ryan O");
    assert_eq!(updated["iden"], iden.as_str());

    // list
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/v2/contacts"))
        .await
        .unwrap();
    let listed = body_json(resp).await;
    assert_eq!(listed["contacts"].as_array().unwrap().len(), 1);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/v2/contacts/{iden}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // delete again: 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/v2/contacts/{iden}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_then_download() {
    use tower::Service;

    let mut app = app().into_service();
    let fields = [
        ("awsaccesskeyid", "AK"),
        ("acl", "public-read"),
        ("key", "abc-a.txt"),
        ("signature", "sig"),
        ("policy", "pol"),
        ("content-type", "text/plain"),
    ];

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(upload(multipart_body(&fields, Some("hello"))))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .uri("/files/abc-a.txt")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await.as_ref(), b"hello");
}
