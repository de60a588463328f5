#![allow(clippy::unwrap_used)]
// Integration tests for `GraphQlClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shopkeep_api::{
    CreateProductInput, Error, GraphQlClient, LoginInput, RegisterInput, UpdateProductInput,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, GraphQlClient) {
    let server = MockServer::start().await;
    let endpoint = Url::parse(&format!("{}/query", server.uri())).unwrap();
    let client = GraphQlClient::with_client(reqwest::Client::new(), endpoint);
    (server, client)
}

fn token() -> SecretString {
    SecretString::from("jwt-abc".to_string())
}

// ── Auth tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_register_returns_token_and_user() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_partial_json(json!({
            "operationName": "Register",
            "variables": { "input": { "name": "Ana", "email": "ana@x.com", "password": "p1" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "register": {
                "token": "jwt-new",
                "user": { "_id": "u1", "name": "Ana", "email": "ana@x.com" }
            } }
        })))
        .mount(&server)
        .await;

    let payload = client
        .register(&RegisterInput {
            name: "Ana".into(),
            email: "ana@x.com".into(),
            password: SecretString::from("p1".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(payload.token, "jwt-new");
    assert_eq!(payload.user.id, "u1");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{ "message": "email already exists", "path": ["register"] }],
            "data": null
        })))
        .mount(&server)
        .await;

    let result = client
        .register(&RegisterInput {
            name: "Ana".into(),
            email: "ana@x.com".into(),
            password: SecretString::from("p1".to_string()),
        })
        .await;

    let err = result.unwrap_err();
    assert!(err.is_validation(), "expected validation error, got: {err:?}");
    assert_eq!(err.to_string(), "email already exists");
}

#[tokio::test]
async fn test_login_bad_credentials() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{ "message": "invalid email or password" }],
            "data": null
        })))
        .mount(&server)
        .await;

    let result = client
        .login(&LoginInput {
            email: "ana@x.com".into(),
            password: SecretString::from("nope".to_string()),
        })
        .await;

    assert!(
        matches!(result, Err(Error::GraphQl { .. })),
        "expected GraphQl error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid or expired token\n"))
        .mount(&server)
        .await;

    let result = client.list_users(&token()).await;

    match result {
        Err(Error::Authentication { message }) => {
            assert_eq!(message, "Invalid or expired token");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

// ── User tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_users_sends_bearer_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(header("authorization", "Bearer jwt-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "users": [
                { "_id": "u1", "name": "Ana", "email": "ana@x.com" },
                { "_id": "u2", "name": "Budi", "email": "budi@x.com" }
            ] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let users = client.list_users(&token()).await.unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(users[1].name, "Budi");
}

#[tokio::test]
async fn test_delete_user_returns_deleted_id() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_partial_json(json!({ "variables": { "id": "u2" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "deleteUser": { "deletedUserId": "u2" } }
        })))
        .mount(&server)
        .await;

    let deleted = client.delete_user("u2", &token()).await.unwrap();
    assert_eq!(deleted, "u2");
}

#[tokio::test]
async fn test_get_user_missing_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "user": null }
        })))
        .mount(&server)
        .await;

    let err = client.get_user("gone", &token()).await.unwrap_err();
    assert!(err.is_not_found(), "expected not-found, got: {err:?}");
}

// ── Product tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_create_product() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_partial_json(json!({
            "operationName": "CreateProduct",
            "variables": { "input": { "name": "Kopi", "price": 1_500_000.0, "stock": 3 } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "createProduct": {
                "_id": "p1", "name": "Kopi", "price": 1_500_000.0, "stock": 3
            } }
        })))
        .mount(&server)
        .await;

    let product = client
        .create_product(
            &CreateProductInput {
                name: "Kopi".into(),
                price: 1_500_000.0,
                stock: 3,
            },
            &token(),
        )
        .await
        .unwrap();

    assert_eq!(product.id, "p1");
    assert_eq!(product.stock, 3);
}

#[tokio::test]
async fn test_update_product_sends_only_present_fields() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_partial_json(json!({
            "variables": { "id": "p1", "input": { "stock": 9 } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "updateProduct": {
                "_id": "p1", "name": "Kopi", "price": 20000.0, "stock": 9
            } }
        })))
        .mount(&server)
        .await;

    let input = UpdateProductInput {
        stock: Some(9),
        ..Default::default()
    };
    let product = client.update_product("p1", &input, &token()).await.unwrap();

    assert_eq!(product.stock, 9);
    assert!((product.price - 20000.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_delete_product_missing() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{ "message": "mongo: no documents in result" }],
            "data": null
        })))
        .mount(&server)
        .await;

    let err = client.delete_product("p9", &token()).await.unwrap_err();
    assert!(err.is_not_found(), "expected not-found, got: {err:?}");
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.list_products(&token()).await;

    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_server_error_status() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = client.list_products(&token()).await.unwrap_err();
    assert!(matches!(err, Error::Http { status: 502, .. }));
    assert!(err.is_transient());
}
