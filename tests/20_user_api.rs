mod common;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use recipe_api::auth::{generate_jwt, Claims};
use recipe_api::config;
use recipe_api::database::Store;

use common::PASSWORD;

#[tokio::test]
async fn create_user_success() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .post(server.url("/api/user/create"))
        .json(&json!({ "email": "test@example.com", "password": "testpass123", "name": "Test Name" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let data = common::data(res).await?;
    assert_eq!(data["email"], "test@example.com");
    assert_eq!(data["name"], "Test Name");
    assert!(data.get("password").is_none());

    // The new account can log in
    server.login("test@example.com", "testpass123").await?;
    Ok(())
}

#[tokio::test]
async fn create_user_with_existing_email_fails() -> Result<()> {
    let server = common::spawn_server().await?;
    server.signup("test@example.com").await?;

    let res = server
        .client
        .post(server.url("/api/user/create"))
        .json(&json!({ "email": "test@EXAMPLE.com", "password": PASSWORD, "name": "Other" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["field_errors"]["email"], "user with this email already exists.");
    Ok(())
}

#[tokio::test]
async fn create_user_with_short_password_fails() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .post(server.url("/api/user/create"))
        .json(&json!({ "email": "test@example.com", "password": "pw", "name": "Test Name" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert!(body["field_errors"]["password"].is_string());

    // No account was created
    let res = server
        .client
        .post(server.url("/api/user/token"))
        .json(&json!({ "email": "test@example.com", "password": "pw" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn create_user_requires_name() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .post(server.url("/api/user/create"))
        .json(&json!({ "email": "test@example.com", "password": PASSWORD }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["field_errors"]["name"], "This field is required.");
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_rejected() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .post(server.url("/api/user/create"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn token_issued_for_valid_credentials() -> Result<()> {
    let server = common::spawn_server().await?;
    server.signup("test@example.com").await?;

    let res = server
        .client
        .post(server.url("/api/user/token"))
        .json(&json!({ "email": "test@example.com", "password": PASSWORD }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let data = common::data(res).await?;
    assert!(data["token"].as_str().is_some_and(|t| !t.is_empty()));
    Ok(())
}

#[tokio::test]
async fn token_login_normalizes_email_domain() -> Result<()> {
    let server = common::spawn_server().await?;
    server.signup("test@example.com").await?;

    server.login("test@Example.COM", PASSWORD).await?;
    Ok(())
}

#[tokio::test]
async fn token_rejected_for_bad_credentials() -> Result<()> {
    let server = common::spawn_server().await?;
    server.signup("test@example.com").await?;

    let res = server
        .client
        .post(server.url("/api/user/token"))
        .json(&json!({ "email": "test@example.com", "password": "wrongpass" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(
        body["field_errors"]["non_field_errors"],
        "unable to authenticate with provided credentials"
    );
    assert!(body.get("data").is_none());
    Ok(())
}

#[tokio::test]
async fn token_rejected_for_unknown_user() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .post(server.url("/api/user/token"))
        .json(&json!({ "email": "nobody@example.com", "password": PASSWORD }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn token_rejected_for_blank_password() -> Result<()> {
    let server = common::spawn_server().await?;
    server.signup("test@example.com").await?;

    let res = server
        .client
        .post(server.url("/api/user/token"))
        .json(&json!({ "email": "test@example.com", "password": "" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["field_errors"]["password"], "This field may not be blank.");
    Ok(())
}

#[tokio::test]
async fn token_rejected_without_email() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .post(server.url("/api/user/token"))
        .json(&json!({ "password": PASSWORD }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["field_errors"]["email"], "This field is required.");
    Ok(())
}

#[tokio::test]
async fn me_requires_authentication() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/api/user/me")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server.get("/api/user/me", "not-a-token").send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn me_accepts_token_scheme() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.signup("test@example.com").await?;

    let res = server
        .client
        .get(server.url("/api/user/me"))
        .header("Authorization", format!("Token {}", token))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn me_returns_profile() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.signup("test@example.com").await?;

    let res = server.get("/api/user/me", &token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let data = common::data(res).await?;
    assert_eq!(data, json!({ "email": "test@example.com", "name": "Test Name" }));
    Ok(())
}

#[tokio::test]
async fn post_on_me_not_allowed() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.signup("test@example.com").await?;

    let res = server.post("/api/user/me", &token, json!({})).send().await?;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    Ok(())
}

#[tokio::test]
async fn patch_me_updates_name_and_password() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.signup("test@example.com").await?;

    let res = server
        .patch("/api/user/me", &token, json!({ "name": "Updated name", "password": "newpassword123" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let data = common::data(res).await?;
    assert_eq!(data["name"], "Updated name");
    assert_eq!(data["email"], "test@example.com");

    server.login("test@example.com", "newpassword123").await?;
    assert!(server.login("test@example.com", PASSWORD).await.is_err());
    Ok(())
}

#[tokio::test]
async fn put_me_requires_every_field() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.signup("test@example.com").await?;

    let res = server
        .put("/api/user/me", &token, json!({ "name": "Only name" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .put(
            "/api/user/me",
            &token,
            json!({ "email": "new@Example.com", "name": "New", "password": "another123" }),
        )
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let data = common::data(res).await?;
    assert_eq!(data["email"], "new@example.com");

    server.login("new@example.com", "another123").await?;
    Ok(())
}

#[tokio::test]
async fn patch_me_rejects_taken_email() -> Result<()> {
    let server = common::spawn_server().await?;
    server.signup("taken@example.com").await?;
    let token = server.signup("test@example.com").await?;

    let res = server
        .patch("/api/user/me", &token, json!({ "email": "taken@example.com" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["field_errors"]["email"], "user with this email already exists.");
    Ok(())
}

#[tokio::test]
async fn create_user_trims_name() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .post(server.url("/api/user/create"))
        .json(&json!({ "email": "  test@example.com ", "password": PASSWORD, "name": "  Bob  " }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let data = common::data(res).await?;
    assert_eq!(data["name"], "Bob");
    assert_eq!(data["email"], "test@example.com");
    Ok(())
}

#[tokio::test]
async fn create_user_with_overlong_password_fails() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .post(server.url("/api/user/create"))
        .json(&json!({
            "email": "test@example.com",
            "password": format!("{}CORRECT", "a".repeat(72)),
            "name": "Test Name"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(
        body["field_errors"]["password"],
        "Ensure this field has no more than 72 characters."
    );
    Ok(())
}

#[tokio::test]
async fn token_rejected_when_only_first_72_bytes_match() -> Result<()> {
    let server = common::spawn_server().await?;
    let stored = "a".repeat(72);

    let res = server
        .client
        .post(server.url("/api/user/create"))
        .json(&json!({ "email": "test@example.com", "password": stored, "name": "Test Name" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    server.login("test@example.com", &stored).await?;

    let res = server
        .client
        .post(server.url("/api/user/token"))
        .json(&json!({ "email": "test@example.com", "password": format!("{}totally-wrong", stored) }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert!(body.get("data").is_none());
    Ok(())
}

#[tokio::test]
async fn oversized_body_is_payload_too_large() -> Result<()> {
    let mut config = config::config().clone();
    config.api.max_request_size_bytes = 64;
    let server = common::spawn_server_with(&config).await?;

    let res = server
        .client
        .post(server.url("/api/user/create"))
        .json(&json!({ "email": "test@example.com", "password": PASSWORD, "name": "x".repeat(500) }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let body: Value = res.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    Ok(())
}

#[tokio::test]
async fn body_without_json_content_type_is_unsupported() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .post(server.url("/api/user/create"))
        .body(json!({ "email": "test@example.com", "password": PASSWORD, "name": "Test" }).to_string())
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let body: Value = res.json().await?;
    assert_eq!(body["code"], "UNSUPPORTED_MEDIA_TYPE");
    Ok(())
}

#[tokio::test]
async fn me_rejects_inactive_user() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.signup("test@example.com").await?;

    let mut user = server
        .store
        .user_by_email("test@example.com")
        .await?
        .context("user missing from store")?;
    user.is_active = false;
    server.store.update_user(&user).await?;

    let res = server.get("/api/user/me", &token).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Nor can the account log in again
    assert!(server.login("test@example.com", PASSWORD).await.is_err());
    Ok(())
}

#[tokio::test]
async fn me_rejects_token_for_deleted_user() -> Result<()> {
    let server = common::spawn_server().await?;

    let token = generate_jwt(&Claims::new(9_999, "ghost@example.com"))?;
    let res = server.get("/api/user/me", &token).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn me_rejects_invalid_token() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.signup("test@example.com").await?;

    let user = server
        .store
        .user_by_email("test@example.com")
        .await?
        .context("user missing from store")?;

    // Signed with another secret
    let forged = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &Claims::new(user.id, user.email.clone()),
        &jsonwebtoken::EncodingKey::from_secret(b"not-the-server-secret"),
    )?;
    let res = server.get("/api/user/me", &forged).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Garbage
    let res = server.get("/api/user/me", "abc.def.ghi").send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Expired
    let mut claims = Claims::new(user.id, user.email.clone());
    claims.iat -= 7_200;
    claims.exp = claims.iat + 60;
    let expired = generate_jwt(&claims)?;
    let res = server.get("/api/user/me", &expired).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body: Value = res.json().await?;
    assert_eq!(body["code"], "UNAUTHORIZED");

    // The untouched token still works
    let res = server.get("/api/user/me", &token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}
